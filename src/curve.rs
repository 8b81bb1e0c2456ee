use crate::zones::Zone;

/// Number of samples in an evaluated response curve.
pub const SAMPLES: usize = 256;

#[derive(Clone, Copy, PartialEq, Debug, serde::Serialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

/// Evaluate the response curve of a zone over 256 samples of `x` in 0..=1.
///
/// The curve is the quadratic `y = x * (a * x + b)` through the origin with
/// `a = mean(alpha) / 256` and `b = mean(beta) / 256`. The zone temperature
/// is a separate compensation axis and does not enter the curve.
///
/// Pure: evaluating the same zone twice yields bit-identical points. Callers
/// render previews by evaluating both the live zone and its parse-time
/// snapshot.
pub fn evaluate(zone: &Zone) -> Vec<CurvePoint> {
    let a = mean(&zone.alpha) / 256.0;
    let b = mean(&zone.beta) / 256.0;
    (0..SAMPLES)
        .map(|i| {
            let x = i as f64 / (SAMPLES - 1) as f64;
            CurvePoint { x, y: x * (a * x + b) }
        })
        .collect()
}

fn mean(values: &[u16; 4]) -> f64 {
    values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64
}

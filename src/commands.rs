use strum::VariantNames as _;

use crate::zones::{Slot, ZoneIndex, ZONE_COUNT};

/// A single `FIELD=VALUE` coefficient assignment with a decimal value.
#[derive(Clone, Debug)]
pub struct Assignment {
    pub slot: Slot,
    pub value: u16,
}

impl std::str::FromStr for Assignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Assignment, String> {
        let Some((field, value)) = s.split_once('=') else {
            return Err(format!("expected FIELD=VALUE, got `{s}`"));
        };
        let field = field.trim();
        let slot = field.parse::<Slot>().map_err(|_| {
            format!("unknown field `{field}` (expected one of: {})", Slot::VARIANTS.join(", "))
        })?;
        let value = value.trim();
        let value = value
            .parse::<u16>()
            .map_err(|e| format!("could not parse `{value}` as a decimal register value: {e}"))?;
        Ok(Assignment { slot, value })
    }
}

fn zone_index(s: &str) -> Result<ZoneIndex, String> {
    let index =
        s.parse::<u8>().map_err(|e| format!("could not parse `{s}` as a zone index: {e}"))?;
    ZoneIndex::new(index).ok_or_else(|| format!("zone index must be below {ZONE_COUNT}"))
}

pub mod zones {
    use std::path::PathBuf;

    use crate::document::RegisterDocument;
    use crate::output;
    use crate::zones::ZoneIndex;

    /// Show the calibration parameters of each zone in a register dump.
    #[derive(clap::Parser)]
    pub struct Args {
        /// Path to the register dump to read.
        input: PathBuf,
        /// Only show the zone with this index.
        #[arg(long, short = 'z', value_parser = super::zone_index)]
        zone: Option<ZoneIndex>,
        #[clap(flatten)]
        output: output::Args,
    }

    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error("could not read the register dump at {1:?}")]
        ReadInput(#[source] std::io::Error, PathBuf),
        #[error("could not load the register dump at {1:?}")]
        Load(#[source] crate::document::Error, PathBuf),
        #[error("could not produce the output")]
        Output(#[source] output::Error),
    }

    #[derive(serde::Serialize)]
    pub struct ZoneSchema {
        pub zone: u8,
        pub base_address: u16,
        pub temperature: u16,
        pub alpha: [u16; 4],
        pub beta: [u16; 4],
    }

    pub fn run(args: Args) -> Result<(), Error> {
        let text = std::fs::read_to_string(&args.input)
            .map_err(|e| Error::ReadInput(e, args.input.clone()))?;
        let document =
            RegisterDocument::parse(&text).map_err(|e| Error::Load(e, args.input.clone()))?;
        let mut output = args.output.to_output().map_err(Error::Output)?;
        output
            .headers(vec![
                "Zone", "Base", "Temperature", "Alpha0", "Alpha1", "Alpha2", "Alpha3", "Beta0",
                "Beta1", "Beta2", "Beta3",
            ])
            .map_err(Error::Output)?;
        for (index, zone) in document.zones() {
            if args.zone.is_some_and(|only| only != index) {
                continue;
            }
            output
                .row(
                    || {
                        let mut cells = vec![index.to_string(), format!("{:04X}", index.base())];
                        cells.push(zone.temperature.to_string());
                        cells.extend(zone.alpha.iter().map(|v| v.to_string()));
                        cells.extend(zone.beta.iter().map(|v| v.to_string()));
                        cells
                    },
                    || ZoneSchema {
                        zone: index.index() as u8,
                        base_address: index.base(),
                        temperature: zone.temperature,
                        alpha: zone.alpha,
                        beta: zone.beta,
                    },
                )
                .map_err(Error::Output)?;
        }
        output.finish().map_err(Error::Output)
    }
}

pub mod curve {
    use std::path::PathBuf;

    use tracing::debug;

    use crate::document::RegisterDocument;
    use crate::{curve, output};
    use crate::zones::ZoneIndex;

    /// Compute the response curve of a zone, next to its as-loaded curve.
    ///
    /// Assignments given with `--set` are applied to the zone first, so the
    /// two series preview what an edit would do to the curve.
    #[derive(clap::Parser)]
    pub struct Args {
        /// Path to the register dump to read.
        input: PathBuf,
        /// Zone whose response curve to compute.
        #[arg(long, short = 'z', value_parser = super::zone_index)]
        zone: ZoneIndex,
        /// Coefficient assignments applied before evaluation, e.g. `--set alpha2=300`.
        #[arg(long = "set", short = 's', value_name = "FIELD=VALUE")]
        set: Vec<super::Assignment>,
        #[clap(flatten)]
        output: output::Args,
    }

    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error("could not read the register dump at {1:?}")]
        ReadInput(#[source] std::io::Error, PathBuf),
        #[error("could not load the register dump at {1:?}")]
        Load(#[source] crate::document::Error, PathBuf),
        #[error("could not produce the output")]
        Output(#[source] output::Error),
    }

    #[derive(serde::Serialize)]
    pub struct CurveSample {
        pub x: f64,
        pub output: f64,
        pub original: f64,
    }

    pub fn run(args: Args) -> Result<(), Error> {
        let text = std::fs::read_to_string(&args.input)
            .map_err(|e| Error::ReadInput(e, args.input.clone()))?;
        let mut document =
            RegisterDocument::parse(&text).map_err(|e| Error::Load(e, args.input.clone()))?;
        for assignment in &args.set {
            document.zone_mut(args.zone).set(assignment.slot, assignment.value);
        }
        debug!(message = "evaluating zone curve", zone = %args.zone, edits = args.set.len());
        let modified = curve::evaluate(document.zone(args.zone));
        let original = curve::evaluate(document.original_zone(args.zone));
        let mut output = args.output.to_output().map_err(Error::Output)?;
        output
            .headers(vec!["Input Brightness", "Output", "Original Output"])
            .map_err(Error::Output)?;
        for (point, baseline) in modified.iter().zip(&original) {
            output
                .row(
                    || {
                        vec![
                            format!("{:.6}", point.x),
                            format!("{:.6}", point.y),
                            format!("{:.6}", baseline.y),
                        ]
                    },
                    || CurveSample { x: point.x, output: point.y, original: baseline.y },
                )
                .map_err(Error::Output)?;
        }
        output.finish().map_err(Error::Output)
    }
}

pub mod edit {
    use std::path::PathBuf;

    use tracing::info;

    use crate::document::RegisterDocument;
    use crate::zones::ZoneIndex;

    /// Apply coefficient edits to a register dump and write it back out.
    ///
    /// Data lines whose values are unchanged since load are reproduced
    /// byte-for-byte; only lines whose value actually changed come out
    /// reformatted. Without any `--set` this normalizes the dump into the
    /// canonical block container.
    #[derive(clap::Parser)]
    pub struct Args {
        /// Path to the register dump to read.
        input: PathBuf,
        /// Zone the assignments apply to.
        #[arg(long, short = 'z', value_parser = super::zone_index)]
        zone: Option<ZoneIndex>,
        /// Coefficient assignments, e.g. `--set alpha2=300`.
        #[arg(long = "set", short = 's', value_name = "FIELD=VALUE", requires = "zone")]
        set: Vec<super::Assignment>,
        /// Write the edited dump to this file instead of the terminal.
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    }

    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error("could not read the register dump at {1:?}")]
        ReadInput(#[source] std::io::Error, PathBuf),
        #[error("could not load the register dump at {1:?}")]
        Load(#[source] crate::document::Error, PathBuf),
        #[error("could not open the specified output file at {1:?}")]
        OpenOutputFile(#[source] std::io::Error, PathBuf),
        #[error("could not write data to the output file at {1:?}")]
        WriteFile(#[source] std::io::Error, PathBuf),
        #[error("could not write data to the terminal")]
        WriteStdout(#[source] std::io::Error),
    }

    pub fn run(args: Args) -> Result<(), Error> {
        let text = std::fs::read_to_string(&args.input)
            .map_err(|e| Error::ReadInput(e, args.input.clone()))?;
        let mut document =
            RegisterDocument::parse(&text).map_err(|e| Error::Load(e, args.input.clone()))?;
        if let Some(zone) = args.zone {
            for assignment in &args.set {
                document.zone_mut(zone).set(assignment.slot, assignment.value);
            }
        }
        let serialized = document.serialize();
        let mut writer: Box<dyn std::io::Write> = match &args.output {
            None => Box::new(std::io::stdout().lock()) as Box<_>,
            Some(path) => Box::new(
                std::fs::OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path)
                    .map_err(|e| Error::OpenOutputFile(e, path.clone()))?,
            ) as Box<_>,
        };
        writer
            .write_all(serialized.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| match &args.output {
                None => Error::WriteStdout(e),
                Some(p) => Error::WriteFile(e, p.clone()),
            })?;
        if let Some(path) = &args.output {
            info!(message = "wrote edited dump", path = ?path, edits = args.set.len());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;

    use super::Assignment;
    use crate::zones::Slot;

    #[test]
    fn assignments_parse_fields_and_decimal_values() {
        let assignment: Assignment = "alpha2=300".parse().expect("assignment should parse");
        assert_eq!(assignment.slot, Slot::Alpha2);
        assert_eq!(assignment.value, 300);
        let assignment: Assignment = "temperature = 17".parse().expect("spaces should be fine");
        assert_eq!(assignment.slot, Slot::Temperature);
        assert_eq!(assignment.value, 17);
    }

    #[test]
    fn assignments_reject_unknown_fields() {
        let error = "gamma1=3".parse::<Assignment>().expect_err("gamma1 is not a field");
        assert!(error.contains("unknown field"));
    }

    #[test]
    fn assignments_reject_non_decimal_values() {
        assert!("alpha0=0x10".parse::<Assignment>().is_err());
        assert!("alpha0=65536".parse::<Assignment>().is_err());
        assert!("alpha0".parse::<Assignment>().is_err());
    }

    #[test]
    fn zone_indices_beyond_the_block_are_rejected() {
        assert!(super::zone_index("3").is_ok());
        assert!(super::zone_index("7").is_err());
        assert!(super::zone_index("x").is_err());
    }

    #[test]
    fn edit_requires_a_zone_for_assignments() {
        let result = super::edit::Args::try_parse_from(["edit", "dump.txt", "--set", "alpha0=1"]);
        assert!(result.is_err());
        let result = super::edit::Args::try_parse_from([
            "edit", "dump.txt", "--zone", "3", "--set", "alpha0=1", "--set", "beta3=9",
        ]);
        assert!(result.is_ok());
    }

    #[test]
    fn edit_without_assignments_is_a_plain_round_trip() {
        assert!(super::edit::Args::try_parse_from(["edit", "dump.txt"]).is_ok());
    }

    #[test]
    fn curve_requires_a_zone() {
        assert!(super::curve::Args::try_parse_from(["curve", "dump.txt"]).is_err());
        let result = super::curve::Args::try_parse_from([
            "curve", "dump.txt", "--zone", "2", "--set", "beta0=5", "--format", "jsonl",
        ]);
        assert!(result.is_ok());
    }
}

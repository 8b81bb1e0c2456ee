use std::path::PathBuf;

use csv_core::WriteResult;

#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Format {
    Table,
    Jsonl,
    Csv,
}

#[derive(clap::Parser)]
#[group(id = "output::Args")]
pub struct Args {
    /// Write the output to this file instead of the terminal.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
    #[arg(long, short='f', value_enum, default_value_t = Format::Table)]
    format: Format,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("could not open the specified output file at {1:?}")]
    OpenOutputFile(#[source] std::io::Error, PathBuf),
    #[error("could not write data to the output file at {1:?}")]
    WriteFile(#[source] std::io::Error, PathBuf),
    #[error("could not write data to the terminal")]
    WriteStdout(#[source] std::io::Error),
    #[error("could not serialize the record to JSON")]
    SerializeJson(#[source] serde_json::Error),
}

impl Args {
    pub fn to_output(self) -> Result<Output, Error> {
        let io = match &self.output {
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
        let formatter = match &self.format {
            Format::Table => {
                let mut comfy = comfy_table::Table::new();
                comfy.set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
                Formatter::Table { comfy }
            }
            Format::Jsonl => Formatter::Jsonl,
            Format::Csv => Formatter::Csv { writer: csv_core::Writer::new() },
        };
        Ok(Output { destination: self.output, io, formatter })
    }
}

/// A row-oriented presentation sink.
///
/// Commands describe each record twice, as display cells and as a serde
/// value, and the selected format picks whichever representation it needs.
pub struct Output {
    destination: Option<PathBuf>,
    io: Box<dyn std::io::Write>,
    formatter: Formatter,
}

enum Formatter {
    Csv { writer: csv_core::Writer },
    Table { comfy: comfy_table::Table },
    Jsonl,
}

impl Output {
    pub fn headers(&mut self, headers: Vec<&'static str>) -> Result<(), Error> {
        match &mut self.formatter {
            Formatter::Csv { .. } => self.write_csv_row(&headers),
            Formatter::Table { comfy } => {
                comfy.set_header(headers);
                Ok(())
            }
            Formatter::Jsonl => Ok(()),
        }
    }

    pub fn row<R: serde::Serialize>(
        &mut self,
        cells: impl FnOnce() -> Vec<String>,
        record: impl FnOnce() -> R,
    ) -> Result<(), Error> {
        match &mut self.formatter {
            Formatter::Csv { .. } => {
                let cells = cells();
                self.write_csv_row(&cells)
            }
            Formatter::Table { comfy } => {
                comfy.add_row(cells());
                Ok(())
            }
            Formatter::Jsonl => {
                serde_json::to_writer(&mut self.io, &record()).map_err(Error::SerializeJson)?;
                writeln!(self.io).map_err(|e| write_error(&self.destination, e))
            }
        }
    }

    fn write_csv_row<V: std::ops::Deref<Target = str>>(
        &mut self,
        values: &[V],
    ) -> Result<(), Error> {
        let Formatter::Csv { writer } = &mut self.formatter else {
            unreachable!("csv rows are only written by the csv formatter");
        };
        let mut scratch = [0u8; 1024];
        for (position, value) in values.iter().enumerate() {
            if position != 0 {
                let (result, written) = writer.delimiter(&mut scratch);
                debug_assert!(matches!(result, WriteResult::InputEmpty));
                self.io
                    .write_all(&scratch[..written])
                    .map_err(|e| write_error(&self.destination, e))?;
            }
            // A field longer than the scratch buffer is written out in as
            // many passes as it takes.
            let mut input = value.as_bytes();
            loop {
                let (result, consumed, written) = writer.field(input, &mut scratch);
                self.io
                    .write_all(&scratch[..written])
                    .map_err(|e| write_error(&self.destination, e))?;
                input = &input[consumed..];
                if matches!(result, WriteResult::InputEmpty) {
                    break;
                }
            }
        }
        let (result, written) = writer.terminator(&mut scratch);
        debug_assert!(matches!(result, WriteResult::InputEmpty));
        self.io.write_all(&scratch[..written]).map_err(|e| write_error(&self.destination, e))
    }

    pub fn finish(mut self) -> Result<(), Error> {
        if let Formatter::Table { comfy } = &self.formatter {
            writeln!(self.io, "{comfy}").map_err(|e| write_error(&self.destination, e))?;
        }
        self.io.flush().map_err(|e| write_error(&self.destination, e))
    }
}

fn write_error(destination: &Option<PathBuf>, e: std::io::Error) -> Error {
    match destination {
        None => Error::WriteStdout(e),
        Some(p) => Error::WriteFile(e, p.clone()),
    }
}

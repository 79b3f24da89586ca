//! CSV series backend.
//!
//! One file per series: a `time` column followed by the series header.
//! Times are written as `YYYY-MM-DD HH:MM:SS`.

use std::fs::{self, File};
use std::path::Path;

use csv::Writer;

use huum_core::SimTime;

use crate::writer::OutputWriter;
use crate::{OutputError, OutputFilter, OutputResult};

/// Writes one series to a CSV file through an [`OutputFilter`].
pub struct CsvSeriesWriter {
    writer:       Writer<File>,
    filter:       OutputFilter,
    width:        usize,
    /// Values of the previous record, written or not.
    previous:     Option<Vec<f64>>,
    last_written: Option<SimTime>,
    rows:         u64,
    closed:       bool,
}

impl CsvSeriesWriter {
    /// Create `path` (and its parent directories) and write the header row.
    pub fn create(path: &Path, header: &[String], filter: OutputFilter) -> OutputResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = Writer::from_path(path)?;
        writer.write_record(std::iter::once("time").chain(header.iter().map(String::as_str)))?;
        Ok(Self {
            writer,
            filter,
            width: header.len(),
            previous: None,
            last_written: None,
            rows: 0,
            closed: false,
        })
    }

    /// Data rows written so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    fn write_row(&mut self, time: SimTime, values: &[f64]) -> OutputResult<()> {
        self.writer
            .write_record(std::iter::once(time.to_string()).chain(values.iter().map(f64::to_string)))?;
        self.last_written = Some(time);
        self.rows += 1;
        Ok(())
    }
}

impl OutputWriter for CsvSeriesWriter {
    fn write_record(&mut self, values: &[f64], current: SimTime, last: SimTime) -> OutputResult<()> {
        if values.len() != self.width {
            return Err(OutputError::Width { expected: self.width, got: values.len() });
        }
        match self.filter {
            OutputFilter::None => return Ok(()),
            OutputFilter::All => self.write_row(current, values)?,
            OutputFilter::Changes => match self.previous.take() {
                None => self.write_row(current, values)?,
                Some(previous) if previous.as_slice() != values => {
                    // close the plateau the previous values held over
                    if self.last_written.is_some_and(|t| t < last) {
                        self.write_row(last, &previous)?;
                    }
                    self.write_row(current, values)?;
                }
                Some(_) => {}
            },
        }
        self.previous = Some(values.to_vec());
        Ok(())
    }

    fn close(&mut self, current: SimTime) -> OutputResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.filter != OutputFilter::None && self.last_written != Some(current) {
            if let Some(previous) = self.previous.take() {
                self.write_row(current, &previous)?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}

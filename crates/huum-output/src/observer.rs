//! `SimOutputObserver` — bridges `SimObserver` to CSV series writers.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use huum_core::SimTime;
use huum_sim::{OutputSettings, Series, SeriesKind, SimObserver, Snapshot};

use crate::writer::OutputWriter;
use crate::{CsvSeriesWriter, OutputError, OutputFilter, OutputResult};

/// One file and the series feeding it.
struct Sink {
    /// Indices into the snapshot's series, in column order.
    series: Vec<usize>,
    writer: CsvSeriesWriter,
    row:    Vec<f64>,
}

/// A [`SimObserver`] that writes every recorded series to CSV.
///
/// Files are opened on the first snapshot, when the series headers are
/// known.  Errors from the writers are stored internally because
/// `SimObserver` methods have no return value.  After `sim.run()` returns,
/// check for errors with [`take_error`][Self::take_error].
pub struct SimOutputObserver {
    dir:         PathBuf,
    filter:      OutputFilter,
    single_file: bool,
    sinks:       Option<Vec<Sink>>,
    last_error:  Option<OutputError>,
}

impl SimOutputObserver {
    /// Write below `dir` using the filter and layout in `settings`.
    pub fn new(dir: impl Into<PathBuf>, settings: &OutputSettings) -> OutputResult<Self> {
        Ok(Self {
            dir:         dir.into(),
            filter:      settings.filter.parse()?,
            single_file: settings.single_file,
            sinks:       None,
            last_error:  None,
        })
    }

    /// Override the filter from the settings.  Only effective before the
    /// first snapshot.
    pub fn with_filter(mut self, filter: OutputFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn filter(&self) -> OutputFilter {
        self.filter
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Number of files opened.
    pub fn file_count(&self) -> usize {
        self.sinks.as_ref().map_or(0, Vec::len)
    }

    fn open(&self, series: &[Series]) -> OutputResult<Vec<Sink>> {
        if self.filter == OutputFilter::None {
            return Ok(Vec::new());
        }
        fs::create_dir_all(&self.dir)?;
        let mut sinks = Vec::new();
        if self.single_file {
            let mut kinds: Vec<SeriesKind> = Vec::new();
            for s in series {
                if !kinds.contains(&s.kind) {
                    kinds.push(s.kind);
                }
            }
            for kind in kinds {
                let members: Vec<usize> = (0..series.len()).filter(|&i| series[i].kind == kind).collect();
                let header: Vec<String> = members
                    .iter()
                    .flat_map(|&i| series[i].header.iter().map(move |col| format!("{}:{col}", series[i].label)))
                    .collect();
                let path = self.dir.join(format!("{}.csv", kind.category()));
                sinks.push(self.sink(&path, &header, members)?);
            }
        } else {
            for (i, s) in series.iter().enumerate() {
                let path = self.dir.join(s.kind.category()).join(file_name(&s.path));
                sinks.push(self.sink(&path, &s.header, vec![i])?);
            }
        }
        debug!(target: "huum::output", dir = %self.dir.display(), files = sinks.len(), filter = %self.filter, "output opened");
        Ok(sinks)
    }

    fn sink(&self, path: &Path, header: &[String], series: Vec<usize>) -> OutputResult<Sink> {
        Ok(Sink {
            writer: CsvSeriesWriter::create(path, header, self.filter)?,
            row: Vec::with_capacity(header.len()),
            series,
        })
    }
}

/// `$model_town.$holding_h1` → `model_town.holding_h1.csv`.
fn file_name(node_path: &str) -> String {
    format!("{}.csv", node_path.replace('$', ""))
}

fn store_err(slot: &mut Option<OutputError>, result: OutputResult<()>) {
    if let Err(e) = result {
        // Keep only the first error.
        if slot.is_none() {
            *slot = Some(e);
        }
    }
}

impl SimObserver for SimOutputObserver {
    fn on_snapshot(&mut self, snapshot: &Snapshot<'_>) {
        if self.sinks.is_none() {
            let opened = self.open(snapshot.series);
            let sinks = match opened {
                Ok(sinks) => sinks,
                Err(e) => {
                    store_err(&mut self.last_error, Err(e));
                    Vec::new()
                }
            };
            self.sinks = Some(sinks);
        }
        let Self { sinks, last_error, .. } = self;
        for sink in sinks.iter_mut().flatten() {
            sink.row.clear();
            for &i in &sink.series {
                sink.row.extend_from_slice(&snapshot.series[i].values);
            }
            let result = sink.writer.write_record(&sink.row, snapshot.now, snapshot.last);
            store_err(last_error, result);
        }
    }

    fn on_sim_end(&mut self, now: SimTime) {
        let Self { sinks, last_error, .. } = self;
        let mut rows = 0;
        for sink in sinks.iter_mut().flatten() {
            let result = sink.writer.close(now);
            store_err(last_error, result);
            rows += sink.writer.rows();
        }
        info!(target: "huum::output", dir = %self.dir.display(), files = self.file_count(), rows, "output closed");
    }
}

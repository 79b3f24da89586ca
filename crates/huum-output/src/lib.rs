//! `huum-output` — CSV output for recorded simulation series.
//!
//! | Module       | Contents                                              |
//! |--------------|-------------------------------------------------------|
//! | [`writer`]   | the `OutputWriter` trait                              |
//! | [`filter`]   | `OutputFilter`: `none`, `all`, `changes`              |
//! | [`csv`]      | `CsvSeriesWriter`, one `time,<header...>` file        |
//! | [`observer`] | `SimOutputObserver`, series → files                   |
//!
//! Files are laid out per category:
//!
//! ```text
//! <dir>/appliance_demand/model_town.holding_h1.….appliance_shower.csv   per node
//! <dir>/appliance_demand.csv                                            single_file = true
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use huum_output::SimOutputObserver;
//!
//! let mut obs = SimOutputObserver::new("./output", &sim.output)?;
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod filter;
pub mod observer;
pub mod writer;


pub use csv::CsvSeriesWriter;
pub use error::{OutputError, OutputResult};
pub use filter::OutputFilter;
pub use observer::SimOutputObserver;
pub use writer::OutputWriter;

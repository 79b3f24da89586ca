//! Output filters.

use std::fmt;
use std::str::FromStr;

use crate::OutputError;

/// How much of a series reaches its file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFilter {
    /// Write nothing; no files are created.
    None,
    /// Every record.
    All,
    /// Only records that differ from the one before, plus the boundary rows
    /// needed to rebuild the step series.
    #[default]
    Changes,
}

impl FromStr for OutputFilter {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(OutputFilter::None),
            "all" => Ok(OutputFilter::All),
            "changes" => Ok(OutputFilter::Changes),
            other => Err(OutputError::UnknownFilter(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFilter::None => "none",
            OutputFilter::All => "all",
            OutputFilter::Changes => "changes",
        })
    }
}

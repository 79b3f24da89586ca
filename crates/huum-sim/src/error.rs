use huum_core::HuError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Model(#[from] HuError),

    #[error("scenario is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("cannot read scenario `{path}`: {source}")]
    Read {
        path:   String,
        source: std::io::Error,
    },

    #[error("simulation configuration error: {0}")]
    Config(String),
}

pub type SimResult<T> = Result<T, SimError>;

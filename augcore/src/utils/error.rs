use augmodel::ClassId;
use thiserror::Error;

use crate::{options::OptionConflict, synth::SynthesisError};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid option combination: {0}")]
    InvalidOptionCombination(#[from] OptionConflict),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(
        "Class `{class}` ({id}) failed augmentation earlier and the failure policy forbids retrying"
    )]
    PreviouslyFailed { class: String, id: ClassId },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration file '{file}': {source}")]
    ConfigParseError {
        source: toml::de::Error,
        file: String,
    },

    #[error("An unknown error occurred: {0}")]
    Unknown(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

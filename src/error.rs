//! Error types for jet analyses.
//!
//! Vetoed events are not errors: they come back as
//! [`CutResult::Vetoed`](crate::selector::CutResult).

use thiserror::Error;

use crate::analysis::RunState;

/// Crate error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid binning or analysis settings, raised before any event is processed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// I/O error while reading a configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A runner operation was called in the wrong lifecycle state.
    #[error("cannot {operation} while the run is {state:?}")]
    Lifecycle {
        operation: &'static str,
        state: RunState,
    },

    /// No histogram with that name was booked.
    #[error("unknown histogram '{0}'")]
    UnknownHistogram(String),

    /// A histogram was filled or transformed after its terminal transform ran.
    #[error("histogram '{0}' is already finalized")]
    HistogramFinalized(String),

    /// Cross-section scaling was requested without a cross-section provider.
    #[error("histogram '{0}' is scaled to the cross section but none was provided")]
    MissingCrossSection(String),

    /// Cross-section scaling with a zero sum of event weights.
    #[error("cannot scale histogram '{name}' by cross section {cross_section}: sum of weights is zero")]
    DegenerateNormalization { name: String, cross_section: f64 },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }
}

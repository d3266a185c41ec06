//! Error types for the collocation estimators and the regression they depend on.

use thiserror::Error;

/// Everything that can go wrong while estimating an error model.
#[derive(Debug, Error)]
pub enum CollocationError {
    /// The York iteration ran out of budget before the slope settled.
    #[error(
        "regression did not converge after {iterations} iterations \
         (last slope {last_slope}, last step {last_step})"
    )]
    NonConvergence {
        iterations: usize,
        last_slope: f64,
        last_step: f64,
    },

    /// The data cannot support the estimate, see [`Degeneracy`].
    #[error("degenerate input: {0}")]
    DegenerateInput(#[from] Degeneracy),

    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: String, found: String },

    #[error("invalid value for `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// The specific reason an input was rejected as degenerate.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Degeneracy {
    #[error("division by zero while computing {quantity}")]
    ZeroDivisor { quantity: &'static str },

    #[error("square root of negative value {value} while computing {quantity}")]
    NegativeRadicand { quantity: &'static str, value: f64 },

    #[error("non-finite value while computing {quantity}")]
    NonFinite { quantity: &'static str },

    #[error("series {column} has no observations")]
    EmptySeries { column: usize },

    #[error("{available} usable observations, at least {required} required")]
    InsufficientData { available: usize, required: usize },
}

impl CollocationError {
    pub(crate) fn shape(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// The degeneracy behind this error, if it is one.
    pub const fn degeneracy(&self) -> Option<&Degeneracy> {
        match self {
            Self::DegenerateInput(reason) => Some(reason),
            _ => None,
        }
    }
}

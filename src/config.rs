use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CollocationError;
use crate::Result;

/// Tunables for the estimators
///
/// Every field has a default, so a configuration file only needs to name the values it changes:
///
/// ```
/// use lagged_collocation::config::{Config, MissingPolicy};
///
/// let config = Config::from_toml("missing = \"pairwise\"\n[regression]\nmax_iterations = 50\n").unwrap();
/// assert_eq!(config.missing, MissingPolicy::Pairwise);
/// assert_eq!(config.regression.max_iterations, 50);
/// approx::assert_relative_eq!(config.regression.tolerance, 1e-4);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub missing: MissingPolicy,
    pub regression: RegressionConfig,
}

impl Config {
    /// Parse a configuration from its TOML representation
    ///
    /// # Errors
    /// Returns an error if the document is not valid TOML, names unknown fields, or holds values
    /// the regression cannot run with.
    pub fn from_toml(document: &str) -> Result<Self> {
        let config: Self = toml::from_str(document)?;
        config.regression.validate()?;
        Ok(config)
    }

    /// Read a configuration file from disk
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, or under the same conditions as
    /// [`Config::from_toml`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let document = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "read collocation config");
        Self::from_toml(&document)
    }
}

/// Stopping rules for the York iteration
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegressionConfig {
    /// The maximum number of slope updates before giving up
    pub max_iterations: usize,
    /// Absolute change in slope below which the iteration is considered converged
    pub tolerance: f64,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-4,
        }
    }
}

impl RegressionConfig {
    /// # Errors
    /// Returns [`CollocationError::InvalidParameter`] for a zero iteration budget or a tolerance
    /// which is not a positive finite number.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(CollocationError::InvalidParameter {
                name: "max_iterations",
                value: 0.,
            });
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.) {
            return Err(CollocationError::InvalidParameter {
                name: "tolerance",
                value: self.tolerance,
            });
        }
        Ok(())
    }
}

/// How rows with missing (`NaN`) entries are handled when building the covariance matrix
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Only rows where all three series are present contribute. The regression step always uses
    /// these rows, so this keeps every quantity on the same sample.
    #[default]
    Listwise,
    /// Each covariance uses every row where its own pair of series is present.
    Pairwise,
}

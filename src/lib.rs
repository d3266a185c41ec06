#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// #![warn(clippy::cargo)]

pub mod config;
pub mod covariance;
pub mod error;
pub mod estimate;
pub mod lagged;
pub(crate) mod math;
pub mod regression;
pub mod simple;

pub use config::{Config, MissingPolicy, RegressionConfig};
pub use error::{CollocationError, Degeneracy};
pub use estimate::CollocationEstimate;
pub use lagged::lagged_triple_collocation;
pub use regression::{regress_weighted_orthogonal, Weights, YorkFit};
pub use simple::simple_lagged_triple_collocation;

pub type Result<T> = ::std::result::Result<T, CollocationError>;

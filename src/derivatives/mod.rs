//! Finite-difference derivatives of single fields and their per-channel
//! reduction over multichannel sources.

pub mod composer;
pub mod metric;
pub mod multichannel;
pub mod operator;

pub use self::composer::{apply_derivative, apply_gradient, Gradient};
pub use self::metric::CombiningMetric;
pub use self::multichannel::{DerivativesFilter, GradientFilter, GradientResults,
                             MultichannelOptions};
pub use self::operator::{DerivativeOperator, GradientOperator};

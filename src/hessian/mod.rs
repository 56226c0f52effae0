//! Closed-form eigen-structure of the 2x2 Hessian of a field.

pub mod eigen;
pub mod filter;
pub mod output;

pub use self::eigen::{ClampedEigenvalues, EigenPolicy, EigenResult, HessianSample,
                      D2DXDY_NORMALIZING_THRESHOLD};
pub use self::filter::{eigen_field, HessianFilter, HessianResults, SecondDerivatives};
pub use self::output::HessianOutput;

//! Differential structure of 2D image fields.
//!
//! The crate computes directional derivatives, gradient magnitudes and the
//! eigen-structure of the local Hessian `[[d²/dx², d²/dxdy], [d²/dxdy, d²/dy²]]`
//! of scalar and multichannel fields. Fields are immutable values backed either
//! by a sample buffer or by a lazy per-pixel closure, so derivative pipelines can
//! be composed without materializing every intermediate step.
//!
//! ```
//! use hessian_field::derivatives::{apply_derivative, DerivativeOperator};
//! use hessian_field::field::{ElementType, Field};
//! use hessian_field::filtering::Boundary;
//!
//! let parabola = Field::from_fn(8, 8, ElementType::F64, |x, _| (x * x) as f64);
//! let d2 = apply_derivative(&parabola, DerivativeOperator::D2Dx2, Boundary::MirrorCyclic);
//! assert_eq!(d2.value_at(4, 4), 2.0);
//! ```

#![recursion_limit = "1024"]

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate itertools;
#[macro_use]
extern crate log;

pub mod derivatives;
pub mod errors;
pub mod field;
pub mod filtering;
pub mod hessian;
mod utils;

pub use crate::derivatives::{CombiningMetric, DerivativeOperator, GradientOperator,
                             MultichannelOptions};
pub use crate::errors::{Error, ErrorKind, Result};
pub use crate::field::{ElementType, Field, MultiField, ScalarField};
pub use crate::filtering::{Boundary, Kernel};
pub use crate::hessian::{EigenPolicy, HessianOutput, HessianSample};

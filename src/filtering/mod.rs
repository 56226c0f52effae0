//! Linear filtering: stencil convolution with boundary continuation, and the
//! Gaussian pre-smoothing built on it.

pub mod blur;
pub mod convolution;

pub use self::blur::{effective_kernel_size, gaussian_blur};
pub use self::convolution::{convolve, Boundary, Kernel};

//! Fields: immutable 2D sample grids, buffered or lazy, and their
//! multichannel container.

pub mod element;
pub mod multi;
pub mod scalar_field;

pub use self::element::ElementType;
pub use self::multi::MultiField;
pub use self::scalar_field::{same_dimensions, Field, ScalarField};

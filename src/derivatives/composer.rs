use crate::derivatives::{CombiningMetric, DerivativeOperator, GradientOperator};
use crate::errors::{ErrorKind, Result};
use crate::field::Field;
use crate::filtering::{convolve, Boundary};

/// Derivatives of a single channel along x and y, with their combined
/// magnitude.
#[derive(Clone, Debug)]
pub struct Gradient {
    pub dx: Field,
    pub dy: Field,
    pub magnitude: Field,
}

/// Convolves `channel` with the stencil of `operator`.
///
/// The result is lazy and floating-point: `F64` for `F64` channels, `F32`
/// otherwise.
pub fn apply_derivative(channel: &Field, operator: DerivativeOperator, boundary: Boundary) -> Field {
    convolve(channel,
             operator.kernel(),
             boundary,
             channel.element_type().floating())
}

/// Applies every stencil of `operator`; the magnitude combines all of them
/// with unit weights.
pub fn apply_gradient(channel: &Field,
                      operator: GradientOperator,
                      metric: CombiningMetric,
                      boundary: Boundary)
                      -> Result<Gradient> {
    if metric.is_single_channel() {
        return Err(ErrorKind::SingleChannelDerivativesMetric(metric).into());
    }
    let derivatives: Vec<Field> = operator.derivatives()
        .iter()
        .map(|&derivative| apply_derivative(channel, derivative, boundary).evaluate())
        .collect();
    let magnitude = metric.combine(channel.element_type().floating(), &derivatives, &[], 1.0)?;
    Ok(Gradient {
        dx: derivatives[0].clone(),
        dy: derivatives[1].clone(),
        magnitude: magnitude,
    })
}

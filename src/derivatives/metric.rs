use crate::errors::{ErrorKind, Result};
use crate::field::{same_dimensions, ElementType, Field};

/// Reduces an ordered list of equally sized fields into one.
///
/// Each field `f_i` is paired with a weight `w_i`; missing weights count as
/// `1.0` and every weight is multiplied by a common scalar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CombiningMetric {
    /// `w0 * f0`; accepts exactly one field.
    SingleChannel,
    /// `max / 2 + w0 * f0`, where `max` is the maximal value of the result
    /// type; shifts signed values into an unsigned range.
    SingleChannelPlusHalf,
    Euclidean,
    /// Euclidean norm divided by the square root of the field count.
    NormalizedEuclidean,
    SumOfAbsoluteValues,
    MeanAbsoluteValue,
    MaxAbsoluteValue,
}

impl Default for CombiningMetric {
    fn default() -> Self {
        CombiningMetric::NormalizedEuclidean
    }
}

impl CombiningMetric {
    #[inline]
    pub fn is_single_channel(self) -> bool {
        match self {
            CombiningMetric::SingleChannel |
            CombiningMetric::SingleChannelPlusHalf => true,
            _ => false,
        }
    }

    /// Lazily combines `fields` into a field of `element_type`.
    ///
    /// Sums are accumulated in `f64`; the result is rounded to
    /// `element_type` when read.
    pub fn combine(self,
                   element_type: ElementType,
                   fields: &[Field],
                   weights: &[f64],
                   extra_multiplier: f64)
                   -> Result<Field> {
        let (width, height) = same_dimensions(fields)?;
        if self.is_single_channel() && fields.len() != 1 {
            return Err(ErrorKind::SingleChannelMetric(self, fields.len()).into());
        }
        let weights: Vec<f64> = (0..fields.len())
            .map(|i| weights.get(i).cloned().unwrap_or(1.0) * extra_multiplier)
            .collect();
        let fields = fields.to_vec();
        let n = fields.len() as f64;

        let metric = match self {
            CombiningMetric::Euclidean |
            CombiningMetric::NormalizedEuclidean |
            CombiningMetric::MaxAbsoluteValue if fields.len() == 1 => {
                CombiningMetric::SumOfAbsoluteValues
            }
            metric => metric,
        };
        let combined = match metric {
            CombiningMetric::SingleChannel => {
                let (source, weight) = (fields[0].clone(), weights[0]);
                Field::lazy(width, height, element_type, move |x, y| {
                    weight * source.value_at(x, y)
                })
            }
            CombiningMetric::SingleChannelPlusHalf => {
                let (source, weight) = (fields[0].clone(), weights[0]);
                let half = 0.5 * element_type.max_possible_value();
                Field::lazy(width, height, element_type, move |x, y| {
                    half + weight * source.value_at(x, y)
                })
            }
            CombiningMetric::Euclidean => {
                Field::lazy(width, height, element_type, move |x, y| {
                    sum_of_squares(&fields, &weights, x, y).sqrt()
                })
            }
            CombiningMetric::NormalizedEuclidean => {
                Field::lazy(width, height, element_type, move |x, y| {
                    (sum_of_squares(&fields, &weights, x, y) / n).sqrt()
                })
            }
            CombiningMetric::SumOfAbsoluteValues => {
                Field::lazy(width, height, element_type, move |x, y| {
                    sum_of_absolute_values(&fields, &weights, x, y)
                })
            }
            CombiningMetric::MeanAbsoluteValue => {
                Field::lazy(width, height, element_type, move |x, y| {
                    sum_of_absolute_values(&fields, &weights, x, y) / n
                })
            }
            CombiningMetric::MaxAbsoluteValue => {
                Field::lazy(width, height, element_type, move |x, y| {
                    fields.iter()
                        .zip(&weights)
                        .map(|(field, weight)| (weight * field.value_at(x, y)).abs())
                        .fold(0.0, f64::max)
                })
            }
        };
        Ok(combined)
    }
}

#[inline]
fn sum_of_squares(fields: &[Field], weights: &[f64], x: usize, y: usize) -> f64 {
    fields.iter()
        .zip(weights)
        .map(|(field, weight)| {
            let value = weight * field.value_at(x, y);
            value * value
        })
        .sum()
}

#[inline]
fn sum_of_absolute_values(fields: &[Field], weights: &[f64], x: usize, y: usize) -> f64 {
    fields.iter()
        .zip(weights)
        .map(|(field, weight)| weight.abs() * field.value_at(x, y).abs())
        .sum()
}

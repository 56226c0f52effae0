use std::time::Instant;

use itertools::Itertools;
use nalgebra::Vector2;
use rayon::prelude::*;

use crate::derivatives::{apply_derivative, DerivativeOperator, MultichannelOptions};
use crate::errors::{ErrorKind, Result};
use crate::field::{same_dimensions, ElementType, Field, MultiField};
use crate::filtering::Boundary;
use crate::hessian::{EigenPolicy, HessianOutput, HessianSample};
use crate::utils::seconds_since;

/// The three distinct entries of the Hessian of one channel.
#[derive(Clone, Debug)]
pub struct SecondDerivatives {
    pub dxx: Field,
    pub dyy: Field,
    pub dxy: Field,
}

impl SecondDerivatives {
    /// Evaluates `d²/dx²`, `d²/dy²` and `d²/dxdy` of `channel`.
    pub fn of(channel: &Field, boundary: Boundary) -> Self {
        SecondDerivatives {
            dxx: apply_derivative(channel, DerivativeOperator::D2Dx2, boundary).evaluate(),
            dyy: apply_derivative(channel, DerivativeOperator::D2Dy2, boundary).evaluate(),
            dxy: apply_derivative(channel, DerivativeOperator::D2Dxdy, boundary).evaluate(),
        }
    }
}

/// Lazy `F64` field of one Hessian output.
///
/// `gradient` holds the `(d/dx, d/dy)` fields; it is required by the scalar
/// product outputs and ignored by the others. Every configuration problem is
/// reported here rather than when pixels are read.
pub fn eigen_field(output: HessianOutput,
                   policy: EigenPolicy,
                   derivatives: &SecondDerivatives,
                   gradient: Option<(&Field, &Field)>)
                   -> Result<Field> {
    let mut fields = vec![derivatives.dxx.clone(), derivatives.dyy.clone(), derivatives.dxy.clone()];
    if let Some((dx, dy)) = gradient {
        fields.push(dx.clone());
        fields.push(dy.clone());
    }
    let (width, height) = same_dimensions(&fields)?;
    let gradient = if output.requires_gradient() {
        match gradient {
            Some((dx, dy)) => Some((dx.clone(), dy.clone())),
            None => return Err(ErrorKind::MissingGradient(output).into()),
        }
    } else {
        None
    };

    let SecondDerivatives { dxx, dyy, dxy } = derivatives.clone();
    Ok(Field::lazy(width, height, ElementType::F64, move |x, y| {
        let sample = HessianSample::new(dxx.value_at(x, y), dyy.value_at(x, y), dxy.value_at(x, y));
        let gradient = gradient.as_ref()
            .map(|(dx, dy)| Vector2::new(dx.value_at(x, y), dy.value_at(x, y)));
        output.evaluate(&sample, gradient.as_ref(), &policy)
    }))
}

/// Outputs of [`HessianFilter::process`] in the order they were requested.
#[derive(Clone, Debug, Default)]
pub struct HessianResults {
    results: Vec<(HessianOutput, Field)>,
}

impl HessianResults {
    pub fn get(&self, output: HessianOutput) -> Option<&Field> {
        self.results.iter().find(|&&(kind, _)| kind == output).map(|(_, field)| field)
    }

    /// Looks an output up by its name; `Ok(None)` if it was not requested.
    pub fn get_by_name(&self, name: &str) -> Result<Option<&Field>> {
        Ok(self.get(name.parse()?))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HessianOutput, &Field)> {
        self.results.iter().map(|(output, field)| (*output, field))
    }
}

/// Eigen-structure of the Hessian of every channel, merged across channels
/// output by output.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HessianFilter {
    policy: EigenPolicy,
    options: MultichannelOptions,
}

impl HessianFilter {
    pub fn new(policy: EigenPolicy) -> Self {
        HessianFilter {
            policy: policy,
            options: MultichannelOptions::default(),
        }
    }

    pub fn with_options(policy: EigenPolicy, options: MultichannelOptions) -> Self {
        HessianFilter {
            policy: policy,
            options: options,
        }
    }

    pub fn policy(&self) -> EigenPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: EigenPolicy) -> &mut Self {
        self.policy = policy;
        self
    }

    pub fn options(&self) -> &MultichannelOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut MultichannelOptions {
        &mut self.options
    }

    /// Computes the requested outputs. The second derivatives of each channel
    /// (and its gradient, when a scalar product is requested) are computed
    /// once and shared by all outputs.
    pub fn process(&self, source: &MultiField, outputs: &[HessianOutput]) -> Result<HessianResults> {
        let outputs: Vec<HessianOutput> = outputs.iter().cloned().unique().collect();
        if outputs.is_empty() {
            warn!("Hessian filter invoked without any requested output");
            return Ok(HessianResults::default());
        }
        let time = Instant::now();
        let source = self.options.preprocess(source)?;
        let boundary = self.options.boundary();
        let gradient_required = outputs.iter().any(|output| output.requires_gradient());

        let per_channel = source.channels()
            .par_iter()
            .map(|channel| {
                let derivatives = SecondDerivatives::of(channel, boundary);
                let gradient = if gradient_required {
                    Some((apply_derivative(channel, DerivativeOperator::Dx, boundary).evaluate(),
                          apply_derivative(channel, DerivativeOperator::Dy, boundary).evaluate()))
                } else {
                    None
                };
                outputs.iter()
                    .map(|&output| {
                        eigen_field(output,
                                    self.policy,
                                    &derivatives,
                                    gradient.as_ref().map(|(dx, dy)| (dx, dy)))
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        trace!("Hessians of {} channel(s) set up in {:.4}s",
               per_channel.len(),
               seconds_since(time));

        let element_type = source.element_type();
        let mut results = Vec::with_capacity(outputs.len());
        for (index, &output) in outputs.iter().enumerate() {
            let channels: Vec<Field> = per_channel.iter().map(|fields| fields[index].clone()).collect();
            results.push((output, self.options.combine_channels(element_type, &channels)?));
        }
        debug!("Hessian outputs [{}] of {} channel(s) took {:.4}s",
               outputs.iter().map(|output| output.name()).join(", "),
               source.num_channels(),
               seconds_since(time));
        Ok(HessianResults { results: results })
    }
}

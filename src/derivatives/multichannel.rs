use std::time::Instant;

use itertools::Itertools;
use rayon::prelude::*;

use crate::derivatives::{apply_derivative, apply_gradient, CombiningMetric, DerivativeOperator,
                         GradientOperator};
use crate::errors::{ErrorKind, Result};
use crate::field::{ElementType, Field, MultiField};
use crate::filtering::{gaussian_blur, Boundary};
use crate::utils::seconds_since;

/// How a multichannel source is smoothed, reduced to the channels that
/// matter, and how per-channel results are merged back into one field.
#[derive(Clone, Debug, PartialEq)]
pub struct MultichannelOptions {
    gaussian_blur: bool,
    blur_kernel_size_x: usize,
    blur_kernel_size_y: usize,
    boundary: Boundary,
    channels_metric: CombiningMetric,
    channels_weights: Vec<f64>,
    additional_multiplier: f64,
    only_first_3_channels: bool,
    float_result: bool,
}

impl Default for MultichannelOptions {
    fn default() -> Self {
        MultichannelOptions {
            gaussian_blur: true,
            blur_kernel_size_x: 5,
            blur_kernel_size_y: 0,
            boundary: Boundary::MirrorCyclic,
            channels_metric: CombiningMetric::NormalizedEuclidean,
            channels_weights: vec![],
            additional_multiplier: 1.0,
            only_first_3_channels: true,
            float_result: true,
        }
    }
}

impl MultichannelOptions {
    pub fn gaussian_blur(&self) -> bool {
        self.gaussian_blur
    }

    pub fn set_gaussian_blur(&mut self, gaussian_blur: bool) -> &mut Self {
        self.gaussian_blur = gaussian_blur;
        self
    }

    /// `(size_x, size_y)` as configured; see `effective_kernel_size` for the
    /// sizes the blur actually uses.
    pub fn blur_kernel_size(&self) -> (usize, usize) {
        (self.blur_kernel_size_x, self.blur_kernel_size_y)
    }

    pub fn set_blur_kernel_size(&mut self, size_x: usize, size_y: usize) -> &mut Self {
        self.blur_kernel_size_x = size_x;
        self.blur_kernel_size_y = size_y;
        self
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    pub fn set_boundary(&mut self, boundary: Boundary) -> &mut Self {
        self.boundary = boundary;
        self
    }

    pub fn channels_metric(&self) -> CombiningMetric {
        self.channels_metric
    }

    pub fn set_channels_metric(&mut self, metric: CombiningMetric) -> &mut Self {
        self.channels_metric = metric;
        self
    }

    pub fn channels_weights(&self) -> &[f64] {
        &self.channels_weights
    }

    pub fn set_channels_weights(&mut self, weights: Vec<f64>) -> &mut Self {
        self.channels_weights = weights;
        self
    }

    pub fn additional_multiplier(&self) -> f64 {
        self.additional_multiplier
    }

    pub fn set_additional_multiplier(&mut self, multiplier: f64) -> &mut Self {
        self.additional_multiplier = multiplier;
        self
    }

    pub fn only_first_3_channels(&self) -> bool {
        self.only_first_3_channels
    }

    pub fn set_only_first_3_channels(&mut self, only_first_3_channels: bool) -> &mut Self {
        self.only_first_3_channels = only_first_3_channels;
        self
    }

    pub fn float_result(&self) -> bool {
        self.float_result
    }

    pub fn set_float_result(&mut self, float_result: bool) -> &mut Self {
        self.float_result = float_result;
        self
    }

    fn promote(&self, source: &MultiField) -> MultiField {
        if self.float_result {
            source.to_floating_point()
        } else {
            source.clone()
        }
    }

    /// Smooths the source if requested, then selects the channels the
    /// channel metric will see.
    pub fn preprocess(&self, source: &MultiField) -> Result<MultiField> {
        let mut source = source.clone();
        if self.gaussian_blur {
            let time = Instant::now();
            let (size_x, size_y) = self.blur_kernel_size();
            let blurred = self.promote(&source)
                .channels()
                .par_iter()
                .map(|channel| gaussian_blur(channel, size_x, size_y, self.boundary))
                .collect::<Result<Vec<_>>>()?;
            source = MultiField::new(blurred)?;
            debug!("Pre-blurred {} channel(s) in {:.4}s",
                   source.num_channels(),
                   seconds_since(time));
        }
        let source = self.promote(&source);
        Ok(if self.channels_metric.is_single_channel() {
            source.to_single_channel()
        } else if self.only_first_3_channels {
            source.cap_channels(3)
        } else {
            source
        })
    }

    /// Merges one field per channel with the channel metric and evaluates
    /// the result.
    pub fn combine_channels(&self,
                            element_type: ElementType,
                            per_channel: &[Field])
                            -> Result<Field> {
        let combined = self.channels_metric
            .combine(element_type,
                     per_channel,
                     &self.channels_weights,
                     self.additional_multiplier)?;
        Ok(combined.evaluate())
    }

    /// Preprocesses `source`, runs `per_channel` on every remaining channel in
    /// parallel and merges the results into the preprocessed element type.
    pub fn process<F>(&self, source: &MultiField, per_channel: F) -> Result<Field>
        where F: Fn(&Field) -> Result<Field> + Sync
    {
        let source = self.preprocess(source)?;
        let results = source.channels()
            .par_iter()
            .map(|channel| per_channel(channel).map(|field| field.evaluate()))
            .collect::<Result<Vec<_>>>()?;
        self.combine_channels(source.element_type(), &results)
    }
}

/// A single derivative of every channel, merged across channels.
#[derive(Clone, Debug, PartialEq)]
pub struct DerivativesFilter {
    operator: DerivativeOperator,
    options: MultichannelOptions,
}

impl DerivativesFilter {
    pub fn new(operator: DerivativeOperator) -> Self {
        DerivativesFilter {
            operator: operator,
            options: MultichannelOptions::default(),
        }
    }

    pub fn with_options(operator: DerivativeOperator, options: MultichannelOptions) -> Self {
        DerivativesFilter {
            operator: operator,
            options: options,
        }
    }

    pub fn operator(&self) -> DerivativeOperator {
        self.operator
    }

    pub fn options(&self) -> &MultichannelOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut MultichannelOptions {
        &mut self.options
    }

    pub fn process(&self, source: &MultiField) -> Result<Field> {
        let time = Instant::now();
        let (operator, boundary) = (self.operator, self.options.boundary());
        let result = self.options
            .process(source, |channel| Ok(apply_derivative(channel, operator, boundary)))?;
        debug!("{:?} of {}x{} source took {:.4}s",
               operator,
               result.width(),
               result.height(),
               seconds_since(time));
        Ok(result)
    }
}

/// Named results of [`GradientFilter::process`].
#[derive(Clone, Debug)]
pub struct GradientResults {
    pub dx: Field,
    pub dy: Field,
    pub magnitude: Field,
}

impl GradientResults {
    /// Looks up an output by its name: `dx`, `dy` or `magnitude`.
    pub fn get_by_name(&self, name: &str) -> Result<&Field> {
        match name {
            "dx" => Ok(&self.dx),
            "dy" => Ok(&self.dy),
            "magnitude" => Ok(&self.magnitude),
            _ => Err(ErrorKind::UnknownOutput(name.to_owned()).into()),
        }
    }
}

/// Per-channel gradient; every output is merged across channels separately.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientFilter {
    operator: GradientOperator,
    derivatives_metric: CombiningMetric,
    options: MultichannelOptions,
}

impl GradientFilter {
    pub fn new(operator: GradientOperator) -> Self {
        GradientFilter {
            operator: operator,
            derivatives_metric: CombiningMetric::NormalizedEuclidean,
            options: MultichannelOptions::default(),
        }
    }

    pub fn with_options(operator: GradientOperator, options: MultichannelOptions) -> Self {
        GradientFilter { options: options, ..GradientFilter::new(operator) }
    }

    pub fn operator(&self) -> GradientOperator {
        self.operator
    }

    pub fn derivatives_metric(&self) -> CombiningMetric {
        self.derivatives_metric
    }

    /// Metric combining the derivatives of one channel into its magnitude;
    /// single-channel metrics cannot combine several derivatives.
    pub fn set_derivatives_metric(&mut self, metric: CombiningMetric) -> Result<&mut Self> {
        if metric.is_single_channel() {
            return Err(ErrorKind::SingleChannelDerivativesMetric(metric).into());
        }
        self.derivatives_metric = metric;
        Ok(self)
    }

    pub fn options(&self) -> &MultichannelOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut MultichannelOptions {
        &mut self.options
    }

    pub fn process(&self, source: &MultiField) -> Result<GradientResults> {
        let time = Instant::now();
        let source = self.options.preprocess(source)?;
        let gradients = source.channels()
            .par_iter()
            .map(|channel| {
                apply_gradient(channel,
                               self.operator,
                               self.derivatives_metric,
                               self.options.boundary())
            })
            .collect::<Result<Vec<_>>>()?;

        let element_type = source.element_type();
        let (dx, dy, magnitude): (Vec<_>, Vec<_>, Vec<_>) = gradients.into_iter()
            .map(|gradient| (gradient.dx, gradient.dy, gradient.magnitude))
            .multiunzip();
        let results = GradientResults {
            dx: self.options.combine_channels(element_type, &dx)?,
            dy: self.options.combine_channels(element_type, &dy)?,
            magnitude: self.options.combine_channels(element_type, &magnitude)?,
        };
        debug!("{:?} gradient of {} channel(s) took {:.4}s",
               self.operator,
               source.num_channels(),
               seconds_since(time));
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(element_type: ElementType, slope_x: f64, slope_y: f64) -> Field {
        Field::from_fn(8, 8, element_type, |x, y| slope_x * x as f64 + slope_y * y as f64)
    }

    fn unblurred() -> MultichannelOptions {
        let mut options = MultichannelOptions::default();
        options.set_gaussian_blur(false);
        options
    }

    #[test]
    fn test_defaults() {
        let options = MultichannelOptions::default();
        assert!(options.gaussian_blur());
        assert_eq!(options.blur_kernel_size(), (5, 0));
        assert_eq!(options.boundary(), Boundary::MirrorCyclic);
        assert_eq!(options.channels_metric(), CombiningMetric::NormalizedEuclidean);
        assert!(options.channels_weights().is_empty());
        assert_eq!(options.additional_multiplier(), 1.0);
        assert!(options.only_first_3_channels());
        assert!(options.float_result());
        let mut options = MultichannelOptions::default();
        options.set_blur_kernel_size(4, 0);
        assert_eq!(options.blur_kernel_size(), (4, 0));
    }

    #[test]
    fn test_preprocess_channels() {
        let channels = (0..5).map(|c| Field::constant(4, 4, ElementType::U8, c as f64)).collect();
        let source = MultiField::new(channels).unwrap();
        let mut options = unblurred();

        let capped = options.preprocess(&source).unwrap();
        assert_eq!(capped.num_channels(), 3);
        assert_eq!(capped.element_type(), ElementType::F32);

        options.set_only_first_3_channels(false).set_float_result(false);
        let all = options.preprocess(&source).unwrap();
        assert_eq!(all.num_channels(), 5);
        assert_eq!(all.element_type(), ElementType::U8);

        options.set_channels_metric(CombiningMetric::SingleChannel);
        let single = options.preprocess(&source).unwrap();
        assert_eq!(single.num_channels(), 1);
        // Five channels are not a color image: the first one is kept.
        assert_eq!(single.channel(0).value_at(0, 0), 0.0);
    }

    #[test]
    fn test_single_channel_metric_uses_luminance() {
        let rgb = MultiField::new(vec![Field::constant(3, 3, ElementType::F64, 1.0),
                                       Field::constant(3, 3, ElementType::F64, 0.0),
                                       Field::constant(3, 3, ElementType::F64, 0.0)])
            .unwrap();
        let mut options = unblurred();
        options.set_channels_metric(CombiningMetric::SingleChannel);
        let single = options.preprocess(&rgb).unwrap();
        assert_eq!(single.num_channels(), 1);
        assert!((single.channel(0).value_at(1, 1) - 0.299).abs() < 1e-12);
    }

    #[test]
    fn test_derivatives_filter_merges_channels() {
        let source = MultiField::new(vec![ramp(ElementType::F64, 3.0, 0.0),
                                          ramp(ElementType::F64, -4.0, 0.0)])
            .unwrap();
        let mut filter = DerivativesFilter::new(DerivativeOperator::Dx);
        filter.options_mut().set_gaussian_blur(false).set_channels_metric(CombiningMetric::Euclidean);
        let result = filter.process(&source).unwrap();
        assert_eq!(result.element_type(), ElementType::F64);
        assert!(!result.is_lazy());
        assert_eq!(result.value_at(3, 3), 5.0);

        filter.options_mut().set_channels_weights(vec![2.0]).set_additional_multiplier(0.5);
        let result = filter.process(&source).unwrap();
        assert!((result.value_at(3, 3) - 13.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_integer_result_plus_half() {
        let source = MultiField::mono(ramp(ElementType::U8, 0.0, 10.0));
        let mut filter = DerivativesFilter::new(DerivativeOperator::DyPair);
        filter.options_mut()
            .set_gaussian_blur(false)
            .set_float_result(false)
            .set_channels_metric(CombiningMetric::SingleChannelPlusHalf)
            .set_additional_multiplier(-1.0);
        let result = filter.process(&source).unwrap();
        assert_eq!(result.element_type(), ElementType::U8);
        assert_eq!(result.value_at(4, 4), 118.0);
    }

    #[test]
    fn test_blur_keeps_linear_ramp_inside() {
        let source = MultiField::mono(ramp(ElementType::U8, 2.0, 1.0));
        let filter = DerivativesFilter::new(DerivativeOperator::Dx);
        let result = filter.process(&source).unwrap();
        assert_eq!(result.element_type(), ElementType::F32);
        assert!((result.value_at(4, 4) - 2.0 / 255.0).abs() < 1e-7);

        // Even kernel sizes are rounded up rather than rejected.
        let mut even = DerivativesFilter::new(DerivativeOperator::Dx);
        even.options_mut().set_blur_kernel_size(4, 0);
        assert_eq!(even.process(&source).unwrap().to_vec(), result.to_vec());
    }

    #[test]
    fn test_float_result_plus_half() {
        let source = MultiField::mono(ramp(ElementType::U8, 0.0, 10.0));
        let mut filter = DerivativesFilter::with_options(DerivativeOperator::DyPair, unblurred());
        filter.options_mut().set_channels_metric(CombiningMetric::SingleChannelPlusHalf);
        let result = filter.process(&source).unwrap();
        assert_eq!(result.element_type(), ElementType::F32);
        // Promoted samples live in [0, 1], so half of that range re-centres them.
        assert!((result.value_at(4, 4) - (0.5 + 10.0 / 255.0)).abs() < 1e-6);
    }

    #[test]
    fn test_gradient_filter() {
        let source = MultiField::mono(ramp(ElementType::F64, 3.0, 4.0));
        let mut filter = GradientFilter::with_options(GradientOperator::Simple, unblurred());
        assert!(filter.set_derivatives_metric(CombiningMetric::SingleChannel).is_err());
        filter.set_derivatives_metric(CombiningMetric::Euclidean).unwrap();
        let results = filter.process(&source).unwrap();
        assert_eq!(results.dx.value_at(3, 3), 3.0);
        assert_eq!(results.dy.value_at(3, 3), 4.0);
        assert_eq!(results.magnitude.value_at(3, 3), 5.0);
        assert_eq!(results.get_by_name("magnitude").unwrap().value_at(3, 3), 5.0);
        assert!(results.get_by_name("angle").is_err());
    }
}

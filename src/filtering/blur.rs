use std::time::Instant;

use crate::errors::Result;
use crate::field::{ElementType, Field};
use crate::filtering::{convolve, Boundary, Kernel};
use crate::utils::seconds_since;

/// Fixed binomial tables used for small kernels when no sigma is given,
/// indexed by `size / 2`.
const SMALL_GAUSSIAN_TABLES: [&[f64]; 4] = [&[1.0],
                                            &[0.25, 0.5, 0.25],
                                            &[0.0625, 0.25, 0.375, 0.25, 0.0625],
                                            &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875,
                                              0.109375, 0.03125]];

/// Standard deviation implied by a kernel size.
#[inline]
pub fn sigma_for_kernel_size(size: usize) -> f64 {
    0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1D Gaussian weights for an odd `size`.
pub fn gaussian_weights(size: usize) -> Vec<f64> {
    debug_assert!(size % 2 == 1);
    if size <= 7 {
        return SMALL_GAUSSIAN_TABLES[size / 2].to_vec();
    }
    let sigma = sigma_for_kernel_size(size);
    let radius = (size / 2) as f64;
    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let x = i as f64 - radius;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Kernel sizes actually used for the requested `(size_x, size_y)`.
///
/// `(0, 0)` disables smoothing. Otherwise a zero size borrows the other axis
/// and even sizes are rounded up to the next odd one.
#[inline]
pub fn effective_kernel_size(size_x: usize, size_y: usize) -> (usize, usize) {
    if size_x == 0 && size_y == 0 {
        return (0, 0);
    }
    let size_x = if size_x > 0 { size_x } else { size_y };
    let size_y = if size_y > 0 { size_y } else { size_x };
    (size_x | 1, size_y | 1)
}

/// Separable Gaussian smoothing with the sizes of [`effective_kernel_size`].
/// The result keeps the element type of `field`.
pub fn gaussian_blur(field: &Field,
                     size_x: usize,
                     size_y: usize,
                     boundary: Boundary)
                     -> Result<Field> {
    let (kernel_x, kernel_y) = effective_kernel_size(size_x, size_y);
    if kernel_x <= 1 && kernel_y <= 1 {
        return Ok(field.clone());
    }
    let time = Instant::now();
    let mut result = field.clone();
    if kernel_x > 1 {
        let radius = (kernel_x / 2) as isize;
        let kernel = Kernel::new((-radius, 0), (radius, 0), gaussian_weights(kernel_x))?;
        result = convolve(&result, &kernel, boundary, ElementType::F64).evaluate();
    }
    if kernel_y > 1 {
        let radius = (kernel_y / 2) as isize;
        let kernel = Kernel::new((0, -radius), (0, radius), gaussian_weights(kernel_y))?;
        result = convolve(&result, &kernel, boundary, ElementType::F64).evaluate();
    }
    let result = result.with_element_type(field.element_type()).evaluate();
    debug!("Gaussian blur {}x{} (requested {}x{}) of {}x{} field took {:.4}s",
           kernel_x,
           kernel_y,
           size_x,
           size_y,
           field.width(),
           field.height(),
           seconds_since(time));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigma_and_weights() {
        assert!((sigma_for_kernel_size(5) - 1.1).abs() < 1e-12);
        assert_eq!(gaussian_weights(3), vec![0.25, 0.5, 0.25]);
        for &size in &[1, 3, 5, 7, 9, 15] {
            let weights = gaussian_weights(size);
            assert_eq!(weights.len(), size);
            assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
            assert!(weights[size / 2] >= weights[0]);
        }
    }

    #[test]
    fn test_blur_keeps_constant_and_type() {
        let field = Field::constant(6, 5, ElementType::U8, 100.0);
        let blurred = gaussian_blur(&field, 5, 0, Boundary::MirrorCyclic).unwrap();
        assert_eq!(blurred.element_type(), ElementType::U8);
        assert!(blurred.to_vec().iter().all(|&v| v == 100.0));
    }

    #[test]
    fn test_blur_spreads_impulse() {
        let field = Field::from_fn(5, 5, ElementType::F64, |x, y| {
            if x == 2 && y == 2 { 16.0 } else { 0.0 }
        });
        let blurred = gaussian_blur(&field, 3, 0, Boundary::Constant(0.0)).unwrap();
        assert_eq!(blurred.value_at(2, 2), 4.0);
        assert_eq!(blurred.value_at(1, 2), 2.0);
        assert_eq!(blurred.value_at(1, 1), 1.0);
        assert_eq!(blurred.value_at(0, 0), 0.0);
        assert!((blurred.to_vec().iter().sum::<f64>() - 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_effective_kernel_size() {
        assert_eq!(effective_kernel_size(0, 0), (0, 0));
        assert_eq!(effective_kernel_size(5, 0), (5, 5));
        assert_eq!(effective_kernel_size(0, 5), (5, 5));
        assert_eq!(effective_kernel_size(4, 0), (5, 5));
        assert_eq!(effective_kernel_size(3, 6), (3, 7));
        assert_eq!(effective_kernel_size(1, 0), (1, 1));
    }

    #[test]
    fn test_blur_sizes() {
        let field = Field::constant(3, 3, ElementType::F32, 1.0);
        let untouched = gaussian_blur(&field, 0, 0, Boundary::MirrorCyclic).unwrap();
        assert_eq!(untouched.to_vec(), vec![1.0; 9]);

        let impulse = Field::from_fn(9, 9, ElementType::F64, |x, y| {
            if x == 4 && y == 4 { 1.0 } else { 0.0 }
        });
        // A zero X size borrows the Y size, so both axes are smoothed.
        let blurred = gaussian_blur(&impulse, 0, 5, Boundary::Constant(0.0)).unwrap();
        assert_eq!(blurred.value_at(3, 4), 0.25 * 0.375);
        assert_eq!(blurred.value_at(4, 3), 0.25 * 0.375);
        // Even sizes are rounded up instead of rejected.
        let even = gaussian_blur(&impulse, 4, 0, Boundary::Constant(0.0)).unwrap();
        assert_eq!(even.to_vec(), blurred.to_vec());
    }
}

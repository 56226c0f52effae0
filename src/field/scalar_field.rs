use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use crate::errors::{ErrorKind, Result};
use crate::field::ElementType;
use crate::utils::seconds_since;

/// A 2D grid of samples addressed by integer coordinates.
pub trait ScalarField {
    fn dimensions(&self) -> (usize, usize);

    fn value_at(&self, x: usize, y: usize) -> f64;
}

type PixelFn = dyn Fn(usize, usize) -> f64 + Send + Sync;

#[derive(Clone, Debug, PartialEq)]
enum Samples {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl Samples {
    fn build<F>(element_type: ElementType, width: usize, height: usize, pixel: F) -> Self
        where F: Fn(usize, usize) -> f64 + Sync
    {
        match element_type {
            ElementType::U8 => {
                Samples::U8(fill(width, height, |x, y| element_type.cast(pixel(x, y)) as u8))
            }
            ElementType::U16 => {
                Samples::U16(fill(width, height, |x, y| element_type.cast(pixel(x, y)) as u16))
            }
            ElementType::F32 => Samples::F32(fill(width, height, |x, y| pixel(x, y) as f32)),
            ElementType::F64 => Samples::F64(fill(width, height, |x, y| pixel(x, y))),
        }
    }

    #[inline]
    fn get(&self, index: usize) -> f64 {
        match *self {
            Samples::U8(ref samples) => samples[index] as f64,
            Samples::U16(ref samples) => samples[index] as f64,
            Samples::F32(ref samples) => samples[index] as f64,
            Samples::F64(ref samples) => samples[index],
        }
    }
}

/// Rows are written by disjoint workers.
fn fill<T, F>(width: usize, height: usize, pixel: F) -> Vec<T>
    where T: Copy + Default + Send,
          F: Fn(usize, usize) -> T + Sync
{
    let mut samples = vec![T::default(); width * height];
    if width > 0 {
        samples.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
            for (x, sample) in row.iter_mut().enumerate() {
                *sample = pixel(x, y);
            }
        });
    }
    samples
}

#[derive(Clone)]
enum Source {
    Buffer(Arc<Samples>),
    Lazy(Arc<PixelFn>),
}

/// An immutable single-channel field.
///
/// Cloning is cheap: both the sample buffer and the lazy closure are shared.
/// A lazy field casts every value to its element type on read, so evaluating
/// it into a buffer never changes what `value_at` returns.
#[derive(Clone)]
pub struct Field {
    width: usize,
    height: usize,
    element_type: ElementType,
    source: Source,
}

impl Field {
    /// Builds a buffered field from row-major samples.
    pub fn from_samples(width: usize,
                        height: usize,
                        element_type: ElementType,
                        samples: &[f64])
                        -> Result<Self> {
        if samples.len() != width * height {
            return Err(ErrorKind::BufferLength(width * height, samples.len()).into());
        }
        Ok(Field::from_fn(width, height, element_type, |x, y| samples[y * width + x]))
    }

    /// Builds a buffered field by evaluating `pixel` at every coordinate.
    pub fn from_fn<F>(width: usize, height: usize, element_type: ElementType, pixel: F) -> Self
        where F: Fn(usize, usize) -> f64 + Sync
    {
        Field {
            width: width,
            height: height,
            element_type: element_type,
            source: Source::Buffer(Arc::new(Samples::build(element_type, width, height, pixel))),
        }
    }

    pub fn from_scalar_field<S>(scalar_field: &S, element_type: ElementType) -> Self
        where S: ScalarField + Sync
    {
        let (width, height) = scalar_field.dimensions();
        Field::from_fn(width,
                       height,
                       element_type,
                       |x, y| scalar_field.value_at(x, y))
    }

    /// A field whose values are computed on demand.
    pub fn lazy<F>(width: usize, height: usize, element_type: ElementType, pixel: F) -> Self
        where F: Fn(usize, usize) -> f64 + Send + Sync + 'static
    {
        Field {
            width: width,
            height: height,
            element_type: element_type,
            source: Source::Lazy(Arc::new(pixel)),
        }
    }

    pub fn constant(width: usize, height: usize, element_type: ElementType, value: f64) -> Self {
        Field::lazy(width, height, element_type, move |_, _| value)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    #[inline]
    pub fn is_lazy(&self) -> bool {
        match self.source {
            Source::Lazy(_) => true,
            Source::Buffer(_) => false,
        }
    }

    #[inline]
    pub fn value_at(&self, x: usize, y: usize) -> f64 {
        debug_assert!(x < self.width && y < self.height);
        match self.source {
            Source::Buffer(ref samples) => samples.get(y * self.width + x),
            Source::Lazy(ref pixel) => self.element_type.cast(pixel(x, y)),
        }
    }

    /// Materializes the field into a sample buffer of its element type.
    pub fn evaluate(&self) -> Field {
        match self.source {
            Source::Buffer(_) => self.clone(),
            Source::Lazy(ref pixel) => {
                let time = Instant::now();
                let samples = Samples::build(self.element_type,
                                             self.width,
                                             self.height,
                                             |x, y| pixel(x, y));
                trace!("Evaluated {}x{} {:?} field in {:.4}s",
                       self.width,
                       self.height,
                       self.element_type,
                       seconds_since(time));
                Field {
                    width: self.width,
                    height: self.height,
                    element_type: self.element_type,
                    source: Source::Buffer(Arc::new(samples)),
                }
            }
        }
    }

    /// Lazily applies `func` to every sample.
    pub fn map<F>(&self, element_type: ElementType, func: F) -> Field
        where F: Fn(f64) -> f64 + Send + Sync + 'static
    {
        let source = self.clone();
        Field::lazy(self.width,
                    self.height,
                    element_type,
                    move |x, y| func(source.value_at(x, y)))
    }

    /// Lazily reinterprets the samples in another precision.
    pub fn with_element_type(&self, element_type: ElementType) -> Field {
        if element_type == self.element_type {
            self.clone()
        } else {
            self.map(element_type, |value| value)
        }
    }

    /// Row-major copy of all values.
    pub fn to_vec(&self) -> Vec<f64> {
        let field = self.evaluate();
        iproduct!(0..self.height, 0..self.width).map(|(y, x)| field.value_at(x, y)).collect()
    }
}

impl ScalarField for Field {
    #[inline]
    fn dimensions(&self) -> (usize, usize) {
        Field::dimensions(self)
    }

    #[inline]
    fn value_at(&self, x: usize, y: usize) -> f64 {
        Field::value_at(self, x, y)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.debug_struct("Field")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("element_type", &self.element_type)
            .field("lazy", &self.is_lazy())
            .finish()
    }
}

/// Checks that all fields share one size and returns it.
pub fn same_dimensions(fields: &[Field]) -> Result<(usize, usize)> {
    let first = match fields.first() {
        Some(field) => field.dimensions(),
        None => return Err(ErrorKind::EmptyFieldList.into()),
    };
    for field in &fields[1..] {
        if field.dimensions() != first {
            return Err(ErrorKind::DimensionsMismatch(first, field.dimensions()).into());
        }
    }
    Ok(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SquareField {
        size: usize,
    }

    impl ScalarField for SquareField {
        fn dimensions(&self) -> (usize, usize) {
            (self.size, self.size)
        }

        fn value_at(&self, x: usize, y: usize) -> f64 {
            (x * x + y * y) as f64
        }
    }

    #[test]
    fn test_lazy_and_buffered_agree() {
        let lazy = Field::lazy(7, 5, ElementType::U8, |x, y| x as f64 * 40.3 - y as f64);
        let buffered = lazy.evaluate();
        assert!(lazy.is_lazy());
        assert!(!buffered.is_lazy());
        assert_eq!(lazy.to_vec(), buffered.to_vec());
        assert_eq!(buffered.value_at(6, 0), 242.0);
        assert_eq!(buffered.value_at(0, 4), 0.0);
    }

    #[test]
    fn test_from_scalar_field() {
        let field = Field::from_scalar_field(&SquareField { size: 4 }, ElementType::F64);
        assert_eq!(field.dimensions(), (4, 4));
        assert_eq!(field.value_at(3, 2), 13.0);
    }

    #[test]
    fn test_from_samples_checks_length() {
        assert!(Field::from_samples(3, 2, ElementType::F32, &[0.0; 5]).is_err());
        let field = Field::from_samples(3, 2, ElementType::F32, &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap();
        assert_eq!(field.value_at(2, 1), 5.0);
    }

    #[test]
    fn test_map_and_cast() {
        let field = Field::constant(2, 2, ElementType::F64, 0.1);
        let scaled = field.map(ElementType::F64, |v| v * 10.0);
        assert!((scaled.value_at(1, 1) - 1.0).abs() < 1e-12);
        assert_eq!(field.with_element_type(ElementType::F32).value_at(0, 0),
                   0.1f32 as f64);
    }

    #[test]
    fn test_same_dimensions() {
        let a = Field::constant(2, 3, ElementType::F32, 0.0);
        let b = Field::constant(3, 2, ElementType::F32, 0.0);
        assert_eq!(same_dimensions(&[a.clone(), a.clone()]).unwrap(), (2, 3));
        match *same_dimensions(&[a, b]).unwrap_err().kind() {
            ErrorKind::DimensionsMismatch((2, 3), (3, 2)) => {}
            ref kind => panic!("unexpected error {:?}", kind),
        }
        assert!(same_dimensions(&[]).is_err());
    }

    #[test]
    fn test_empty_field() {
        let field = Field::from_fn(0, 3, ElementType::F32, |_, _| 1.0);
        assert!(field.to_vec().is_empty());
    }
}

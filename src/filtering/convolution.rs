use std::borrow::Cow;
use std::time::Instant;

use crate::errors::{ErrorKind, Result};
use crate::field::{ElementType, Field};
use crate::utils::seconds_since;

/// A finite stencil: a rectangular window of integer offsets with one weight
/// per offset, stored row by row.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    min_x: isize,
    min_y: isize,
    max_x: isize,
    max_y: isize,
    weights: Cow<'static, [f64]>,
}

impl Kernel {
    /// Kernel over a constant table; the table length must match the window.
    pub const fn from_static(min_x: isize,
                             min_y: isize,
                             max_x: isize,
                             max_y: isize,
                             weights: &'static [f64])
                             -> Self {
        Kernel {
            min_x: min_x,
            min_y: min_y,
            max_x: max_x,
            max_y: max_y,
            weights: Cow::Borrowed(weights),
        }
    }

    pub fn new(min: (isize, isize), max: (isize, isize), weights: Vec<f64>) -> Result<Self> {
        let expected = if max.0 < min.0 || max.1 < min.1 {
            0
        } else {
            ((max.0 - min.0 + 1) * (max.1 - min.1 + 1)) as usize
        };
        if expected == 0 || weights.len() != expected {
            return Err(ErrorKind::BufferLength(expected, weights.len()).into());
        }
        Ok(Kernel {
            min_x: min.0,
            min_y: min.1,
            max_x: max.0,
            max_y: max.1,
            weights: Cow::Owned(weights),
        })
    }

    /// `((min_x, min_y), (max_x, max_y))`, both corners inclusive.
    #[inline]
    pub fn support(&self) -> ((isize, isize), (isize, isize)) {
        ((self.min_x, self.min_y), (self.max_x, self.max_y))
    }

    #[inline]
    pub fn width(&self) -> usize {
        (self.max_x - self.min_x + 1) as usize
    }

    #[inline]
    pub fn height(&self) -> usize {
        (self.max_y - self.min_y + 1) as usize
    }

    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Weight at offset `(dx, dy)`, zero outside the support.
    pub fn weight_at(&self, dx: isize, dy: isize) -> f64 {
        if dx < self.min_x || dx > self.max_x || dy < self.min_y || dy > self.max_y {
            return 0.0;
        }
        let index = (dy - self.min_y) as usize * self.width() + (dx - self.min_x) as usize;
        self.weights[index]
    }

    /// Non-zero `(dx, dy, weight)` triples.
    pub fn taps(&self) -> Vec<(isize, isize, f64)> {
        iproduct!(self.min_y..self.max_y + 1, self.min_x..self.max_x + 1)
            .map(|(dy, dx)| (dx, dy, self.weight_at(dx, dy)))
            .filter(|&(_, _, weight)| weight != 0.0)
            .collect()
    }
}

/// How samples outside the field are synthesized for a stencil.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Boundary {
    /// Each coordinate wraps around independently.
    Cyclic,
    /// The row-major linear index wraps around the whole buffer.
    PseudoCyclic,
    /// The field is reflected with the edge sample repeated: `-1 -> 0`,
    /// `width -> width - 1`.
    MirrorCyclic,
    /// Every outside sample has the given value.
    Constant(f64),
}

impl Default for Boundary {
    fn default() -> Self {
        Boundary::MirrorCyclic
    }
}

impl Boundary {
    /// Value of `field` at a possibly out-of-range coordinate.
    #[inline]
    pub fn value_at(self, field: &Field, x: isize, y: isize) -> f64 {
        let (width, height) = (field.width() as isize, field.height() as isize);
        if x >= 0 && x < width && y >= 0 && y < height {
            return field.value_at(x as usize, y as usize);
        }
        match self {
            Boundary::Cyclic => {
                field.value_at(x.rem_euclid(width) as usize, y.rem_euclid(height) as usize)
            }
            Boundary::PseudoCyclic => {
                let index = (y * width + x).rem_euclid(width * height);
                field.value_at((index % width) as usize, (index / width) as usize)
            }
            Boundary::MirrorCyclic => field.value_at(mirror(x, width), mirror(y, height)),
            Boundary::Constant(value) => value,
        }
    }
}

#[inline]
fn mirror(coordinate: isize, size: isize) -> usize {
    let period = coordinate.rem_euclid(2 * size);
    (if period < size { period } else { 2 * size - 1 - period }) as usize
}

/// Lazily convolves `field` with `kernel`:
/// `out(x, y) = sum of w(dx, dy) * in(x - dx, y - dy)`.
///
/// The source is evaluated once up front; sums are accumulated in `f64` and
/// rounded to `element_type` only when read.
pub fn convolve(field: &Field,
                kernel: &Kernel,
                boundary: Boundary,
                element_type: ElementType)
                -> Field {
    let time = Instant::now();
    let source = field.evaluate();
    if field.is_lazy() {
        trace!("Evaluated convolution source in {:.4}s", seconds_since(time));
    }
    let taps = kernel.taps();
    let (width, height) = source.dimensions();
    Field::lazy(width, height, element_type, move |x, y| {
        let (x, y) = (x as isize, y as isize);
        taps.iter()
            .map(|&(dx, dy, weight)| weight * boundary.value_at(&source, x - dx, y - dy))
            .sum()
    })
}

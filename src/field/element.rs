use num::{clamp, Float, ToPrimitive};

/// Numeric precision of the samples stored in a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    U8,
    U16,
    F32,
    F64,
}

impl ElementType {
    #[inline]
    pub fn is_floating_point(self) -> bool {
        match self {
            ElementType::F32 | ElementType::F64 => true,
            ElementType::U8 | ElementType::U16 => false,
        }
    }

    /// Maximal value representable by the type, or `1.0` for floating types
    /// (whose natural range is the unit interval).
    #[inline]
    pub fn max_possible_value(self) -> f64 {
        match self {
            ElementType::U8 => u8::MAX as f64,
            ElementType::U16 => u16::MAX as f64,
            ElementType::F32 | ElementType::F64 => 1.0,
        }
    }

    /// Precision of derivatives taken from samples of this type.
    #[inline]
    pub fn floating(self) -> ElementType {
        match self {
            ElementType::F64 => ElementType::F64,
            _ => ElementType::F32,
        }
    }

    /// Rounds `value` to what a buffer of this type would store.
    ///
    /// Integer types round to nearest and saturate; NaN becomes 0.
    #[inline]
    pub fn cast(self, value: f64) -> f64 {
        match self {
            ElementType::U8 => cast_integer(value, self.max_possible_value()),
            ElementType::U16 => cast_integer(value, self.max_possible_value()),
            ElementType::F32 => value.to_f32().map_or(f64::nan(), f64::from),
            ElementType::F64 => value,
        }
    }
}

#[inline]
fn cast_integer(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        clamp(value.round(), 0.0, max)
    }
}

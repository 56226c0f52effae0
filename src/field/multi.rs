use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

use crate::errors::{ErrorKind, Result};
use crate::field::{same_dimensions, ElementType, Field};

/// Luminance weights of the red, green and blue channels.
const LUMINANCE_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// A non-empty list of equally sized channels sharing one element type.
///
/// Color fields keep their channels in RGB(A) order.
#[derive(Clone, Debug)]
pub struct MultiField {
    channels: Vec<Field>,
}

impl MultiField {
    pub fn new(channels: Vec<Field>) -> Result<Self> {
        same_dimensions(&channels)?;
        let element_type = channels[0].element_type();
        if let Some(other) = channels.iter().find(|c| c.element_type() != element_type) {
            return Err(ErrorKind::ElementTypeMismatch(element_type, other.element_type()).into());
        }
        Ok(MultiField { channels: channels })
    }

    pub fn mono(channel: Field) -> Self {
        MultiField { channels: vec![channel] }
    }

    pub fn from_luma8(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        from_interleaved(width as usize, height as usize, 1, ElementType::U8, image.as_raw())
    }

    pub fn from_rgb8(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        from_interleaved(width as usize, height as usize, 3, ElementType::U8, image.as_raw())
    }

    pub fn from_rgba8(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        from_interleaved(width as usize, height as usize, 4, ElementType::U8, image.as_raw())
    }

    /// Converts a decoded image, keeping 16-bit samples at 16 bits and
    /// floating-point samples as `F32`.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        let (width, height) = (image.width() as usize, image.height() as usize);
        match *image {
            DynamicImage::ImageLuma16(ref buffer) => {
                from_interleaved(width, height, 1, ElementType::U16, buffer.as_raw())
            }
            DynamicImage::ImageLumaA16(ref buffer) => {
                from_interleaved(width, height, 2, ElementType::U16, buffer.as_raw())
            }
            DynamicImage::ImageRgb16(ref buffer) => {
                from_interleaved(width, height, 3, ElementType::U16, buffer.as_raw())
            }
            DynamicImage::ImageRgba16(ref buffer) => {
                from_interleaved(width, height, 4, ElementType::U16, buffer.as_raw())
            }
            DynamicImage::ImageRgb32F(ref buffer) => {
                from_interleaved(width, height, 3, ElementType::F32, buffer.as_raw())
            }
            DynamicImage::ImageRgba32F(ref buffer) => {
                from_interleaved(width, height, 4, ElementType::F32, buffer.as_raw())
            }
            _ => {
                match image.color().channel_count() {
                    1 => MultiField::from_luma8(&image.to_luma8()),
                    2 => {
                        let buffer = image.to_luma_alpha8();
                        from_interleaved(width, height, 2, ElementType::U8, buffer.as_raw())
                    }
                    3 => MultiField::from_rgb8(&image.to_rgb8()),
                    _ => MultiField::from_rgba8(&image.to_rgba8()),
                }
            }
        }
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn channel(&self, index: usize) -> &Field {
        &self.channels[index]
    }

    #[inline]
    pub fn channels(&self) -> &[Field] {
        &self.channels
    }

    pub fn into_channels(self) -> Vec<Field> {
        self.channels
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        self.channels[0].dimensions()
    }

    #[inline]
    pub fn element_type(&self) -> ElementType {
        self.channels[0].element_type()
    }

    #[inline]
    pub fn is_floating_point(&self) -> bool {
        self.element_type().is_floating_point()
    }

    /// RGB or RGBA.
    #[inline]
    pub fn is_color(&self) -> bool {
        self.channels.len() == 3 || self.channels.len() == 4
    }

    /// Promotes integer samples to `F32`, mapping the maximal value of the
    /// integer type to 1.0. Floating fields are returned as is.
    pub fn to_floating_point(&self) -> MultiField {
        if self.is_floating_point() {
            return self.clone();
        }
        let max = self.element_type().max_possible_value();
        MultiField {
            channels: self.channels
                .iter()
                .map(|channel| channel.map(ElementType::F32, move |value| value / max).evaluate())
                .collect(),
        }
    }

    /// Keeps at most the first `max_channels` channels (at least one).
    pub fn cap_channels(&self, max_channels: usize) -> MultiField {
        let count = max_channels.max(1).min(self.channels.len());
        MultiField { channels: self.channels[..count].to_vec() }
    }

    /// Collapses to one channel: luminance of a color field, the first channel
    /// of any other.
    pub fn to_single_channel(&self) -> MultiField {
        if !self.is_color() {
            return self.cap_channels(1);
        }
        let (red, green, blue) = (self.channels[0].clone(),
                                  self.channels[1].clone(),
                                  self.channels[2].clone());
        let (width, height) = self.dimensions();
        let luminance = Field::lazy(width, height, self.element_type(), move |x, y| {
            LUMINANCE_WEIGHTS[0] * red.value_at(x, y) + LUMINANCE_WEIGHTS[1] * green.value_at(x, y) +
            LUMINANCE_WEIGHTS[2] * blue.value_at(x, y)
        });
        MultiField::mono(luminance.evaluate())
    }
}

fn from_interleaved<T>(width: usize,
                       height: usize,
                       num_channels: usize,
                       element_type: ElementType,
                       raw: &[T])
                       -> MultiField
    where T: Copy + Into<f64> + Sync
{
    let channels = (0..num_channels)
        .map(|channel| {
            Field::from_fn(width,
                           height,
                           element_type,
                           |x, y| raw[(y * width + x) * num_channels + channel].into())
        })
        .collect();
    MultiField { channels: channels }
}

//! Decodes images into a fixed size grid of pixels

use crate::{Error, Result};
use image::{imageops::FilterType, DynamicImage, GenericImageView};
use palette::Srgb;

/// Resampling filter used for every resize, so the same bytes always give the same pixels
const SAMPLE_FILTER: FilterType = FilterType::Triangle;

/// Pixels sampled from one image, in row-major order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSet {
	/// Width of the sampled grid
	width: u32,
	/// Height of the sampled grid
	height: u32,
	/// `width * height` pixels
	pixels: Vec<Srgb<u8>>,
}

impl PixelSet {
	/// Wrap an existing grid of pixels.
	///
	/// Returns `None` if `pixels.len()` is not `width * height`.
	#[must_use]
	pub fn from_pixels(width: u32, height: u32, pixels: Vec<Srgb<u8>>) -> Option<Self> {
		(u64::from(width) * u64::from(height) == pixels.len() as u64).then_some(Self { width, height, pixels })
	}

	/// Decode image bytes and resize the result to exactly `width` x `height` pixels.
	///
	/// Any alpha channel is discarded and other color types are converted to RGB.
	///
	/// # Errors
	/// Returns [`Error::InsufficientData`] if `bytes` is empty or the decoded image has no pixels,
	/// or [`Error::Decode`] if the bytes are not a supported image.
	pub fn from_bytes(bytes: &[u8], width: u32, height: u32) -> Result<Self> {
		if bytes.is_empty() {
			return Err(Error::InsufficientData);
		}

		let image = image::load_from_memory(bytes)?;
		Self::from_image(&image, width, height)
	}

	/// Resize an already decoded image to exactly `width` x `height` pixels.
	///
	/// # Errors
	/// Returns [`Error::InsufficientData`] if the image has no pixels.
	pub fn from_image(image: &DynamicImage, width: u32, height: u32) -> Result<Self> {
		let (img_width, img_height) = image.dimensions();
		if img_width == 0 || img_height == 0 {
			return Err(Error::InsufficientData);
		}

		log::trace!("Sampling {img_width}x{img_height} image at {width}x{height}");

		let rgb = if (img_width, img_height) == (width, height) {
			image.to_rgb8()
		} else {
			image.resize_exact(width, height, SAMPLE_FILTER).into_rgb8()
		};

		let pixels = palette::cast::from_component_slice::<Srgb<u8>>(rgb.as_raw()).to_vec();

		Ok(Self { width, height, pixels })
	}

	/// The width of the sampled grid
	#[must_use]
	pub const fn width(&self) -> u32 {
		self.width
	}

	/// The height of the sampled grid
	#[must_use]
	pub const fn height(&self) -> u32 {
		self.height
	}

	/// The sampled pixels in row-major order
	#[must_use]
	pub fn pixels(&self) -> &[Srgb<u8>] {
		&self.pixels
	}

	/// The number of sampled pixels
	#[must_use]
	pub fn len(&self) -> usize {
		self.pixels.len()
	}

	/// Whether there are no pixels
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.pixels.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use image::{ImageOutputFormat, Rgb, RgbImage, Rgba, RgbaImage};
	use std::io::Cursor;

	fn png_bytes(image: DynamicImage) -> Vec<u8> {
		let mut bytes = Cursor::new(Vec::new());
		image.write_to(&mut bytes, ImageOutputFormat::Png).expect("encoded png");
		bytes.into_inner()
	}

	#[test]
	fn from_pixels_checks_length() {
		assert!(PixelSet::from_pixels(2, 2, vec![Srgb::new(0, 0, 0); 4]).is_some());
		assert!(PixelSet::from_pixels(2, 2, vec![Srgb::new(0, 0, 0); 3]).is_none());
	}

	#[test]
	fn resizes_to_sample_resolution() {
		let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(640, 480, Rgb([10, 20, 30])));
		let pixels = PixelSet::from_bytes(&png_bytes(image), 150, 150).expect("decodable png");

		assert_eq!((pixels.width(), pixels.height()), (150, 150));
		assert_eq!(pixels.len(), 150 * 150);
		assert!(pixels.pixels().iter().all(|&p| p == Srgb::new(10, 20, 30)));
	}

	#[test]
	fn discards_alpha() {
		let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([200, 100, 50, 0])));
		let pixels = PixelSet::from_image(&image, 4, 4).expect("non-empty image");

		assert!(pixels.pixels().iter().all(|&p| p == Srgb::new(200, 100, 50)));
	}

	#[test]
	fn keeps_row_major_order() {
		let mut image = RgbImage::new(2, 2);
		image.put_pixel(1, 0, Rgb([255, 0, 0]));
		image.put_pixel(0, 1, Rgb([0, 255, 0]));
		let pixels = PixelSet::from_image(&DynamicImage::ImageRgb8(image), 2, 2).expect("non-empty image");

		assert_eq!(
			pixels.pixels(),
			&[Srgb::new(0, 0, 0), Srgb::new(255, 0, 0), Srgb::new(0, 255, 0), Srgb::new(0, 0, 0)]
		);
	}

	#[test]
	fn same_bytes_same_pixels() {
		let mut image = RgbImage::new(37, 23);
		for (x, y, pixel) in image.enumerate_pixels_mut() {
			#[allow(clippy::cast_possible_truncation)]
			{
				*pixel = Rgb([(x * 7) as u8, (y * 11) as u8, ((x + y) * 3) as u8]);
			}
		}
		let bytes = png_bytes(DynamicImage::ImageRgb8(image));

		let a = PixelSet::from_bytes(&bytes, 16, 16).expect("decodable png");
		let b = PixelSet::from_bytes(&bytes, 16, 16).expect("decodable png");
		assert_eq!(a, b);
	}

	#[test]
	fn empty_bytes_are_insufficient_data() {
		assert!(matches!(PixelSet::from_bytes(&[], 150, 150), Err(Error::InsufficientData)));
	}

	#[test]
	fn rejects_undecodable_bytes() {
		let result = PixelSet::from_bytes(&[0x89, b'P', b'N', b'G', 0, 1, 2], 150, 150);
		assert!(matches!(result, Err(Error::Decode(_))));
	}
}

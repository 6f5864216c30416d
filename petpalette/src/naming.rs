//! Human readable names for palette colors

use crate::Palette;
use palette::{FromColor, Hsl, Srgb};
use std::fmt::{self, Display};

/// Percentage above which the second most prevalent color is also named
pub const SECONDARY_COLOR_THRESHOLD: f64 = 0.2;

/// A coarse color category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorName {
	/// Very dark colors
	Black,
	/// Very light, unsaturated colors
	White,
	/// Dark, unsaturated colors
	DarkGray,
	/// Unsaturated colors
	Gray,
	/// Light, unsaturated colors
	LightGray,
	/// Hues from 345° through 15°
	Red,
	/// Hues from 15° to 45°
	Orange,
	/// Hues from 45° to 70°
	Yellow,
	/// Hues from 70° to 150°
	Green,
	/// Hues from 150° to 200°
	Cyan,
	/// Hues from 200° to 260°
	Blue,
	/// Hues from 260° to 330°
	Purple,
	/// Hues from 330° to 345°
	Pink,
}

impl ColorName {
	/// Classify a color by its HSL lightness, saturation, and hue
	#[must_use]
	pub fn of(color: Srgb<u8>) -> Self {
		use ColorName::*;

		let hsl = Hsl::from_color(color.into_format::<f32>());
		let lightness = hsl.lightness * 100.0;
		let saturation = hsl.saturation * 100.0;
		let hue = hsl.hue.into_positive_degrees();

		if lightness < 15.0 {
			Black
		} else if lightness > 85.0 && saturation < 10.0 {
			White
		} else if saturation < 15.0 {
			if lightness < 40.0 {
				DarkGray
			} else if lightness < 70.0 {
				Gray
			} else {
				LightGray
			}
		} else if !(15.0..345.0).contains(&hue) {
			Red
		} else if hue < 45.0 {
			Orange
		} else if hue < 70.0 {
			Yellow
		} else if hue < 150.0 {
			Green
		} else if hue < 200.0 {
			Cyan
		} else if hue < 260.0 {
			Blue
		} else if hue < 330.0 {
			Purple
		} else {
			Pink
		}
	}
}

impl Display for ColorName {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		use ColorName::*;

		f.write_str(match self {
			Black => "black",
			White => "white",
			DarkGray => "dark gray",
			Gray => "gray",
			LightGray => "light gray",
			Red => "red",
			Orange => "orange",
			Yellow => "yellow",
			Green => "green",
			Cyan => "cyan",
			Blue => "blue",
			Purple => "purple",
			Pink => "pink",
		})
	}
}

/// Describe the dominant colors of a palette, e.g. `"orange"` or `"black and white"`.
///
/// The second color is only mentioned if it makes up more than [`SECONDARY_COLOR_THRESHOLD`] of the image
/// and has a different name than the first. Returns `None` for an empty palette.
#[must_use]
pub fn describe(palette: &Palette) -> Option<String> {
	let (first, rest) = palette.entries().split_first()?;
	let primary = ColorName::of(first.color);

	let secondary = rest
		.first()
		.filter(|entry| entry.percentage > SECONDARY_COLOR_THRESHOLD)
		.map(|entry| ColorName::of(entry.color))
		.filter(|&name| name != primary);

	Some(match secondary {
		Some(secondary) => format!("{primary} and {secondary}"),
		None => primary.to_string(),
	})
}

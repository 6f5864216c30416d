//! Scores how similar the colors of two palettes are.
//!
//! The score is a prevalence weighted average of best matches:
//! each color of the query palette is matched to its nearest color in the reference palette,
//! the distance is normalized by [`MAX_RGB_DISTANCE`] into a similarity in `0.0..=1.0`,
//! and the similarities are weighted by the query color percentages.
//!
//! This measures how well the query's colors are covered by the reference,
//! so swapping the two palettes can change the result.

use crate::{ColorProfile, Palette};
use palette::Srgb;

/// The largest possible Euclidean distance between two RGB colors, `sqrt(3 * 255^2)`
pub const MAX_RGB_DISTANCE: f64 = 441.6729559300637;

/// Euclidean distance between two RGB colors
fn distance(x: Srgb<u8>, y: Srgb<u8>) -> f64 {
	let dr = f64::from(x.red) - f64::from(y.red);
	let dg = f64::from(x.green) - f64::from(y.green);
	let db = f64::from(x.blue) - f64::from(y.blue);
	(dr * dr + dg * dg + db * db).sqrt()
}

/// Score how well the colors of `query` are covered by the colors of `reference`, in `0.0..=1.0`.
///
/// Returns `0.0` if either palette is empty.
#[must_use]
pub fn color_similarity(query: &Palette, reference: &Palette) -> f64 {
	if query.is_empty() || reference.is_empty() {
		return 0.0;
	}

	let score = query
		.entries()
		.iter()
		.map(|entry| {
			let nearest = reference
				.entries()
				.iter()
				.map(|other| distance(entry.color, other.color))
				.fold(f64::INFINITY, f64::min);

			entry.percentage * f64::max(0.0, 1.0 - nearest / MAX_RGB_DISTANCE)
		})
		.sum::<f64>();

	score.clamp(0.0, 1.0)
}

/// A similarity score together with the palettes it was computed from
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaletteComparison {
	/// See [`color_similarity`]
	pub similarity: f64,
	/// The query palette
	pub query: ColorProfile,
	/// The reference palette
	pub reference: ColorProfile,
}

impl PaletteComparison {
	/// Score `query` against `reference`, keeping both palettes
	#[must_use]
	pub fn new(query: Palette, reference: Palette) -> Self {
		Self {
			similarity: color_similarity(&query, &reference),
			query: query.profile(),
			reference: reference.profile(),
		}
	}
}

//! Ranks clusters into a palette of colors ordered by prevalence

use crate::ClusterResult;
use palette::Srgb;

/// A representative color of an image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteEntry {
	/// The cluster centroid, with each channel truncated towards zero
	pub color: Srgb<u8>,
	/// Fraction of the sampled pixels belonging to this color, in `0.0..=1.0`
	pub percentage: f64,
}

/// Representative colors of an image in descending order of prevalence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
	/// The entries, most prevalent first
	entries: Vec<PaletteEntry>,
}

/// Truncate a centroid channel to an integer in `0..=255`
// clamped to the u8 range before the cast
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn truncate_channel(value: f64) -> u8 {
	value.clamp(0.0, 255.0).floor() as u8
}

impl Palette {
	/// Convert clustering output into a palette.
	///
	/// Empty clusters are dropped, and equally prevalent colors keep their cluster order.
	#[must_use]
	pub fn from_clusters(result: &ClusterResult) -> Self {
		let total = f64::from(result.total);

		let entries = result
			.clusters
			.iter()
			.filter(|cluster| cluster.count > 0)
			.map(|cluster| {
				let centroid = cluster.centroid;
				PaletteEntry {
					color: Srgb::new(
						truncate_channel(centroid.red),
						truncate_channel(centroid.green),
						truncate_channel(centroid.blue),
					),
					percentage: f64::from(cluster.count) / total,
				}
			})
			.collect::<Vec<_>>();

		Self::from_entries(entries)
	}

	/// Build a palette from entries in any order.
	///
	/// The entries are sorted by descending percentage, and equally prevalent entries keep their given order.
	#[must_use]
	pub fn from_entries(mut entries: Vec<PaletteEntry>) -> Self {
		entries.sort_by(|x, y| f64::total_cmp(&y.percentage, &x.percentage));
		Self { entries }
	}

	/// The entries, most prevalent first
	#[must_use]
	pub fn entries(&self) -> &[PaletteEntry] {
		&self.entries
	}

	/// The number of colors
	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the palette has no colors
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// The index-aligned color and percentage lists for this palette
	#[must_use]
	pub fn profile(&self) -> ColorProfile {
		ColorProfile {
			colors: self.entries.iter().map(|e| e.color.into()).collect(),
			percentages: self.entries.iter().map(|e| e.percentage).collect(),
		}
	}
}

impl From<&ColorProfile> for Palette {
	fn from(profile: &ColorProfile) -> Self {
		Self::from_entries(
			profile
				.colors
				.iter()
				.zip(&profile.percentages)
				.map(|(&color, &percentage)| PaletteEntry { color: color.into(), percentage })
				.collect(),
		)
	}
}

/// A palette as two index-aligned lists: `[r, g, b]` colors and their percentages
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorProfile {
	/// Colors, most prevalent first
	pub colors: Vec<[u8; 3]>,
	/// Fraction of pixels for each color, summing to about `1.0`
	pub percentages: Vec<f64>,
}

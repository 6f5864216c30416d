//! Feature vectors for matching whole images.
//!
//! The deep-feature network used in production is not part of this crate.
//! Callers construct their own [`FeatureExtractor`] once and pass it by reference to wherever images are matched.
//! [`HistogramExtractor`] is a small built-in extractor for when no network is available.

use crate::{PixelSet, Result};

/// Default minimum cosine similarity for [`best_matches`]
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.7;

/// Default maximum number of results for [`best_matches`]
pub const DEFAULT_MATCH_COUNT: usize = 5;

/// Turns sampled pixels into a fixed-length feature vector
pub trait FeatureExtractor {
	/// The length of every vector returned by [`FeatureExtractor::extract`]
	fn dimensions(&self) -> usize;

	/// Compute the feature vector for an image.
	///
	/// # Errors
	/// Implementations may fail if the pixels are unusable for their model.
	fn extract(&self, pixels: &PixelSet) -> Result<Vec<f32>>;
}

impl<T: FeatureExtractor + ?Sized> FeatureExtractor for &T {
	fn dimensions(&self) -> usize {
		(**self).dimensions()
	}

	fn extract(&self, pixels: &PixelSet) -> Result<Vec<f32>> {
		(**self).extract(pixels)
	}
}

/// Cosine similarity of two vectors, in `-1.0..=1.0`.
///
/// Returns `0.0` if the vectors differ in length or either has a norm of zero.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
	if a.len() != b.len() {
		return 0.0;
	}

	let mut dot = 0.0;
	let mut norm_a = 0.0;
	let mut norm_b = 0.0;
	for (&x, &y) in a.iter().zip(b) {
		dot += f64::from(x) * f64::from(y);
		norm_a += f64::from(x) * f64::from(x);
		norm_b += f64::from(y) * f64::from(y);
	}

	if norm_a > 0.0 && norm_b > 0.0 {
		// bounded by 1.0 in magnitude
		#[allow(clippy::cast_possible_truncation)]
		let similarity = (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0) as f32;
		similarity
	} else {
		0.0
	}
}

/// A candidate that matched a query vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a, Id> {
	/// The id given with the candidate
	pub id: &'a Id,
	/// Cosine similarity to the query
	pub similarity: f32,
}

/// Find the `count` candidates most similar to `query` with a similarity of at least `threshold`.
///
/// Matches are returned best first, and equally similar candidates keep their input order.
#[must_use]
pub fn best_matches<'a, Id: 'a>(
	query: &[f32],
	candidates: impl IntoIterator<Item = (&'a Id, &'a [f32])>,
	threshold: f32,
	count: usize,
) -> Vec<Match<'a, Id>> {
	let mut matches = candidates
		.into_iter()
		.map(|(id, vector)| Match { id, similarity: cosine_similarity(query, vector) })
		.filter(|m| m.similarity >= threshold)
		.collect::<Vec<_>>();

	matches.sort_by(|x, y| f32::total_cmp(&y.similarity, &x.similarity));
	matches.truncate(count);
	matches
}

/// A per-channel color histogram, normalized to unit length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramExtractor {
	/// The number of bins for each of the three channels
	bins: u16,
}

impl Default for HistogramExtractor {
	fn default() -> Self {
		Self { bins: 16 }
	}
}

impl HistogramExtractor {
	/// Create an extractor with `bins` bins per channel, clamped to `1..=256`
	#[must_use]
	pub fn new(bins: u16) -> Self {
		Self { bins: bins.clamp(1, 256) }
	}
}

impl FeatureExtractor for HistogramExtractor {
	fn dimensions(&self) -> usize {
		usize::from(self.bins) * 3
	}

	fn extract(&self, pixels: &PixelSet) -> Result<Vec<f32>> {
		let bins = usize::from(self.bins);
		let bin = |channel: u8| usize::from(channel) * bins / 256;

		let mut histogram = vec![0.0f32; bins * 3];
		for pixel in pixels.pixels() {
			histogram[bin(pixel.red)] += 1.0;
			histogram[bins + bin(pixel.green)] += 1.0;
			histogram[2 * bins + bin(pixel.blue)] += 1.0;
		}

		let norm = histogram.iter().map(|v| v * v).sum::<f32>().sqrt();
		if norm > 0.0 {
			for value in &mut histogram {
				*value /= norm;
			}
		}

		Ok(histogram)
	}
}

//! Color similarity signals for pet photos.
//!
//! An image is reduced to a handful of representative colors by seeded k-means clustering in RGB space.
//! The resulting clusters are ranked into a [`Palette`] by prevalence,
//! and two palettes can be scored against each other with [`color_similarity`].
//!
//! # Examples
//!
//! ## Get the 3 dominant colors of an image.
//!
//! ```no_run
//! let bytes = std::fs::read("some image").unwrap();
//! let palette = petpalette::color_profile(&bytes, &petpalette::Config::default()).unwrap();
//!
//! for entry in palette.entries() {
//! 	println!("{:?} {:.3}", entry.color, entry.percentage);
//! }
//! ```
//!
//! ## Compare two images.
//!
//! ```no_run
//! let query = std::fs::read("lost pet").unwrap();
//! let reference = std::fs::read("found pet").unwrap();
//!
//! let config = petpalette::Config::default().with_k(4);
//! let comparison = petpalette::compare(&query, &reference, &config).unwrap();
//! println!("{}", comparison.similarity);
//! ```
//!
//! # Arguments
//!
//! Here are explanations of the values held by [`Config`].
//!
//! ## K
//!
//! This is the number of clusters to find. Defaults to 3.
//!
//! Exactly `k` clusters are produced, but some of them may end up with no pixels,
//! e.g. for a single colored image. Empty clusters are dropped from the [`Palette`],
//! so a palette can have fewer than `k` entries.
//!
//! ## Sample Resolution
//!
//! Every image is resized to exactly this many pixels (150x150 by default) before clustering.
//! This bounds the cost of clustering independent of the input size.
//!
//! ## Attempts
//!
//! k-means can get stuck in a local minimum, so it is run this many times (10 by default)
//! with different seeds, and the attempt with the lowest variance is kept.
//!
//! ## Seed
//!
//! This is the value used to seed the random number generator which is used to choose the initial centroids.
//! The same seed, attempts, and image bytes always give the same palette.

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::cargo)]
#![warn(clippy::use_debug, clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
#![warn(clippy::unwrap_used, clippy::unwrap_in_result)]
#![warn(clippy::unneeded_field_pattern, clippy::rest_pat_in_fully_bound_structs)]
#![warn(clippy::unnecessary_self_imports)]
#![warn(clippy::str_to_string, clippy::string_to_string, clippy::string_slice)]
#![warn(missing_docs, clippy::missing_docs_in_private_items, rustdoc::all)]
#![warn(clippy::float_cmp_const, clippy::lossy_float_literal)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::enum_glob_use)]
#![allow(clippy::unreadable_literal)]

use palette::Srgb;
use std::collections::HashMap;

mod config;
mod error;
mod kmeans;
mod rank;
mod sample;

pub mod embedding;
pub mod naming;
pub mod similarity;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use kmeans::{Cluster, ClusterResult};
pub use rank::{ColorProfile, Palette, PaletteEntry};
pub use sample::PixelSet;
pub use similarity::{color_similarity, PaletteComparison};

/// Deduplicated colors from a [`PixelSet`]
#[derive(Debug, Clone)]
pub struct RgbCounts {
	/// Unique colors, as floats, in order of first appearance
	pub(crate) colors: Vec<Srgb<f32>>,
	/// The number of pixels with each color
	pub(crate) counts: Vec<u32>,
	/// The total number of pixels
	pub(crate) total: u32,
}

impl RgbCounts {
	/// Group identical pixels together.
	///
	/// Returns an [`Error::InsufficientData`] if there are no pixels to group.
	pub fn new(pixels: &PixelSet) -> Result<Self> {
		if pixels.is_empty() {
			return Err(Error::InsufficientData);
		}

		let mut data = Self {
			colors: Vec::new(),
			counts: Vec::new(),
			total: 0,
		};

		// Packed Srgb -> data index
		let mut memo: HashMap<u32, u32> = HashMap::new();

		for &srgb in pixels.pixels() {
			let key = srgb.into_u32::<palette::rgb::channels::Rgba>();
			let index = *memo.entry(key).or_insert_with(|| {
				// data.len() < u32::MAX because there are only (2^8)^3 < u32::MAX possible sRGB colors
				#[allow(clippy::cast_possible_truncation)]
				let index = data.colors.len() as u32;

				data.colors.push(widen(srgb));
				data.counts.push(0);
				index
			});

			data.counts[index as usize] += 1;
			data.total += 1;
		}

		Ok(data)
	}

	/// The number of unique colors
	#[must_use]
	pub fn num_colors(&self) -> u32 {
		// at most 2^24 unique colors
		#[allow(clippy::cast_possible_truncation)]
		let n = self.colors.len() as u32;
		n
	}

	/// The total number of pixels these colors were counted from
	#[must_use]
	pub const fn total(&self) -> u32 {
		self.total
	}

	/// Iterate over each unique color and its count
	pub(crate) fn pairs(&self) -> impl Iterator<Item = (Srgb<f32>, u32)> + '_ {
		self.colors.iter().copied().zip(self.counts.iter().copied())
	}
}

/// Widen 8-bit channels to floats without rescaling, so `255` stays `255.0`
fn widen(srgb: Srgb<u8>) -> Srgb<f32> {
	Srgb::new(f32::from(srgb.red), f32::from(srgb.green), f32::from(srgb.blue))
}

/// Clusters the given pixels and ranks the clusters into a [`Palette`].
///
/// # Errors
/// Returns [`Error::InvalidConfig`] if `config` is invalid
/// or [`Error::InsufficientData`] if `pixels` is empty.
pub fn palette_from_pixels(pixels: &PixelSet, config: &Config) -> Result<Palette> {
	config.validate()?;
	let counts = RgbCounts::new(pixels)?;
	let clusters = kmeans::run(&counts, config);
	Ok(Palette::from_clusters(&clusters))
}

/// Decodes an image, samples it at the configured resolution, and returns its ranked [`Palette`].
///
/// # Errors
/// Returns [`Error::InvalidConfig`] if `config` is invalid,
/// [`Error::Decode`] if `bytes` is not a decodable image,
/// or [`Error::InsufficientData`] if `bytes` is empty or the image has no pixels.
pub fn color_profile(bytes: &[u8], config: &Config) -> Result<Palette> {
	config.validate()?;
	let pixels = PixelSet::from_bytes(bytes, config.sample_width, config.sample_height)?;
	palette_from_pixels(&pixels, config)
}

/// Computes the palettes of both images and scores how well the query's colors are covered by the reference.
///
/// The score is asymmetric, see [`color_similarity`].
///
/// # Errors
/// Same as [`color_profile`], for either image.
pub fn compare(query: &[u8], reference: &[u8], config: &Config) -> Result<PaletteComparison> {
	let query = color_profile(query, config)?;
	let reference = color_profile(reference, config)?;
	Ok(PaletteComparison::new(query, reference))
}

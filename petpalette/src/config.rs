//! Tunable values for palette extraction

use crate::{Error, Result};

/// Parameters for sampling and clustering an image.
///
/// See the crate documentation for information on each value.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
	/// The number of clusters to find
	pub k: u8,
	/// The width every image is resized to before clustering
	pub sample_width: u32,
	/// The height every image is resized to before clustering
	pub sample_height: u32,
	/// The value used to seed the centroid initialization
	pub seed: u64,
	/// The number of k-means runs, keeping the one with the lowest variance
	pub attempts: u32,
	/// The maximum number of iterations for each k-means run
	pub max_iter: u32,
	/// Total centroid movement (in RGB units) at or below which a run is considered converged
	pub convergence_threshold: f32,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			k: 3,
			sample_width: 150,
			sample_height: 150,
			seed: 0,
			attempts: 10,
			max_iter: 300,
			convergence_threshold: 1e-4,
		}
	}
}

impl Config {
	/// Set the number of clusters
	#[must_use]
	pub const fn with_k(mut self, k: u8) -> Self {
		self.k = k;
		self
	}

	/// Set the sampling resolution
	#[must_use]
	pub const fn with_sample_size(mut self, width: u32, height: u32) -> Self {
		self.sample_width = width;
		self.sample_height = height;
		self
	}

	/// Set the seed
	#[must_use]
	pub const fn with_seed(mut self, seed: u64) -> Self {
		self.seed = seed;
		self
	}

	/// Set the number of k-means runs
	#[must_use]
	pub const fn with_attempts(mut self, attempts: u32) -> Self {
		self.attempts = attempts;
		self
	}

	/// Set the iteration cap for each k-means run
	#[must_use]
	pub const fn with_max_iter(mut self, max_iter: u32) -> Self {
		self.max_iter = max_iter;
		self
	}

	/// Set the convergence threshold
	#[must_use]
	pub const fn with_convergence_threshold(mut self, threshold: f32) -> Self {
		self.convergence_threshold = threshold;
		self
	}

	/// Check that every value is in its valid range.
	///
	/// # Errors
	/// Returns [`Error::InvalidConfig`] naming the first offending value.
	pub fn validate(&self) -> Result<()> {
		if self.k == 0 {
			Err(Error::InvalidConfig("k must be at least 1".to_owned()))
		} else if self.sample_width == 0 || self.sample_height == 0 {
			Err(Error::InvalidConfig(format!(
				"sample resolution must be positive, got {}x{}",
				self.sample_width, self.sample_height
			)))
		} else if self.attempts == 0 {
			Err(Error::InvalidConfig("attempts must be at least 1".to_owned()))
		} else if self.max_iter == 0 {
			Err(Error::InvalidConfig("max_iter must be at least 1".to_owned()))
		} else if self.convergence_threshold.is_nan() || self.convergence_threshold < 0.0 {
			Err(Error::InvalidConfig(format!(
				"convergence threshold must be >= 0, got {}",
				self.convergence_threshold
			)))
		} else {
			Ok(())
		}
	}
}

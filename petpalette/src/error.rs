//! Failures surfaced by palette extraction

/// Error cases for sampling, clustering, and configuration
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The bytes could not be decoded as an image
	#[error("failed to decode the image: {0}")]
	Decode(#[from] image::ImageError),
	/// There were no pixels to cluster
	#[error("the image has no pixels to cluster")]
	InsufficientData,
	/// A configuration value is out of range
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),
}

/// The kind of an [`Error`], without its details
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// See [`Error::Decode`]
	Decode,
	/// See [`Error::InsufficientData`]
	InsufficientData,
	/// See [`Error::InvalidConfig`]
	InvalidConfig,
}

impl Error {
	/// Returns the kind of this error
	#[must_use]
	pub const fn kind(&self) -> ErrorKind {
		match self {
			Self::Decode(_) => ErrorKind::Decode,
			Self::InsufficientData => ErrorKind::InsufficientData,
			Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
		}
	}
}

/// Result type for fallible palette operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

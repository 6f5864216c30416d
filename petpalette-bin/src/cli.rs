//! Specifies the CLI and handles arg parsing

use clap::{Args, Parser, Subcommand, ValueEnum};
use petpalette::Config;
use std::{
    fmt::{Debug, Display},
    num::ParseFloatError,
    ops::RangeBounds,
    path::PathBuf,
    str::FromStr,
};

/// Supported output formats for the palette colors
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatOutput {
    /// sRGB hexcode
    Hex,
    /// sRGB (r,g,b) triple
    Rgb,
    /// Whitespace with true color background
    Swatch,
    /// JSON object with index-aligned colors and percentages
    Json,
}

/// Ways to colorize the output text
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorizeOutput {
    /// Foreground
    Fg,
    /// Background
    Bg,
}

/// Dominant colors and color similarity scores for pet photos.
///
/// Images are resized to a fixed sample resolution
/// and their pixels are grouped by k-means clustering in RGB space.
#[derive(Parser)]
#[command(version)]
pub struct Options {
    /// What to compute
    #[command(subcommand)]
    pub command: Command,

    /// Sampling and clustering parameters
    #[command(flatten)]
    pub clustering: ClusterOptions,

    /// The number of threads to use, or 0 to use all available cores
    #[cfg(feature = "threads")]
    #[arg(short, long, global = true, default_value_t = 0)]
    pub threads: u8,

    /// Log additional information, such as timings and the variance of each k-means attempt
    #[arg(long, global = true)]
    pub verbose: bool,
}

/// The subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Print the dominant colors of an image, most prevalent first
    Palette {
        /// The path to the input image
        image: PathBuf,

        /// The format to print the colors in
        #[arg(short, long, default_value = "hex")]
        output: FormatOutput,

        /// Color the foreground or background for each printed color
        #[arg(short, long)]
        colorize: Option<ColorizeOutput>,

        /// Also print a color name for each color and a description of the image
        #[arg(long)]
        names: bool,
    },

    /// Score how well the colors of QUERY are covered by the colors of REFERENCE
    ///
    /// The score is in [0, 1] and is not symmetric:
    /// swapping the two images can give a different result.
    Compare {
        /// The path to the query image
        query: PathBuf,

        /// The path to the reference image
        reference: PathBuf,

        /// Also print the score with the two images swapped
        #[arg(long)]
        both_ways: bool,

        /// Print the score and both palettes as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Values for [`Config`]
#[derive(Args)]
pub struct ClusterOptions {
    /// The (maximum) number of colors to find
    #[arg(short, global = true, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..))]
    pub k: u8,

    /// The width images are resized to before clustering
    #[arg(long, global = true, default_value_t = 150, value_parser = clap::value_parser!(u32).range(1..))]
    pub sample_width: u32,

    /// The height images are resized to before clustering
    #[arg(long, global = true, default_value_t = 150, value_parser = clap::value_parser!(u32).range(1..))]
    pub sample_height: u32,

    /// The number of k-means runs, keeping the one with the lowest variance
    ///
    /// k-means can get stuck in a local minimum, so running a few attempts gives more stable results.
    #[arg(short = 'n', long, global = true, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub attempts: u32,

    /// The maximum number of iterations for each k-means run
    #[arg(short = 'i', long, global = true, default_value_t = 300, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_iter: u32,

    /// The total centroid movement, in RGB units, at or below which k-means stops
    #[arg(short = 'e', long, global = true, default_value_t = 1e-4, value_parser = parse_valid_convergence)]
    pub convergence_threshold: f32,

    /// The seed value used for the random number generator
    #[arg(long, global = true, default_value_t = 0)]
    pub seed: u64,
}

impl ClusterOptions {
    /// The library configuration for these options
    pub fn config(&self) -> Config {
        Config::default()
            .with_k(self.k)
            .with_sample_size(self.sample_width, self.sample_height)
            .with_attempts(self.attempts)
            .with_max_iter(self.max_iter)
            .with_convergence_threshold(self.convergence_threshold)
            .with_seed(self.seed)
    }
}

/// Parse a float value and ensure it in the provided, valid range
fn parse_float_in_range<T>(s: &str, range: impl RangeBounds<T> + Debug) -> Result<T, String>
where
    T: FromStr<Err = ParseFloatError> + Display + PartialOrd,
{
    let value: T = s.parse().map_err(|e| format!("{e}"))?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in {range:?}"))
    }
}

/// Parse the convergence number and ensure it is >= `0.0`
fn parse_valid_convergence(s: &str) -> Result<f32, String> {
    parse_float_in_range(s, 0.0..)
}

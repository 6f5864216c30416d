//! Print the dominant colors of pet photos and score how similar the colors of two photos are.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::unreadable_literal
)]

mod cli;

#[allow(clippy::wildcard_imports)]
use cli::*;

use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use clap::Parser;
use colored::Colorize;
use image::DynamicImage;
use palette::Srgb;
use petpalette::{
    embedding::{cosine_similarity, FeatureExtractor, HistogramExtractor},
    naming::{self, ColorName},
    Config, Palette, PaletteComparison, PixelSet,
};

/// Record the running time of a function and log the elapsed time
macro_rules! time {
    ($name: literal, $func_call: expr) => {{
        let start = Instant::now();
        let result = $func_call;
        log::info!("{} took {}ms", $name, start.elapsed().as_millis());
        result
    }};
}

/// Error cases for the CLI
#[derive(Debug)]
enum AppError {
    /// Failed to read or decode an image file
    ImageLoad(PathBuf, image::ImageError),
    /// Sampling or clustering failed
    Palette(PathBuf, petpalette::Error),
    /// Failed to serialize the output
    Json(serde_json::Error),
    /// Failed to build the thread pool
    #[cfg(feature = "threads")]
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::ImageLoad(path, e) => {
                write!(f, "Failed to load the image file {}: {e}", path.display())
            }
            AppError::Palette(path, e) => {
                write!(f, "Failed to get the palette of {}: {e}", path.display())
            }
            AppError::Json(e) => write!(f, "Failed to write JSON output: {e}"),
            #[cfg(feature = "threads")]
            AppError::ThreadPool(e) => write!(f, "Failed to start the thread pool: {e}"),
        }
    }
}

fn main() -> ExitCode {
    let options = Options::parse();

    let level = if options.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = run_command(&options);

    // Returning Result<_> uses Debug printing instead of Display
    if let Err(e) = result {
        eprintln!("{e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Builds a thread pool and then runs `command`
#[cfg(feature = "threads")]
fn run_command(options: &Options) -> Result<(), AppError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(usize::from(options.threads))
        .build()
        .map_err(AppError::ThreadPool)?;

    pool.install(|| command(options))
}

/// Runs `command` on a single thread
#[cfg(not(feature = "threads"))]
fn run_command(options: &Options) -> Result<(), AppError> {
    command(options)
}

/// Run the chosen subcommand
fn command(options: &Options) -> Result<(), AppError> {
    let config = options.clustering.config();

    match &options.command {
        Command::Palette {
            image,
            output,
            colorize,
            names,
        } => {
            let pixels = sample_image(image, &config)?;
            let palette = get_palette(image, &pixels, &config)?;
            print_palette(&palette, *output, *colorize, *names)
        }
        Command::Compare {
            query,
            reference,
            both_ways,
            json,
        } => {
            let query_pixels = sample_image(query, &config)?;
            let reference_pixels = sample_image(reference, &config)?;
            let query_palette = get_palette(query, &query_pixels, &config)?;
            let reference_palette = get_palette(reference, &reference_pixels, &config)?;

            let feature_similarity = feature_similarity(
                &HistogramExtractor::default(),
                (query, &query_pixels),
                (reference, &reference_pixels),
            )?;

            let comparison =
                PaletteComparison::new(query_palette.clone(), reference_palette.clone());

            if *json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&comparison).map_err(AppError::Json)?
                );
            } else {
                println!("color similarity: {:.4}", comparison.similarity);
                if *both_ways {
                    let reverse = petpalette::color_similarity(&reference_palette, &query_palette);
                    println!("reverse color similarity: {reverse:.4}");
                }
                println!("histogram similarity: {feature_similarity:.4}");
            }

            Ok(())
        }
    }
}

/// Load the image at the given path
fn load_image(path: &Path) -> Result<DynamicImage, AppError> {
    image::open(path).map_err(|e| AppError::ImageLoad(path.to_owned(), e))
}

/// Load an image and resize it to the sample resolution
fn sample_image(path: &Path, config: &Config) -> Result<PixelSet, AppError> {
    let image = time!("Image loading", load_image(path))?;
    time!(
        "Sampling",
        PixelSet::from_image(&image, config.sample_width, config.sample_height)
    )
    .map_err(|e| AppError::Palette(path.to_owned(), e))
}

/// Cluster the sampled pixels of an image into a palette
fn get_palette(path: &Path, pixels: &PixelSet, config: &Config) -> Result<Palette, AppError> {
    time!(
        "Palette generation",
        petpalette::palette_from_pixels(pixels, config)
    )
    .map_err(|e| AppError::Palette(path.to_owned(), e))
}

/// Cosine similarity of the feature vectors of two images
fn feature_similarity(
    extractor: &impl FeatureExtractor,
    (query_path, query): (&Path, &PixelSet),
    (reference_path, reference): (&Path, &PixelSet),
) -> Result<f32, AppError> {
    let query = extractor
        .extract(query)
        .map_err(|e| AppError::Palette(query_path.to_owned(), e))?;
    let reference = extractor
        .extract(reference)
        .map_err(|e| AppError::Palette(reference_path.to_owned(), e))?;
    Ok(cosine_similarity(&query, &reference))
}

/// Format a color for the text output formats
fn format_color(color: Srgb<u8>, format: FormatOutput) -> String {
    match format {
        FormatOutput::Hex | FormatOutput::Json => format!("{color:X}"),
        FormatOutput::Rgb => format!("({},{},{})", color.red, color.green, color.blue),
        FormatOutput::Swatch => "   ".to_owned(),
    }
}

/// Apply the colorize option to formatted text
fn colorize_text(
    text: &str,
    color: Srgb<u8>,
    format: FormatOutput,
    colorize: Option<ColorizeOutput>,
) -> String {
    let (r, g, b) = color.into_components();
    match (format, colorize) {
        (FormatOutput::Swatch, _) | (_, Some(ColorizeOutput::Bg)) => {
            text.on_truecolor(r, g, b).to_string()
        }
        (_, Some(ColorizeOutput::Fg)) => text.truecolor(r, g, b).to_string(),
        (_, None) => text.to_owned(),
    }
}

/// Format one line of the palette output
fn palette_line(
    color: Srgb<u8>,
    percentage: f64,
    format: FormatOutput,
    colorize: Option<ColorizeOutput>,
    names: bool,
) -> String {
    let text = colorize_text(&format_color(color, format), color, format, colorize);
    let mut line = format!("{text} {:>5.1}%", percentage * 100.0);
    if names {
        line.push(' ');
        line.push_str(&ColorName::of(color).to_string());
    }
    line
}

/// Print the palette based off the provided options
fn print_palette(
    palette: &Palette,
    format: FormatOutput,
    colorize: Option<ColorizeOutput>,
    names: bool,
) -> Result<(), AppError> {
    if format == FormatOutput::Json {
        let profile = palette.profile();
        println!(
            "{}",
            serde_json::to_string_pretty(&profile).map_err(AppError::Json)?
        );
        return Ok(());
    }

    for entry in palette.entries() {
        println!(
            "{}",
            palette_line(entry.color, entry.percentage, format, colorize, names)
        );
    }

    if names {
        if let Some(description) = naming::describe(palette) {
            println!("{description}");
        }
    }

    Ok(())
}

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use palette::Srgb;
use petpalette::{color_profile, color_similarity, compare, Config, ErrorKind};
use std::io::Cursor;

fn png(image: RgbImage) -> Vec<u8> {
	let mut bytes = Cursor::new(Vec::new());
	DynamicImage::ImageRgb8(image)
		.write_to(&mut bytes, ImageOutputFormat::Png)
		.unwrap();
	bytes.into_inner()
}

fn solid(color: [u8; 3]) -> Vec<u8> {
	png(RgbImage::from_pixel(150, 150, Rgb(color)))
}

/// Left half one color, right half another, already at the sample resolution
fn halves(left: [u8; 3], right: [u8; 3]) -> Vec<u8> {
	png(RgbImage::from_fn(150, 150, |x, _| if x < 75 { Rgb(left) } else { Rgb(right) }))
}

/// Deterministic noisy image with three color groups of different sizes
fn noisy() -> Vec<u8> {
	png(RgbImage::from_fn(120, 90, |x, y| {
		#[allow(clippy::cast_possible_truncation)]
		let jitter = ((x * 31 + y * 17) % 23) as u8;
		if x < 60 {
			Rgb([200 + jitter, 40, 30])
		} else if y < 60 {
			Rgb([20, 30 + jitter, 180])
		} else {
			Rgb([240, 240, 230 - jitter])
		}
	}))
}

#[test]
fn pure_red_is_one_color() {
	let palette = color_profile(&solid([255, 0, 0]), &Config::default()).unwrap();

	let profile = palette.profile();
	assert_eq!(profile.colors, vec![[255, 0, 0]]);
	assert!((profile.percentages[0] - 1.0).abs() <= 1e-12);
}

#[test]
fn red_against_blue() {
	let config = Config::default();
	let comparison = compare(&solid([255, 0, 0]), &solid([0, 0, 255]), &config).unwrap();

	assert_eq!(comparison.query.colors, vec![[255, 0, 0]]);
	assert_eq!(comparison.reference.colors, vec![[0, 0, 255]]);
	assert!((comparison.similarity - 0.18350341907227397).abs() <= 1e-9);
}

#[test]
fn single_cluster_is_the_mean_color() {
	let palette = color_profile(&halves([200, 0, 0], [0, 0, 100]), &Config::default().with_k(1)).unwrap();

	assert_eq!(palette.len(), 1);
	let entry = palette.entries()[0];
	assert!((entry.percentage - 1.0).abs() <= 1e-12);
	assert_eq!(entry.color, Srgb::new(100, 0, 50));
}

#[test]
fn percentages_sum_to_one_and_descend() {
	for k in 1..=8 {
		let palette = color_profile(&noisy(), &Config::default().with_k(k)).unwrap();
		let percentages = palette.profile().percentages;

		assert!(palette.len() <= usize::from(k));
		assert!((percentages.iter().sum::<f64>() - 1.0).abs() <= 1e-6);
		assert!(percentages.windows(2).all(|w| w[0] >= w[1]));
	}
}

#[test]
fn same_input_same_palette() {
	let bytes = noisy();
	let config = Config::default().with_k(5).with_seed(1234);

	let first = color_profile(&bytes, &config).unwrap();
	for _ in 0..3 {
		assert_eq!(color_profile(&bytes, &config).unwrap(), first);
	}
}

#[test]
fn finds_the_three_color_groups() {
	let palette = color_profile(&noisy(), &Config::default()).unwrap();

	assert_eq!(palette.len(), 3);
	let reds = palette.entries().iter().filter(|e| e.color.red > 150 && e.color.blue < 100).count();
	assert_eq!(reds, 1);
	assert!((palette.entries()[0].percentage - 0.5).abs() <= 0.02);
}

#[test]
fn self_similarity_is_one() {
	let palette = color_profile(&noisy(), &Config::default()).unwrap();
	assert!((color_similarity(&palette, &palette) - 1.0).abs() <= 1e-9);
}

#[test]
fn similarity_is_asymmetric() {
	let config = Config::default().with_k(2);
	let red = color_profile(&solid([255, 0, 0]), &config).unwrap();
	let red_blue = color_profile(&halves([255, 0, 0], [0, 0, 255]), &config).unwrap();

	let covered = color_similarity(&red, &red_blue);
	let partly_covered = color_similarity(&red_blue, &red);

	assert!((covered - 1.0).abs() <= 1e-9);
	assert!(partly_covered < covered);
}

#[test]
fn errors_have_distinct_kinds() {
	let config = Config::default();
	assert_eq!(color_profile(b"", &config).unwrap_err().kind(), ErrorKind::InsufficientData);
	assert_eq!(color_profile(b"GIF89a", &config).unwrap_err().kind(), ErrorKind::Decode);
	assert_eq!(
		color_profile(&solid([1, 2, 3]), &config.clone().with_sample_size(0, 10)).unwrap_err().kind(),
		ErrorKind::InvalidConfig
	);
	assert_eq!(
		petpalette::palette_from_pixels(&petpalette::PixelSet::from_pixels(0, 0, Vec::new()).unwrap(), &config)
			.unwrap_err()
			.kind(),
		ErrorKind::InsufficientData
	);
}

#[test]
fn explicit_pixels_skip_decoding() {
	let pixels = petpalette::PixelSet::from_pixels(2, 1, vec![Srgb::new(9, 9, 9), Srgb::new(9, 9, 9)]).unwrap();
	let palette = petpalette::palette_from_pixels(&pixels, &Config::default()).unwrap();

	assert_eq!(palette.profile().colors, vec![[9, 9, 9]]);
}

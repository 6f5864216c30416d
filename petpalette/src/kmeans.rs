//! Provides the implementation for (sort) k-means over RGB colors

use crate::{Config, RgbCounts};
use palette::Srgb;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Squared Euclidean distance over the three channels
fn squared_distance(x: Srgb<f32>, y: Srgb<f32>) -> f32 {
	let dr = x.red - y.red;
	let dg = x.green - y.green;
	let db = x.blue - y.blue;
	dr * dr + dg * dg + db * db
}

/// A zeroed vector sum
const ZERO_SUM: Srgb<f64> = Srgb::new(0.0, 0.0, 0.0);

/// Bookkeeping for each k-means data point
struct PointData {
	/// Center assignment for this data point
	assignment: Vec<u8>,
	/// Squared distance to the closest chosen centroid, used to select starting centroids in k-means++
	weight: Vec<f32>,
}

impl PointData {
	/// Create a [`PointData`] with the given number data points
	fn new(n: u32) -> Self {
		let n = n as usize;
		Self {
			assignment: vec![0; n],
			weight: vec![f32::INFINITY; n],
		}
	}

	/// Reset data for the next k-means attempt
	fn reset(&mut self) {
		// the starting assignment affects the result, so each attempt must begin from the same one
		self.assignment.fill(0);
		self.weight.fill(f32::INFINITY);
	}
}

/// Data for each center/centroid
struct CenterData {
	/// The centroid point
	centroid: Vec<Srgb<f32>>,
	/// Vector sum for all data points in this center
	sum: Vec<Srgb<f64>>,
	/// Number of pixels in this center
	count: Vec<u32>,
}

impl CenterData {
	/// Create a [`CenterData`] with the given number of centers
	fn new(k: u8) -> Self {
		let k = usize::from(k);
		Self {
			centroid: Vec::with_capacity(k),
			sum: vec![ZERO_SUM; k],
			count: vec![0; k],
		}
	}

	/// Reset data for the next k-means attempt
	fn reset(&mut self) {
		self.centroid.clear();
		self.sum.fill(ZERO_SUM);
		self.count.fill(0);
	}
}

/// Holds all the state used by one k-means attempt
struct KmeansState {
	/// Data for each center
	centers: CenterData,
	/// One fourth of the squared distance between each pairs of centers
	distances: Vec<(u8, f32)>,
	/// Data for each point
	points: PointData,
}

impl KmeansState {
	/// Initialize a new [`KmeansState`] with `k` centers and `n` data points
	fn new(k: u8, n: u32) -> Self {
		Self {
			centers: CenterData::new(k),
			distances: vec![(0, 0.0); usize::from(k) * usize::from(k)],
			points: PointData::new(n),
		}
	}
}

/// One cluster of pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cluster {
	/// The mean color of the pixels in this cluster, with channels in `0.0..=255.0`
	///
	/// Computed from the exact channel sums, so flooring it gives the true integer part of the mean.
	pub centroid: Srgb<f64>,
	/// Number of pixels in this cluster
	pub count: u32,
}

/// Result from clustering the pixels of one image
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterResult {
	/// Exactly `k` clusters, some of which may be empty
	pub clusters: Vec<Cluster>,
	/// The number of pixels that were clustered
	pub total: u32,
	/// Total squared distance from each pixel to its centroid
	///
	/// A lower variance indicates a tighter fit.
	pub variance: f64,
	/// Number of elapsed iterations for the chosen attempt
	pub iterations: u32,
}

/// Choose the starting centroids using the k-means++ algorithm.
///
/// Always pushes exactly `k` centroids. Once every color coincides with a chosen centroid,
/// the remaining centroids are copies of the first one and will stay empty.
fn kmeans_plus_plus(
	k: u8,
	rng: &mut impl Rng,
	colors: &[Srgb<f32>],
	counts: &[u32],
	centroids: &mut Vec<Srgb<f32>>,
	weights: &mut [f32],
) {
	use rand::{
		distributions::{WeightedError::*, WeightedIndex},
		prelude::Distribution,
	};

	let k = usize::from(k);

	// Pick the first centroid with a probability based off the number of pixels of each color
	match WeightedIndex::new(counts) {
		Ok(sampler) => centroids.push(colors[sampler.sample(rng)]),
		Err(NoItem | InvalidWeight | AllWeightsZero | TooMany) => {
			unreachable!("counts are > 0 and colors.len() is in 1..=2.pow(24)")
		},
	}

	// Pick each next centroid with a weighted probability based off the squared distance to its closest centroid
	for i in 1..k {
		let centroid = centroids[i - 1];
		for (weight, &color) in weights.iter_mut().zip(colors) {
			*weight = f32::min(*weight, squared_distance(color, centroid));
		}

		#[allow(clippy::cast_precision_loss)]
		let weighted = weights.iter().zip(counts).map(|(&w, &n)| w * n as f32);

		match WeightedIndex::new(weighted) {
			Ok(sampler) => centroids.push(colors[sampler.sample(rng)]),
			Err(AllWeightsZero) => break, // all points exactly match a centroid
			Err(InvalidWeight | NoItem | TooMany) => {
				unreachable!("distances are >= 0 and colors.len() is in 1..=2.pow(24)")
			},
		}
	}

	let first = centroids[0];
	centroids.resize(k, first);
}

/// Initializes the center sums and counts based off the initial assignments
fn compute_initial_sums(data: &RgbCounts, centers: &mut CenterData, assignment: &[u8]) {
	for ((color, n), &center) in data.pairs().zip(assignment) {
		let i = usize::from(center);
		let nf = f64::from(n);
		let sum = &mut centers.sum[i];
		sum.red += nf * f64::from(color.red);
		sum.green += nf * f64::from(color.green);
		sum.blue += nf * f64::from(color.blue);
		centers.count[i] += n;
	}
}

/// For each pair of centers, update their distances and sort each center's row by increasing distance
// i and j are < centroids.len() <= u8::MAX
#[allow(clippy::cast_possible_truncation)]
fn update_distances(centroids: &[Srgb<f32>], distances: &mut [(u8, f32)]) {
	let k = centroids.len();
	for i in 0..k {
		let ci = centroids[i];
		distances[i * k + i] = (i as u8, 0.0);
		for j in (i + 1)..k {
			let cj = centroids[j];
			let dist = squared_distance(ci, cj) / 4.0;
			distances[j * k + i] = (i as u8, dist);
			distances[i * k + j] = (j as u8, dist);
		}
	}

	// stable, so equally distant centers stay in index order
	for row in distances.chunks_exact_mut(k) {
		row.sort_by(|(_, x), (_, y)| f32::total_cmp(x, y));
	}
}

/// For each data point, update its assigned center.
///
/// Returns the number of pixels that changed centers.
fn update_assignments(
	data: &RgbCounts,
	centers: &mut CenterData,
	distances: &[(u8, f32)],
	points: &mut PointData,
) -> u32 {
	let k = centers.centroid.len();
	let mut moved = 0;
	for ((color, n), center) in data.pairs().zip(&mut points.assignment) {
		let ci = usize::from(*center);
		let dist = squared_distance(color, centers.centroid[ci]);

		// Find the closest center
		let mut min_dist = dist;
		let mut min_center = *center;
		for &(other_center, half_dist) in &distances[(ci * k + 1)..((ci + 1) * k)] {
			if dist < half_dist {
				break;
			}

			let other_dist = squared_distance(color, centers.centroid[usize::from(other_center)]);
			// ties go to the lower index, so duplicate centroids never steal points
			#[allow(clippy::float_cmp)]
			if other_dist < min_dist || (other_dist == min_dist && other_center < min_center) {
				min_dist = other_dist;
				min_center = other_center;
			}
		}

		// Move this point to its new center
		if min_center != *center {
			let nf = f64::from(n);
			let r = nf * f64::from(color.red);
			let g = nf * f64::from(color.green);
			let b = nf * f64::from(color.blue);

			let old_sum = &mut centers.sum[ci];
			old_sum.red -= r;
			old_sum.green -= g;
			old_sum.blue -= b;
			centers.count[ci] -= n;

			let cj = usize::from(min_center);

			let new_sum = &mut centers.sum[cj];
			new_sum.red += r;
			new_sum.green += g;
			new_sum.blue += b;
			centers.count[cj] += n;

			*center = min_center;
			moved += n;
		}
	}

	moved
}

/// For each center, update its centroid using the vector sums and return the total centroid movement.
///
/// Centers with no points keep their previous centroid.
fn update_centroids(centers: &mut CenterData) -> f32 {
	let mut total_delta = 0.0;
	for ((centroid, &n), sum) in centers.centroid.iter_mut().zip(&centers.count).zip(&centers.sum) {
		if n == 0 {
			continue;
		}

		let n = f64::from(n);
		// Sums need the extra precision, but the mean can fall back down to f32
		#[allow(clippy::cast_possible_truncation)]
		let new_centroid = Srgb::new(
			(sum.red / n) as f32,
			(sum.green / n) as f32,
			(sum.blue / n) as f32,
		);

		total_delta += squared_distance(*centroid, new_centroid).sqrt();
		*centroid = new_centroid;
	}

	total_delta
}

/// The final centroid of a center in full precision, or its last working centroid if it is empty
fn mean(centroid: Srgb<f32>, sum: Srgb<f64>, count: u32) -> Srgb<f64> {
	if count == 0 {
		Srgb::new(f64::from(centroid.red), f64::from(centroid.green), f64::from(centroid.blue))
	} else {
		let n = f64::from(count);
		Srgb::new(sum.red / n, sum.green / n, sum.blue / n)
	}
}

/// Run one attempt of sort k-means
fn kmeans(
	data: &RgbCounts,
	KmeansState { centers, distances, points }: &mut KmeansState,
	k: u8,
	max_iter: u32,
	convergence: f32,
	seed: u64,
) -> ClusterResult {
	let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
	kmeans_plus_plus(
		k,
		&mut rng,
		&data.colors,
		&data.counts,
		&mut centers.centroid,
		&mut points.weight,
	);
	compute_initial_sums(data, centers, &points.assignment);

	let mut iterations = 0;
	let mut total_delta = f32::INFINITY;
	while iterations < max_iter && total_delta > convergence {
		update_distances(&centers.centroid, distances);
		let moved = update_assignments(data, centers, distances, points);
		total_delta = update_centroids(centers);
		iterations += 1;

		log::trace!("iteration {iterations}: {moved} pixels moved, centroids moved {total_delta}");
	}

	let variance = data
		.pairs()
		.zip(&points.assignment)
		.map(|((color, n), &center)| {
			f64::from(n) * f64::from(squared_distance(color, centers.centroid[usize::from(center)]))
		})
		.sum();

	let clusters = centers
		.centroid
		.iter()
		.zip(&centers.count)
		.zip(&centers.sum)
		.map(|((&centroid, &count), &sum)| Cluster { centroid: mean(centroid, sum, count), count })
		.collect();

	centers.reset();
	points.reset();

	ClusterResult {
		clusters,
		total: data.total,
		variance,
		iterations,
	}
}

/// Run one attempt, logging its outcome
fn attempt(data: &RgbCounts, state: &mut KmeansState, config: &Config, i: u32) -> ClusterResult {
	let seed = config.seed ^ u64::from(i);
	let result = kmeans(data, state, config.k, config.max_iter, config.convergence_threshold, seed);
	log::debug!(
		"k-means attempt {i} (seed {seed}) took {} iterations with variance {}",
		result.iterations,
		result.variance
	);
	result
}

/// Take the attempt with the lowest variance, preferring the earliest attempt on ties
fn best(first: ClusterResult, rest: impl IntoIterator<Item = ClusterResult>) -> ClusterResult {
	rest.into_iter()
		.fold(first, |best, result| if result.variance < best.variance { result } else { best })
}

/// Run multiple attempts of k-means, taking the attempt with the lowest variance
#[cfg(not(feature = "threads"))]
fn run_attempts(data: &RgbCounts, config: &Config) -> ClusterResult {
	let mut state = KmeansState::new(config.k, data.num_colors());
	let first = attempt(data, &mut state, config, 0);
	best(first, (1..config.attempts).map(|i| attempt(data, &mut state, config, i)))
}

/// Run multiple attempts of k-means in parallel, taking the attempt with the lowest variance
#[cfg(feature = "threads")]
fn run_attempts(data: &RgbCounts, config: &Config) -> ClusterResult {
	use rayon::prelude::*;

	// collected in attempt order so that ties resolve the same way as the sequential version
	let (first, rest) = rayon::join(
		|| attempt(data, &mut KmeansState::new(config.k, data.num_colors()), config, 0),
		|| {
			(1..config.attempts)
				.into_par_iter()
				.map_init(
					|| KmeansState::new(config.k, data.num_colors()),
					|state, i| attempt(data, state, config, i),
				)
				.collect::<Vec<_>>()
		},
	);

	best(first, rest)
}

/// Run multiple attempts of k-means, taking the attempt with the lowest variance.
///
/// `config` must be validated: at least one attempt is always run, and `k` must be at least 1.
pub fn run(data: &RgbCounts, config: &Config) -> ClusterResult {
	debug_assert!(config.k > 0 && config.attempts > 0, "unvalidated config");
	run_attempts(data, config)
}

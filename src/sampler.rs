//! Monte Carlo point sampler.
//!
//! Draws points uniformly from the square [-1, 1]² and counts how many land
//! in the inscribed unit circle. The ratio of areas (π / 4) is what the
//! estimator recovers.

use serde::{Deserialize, Serialize};

use crate::engine::rng::PiRng;
use crate::error::{PiError, PiResult};

/// Smallest point count a run accepts.
pub const MIN_POINTS: u64 = 1;

/// Largest point count a run accepts.
pub const MAX_POINTS: u64 = 10_000;

/// A sampled point in the square [-1, 1]².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether the point lies in the closed unit disc.
    #[must_use]
    pub fn is_inside(&self) -> bool {
        self.x * self.x + self.y * self.y <= 1.0
    }
}

/// The points drawn for one run together with their inside count.
///
/// Only built by [`Sampler::run`] or [`SampleBatch::from_points`], so the
/// count always agrees with the points. Serializes but does not deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleBatch {
    points: Vec<Point>,
    inside_count: u64,
}

impl SampleBatch {
    /// Build a batch from explicit points, classifying each one.
    #[must_use]
    pub fn from_points(points: Vec<Point>) -> Self {
        let inside_count = points.iter().filter(|p| p.is_inside()).count() as u64;
        Self {
            points,
            inside_count,
        }
    }

    /// Sampled points, in draw order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of points inside the unit circle.
    #[must_use]
    pub const fn inside_count(&self) -> u64 {
        self.inside_count
    }

    /// Number of points outside the unit circle.
    #[must_use]
    pub fn outside_count(&self) -> u64 {
        self.len() as u64 - self.inside_count
    }

    /// Number of points in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the batch holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Reject point counts outside `[MIN_POINTS, MAX_POINTS]`.
///
/// # Errors
///
/// Returns `InvalidArgument` when `n` is out of range.
pub fn validate_point_count(n: u64) -> PiResult<u64> {
    if (MIN_POINTS..=MAX_POINTS).contains(&n) {
        Ok(n)
    } else {
        Err(PiError::invalid_argument(
            "n",
            n,
            format!("point count must be in [{MIN_POINTS}, {MAX_POINTS}]"),
        ))
    }
}

/// Sampler bound to a validated point count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampler {
    n_points: u64,
}

impl Sampler {
    /// Create a sampler for `n_points` points.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `n_points` is outside `[1, 10000]`.
    pub fn new(n_points: u64) -> PiResult<Self> {
        Ok(Self {
            n_points: validate_point_count(n_points)?,
        })
    }

    /// Point count this sampler draws.
    #[must_use]
    pub const fn n_points(&self) -> u64 {
        self.n_points
    }

    /// Draw the batch. x is drawn before y for every point.
    pub fn run(&self, rng: &mut PiRng) -> SampleBatch {
        let mut points = Vec::with_capacity(self.n_points as usize);
        let mut inside_count = 0;

        for _ in 0..self.n_points {
            let x = rng.gen_range_f64(-1.0, 1.0);
            let y = rng.gen_range_f64(-1.0, 1.0);
            let point = Point::new(x, y);
            if point.is_inside() {
                inside_count += 1;
            }
            points.push(point);
        }

        SampleBatch {
            points,
            inside_count,
        }
    }
}

/// Validate `n` and draw a batch of that size.
///
/// # Errors
///
/// Returns `InvalidArgument` if `n` is outside `[1, 10000]`; nothing is
/// drawn from `rng` in that case.
pub fn sample(n: u64, rng: &mut PiRng) -> PiResult<SampleBatch> {
    Ok(Sampler::new(n)?.run(rng))
}

//! Chart-ready series built from the convergence ledger.
//!
//! Rendering belongs to whatever host displays the charts. This module only
//! shapes the data for the four plots a host shows:
//! - Sample scatter: the run's points, tagged inside/outside
//! - Raw convergence: point count vs estimate
//! - Trial-ordered convergence: trial index vs estimate, colored by point
//!   count or by error
//! - Error decay: point count vs percent error
//!
//! A logarithmic axis cannot place values ≤ 0, so such points are dropped
//! from that series.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PiError, PiResult};
use crate::estimate::PI_TRUE;
use crate::ledger::ConvergenceLedger;
use crate::sampler::{SampleBatch, MAX_POINTS, MIN_POINTS};

/// Padding added on both sides of a user-selected y-range.
pub const Y_RANGE_PADDING: f64 = 0.25;

/// Axis scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisScale {
    /// Linear axis.
    #[default]
    Linear,
    /// Base-10 logarithmic axis.
    Log,
}

impl AxisScale {
    /// Map a "log axis" checkbox to a scale.
    #[must_use]
    pub const fn from_log_flag(log: bool) -> Self {
        if log {
            Self::Log
        } else {
            Self::Linear
        }
    }

    /// Whether `value` can be placed on this axis.
    #[must_use]
    pub fn accepts(self, value: f64) -> bool {
        match self {
            Self::Linear => value.is_finite(),
            Self::Log => value.is_finite() && value > 0.0,
        }
    }
}

/// Which column colors the trial-ordered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorBy {
    /// Color by `N_points`.
    #[default]
    PointCount,
    /// Color by percent error.
    Error,
}

impl ColorBy {
    /// Legend label for the color scale.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PointCount => "# of Points",
            Self::Error => "% Error",
        }
    }
}

impl fmt::Display for ColorBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PointCount => write!(f, "n"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl FromStr for ColorBy {
    type Err = PiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "n" | "points" | "n_points" => Ok(Self::PointCount),
            "error" | "err" => Ok(Self::Error),
            other => Err(PiError::invalid_argument(
                "color",
                other,
                "expected 'n' or 'error'",
            )),
        }
    }
}

/// User-selected y-axis window for the trial-ordered view.
///
/// Deserialization goes through [`YRange::new`], so stored options obey the
/// same bounds as CLI input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawYRange")]
pub struct YRange {
    low: f64,
    high: f64,
}

#[derive(Deserialize)]
struct RawYRange {
    low: f64,
    high: f64,
}

impl TryFrom<RawYRange> for YRange {
    type Error = PiError;

    fn try_from(raw: RawYRange) -> PiResult<Self> {
        Self::new(raw.low, raw.high)
    }
}

impl Default for YRange {
    fn default() -> Self {
        Self {
            low: 0.0,
            high: 4.0,
        }
    }
}

impl YRange {
    /// Create a window inside [0, 4].
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the bounds are outside [0, 4] or
    /// inverted.
    pub fn new(low: f64, high: f64) -> PiResult<Self> {
        let valid = |v: f64| (0.0..=4.0).contains(&v);
        if !valid(low) || !valid(high) {
            return Err(PiError::invalid_argument(
                "range",
                format!("{low}..{high}"),
                "bounds must lie in [0, 4]",
            ));
        }
        if low > high {
            return Err(PiError::invalid_argument(
                "range",
                format!("{low}..{high}"),
                "low bound exceeds high bound",
            ));
        }
        Ok(Self { low, high })
    }

    /// Axis limits with padding applied.
    #[must_use]
    pub fn padded(&self) -> (f64, f64) {
        (self.low - Y_RANGE_PADDING, self.high + Y_RANGE_PADDING)
    }
}

/// One plotted point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewPoint {
    /// Horizontal value.
    pub x: f64,
    /// Vertical value.
    pub y: f64,
    /// Color scale value, if the series is colored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<f64>,
}

/// Horizontal reference line, drawn at π.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    /// Left end.
    pub x0: f64,
    /// Right end.
    pub x1: f64,
    /// Height.
    pub y: f64,
}

/// A single chart's data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Chart title.
    pub title: String,
    /// X axis label.
    pub x_label: String,
    /// Y axis label.
    pub y_label: String,
    /// Color legend label, if colored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_label: Option<String>,
    /// X axis scaling.
    pub x_scale: AxisScale,
    /// Y axis scaling.
    pub y_scale: AxisScale,
    /// Fixed y-axis limits, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_limits: Option<(f64, f64)>,
    /// Reference line, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceLine>,
    /// Plotted points.
    pub points: Vec<ViewPoint>,
}

impl ChartSeries {
    fn new(
        title: &str,
        x_label: &str,
        y_label: &str,
        x_scale: AxisScale,
        y_scale: AxisScale,
    ) -> Self {
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            color_label: None,
            x_scale,
            y_scale,
            y_limits: None,
            reference: None,
            points: Vec::new(),
        }
    }

    fn push(&mut self, x: f64, y: f64, color: Option<f64>) {
        if self.x_scale.accepts(x) && self.y_scale.accepts(y) {
            self.points.push(ViewPoint { x, y, color });
        }
    }

    /// Number of plotted points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether nothing is plotted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Display options supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewOptions {
    /// Log x axis on the raw convergence chart.
    pub raw_log_x: bool,
    /// Coloring of the trial-ordered chart.
    pub trial_color: ColorBy,
    /// Y window of the trial-ordered chart.
    pub trial_range: YRange,
    /// Log x axis on the error chart.
    pub error_log_x: bool,
    /// Log y axis on the error chart.
    pub error_log_y: bool,
}

/// Scatter of one run's points; color is 1.0 inside, 0.0 outside.
#[must_use]
pub fn sample_scatter(batch: &SampleBatch) -> ChartSeries {
    let mut series = ChartSeries::new(
        "Sampled Points",
        "x",
        "y",
        AxisScale::Linear,
        AxisScale::Linear,
    );
    series.color_label = Some("inside".to_string());
    series.y_limits = Some((-1.0, 1.0));
    for p in batch.points() {
        series.push(p.x, p.y, Some(if p.is_inside() { 1.0 } else { 0.0 }));
    }
    series
}

/// Point count vs estimate.
#[must_use]
pub fn raw_convergence(ledger: &ConvergenceLedger, log_x: bool) -> ChartSeries {
    let mut series = ChartSeries::new(
        "Impact of Point Count on π Estimation",
        "Number of Points Used in Estimation",
        "Calculated Pi values",
        AxisScale::from_log_flag(log_x),
        AxisScale::Linear,
    );
    series.reference = Some(ReferenceLine {
        x0: MIN_POINTS as f64,
        x1: MAX_POINTS as f64,
        y: PI_TRUE,
    });
    for r in ledger.records() {
        series.push(r.n_points as f64, r.pi_estimate, None);
    }
    series
}

/// Trial index vs estimate, colored per `color`, windowed to `range`.
#[must_use]
pub fn trial_convergence(
    ledger: &ConvergenceLedger,
    color: ColorBy,
    range: YRange,
) -> ChartSeries {
    let mut series = ChartSeries::new(
        "Tracking Progress of π Estimates",
        "Trial Number",
        "Calculated Pi values",
        AxisScale::Linear,
        AxisScale::Linear,
    );
    series.color_label = Some(color.label().to_string());
    series.y_limits = Some(range.padded());
    series.reference = Some(ReferenceLine {
        x0: 0.0,
        x1: ledger.len() as f64,
        y: PI_TRUE,
    });
    for (trial, r) in ledger.records().iter().enumerate() {
        let c = match color {
            ColorBy::PointCount => r.n_points as f64,
            ColorBy::Error => r.error_percent,
        };
        series.push(trial as f64, r.pi_estimate, Some(c));
    }
    series
}

/// Point count vs percent error, colored by point count.
#[must_use]
pub fn error_decay(ledger: &ConvergenceLedger, log_x: bool, log_y: bool) -> ChartSeries {
    let mut series = ChartSeries::new(
        "% Error Across Iterations",
        "Number of Points Used in Estimation",
        "% Error",
        AxisScale::from_log_flag(log_x),
        AxisScale::from_log_flag(log_y),
    );
    series.color_label = Some(ColorBy::PointCount.label().to_string());
    for r in ledger.records() {
        let n = r.n_points as f64;
        series.push(n, r.error_percent, Some(n));
    }
    series
}

/// The three ledger charts together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceViews {
    /// Point count vs estimate.
    pub raw: ChartSeries,
    /// Trial index vs estimate.
    pub trials: ChartSeries,
    /// Point count vs percent error.
    pub errors: ChartSeries,
}

impl ConvergenceViews {
    /// Build all three charts from `ledger`.
    #[must_use]
    pub fn build(ledger: &ConvergenceLedger, options: &ViewOptions) -> Self {
        Self {
            raw: raw_convergence(ledger, options.raw_log_x),
            trials: trial_convergence(ledger, options.trial_color, options.trial_range),
            errors: error_decay(ledger, options.error_log_x, options.error_log_y),
        }
    }

    /// Pretty JSON for hosts that render in another process.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if encoding fails.
    pub fn to_json(&self) -> PiResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PiError::serialization(format!("JSON serialization failed: {e}")))
    }
}

//! Performance scoring and trend classification.
//!
//! Everything in this module is a pure function over the caller's data.
//! The numeric policy is deliberately lenient: a field that does not
//! parse as a number scores as 0 so that partially filled or legacy
//! records still produce a total. Validation of ranges (GPA in [0,4],
//! attendance in [0,100]) belongs to the registration form, not here.

/// Rolling history keeps the 5 most recent samples.
pub const HISTORY_WINDOW: usize = 5;
/// Trend looks at the last 3 samples.
pub const TREND_WINDOW: usize = 3;

/// Score deltas at or below this are treated as "no change" when
/// appending to the history, so repeated saves with identical inputs
/// do not pile up duplicate samples.
const SAMPLE_EPSILON: f64 = 0.001;
/// First-vs-last delta beyond which the trend reads as up/down.
const TREND_EPSILON: f64 = 0.05;
/// Population variance at or below this reads as consistent.
const VARIANCE_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consistency {
    High,
    Low,
}

impl Consistency {
    pub fn as_str(self) -> &'static str {
        match self {
            Consistency::High => "high",
            Consistency::Low => "low",
        }
    }
}

/// 2-decimal rounding used for every stored score.
pub fn round_off_2_decimals(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Coerce a JSON field to f64: numbers pass through, numeric strings
/// parse, everything else (null, missing, garbage) degrades to 0.
pub fn lenient_f64(v: Option<&serde_json::Value>) -> f64 {
    let Some(v) = v else {
        return 0.0;
    };
    if let Some(n) = v.as_f64() {
        return n;
    }
    v.as_str()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Weighted composite: GPA on a 10-point scale at 50%, attendance at
/// 30%, assignment score at 20%.
pub fn compute_score(gpa: f64, attendance: f64, assignment_score: f64) -> f64 {
    round_off_2_decimals(gpa * 10.0 * 0.5 + attendance * 0.3 + assignment_score * 0.2)
}

/// Append a sample to a rolling history, keeping the trailing
/// [`HISTORY_WINDOW`]. A delta within [`SAMPLE_EPSILON`] of the last
/// sample is a no-op append; the result is still clamped to the window.
pub fn append_sample(history: &[f64], score: f64) -> Vec<f64> {
    if history.is_empty() {
        return vec![score];
    }
    let last = history[history.len() - 1];
    let mut out: Vec<f64> = history.to_vec();
    if (score - last).abs() > SAMPLE_EPSILON {
        out.push(score);
    }
    if out.len() > HISTORY_WINDOW {
        out.drain(..out.len() - HISTORY_WINDOW);
    }
    out
}

/// Direction of the last [`TREND_WINDOW`] samples. Fewer than 2 samples
/// reads as stable.
pub fn classify_trend(history: &[f64]) -> Trend {
    let window = trailing(history, TREND_WINDOW);
    if window.len() < 2 {
        return Trend::Stable;
    }
    let delta = window[window.len() - 1] - window[0];
    if delta > TREND_EPSILON {
        Trend::Up
    } else if delta < -TREND_EPSILON {
        Trend::Down
    } else {
        Trend::Stable
    }
}

/// Stability of the last [`HISTORY_WINDOW`] samples by population
/// variance. Fewer than 2 samples reads as high.
pub fn classify_consistency(history: &[f64]) -> Consistency {
    let window = trailing(history, HISTORY_WINDOW);
    if window.len() < 2 {
        return Consistency::High;
    }
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    if variance <= VARIANCE_THRESHOLD {
        Consistency::High
    } else {
        Consistency::Low
    }
}

/// Human-readable trend line. Lives next to the thresholds it narrates.
pub fn describe_trend(trend: Trend, sample_count: usize) -> String {
    match trend {
        Trend::Up => format!(
            "Improving across the last {} updates.",
            sample_count.min(TREND_WINDOW)
        ),
        Trend::Down => "Recent scores show a decline worth a closer look.".to_string(),
        Trend::Stable => "Performance is holding steady.".to_string(),
    }
}

fn trailing(history: &[f64], window: usize) -> &[f64] {
    if history.len() > window {
        &history[history.len() - window..]
    } else {
        history
    }
}

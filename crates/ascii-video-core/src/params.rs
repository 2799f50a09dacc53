//! Per-request stream parameters and their clamping rules.
//!
//! Malformed values never produce an error: they fall back to the defaults and
//! everything is clamped into range, so a terminal user always gets a stream.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Smallest allowed frame interval in seconds.
pub const MIN_INTERVAL: f64 = 0.01;
/// Largest allowed frame interval in seconds.
pub const MAX_INTERVAL: f64 = 10.0;
/// Interval used when none (or garbage) is supplied.
pub const DEFAULT_INTERVAL: f64 = 0.1;

/// Smallest allowed stride.
pub const MIN_STRIDE: usize = 1;
/// Largest allowed stride.
pub const MAX_STRIDE: usize = 100;
/// Stride used when none (or garbage) is supplied.
pub const DEFAULT_STRIDE: usize = 1;

/// Clamp an interval into `[MIN_INTERVAL, MAX_INTERVAL]`. NaN maps to the default.
pub fn clamp_interval(seconds: f64) -> f64 {
    if seconds.is_nan() {
        return DEFAULT_INTERVAL;
    }
    seconds.clamp(MIN_INTERVAL, MAX_INTERVAL)
}

/// Parse a decimal interval, falling back to `default` on malformed input.
pub fn parse_interval(raw: Option<&str>, default: f64) -> f64 {
    let parsed = raw
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| !v.is_nan())
        .unwrap_or(default);
    clamp_interval(parsed)
}

/// Sampling step over an animation's frames, always within `[MIN_STRIDE, MAX_STRIDE]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "usize")]
pub struct Stride(usize);

impl Stride {
    /// Create a stride, clamping into range.
    pub fn new(value: i64) -> Self {
        Self(value.clamp(MIN_STRIDE as i64, MAX_STRIDE as i64) as usize)
    }

    /// Parse an integer stride, falling back to `default` on malformed input.
    ///
    /// Integers too large for `i64` still saturate by sign rather than being
    /// treated as garbage.
    pub fn parse(raw: Option<&str>, default: Stride) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return default;
        };
        match raw.parse::<i64>() {
            Ok(v) => Self::new(v),
            Err(_) => {
                let digits = raw.strip_prefix(&['+', '-'][..]).unwrap_or(raw);
                if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                    if raw.starts_with('-') {
                        Self::new(i64::MIN)
                    } else {
                        Self::new(i64::MAX)
                    }
                } else {
                    default
                }
            }
        }
    }

    /// The step as an index increment.
    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for Stride {
    fn default() -> Self {
        Self(DEFAULT_STRIDE)
    }
}

impl From<i64> for Stride {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<Stride> for usize {
    fn from(stride: Stride) -> Self {
        stride.0
    }
}

impl std::fmt::Display for Stride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated timing parameters for one stream session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamParams {
    interval: f64,
    stride: Stride,
}

impl Default for StreamParams {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            stride: Stride::default(),
        }
    }
}

impl StreamParams {
    /// Create parameters, clamping both values into range.
    pub fn new(interval: f64, stride: i64) -> Self {
        Self {
            interval: clamp_interval(interval),
            stride: Stride::new(stride),
        }
    }

    /// Build parameters from raw query values, using `defaults` for anything
    /// missing or malformed.
    pub fn from_query(
        interval: Option<&str>,
        stride: Option<&str>,
        defaults: &StreamParams,
    ) -> Self {
        Self {
            interval: parse_interval(interval, defaults.interval),
            stride: Stride::parse(stride, defaults.stride),
        }
    }

    /// Interval between frames in seconds.
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Interval between frames as a `Duration`.
    pub fn interval_duration(&self) -> Duration {
        Duration::from_secs_f64(self.interval)
    }

    /// Frame sampling stride.
    pub fn stride(&self) -> Stride {
        self.stride
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_interval_bounds() {
        assert_eq!(clamp_interval(50.0), 10.0);
        assert_eq!(clamp_interval(-1.0), 0.01);
        assert_eq!(clamp_interval(0.25), 0.25);
        assert_eq!(clamp_interval(f64::INFINITY), 10.0);
        assert_eq!(clamp_interval(f64::NEG_INFINITY), 0.01);
        assert_eq!(clamp_interval(f64::NAN), DEFAULT_INTERVAL);
    }

    #[test]
    fn test_parse_interval_defaults_on_garbage() {
        assert_eq!(parse_interval(Some("abc"), DEFAULT_INTERVAL), 0.1);
        assert_eq!(parse_interval(Some(""), DEFAULT_INTERVAL), 0.1);
        assert_eq!(parse_interval(None, DEFAULT_INTERVAL), 0.1);
        assert_eq!(parse_interval(Some("nan"), DEFAULT_INTERVAL), 0.1);
    }

    #[test]
    fn test_parse_interval_clamps() {
        assert_eq!(parse_interval(Some("50"), DEFAULT_INTERVAL), 10.0);
        assert_eq!(parse_interval(Some("-1"), DEFAULT_INTERVAL), 0.01);
        assert_eq!(parse_interval(Some(" 0.2 "), DEFAULT_INTERVAL), 0.2);
    }

    #[test]
    fn test_stride_clamps() {
        assert_eq!(Stride::new(0).get(), 1);
        assert_eq!(Stride::new(500).get(), 100);
        assert_eq!(Stride::new(-3).get(), 1);
        assert_eq!(Stride::new(7).get(), 7);
    }

    #[test]
    fn test_stride_parse() {
        let d = Stride::default();
        assert_eq!(Stride::parse(Some("2"), d).get(), 2);
        assert_eq!(Stride::parse(Some("abc"), d).get(), 1);
        assert_eq!(Stride::parse(Some("2.5"), d).get(), 1);
        assert_eq!(Stride::parse(None, Stride::new(4)).get(), 4);
        assert_eq!(Stride::parse(Some("99999999999999999999999"), d).get(), 100);
        assert_eq!(Stride::parse(Some("-99999999999999999999999"), d).get(), 1);
    }

    #[test]
    fn test_stride_serde_clamps() {
        let stride: Stride = serde_json::from_str("1000").unwrap();
        assert_eq!(stride.get(), 100);
        assert_eq!(serde_json::to_string(&Stride::new(3)).unwrap(), "3");
    }

    #[test]
    fn test_stream_params_from_query() {
        let defaults = StreamParams::default();
        let params = StreamParams::from_query(Some("0.2"), Some("2"), &defaults);
        assert_eq!(params.interval(), 0.2);
        assert_eq!(params.stride().get(), 2);

        let params = StreamParams::from_query(Some("oops"), Some("oops"), &defaults);
        assert_eq!(params.interval(), 0.1);
        assert_eq!(params.stride().get(), 1);
    }

    #[test]
    fn test_interval_duration() {
        let params = StreamParams::new(0.5, 1);
        assert_eq!(params.interval_duration(), Duration::from_millis(500));
    }
}

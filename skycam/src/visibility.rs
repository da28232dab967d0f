//! Magnitude-dependent visibility classification
//!
//! Two lines in `(magnitude, log10 response)` space bracket the transition:
//! at or above the upper line a star counts as fully visible, at or below the
//! lower line as invisible, and in between visibility rises linearly.

use serde::{Deserialize, Serialize};

/// `log10(response) = slope · m + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct VisibilityLine {
    pub slope: f64,
    pub intercept: f64,
}

impl VisibilityLine {
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    pub fn at(&self, magnitude: f64) -> f64 {
        self.slope * magnitude + self.intercept
    }
}

impl From<[f64; 2]> for VisibilityLine {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<VisibilityLine> for [f64; 2] {
    fn from(line: VisibilityLine) -> Self {
        [line.slope, line.intercept]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityModel {
    pub upper: VisibilityLine,
    pub lower: VisibilityLine,
}

impl VisibilityModel {
    /// Visibility in `[0, 1]` of a star of magnitude `vmag` with corrected
    /// response `response`.
    ///
    /// Magnitudes where the upper line is not above the lower one, and
    /// non-finite inputs, give 0.
    pub fn visibility(&self, response: f64, vmag: f64) -> f64 {
        let upper = self.upper.at(vmag);
        let lower = self.lower.at(vmag);
        if upper.is_nan() || lower.is_nan() || upper <= lower {
            return 0.0;
        }
        let v = ((response.log10() - lower) / (upper - lower)).clamp(0.0, 1.0);
        if v.is_finite() {
            v
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> VisibilityModel {
        VisibilityModel {
            upper: VisibilityLine::new(-0.4, -1.0),
            lower: VisibilityLine::new(-0.3, -3.0),
        }
    }

    #[test]
    fn test_limits() {
        let m = model();
        // vmag 2: upper −1.8, lower −3.6
        assert_eq!(m.visibility(10f64.powf(-1.0), 2.0), 1.0);
        assert_eq!(m.visibility(10f64.powf(-4.0), 2.0), 0.0);
        let mid = m.visibility(10f64.powf(-2.7), 2.0);
        assert!((mid - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_monotone_in_response() {
        let m = model();
        let mut last = 0.0;
        for exp in [-5.0, -4.0, -3.5, -3.0, -2.5, -2.0, -1.5, -1.0, 0.0] {
            let v = m.visibility(10f64.powf(exp), 3.0);
            assert!((0.0..=1.0).contains(&v));
            assert!(v >= last);
            last = v;
        }
    }

    #[test]
    fn test_crossed_lines_give_zero() {
        let m = model();
        // Lines cross at m = 20; beyond it upper < lower
        assert_eq!(m.visibility(1.0, 25.0), 0.0);
        assert_eq!(m.visibility(1.0, 20.0), 0.0);
    }

    #[test]
    fn test_non_finite_inputs() {
        let m = model();
        assert_eq!(m.visibility(f64::NAN, 2.0), 0.0);
        assert_eq!(m.visibility(0.0, 2.0), 0.0);
        assert_eq!(m.visibility(-1.0, 2.0), 0.0);
        assert_eq!(m.visibility(1.0, f64::NAN), 0.0);
    }

    #[test]
    fn test_line_from_pair() {
        let line: VisibilityLine = serde_json::from_str("[-0.4, -1.0]").unwrap();
        assert_eq!(line, VisibilityLine::new(-0.4, -1.0));
    }
}

//! Monotonic scales from a domain onto an output range.
//!
//! A [`Scale`] is used to fill plain tables (index domain `[0, n - 1]` onto the channel's
//! range) and to map table indices into a field's domain before an expression runs.
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Two-element interval `[lo, hi]`. The order is significant; `lo > hi` reverses a scale.
pub type Extent = [f64; 2];

/// Shape of the domain-to-range mapping.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Transform {
    #[default]
    Linear,
    Sqrt,
    Log,
}

impl Transform {
    pub fn as_str(self) -> &'static str {
        match self {
            Transform::Linear => "linear",
            Transform::Sqrt => "sqrt",
            Transform::Log => "log",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear" => Ok(Transform::Linear),
            "sqrt" => Ok(Transform::Sqrt),
            "log" => Ok(Transform::Log),
            other => Err(Error::InvalidConfig(format!(
                "unknown transform '{other}', expected linear, sqrt or log"
            ))),
        }
    }
}

/// A sampling function from `domain` onto `range`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale {
    pub transform: Transform,
    pub domain: Extent,
    pub range: Extent,
}

impl Scale {
    pub fn new(transform: Transform, domain: Extent, range: Extent) -> Self {
        Self {
            transform,
            domain,
            range,
        }
    }

    pub fn linear(domain: Extent, range: Extent) -> Self {
        Self::new(Transform::Linear, domain, range)
    }

    /// Scale over the index space `[0, size - 1]` of a table.
    pub fn index(transform: Transform, size: usize, range: Extent) -> Self {
        Self::new(transform, [0.0, size.saturating_sub(1) as f64], range)
    }

    /// Map `x` from the domain onto the range. Values outside the domain extrapolate.
    pub fn apply(&self, x: f64) -> f64 {
        let [r0, r1] = self.range;
        r0 + self.normalize(x) * (r1 - r0)
    }

    /// Sample the scale at `0, 1, ..., n - 1`.
    pub fn sample(&self, n: usize) -> Vec<f64> {
        (0..n).map(|i| self.apply(i as f64)).collect()
    }

    /// Position of `x` within the domain, in transformed space.
    fn normalize(&self, x: f64) -> f64 {
        let [d0, d1] = self.domain;
        match self.transform {
            Transform::Linear => ratio(x, d0, d1),
            Transform::Sqrt => ratio(signed_sqrt(x), signed_sqrt(d0), signed_sqrt(d1)),
            Transform::Log => {
                if (d0 > 0.0 && d1 > 0.0) || (d0 < 0.0 && d1 < 0.0) {
                    ratio(signed_ln(x), signed_ln(d0), signed_ln(d1))
                } else {
                    // Domain touches zero: shift so the lower bound sits at 1.
                    let lo = d0.min(d1);
                    ratio((1.0 + x - lo).ln(), (1.0 + d0 - lo).ln(), (1.0 + d1 - lo).ln())
                }
            }
        }
    }
}

#[inline]
fn ratio(x: f64, a: f64, b: f64) -> f64 {
    let span = b - a;
    if span == 0.0 {
        0.5
    } else {
        (x - a) / span
    }
}

#[inline]
fn signed_sqrt(x: f64) -> f64 {
    x.signum() * x.abs().sqrt()
}

#[inline]
fn signed_ln(x: f64) -> f64 {
    if x < 0.0 {
        -(-x).ln()
    } else {
        x.ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    fn non_decreasing(values: &[f64]) -> bool {
        values.windows(2).all(|w| w[0] <= w[1])
    }

    #[test]
    fn linear_maps_endpoints_and_midpoint() {
        let s = Scale::linear([0.0, 10.0], [1.0, 3.0]);
        approx_eq(s.apply(0.0), 1.0);
        approx_eq(s.apply(5.0), 2.0);
        approx_eq(s.apply(10.0), 3.0);
        approx_eq(s.apply(20.0), 5.0);
    }

    #[test]
    fn index_scale_samples_table_positions() {
        let s = Scale::index(Transform::Linear, 4, [1.0, 10.0]);
        let v = s.sample(4);
        for (got, want) in v.iter().zip([1.0, 4.0, 7.0, 10.0]) {
            approx_eq(*got, want);
        }
    }

    #[test]
    fn sqrt_interpolates_in_root_space() {
        let s = Scale::new(Transform::Sqrt, [0.0, 100.0], [0.0, 10.0]);
        approx_eq(s.apply(25.0), 5.0);
        approx_eq(s.apply(100.0), 10.0);
    }

    #[test]
    fn log_on_positive_domain_is_standard() {
        let s = Scale::new(Transform::Log, [1.0, 100.0], [0.0, 2.0]);
        approx_eq(s.apply(10.0), 1.0);
        approx_eq(s.apply(1.0), 0.0);
    }

    #[test]
    fn log_on_index_domain_is_finite_and_monotonic() {
        let s = Scale::index(Transform::Log, 1024, [0.5, 5.0]);
        let v = s.sample(1024);
        assert!(v.iter().all(|x| x.is_finite()));
        approx_eq(v[0], 0.5);
        approx_eq(v[1023], 5.0);
        assert!(non_decreasing(&v));
    }

    #[test]
    fn every_transform_is_monotonic_over_the_index_domain() {
        for t in [Transform::Linear, Transform::Sqrt, Transform::Log] {
            let v = Scale::index(t, 256, [-2.0, 7.0]).sample(256);
            assert!(non_decreasing(&v), "{t} is not monotonic");
        }
    }

    #[test]
    fn degenerate_domain_maps_to_range_midpoint() {
        let s = Scale::linear([3.0, 3.0], [0.0, 8.0]);
        approx_eq(s.apply(3.0), 4.0);
        approx_eq(s.apply(-100.0), 4.0);
    }

    #[test]
    fn transform_parses_and_displays() {
        for t in [Transform::Linear, Transform::Sqrt, Transform::Log] {
            assert_eq!(t.to_string().parse::<Transform>().unwrap(), t);
        }
        assert!("cubic".parse::<Transform>().is_err());
    }
}

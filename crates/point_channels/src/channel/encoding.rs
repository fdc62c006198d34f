//! Encoding descriptions accepted by [`crate::channel::Channel::update`].
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::scale::{Extent, Transform};

/// Output side of a channel.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Clone, Debug, PartialEq)]
pub enum RangeSpec {
    /// Numeric `[lo, hi]` output interval.
    Extent(Extent),
    /// Name of a registered palette (colour channels).
    Palette(String),
    /// Raw RGBA8 table (colour channels); must be exactly one table long.
    Bytes(Vec<u8>),
}

impl RangeSpec {
    /// Both ends equal to `value`.
    pub fn constant(value: f64) -> Self {
        RangeSpec::Extent([value, value])
    }

    pub fn as_extent(&self) -> Option<Extent> {
        match self {
            RangeSpec::Extent(e) => Some(*e),
            _ => None,
        }
    }
}

impl From<Extent> for RangeSpec {
    fn from(value: Extent) -> Self {
        RangeSpec::Extent(value)
    }
}

impl From<&str> for RangeSpec {
    fn from(value: &str) -> Self {
        RangeSpec::Palette(value.to_string())
    }
}

impl From<Vec<u8>> for RangeSpec {
    fn from(value: Vec<u8>) -> Self {
        RangeSpec::Bytes(value)
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeSpec::Extent([lo, hi]) => write!(f, "{lo},{hi}"),
            RangeSpec::Palette(name) => f.write_str(name),
            RangeSpec::Bytes(bytes) => {
                let mut hasher = DefaultHasher::new();
                bytes.hash(&mut hasher);
                write!(f, "bytes[{}]:{:016x}", bytes.len(), hasher.finish())
            }
        }
    }
}

/// Structured encoding. Absent parts fall back to the channel kind's defaults.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Encoding {
    pub field: Option<String>,
    pub domain: Option<Extent>,
    pub range: Option<RangeSpec>,
    pub transform: Option<Transform>,
    /// `"<field> => <expression>"`; its field overrides [`Encoding::field`].
    pub lambda: Option<String>,
}

impl Encoding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoding bound to `field`.
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            ..Self::default()
        }
    }

    pub fn with_domain(mut self, domain: Extent) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn with_range(mut self, range: impl Into<RangeSpec>) -> Self {
        self.range = Some(range.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn with_lambda(mut self, lambda: impl Into<String>) -> Self {
        self.lambda = Some(lambda.into());
        self
    }
}

/// Every shape `update` accepts.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Clone, Debug, PartialEq)]
pub enum EncodingInput {
    /// Reset the channel.
    Null,
    /// Every entry equals this value.
    Constant(f64),
    /// `"<field> => <expression>"`.
    Expression(String),
    Spec(Encoding),
}

impl From<Encoding> for EncodingInput {
    fn from(value: Encoding) -> Self {
        EncodingInput::Spec(value)
    }
}

impl From<f64> for EncodingInput {
    fn from(value: f64) -> Self {
        EncodingInput::Constant(value)
    }
}

impl From<&str> for EncodingInput {
    fn from(value: &str) -> Self {
        EncodingInput::Expression(value.to_string())
    }
}

impl From<String> for EncodingInput {
    fn from(value: String) -> Self {
        EncodingInput::Expression(value)
    }
}

impl<T: Into<EncodingInput>> From<Option<T>> for EncodingInput {
    fn from(value: Option<T>) -> Self {
        value.map_or(EncodingInput::Null, Into::into)
    }
}

/// Input to the filter channel's boolean entry point.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Clone, Debug, PartialEq)]
pub enum FilterEncoding {
    /// Bare expression, with or without a `"<param> =>"` prefix.
    Expression(String),
    Lambda {
        #[cfg_attr(feature = "serde", serde(default))]
        field: Option<String>,
        #[cfg_attr(feature = "serde", serde(default))]
        lambda: Option<String>,
    },
}

impl Default for FilterEncoding {
    fn default() -> Self {
        FilterEncoding::Lambda {
            field: None,
            lambda: None,
        }
    }
}

impl From<&str> for FilterEncoding {
    fn from(value: &str) -> Self {
        FilterEncoding::Expression(value.to_string())
    }
}

impl From<String> for FilterEncoding {
    fn from(value: String) -> Self {
        FilterEncoding::Expression(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_each_part() {
        let enc = Encoding::field("mass")
            .with_domain([0.0, 10.0])
            .with_range([1.0, 2.0])
            .with_transform(Transform::Log)
            .with_lambda("mass => mass * 2");
        assert_eq!(enc.field.as_deref(), Some("mass"));
        assert_eq!(enc.domain, Some([0.0, 10.0]));
        assert_eq!(enc.range, Some(RangeSpec::Extent([1.0, 2.0])));
        assert_eq!(enc.transform, Some(Transform::Log));
        assert_eq!(enc.lambda.as_deref(), Some("mass => mass * 2"));
    }

    #[test]
    fn inputs_convert_from_plain_values() {
        assert_eq!(EncodingInput::from(None::<f64>), EncodingInput::Null);
        assert_eq!(EncodingInput::from(Some(2.0)), EncodingInput::Constant(2.0));
        assert_eq!(
            EncodingInput::from("x => x"),
            EncodingInput::Expression("x => x".into())
        );
    }

    #[test]
    fn range_display_is_compact() {
        assert_eq!(RangeSpec::Extent([0.5, 5.0]).to_string(), "0.5,5");
        assert_eq!(RangeSpec::from("viridis").to_string(), "viridis");
        let a = RangeSpec::Bytes(vec![1, 2, 3, 4]).to_string();
        let b = RangeSpec::Bytes(vec![1, 2, 3, 5]).to_string();
        assert!(a.starts_with("bytes[4]:"));
        assert_ne!(a, b);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_every_input_shape() {
        let parsed: Vec<EncodingInput> = serde_json::from_str(
            r#"[null, 3, "x => x > 1", {"field": "mass", "range": [0, 1], "transform": "sqrt"},
                {"range": "rainbow"}]"#,
        )
        .expect("valid json");
        assert_eq!(parsed[0], EncodingInput::Null);
        assert_eq!(parsed[1], EncodingInput::Constant(3.0));
        assert_eq!(parsed[2], EncodingInput::Expression("x => x > 1".into()));
        assert_eq!(
            parsed[3],
            EncodingInput::Spec(
                Encoding::field("mass")
                    .with_range([0.0, 1.0])
                    .with_transform(Transform::Sqrt)
            )
        );
        assert_eq!(
            parsed[4],
            EncodingInput::Spec(Encoding::new().with_range("rainbow"))
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_filter_shapes() {
        let bare: FilterEncoding = serde_json::from_str(r#""x > 5""#).unwrap();
        assert_eq!(bare, FilterEncoding::Expression("x > 5".into()));
        let obj: FilterEncoding = serde_json::from_str(r#"{"field": "year"}"#).unwrap();
        assert_eq!(
            obj,
            FilterEncoding::Lambda {
                field: Some("year".into()),
                lambda: None
            }
        );
    }
}

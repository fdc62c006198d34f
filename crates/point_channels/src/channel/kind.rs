//! Catalog of channel kinds and their defaults.
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::channel::encoding::RangeSpec;
use crate::error::{Error, Result};
use crate::palette::VIRIDIS;
use crate::scale::Transform;
use crate::table::codec;

/// Opaque mid-tone used by idle colour channels.
pub const DEFAULT_COLOR: [u8; 4] = [128, 150, 213, 255];

/// How a channel stores its table entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Packing {
    /// Each entry is a packed real (see [`crate::table::codec`]).
    Float,
    /// Each entry is an RGBA8 colour copied from a palette.
    Rgba,
}

/// One visual property driven by a lookup table.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Color,
    Size,
    Alpha,
    JitterRadius,
    JitterSpeed,
    Filter,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 6] = [
        ChannelKind::Color,
        ChannelKind::Size,
        ChannelKind::Alpha,
        ChannelKind::JitterRadius,
        ChannelKind::JitterSpeed,
        ChannelKind::Filter,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChannelKind::Color => "color",
            ChannelKind::Size => "size",
            ChannelKind::Alpha => "alpha",
            ChannelKind::JitterRadius => "jitter_radius",
            ChannelKind::JitterSpeed => "jitter_speed",
            ChannelKind::Filter => "filter",
        }
    }

    /// Value every entry holds while no field is bound. Unused by [`ChannelKind::Color`].
    pub fn default_value(self) -> f64 {
        match self {
            ChannelKind::Color
            | ChannelKind::Size
            | ChannelKind::Alpha
            | ChannelKind::Filter => 1.0,
            ChannelKind::JitterRadius => 0.05,
            ChannelKind::JitterSpeed => 0.1,
        }
    }

    pub fn default_range(self) -> RangeSpec {
        match self {
            ChannelKind::Color => RangeSpec::Palette(VIRIDIS.to_string()),
            ChannelKind::Size => RangeSpec::Extent([0.5, 5.0]),
            ChannelKind::Alpha | ChannelKind::Filter => RangeSpec::Extent([0.0, 1.0]),
            ChannelKind::JitterRadius => RangeSpec::Extent([0.0, 0.05]),
            ChannelKind::JitterSpeed => RangeSpec::Extent([0.05, 1.0]),
        }
    }

    pub fn default_transform(self) -> Transform {
        match self {
            ChannelKind::Size | ChannelKind::JitterRadius => Transform::Sqrt,
            _ => Transform::Linear,
        }
    }

    pub fn packing(self) -> Packing {
        match self {
            ChannelKind::Color => Packing::Rgba,
            _ => Packing::Float,
        }
    }

    /// Table contents of an idle channel: the default value (or colour) in every entry.
    pub fn default_table(self, size: usize) -> Vec<u8> {
        let entry = match self.packing() {
            Packing::Rgba => DEFAULT_COLOR,
            Packing::Float => codec::encode(self.default_value()),
        };
        entry.repeat(size)
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChannelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ChannelKind::ALL
            .into_iter()
            .find(|k| k.label() == s)
            .ok_or_else(|| Error::InvalidConfig(format!("unknown channel '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for kind in ChannelKind::ALL {
            assert_eq!(kind.label().parse::<ChannelKind>().unwrap(), kind);
        }
        assert!("opacity".parse::<ChannelKind>().is_err());
    }

    #[test]
    fn catalog_defaults() {
        assert_eq!(ChannelKind::Size.default_range(), RangeSpec::Extent([0.5, 5.0]));
        assert_eq!(ChannelKind::Size.default_transform(), Transform::Sqrt);
        assert_eq!(ChannelKind::JitterRadius.default_value(), 0.05);
        assert_eq!(ChannelKind::JitterRadius.default_transform(), Transform::Sqrt);
        assert_eq!(
            ChannelKind::JitterSpeed.default_range(),
            RangeSpec::Extent([0.05, 1.0])
        );
        assert_eq!(ChannelKind::JitterSpeed.default_value(), 0.1);
        assert_eq!(ChannelKind::Alpha.default_transform(), Transform::Linear);
        assert_eq!(
            ChannelKind::Color.default_range(),
            RangeSpec::Palette("viridis".into())
        );
        assert_eq!(ChannelKind::Color.packing(), Packing::Rgba);
        assert_eq!(ChannelKind::Filter.packing(), Packing::Float);
    }

    #[test]
    fn default_tables_repeat_one_entry() {
        let size = ChannelKind::JitterSpeed.default_table(8);
        assert_eq!(size.len(), 32);
        assert!(codec::decode_all(&size)
            .iter()
            .all(|v| (v - 0.1).abs() < codec::RESOLUTION));

        let color = ChannelKind::Color.default_table(3);
        assert_eq!(color, DEFAULT_COLOR.repeat(3));
    }
}

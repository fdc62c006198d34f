#![forbid(unsafe_code)]
//! point_channels: lookup-table encoding for GPU point channels.
//!
//! Modules:
//! - table: float packing codec, table constants and the rendering backend seam
//! - palette: named RGBA8 colour tables (viridis, rainbow, shuffled rainbow)
//! - scale: linear/sqrt/log scales from a domain onto a range
//! - expr: `"<field> => <expression>"` lambdas compiled to a small evaluator
//! - data: the data source seam and an in-memory source
//! - channel: per-channel encoding state, the channel catalog and the filter entry point
//!
//! For examples and docs, see README and docs.rs.
pub mod channel;
pub mod data;
pub mod error;
pub mod expr;
pub mod palette;
pub mod scale;
pub mod table;

/// Convenient re-exports for common types. Import with `use point_channels::prelude::*;`.
pub mod prelude {
    pub use crate::channel::{
        Channel, ChannelConfig, ChannelKind, Encoding, EncodingInput, FilterEncoding, Packing,
        RangeSpec, DEFAULT_COLOR,
    };
    pub use crate::data::{extent, Column, DataSource, Dictionary, MemoryColumn, MemorySource};
    pub use crate::error::{Error, Result};
    pub use crate::expr::{normalize_body, split_lambda, Lambda};
    pub use crate::palette::{build_palettes, Palettes, RAINBOW, SHUFFLED_RAINBOW, VIRIDIS};
    pub use crate::scale::{Extent, Scale, Transform};
    pub use crate::table::codec;
    pub use crate::table::{
        RecordedTable, RecordingBackend, TableBackend, TableHandle, TABLE_SIZE,
    };
}

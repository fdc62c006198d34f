//! Lookup tables shared by every channel.
//!
//! A table is `size` entries of four bytes each, uploaded as a `1 x size` texture.
//! This module groups the float packing codec and the rendering backend seam.
pub mod backend;
pub mod codec;

pub use backend::{RecordedTable, RecordingBackend, TableBackend, TableHandle};

/// Default number of entries in a channel table.
pub const TABLE_SIZE: usize = 1024;

/// Bytes per table entry (RGBA8).
pub const BYTES_PER_ENTRY: usize = 4;

/// Byte length of a table with `size` entries.
#[inline]
pub fn table_bytes(size: usize) -> usize {
    size * BYTES_PER_ENTRY
}

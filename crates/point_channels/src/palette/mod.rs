//! Named colour tables shared by every colour channel.
//!
//! [`Palettes`] is built once at startup, optionally extended with
//! [`Palettes::register`], and then shared read-only (usually behind an `Arc`).
//! Every palette is a ready-to-upload RGBA8 buffer with one entry per table slot.
use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{Error, Result};
use crate::table::{table_bytes, TABLE_SIZE};

pub mod colormap;

pub const VIRIDIS: &str = "viridis";
pub const RAINBOW: &str = "rainbow";
pub const SHUFFLED_RAINBOW: &str = "shuffled_rainbow";

/// Seed used by [`build_palettes`] so the shuffled palette is stable between runs.
pub const DEFAULT_SHUFFLE_SEED: u64 = 0x5EED_C010;

/// Registry of named RGBA8 tables, all `table_size * 4` bytes long.
#[derive(Clone, Debug)]
pub struct Palettes {
    table_size: usize,
    entries: HashMap<String, Vec<u8>>,
}

impl Palettes {
    /// Build the built-in palettes for tables of `table_size` entries.
    ///
    /// `rng` drives the permutation behind [`SHUFFLED_RAINBOW`].
    pub fn build(table_size: usize, rng: &mut dyn Rng) -> Self {
        let viridis = sample_viridis(table_size);
        let rainbow = sample_rainbow(table_size);
        let shuffled = shuffle_entries(&rainbow, rng);

        let mut entries = HashMap::with_capacity(3);
        entries.insert(VIRIDIS.to_string(), viridis);
        entries.insert(RAINBOW.to_string(), rainbow);
        entries.insert(SHUFFLED_RAINBOW.to_string(), shuffled);
        debug!("Built {} palettes of {} entries.", entries.len(), table_size);

        Self {
            table_size,
            entries,
        }
    }

    /// Build with a deterministic shuffle seeded from `seed`.
    pub fn with_seed(table_size: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::build(table_size, &mut rng)
    }

    /// Number of entries every palette holds.
    pub fn table_size(&self) -> usize {
        self.table_size
    }

    /// Register (or replace) a palette under `name`.
    pub fn register(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> Result<()> {
        let name = name.into();
        let expected = table_bytes(self.table_size);
        if bytes.len() != expected {
            return Err(Error::InvalidPalette {
                name,
                expected,
                actual: bytes.len(),
            });
        }
        self.entries.insert(name, bytes);
        Ok(())
    }

    /// Bytes of the palette called `name`.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered palette names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for Palettes {
    fn default() -> Self {
        build_palettes()
    }
}

/// Build the built-in palettes for [`TABLE_SIZE`] entries with [`DEFAULT_SHUFFLE_SEED`].
pub fn build_palettes() -> Palettes {
    Palettes::with_seed(TABLE_SIZE, DEFAULT_SHUFFLE_SEED)
}

fn sample_viridis(size: usize) -> Vec<u8> {
    (0..size)
        .flat_map(|i| colormap::to_rgba8(colormap::viridis(i as f32 / size as f32)))
        .collect()
}

/// Warm ramp over the first half, mirrored cool ramp over the second.
fn sample_rainbow(size: usize) -> Vec<u8> {
    let half = size / 2;
    let last_index = half.saturating_sub(1);
    let last = last_index.max(1) as f32;
    (0..size)
        .flat_map(|i| {
            let rgb = if i < half {
                colormap::warm(i as f32 / last)
            } else {
                colormap::cool(last_index.saturating_sub(i - half) as f32 / last)
            };
            colormap::to_rgba8(rgb)
        })
        .collect()
}

/// Fisher-Yates over whole RGBA entries.
fn shuffle_entries(bytes: &[u8], rng: &mut dyn Rng) -> Vec<u8> {
    let mut entries: Vec<[u8; 4]> = bytes
        .chunks_exact(4)
        .map(|c| [c[0], c[1], c[2], c[3]])
        .collect();
    for i in (1..entries.len()).rev() {
        let j = uniform_index(rng, i + 1);
        entries.swap(i, j);
    }
    entries.into_iter().flatten().collect()
}

/// Uniform index in `0..bound`.
#[inline]
fn uniform_index(rng: &mut dyn Rng, bound: usize) -> usize {
    ((u128::from(rng.next_u64()) * bound as u128) >> 64) as usize
}

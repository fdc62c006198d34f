use std::path::Path;

use anyhow::{ensure, Context};
use image::{Rgba, RgbaImage};
use point_channels::table::BYTES_PER_ENTRY;

/// Install a `fmt` subscriber honouring `RUST_LOG` (defaults to `point_channels=debug`).
pub fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "point_channels=debug".to_string());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// One vertical strip of the output image: an RGBA8 table, one row per entry.
pub struct Strip<'a> {
    pub label: &'a str,
    pub rgba: &'a [u8],
}

impl<'a> Strip<'a> {
    pub fn new(label: &'a str, rgba: &'a [u8]) -> Self {
        Self { label, rgba }
    }

    fn entries(&self) -> usize {
        self.rgba.len() / BYTES_PER_ENTRY
    }
}

/// Greyscale preview of a decoded float table, normalised to its own min/max.
pub fn float_table_to_rgba(values: &[f64]) -> Vec<u8> {
    let (lo, hi) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let span = hi - lo;
    values
        .iter()
        .flat_map(|&v| {
            let t = if span > 0.0 && v.is_finite() {
                (v - lo) / span
            } else {
                0.5
            };
            let g = (t * 255.0).round().clamp(0.0, 255.0) as u8;
            [g, g, g, 255]
        })
        .collect()
}

/// Write the strips side by side, each `strip_width` pixels wide, entry 0 at the bottom.
pub fn render_strips_to_png<P: AsRef<Path>>(
    strips: &[Strip<'_>],
    strip_width: u32,
    path: P,
) -> anyhow::Result<()> {
    ensure!(!strips.is_empty(), "nothing to render");
    ensure!(strip_width > 0, "strip_width must be > 0");
    let height = strips[0].entries();
    for strip in strips {
        ensure!(
            strip.entries() == height,
            "strip '{}' has {} entries, expected {}",
            strip.label,
            strip.entries(),
            height
        );
    }

    let width = strip_width * strips.len() as u32;
    let height_px = u32::try_from(height).context("table too tall")?;
    let image = RgbaImage::from_fn(width, height_px, |x, y| {
        let strip = &strips[(x / strip_width) as usize];
        let entry = (height_px - 1 - y) as usize * BYTES_PER_ENTRY;
        let px = &strip.rgba[entry..entry + BYTES_PER_ENTRY];
        Rgba([px[0], px[1], px[2], px[3]])
    });

    let path = path.as_ref();
    image
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!("Wrote {} strips to {}", strips.len(), path.display());
    Ok(())
}

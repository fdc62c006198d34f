use point_channels::prelude::*;
use point_channels_examples::{init_tracing, render_strips_to_png, Strip};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();

    // Built-in palettes with a fixed shuffle seed so the image is reproducible.
    let mut rng = StdRng::seed_from_u64(2025);
    let mut palettes = Palettes::build(TABLE_SIZE, &mut rng);

    // A custom two-tone palette registered next to the built-ins.
    let half = TABLE_SIZE / 2;
    let mut two_tone = [230u8, 80, 60, 255].repeat(half);
    two_tone.extend([40u8, 90, 200, 255].repeat(TABLE_SIZE - half));
    palettes.register("two_tone", two_tone)?;

    let names = palettes.names();
    let strips: Vec<Strip<'_>> = names
        .iter()
        .filter_map(|name| palettes.get(name).map(|rgba| Strip::new(name, rgba)))
        .collect();

    render_strips_to_png(&strips, 64, "palettes-strip.png")?;
    Ok(())
}

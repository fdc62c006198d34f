use std::sync::Arc;

use point_channels::prelude::*;
use point_channels_examples::{float_table_to_rgba, init_tracing, render_strips_to_png, Strip};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let source: Arc<dyn DataSource> = Arc::new(
        MemorySource::new()
            .with_continuous("mass", (0..500).map(|i| (i as f64 * 0.37).exp2() % 90.0).collect())
            .with_categorical("species", vec![0, 1, 2, 1, 0], vec![3.0, 11.0, 7.0]),
    );
    let palettes = Arc::new(build_palettes());
    let config = ChannelConfig::default();
    let mut backend = RecordingBackend::new();

    let mut size = Channel::new(ChannelKind::Size, &config, &mut backend, palettes.clone())?
        .with_source(source.clone());
    let mut color = Channel::new(ChannelKind::Color, &config, &mut backend, palettes.clone())?
        .with_source(source.clone());
    let mut filter = Channel::new(ChannelKind::Filter, &config, &mut backend, palettes)?
        .with_source(source);

    // Bind size to mass, then switch transform; previous/current show the transition.
    size.update(Encoding::field("mass").with_range([1.0, 8.0]))?;
    size.update(
        Encoding::field("mass")
            .with_range([1.0, 8.0])
            .with_transform(Transform::Log),
    )?;
    color.update(Encoding::field("species").with_range(RAINBOW))?;
    filter.update_filter("species => species > 5")?;

    let previous_size = float_table_to_rgba(&codec::decode_all(size.previous_table()));
    let current_size = float_table_to_rgba(&codec::decode_all(size.current_table()));
    let filter_rgba = float_table_to_rgba(&codec::decode_all(filter.current_table()));

    let strips = [
        Strip::new("size (sqrt)", &previous_size),
        Strip::new("size (log)", &current_size),
        Strip::new("color", color.current_table()),
        Strip::new("filter", &filter_rgba),
    ];
    render_strips_to_png(&strips, 48, "channels-transition.png")?;

    tracing::info!(
        "size key: {}; {} tables published",
        size.key(),
        backend.len()
    );
    Ok(())
}

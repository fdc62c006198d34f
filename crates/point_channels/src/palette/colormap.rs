//! Continuous colormaps sampled by the palette builder.
//!
//! Each function maps `t` in `[0, 1]` to an RGB triple in `[0, 255]` (unrounded).
use glam::Vec3;

/// Canonical viridis stops at `t = 0.0, 0.1, ..., 1.0`.
const VIRIDIS_STOPS: [[u8; 3]; 11] = [
    [0x44, 0x01, 0x54],
    [0x48, 0x24, 0x75],
    [0x41, 0x44, 0x87],
    [0x35, 0x5f, 0x8d],
    [0x2a, 0x78, 0x8e],
    [0x21, 0x91, 0x8c],
    [0x22, 0xa8, 0x84],
    [0x44, 0xbf, 0x70],
    [0x7a, 0xd1, 0x51],
    [0xbd, 0xdf, 0x26],
    [0xfd, 0xe7, 0x25],
];

// Cubehelix basis (Green 2011).
const A: f32 = -0.14861;
const B: f32 = 1.78277;
const C: f32 = -0.29227;
const D: f32 = -0.90649;
const E: f32 = 1.97294;

/// Perceptually uniform dark-purple to yellow ramp.
pub fn viridis(t: f32) -> Vec3 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (VIRIDIS_STOPS.len() - 1) as f32;
    let lo = (scaled as usize).min(VIRIDIS_STOPS.len() - 2);
    let frac = scaled - lo as f32;
    stop(lo).lerp(stop(lo + 1), frac)
}

/// Warm half of the diverging rainbow: purple through red to yellow-green.
pub fn warm(t: f32) -> Vec3 {
    cubehelix_long(
        Vec3::new(-100.0, 0.75, 0.35),
        Vec3::new(80.0, 1.50, 0.8),
        t,
    )
}

/// Cool half of the diverging rainbow: purple through blue to green.
pub fn cool(t: f32) -> Vec3 {
    cubehelix_long(
        Vec3::new(260.0, 0.75, 0.35),
        Vec3::new(80.0, 1.50, 0.8),
        t,
    )
}

/// Convert a cubehelix colour `(hue degrees, saturation, lightness)` to RGB in `[0, 255]`.
pub fn cubehelix(hsl: Vec3) -> Vec3 {
    let h = (hsl.x + 120.0).to_radians();
    let l = hsl.z;
    let a = hsl.y * l * (1.0 - l);
    let (sinh, cosh) = h.sin_cos();
    Vec3::new(
        l + a * (A * cosh + B * sinh),
        l + a * (C * cosh + D * sinh),
        l + a * (E * cosh),
    ) * 255.0
}

/// Interpolate in cubehelix space without wrapping the hue the short way round.
fn cubehelix_long(start: Vec3, end: Vec3, t: f32) -> Vec3 {
    cubehelix(start.lerp(end, t))
}

fn stop(i: usize) -> Vec3 {
    let [r, g, b] = VIRIDIS_STOPS[i];
    Vec3::new(r as f32, g as f32, b as f32)
}

/// Round and clamp an RGB triple into an opaque RGBA8 entry.
pub fn to_rgba8(rgb: Vec3) -> [u8; 4] {
    let c = rgb.round().clamp(Vec3::ZERO, Vec3::splat(255.0));
    [c.x as u8, c.y as u8, c.z as u8, 255]
}

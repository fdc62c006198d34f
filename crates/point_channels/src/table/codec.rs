//! Fixed-point packing of signed reals into four-byte table entries.
//!
//! Layout of an entry:
//! - byte 0: sign flag (1 when the input is negative)
//! - byte 1: the part of the magnitude below 1/256, in units of 1/65536
//! - byte 2: the fractional part above 1/256, in units of 1/256
//! - byte 3: the integer part of the magnitude
//!
//! Bytes are stored with modular byte semantics (truncate toward zero, wrap modulo 256,
//! non-finite becomes 0), so magnitudes of 256 and above wrap instead of saturating.
//! The rendering backend reverses this in the shader; [`decode`] is the same inverse on
//! the CPU side.

/// Smallest difference the codec is guaranteed to preserve.
pub const RESOLUTION: f64 = 1.0 / 65025.0;

const STEP: f64 = 1.0 / 256.0;

/// Pack one real into a table entry.
pub fn encode(value: f64) -> [u8; 4] {
    let (sign, magnitude) = if value < 0.0 {
        (1, -value)
    } else {
        (0, value)
    };
    let remainder = magnitude % STEP;
    [
        sign,
        to_byte(remainder * 256.0 * 256.0),
        to_byte((magnitude % 1.0 - remainder) * 256.0),
        to_byte(magnitude),
    ]
}

/// Pack a boolean as `1` or `0`.
#[inline]
pub fn encode_bool(value: bool) -> [u8; 4] {
    encode(if value { 1.0 } else { 0.0 })
}

/// Unpack a table entry produced by [`encode`].
pub fn decode(bytes: [u8; 4]) -> f64 {
    let magnitude =
        f64::from(bytes[3]) + f64::from(bytes[2]) / 256.0 + f64::from(bytes[1]) / 65536.0;
    if bytes[0] != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Pack `values` into `out`, four bytes per value. Stops at whichever runs out first.
pub fn encode_into<I>(values: I, out: &mut [u8])
where
    I: IntoIterator<Item = f64>,
{
    for (chunk, value) in out.chunks_exact_mut(4).zip(values) {
        chunk.copy_from_slice(&encode(value));
    }
}

/// Pack `values` into a freshly allocated buffer.
pub fn encode_all(values: &[f64]) -> Vec<u8> {
    let mut out = vec![0; values.len() * 4];
    encode_into(values.iter().copied(), &mut out);
    out
}

/// Unpack every complete entry of `bytes`.
pub fn decode_all(bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks_exact(4)
        .map(|c| decode([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Store a real into a byte the way a typed byte array does.
#[inline]
fn to_byte(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc().rem_euclid(256.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_within_resolution() {
        let samples = [
            0.0, 1.0, -1.0, 0.5, 3.7, -3.7, 0.05, 1.0 / 3.0, 12.345_678, -99.999, 255.98, -255.5,
        ];
        for v in samples {
            let back = decode(encode(v));
            assert!(
                (back - v).abs() < RESOLUTION,
                "decode(encode({v})) = {back}"
            );
        }
    }

    #[test]
    fn round_trips_a_dense_sweep() {
        let mut v = -255.0;
        while v < 255.0 {
            assert!((decode(encode(v)) - v).abs() < RESOLUTION, "{v}");
            v += 0.731;
        }
    }

    #[test]
    fn known_layout() {
        assert_eq!(encode(0.0), [0, 0, 0, 0]);
        assert_eq!(encode(1.5), [0, 0, 128, 1]);
        assert_eq!(encode(-2.25), [1, 0, 64, 2]);
        assert_eq!(encode(1.0 / 512.0), [0, 128, 0, 0]);
    }

    #[test]
    fn large_magnitudes_wrap_instead_of_saturating() {
        assert_eq!(encode(256.0), [0, 0, 0, 0]);
        assert_eq!(encode(300.5), [0, 0, 128, 44]);
        assert_eq!(encode(-257.0), [1, 0, 0, 1]);
    }

    #[test]
    fn non_finite_values_pack_to_zero() {
        assert_eq!(encode(f64::NAN), [0, 0, 0, 0]);
        assert_eq!(encode(f64::INFINITY), [0, 0, 0, 0]);
        assert_eq!(encode(f64::NEG_INFINITY), [1, 0, 0, 0]);
    }

    #[test]
    fn booleans_pack_as_zero_and_one() {
        assert_eq!(decode(encode_bool(true)), 1.0);
        assert_eq!(decode(encode_bool(false)), 0.0);
    }

    #[test]
    fn bulk_helpers_agree_with_single_entries() {
        let values = [0.25, -4.0, 17.125];
        let packed = encode_all(&values);
        assert_eq!(packed.len(), 12);
        assert_eq!(&packed[4..8], &encode(-4.0));
        assert_eq!(decode_all(&packed), values.to_vec());
    }

    #[test]
    fn encode_into_stops_at_shorter_input() {
        let mut out = [9u8; 8];
        encode_into([2.0], &mut out);
        assert_eq!(out, [0, 0, 0, 2, 9, 9, 9, 9]);
    }
}

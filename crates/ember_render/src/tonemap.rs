//! Linear-to-display conversion.
//!
//! Every display and export path runs the same operator: a fixed-exposure
//! Reinhard curve, gamma correction, and quantization to a byte per
//! channel. The frame buffer itself always stays linear.

use ember_core::RgbColor;

/// Exposure multiplier applied before the Reinhard curve.
const EXPOSURE: f32 = 16.0;

/// Map one linear pixel to display bytes.
///
/// `inv_gamma` is `1 / gamma` from the view plane. Quantization truncates,
/// matching `as u8` on the scaled value; inputs above the curve's range
/// saturate at 255 through the curve itself (it maps `[0, inf)` into
/// `[0, 1)`).
pub fn tonemap(pixel: RgbColor, inv_gamma: f32) -> [u8; 3] {
    let exposed = pixel * EXPOSURE;
    let compressed = RgbColor::new(
        exposed.r / (1.0 + exposed.r),
        exposed.g / (1.0 + exposed.g),
        exposed.b / (1.0 + exposed.b),
    );
    let corrected = compressed.powf(inv_gamma);
    [
        (corrected.r * 255.0) as u8,
        (corrected.g * 255.0) as u8,
        (corrected.b * 255.0) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_maps_to_zero() {
        assert_eq!(tonemap(RgbColor::BLACK, 1.0), [0, 0, 0]);
    }

    #[test]
    fn test_white_at_gamma_2_2() {
        // 16 / 17 compressed, then ^(1/2.2): 0.9728 * 255 truncates to 248.
        assert_eq!(tonemap(RgbColor::WHITE, 1.0 / 2.2), [248, 248, 248]);
    }

    #[test]
    fn test_curve_never_reaches_255_at_unit_gamma() {
        // The Reinhard curve is strictly below 1, so even huge radiance
        // values stay in range without clamping.
        let huge = RgbColor::new(1000.0, 1000.0, 1000.0);
        let bytes = tonemap(huge, 1.0);
        assert!(bytes.iter().all(|&b| b == 254));
    }

    #[test]
    fn test_monotonic_per_channel() {
        let mut last = 0;
        for i in 0..=20 {
            let value = i as f32 / 20.0;
            let byte = tonemap(RgbColor::new(value, value, value), 1.0 / 2.2)[0];
            assert!(byte >= last);
            last = byte;
        }
    }
}

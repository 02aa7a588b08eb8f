//! Continuous color ramps applied to float columns, producing fixed-size-list color
//! columns suitable for rendering.

use std::sync::Arc;

use arrow_array::{FixedSizeListArray, UInt8Array};
use arrow_schema::{DataType, Field};

/// An ordered list of RGB stops, evenly spaced over `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRamp {
    pub stops: &'static [[u8; 3]],
}

/// ColorBrewer diverging purple-green ramp with 11 classes.
pub const PRGN_11: ColorRamp = ColorRamp {
    stops: &[
        [64, 0, 75],
        [118, 42, 131],
        [153, 112, 171],
        [194, 165, 207],
        [231, 212, 232],
        [247, 247, 247],
        [217, 240, 211],
        [166, 219, 160],
        [90, 174, 97],
        [27, 120, 55],
        [0, 68, 27],
    ],
};

/// ColorBrewer diverging brown-bluegreen ramp with 10 classes.
pub const BRBG_10: ColorRamp = ColorRamp {
    stops: &[
        [84, 48, 5],
        [140, 81, 10],
        [191, 129, 45],
        [223, 194, 125],
        [246, 232, 195],
        [199, 234, 229],
        [128, 205, 193],
        [53, 151, 143],
        [1, 102, 94],
        [0, 60, 48],
    ],
};

impl ColorRamp {
    /// Interpolate this ramp at `value`, clamped to `[0, 1]`. NaN maps to the first
    /// stop.
    pub fn interpolate(&self, value: f64) -> [u8; 3] {
        let value = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        };
        let position = value * (self.stops.len() - 1) as f64;
        let lower_index = position.floor() as usize;
        let upper_index = position.ceil() as usize;
        let fraction = position - lower_index as f64;

        let lower = self.stops[lower_index];
        let upper = self.stops[upper_index];
        let mut out = [0u8; 3];
        for (channel, slot) in out.iter_mut().enumerate() {
            let interpolated = lower[channel] as f64
                + (upper[channel] as f64 - lower[channel] as f64) * fraction;
            *slot = interpolated.round() as u8;
        }
        out
    }
}

/// Rescale `values` to `[0, 1]` via `(v - min) / (max - min)`. NaNs are ignored when
/// finding the bounds and passed through unchanged.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &value in values {
        if value.is_nan() {
            continue;
        }
        min = min.min(value);
        max = max.max(value);
    }

    let range = max - min;
    if !range.is_finite() || range == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|&v| (v - min) / range).collect()
}

fn color_list_array(flat: Vec<u8>, width: i32) -> FixedSizeListArray {
    let field = Arc::new(Field::new("item", DataType::UInt8, false));
    FixedSizeListArray::new(field, width, Arc::new(UInt8Array::from(flat)), None)
}

/// Map each value through `ramp`, producing a `FixedSizeList<UInt8>[3]` RGB column.
pub fn apply_continuous_cmap(values: &[f64], ramp: &ColorRamp) -> FixedSizeListArray {
    let mut flat = Vec::with_capacity(values.len() * 3);
    for &value in values {
        flat.extend_from_slice(&ramp.interpolate(value));
    }
    color_list_array(flat, 3)
}

/// Map each value through `ramp` with a constant alpha in `[0, 1]`, producing a
/// `FixedSizeList<UInt8>[4]` RGBA column.
pub fn apply_continuous_cmap_alpha(
    values: &[f64],
    ramp: &ColorRamp,
    alpha: f64,
) -> FixedSizeListArray {
    let alpha = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    let mut flat = Vec::with_capacity(values.len() * 4);
    for &value in values {
        flat.extend_from_slice(&ramp.interpolate(value));
        flat.push(alpha);
    }
    color_list_array(flat, 4)
}

#[cfg(test)]
mod test {
    use arrow_array::Array;

    use super::*;

    #[test]
    fn endpoints_hit_first_and_last_stops() {
        assert_eq!(PRGN_11.interpolate(0.0), [64, 0, 75]);
        assert_eq!(PRGN_11.interpolate(1.0), [0, 68, 27]);
        assert_eq!(BRBG_10.interpolate(0.0), [84, 48, 5]);
        assert_eq!(BRBG_10.interpolate(1.0), [0, 60, 48]);
    }

    #[test]
    fn midpoint_of_odd_ramp_is_center_stop() {
        // 11 stops puts 0.5 exactly on the sixth.
        assert_eq!(PRGN_11.interpolate(0.5), [247, 247, 247]);
    }

    #[test]
    fn out_of_range_values_clamp() {
        assert_eq!(PRGN_11.interpolate(-3.0), PRGN_11.interpolate(0.0));
        assert_eq!(PRGN_11.interpolate(7.5), PRGN_11.interpolate(1.0));
    }

    #[test]
    fn normalize_rescales_to_unit_interval() {
        use approx::assert_relative_eq;

        let normalized = normalize(&[10.0, 20.0, 30.0]);
        assert_relative_eq!(normalized[0], 0.0);
        assert_relative_eq!(normalized[1], 0.5);
        assert_relative_eq!(normalized[2], 1.0);
    }

    #[test]
    fn normalize_constant_input() {
        assert_eq!(normalize(&[5.0, 5.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn rgb_column_shape() {
        let colors = apply_continuous_cmap(&[0.0, 0.5, 1.0], &BRBG_10);
        assert_eq!(colors.len(), 3);
        assert_eq!(colors.value_length(), 3);
    }

    #[test]
    fn rgba_column_carries_alpha() {
        let colors = apply_continuous_cmap_alpha(&[0.0, 1.0], &PRGN_11, 0.5);
        assert_eq!(colors.value_length(), 4);
        let values = colors
            .values()
            .as_any()
            .downcast_ref::<UInt8Array>()
            .unwrap();
        assert_eq!(values.value(3), 128);
        assert_eq!(values.value(7), 128);
    }
}

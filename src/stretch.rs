// src/stretch.rs

use image::{Rgba, RgbaImage};
use ndarray::Array2;

/// Viridis sampled at nine evenly spaced stops.
const VIRIDIS: [[u8; 3]; 9] = [
    [68, 1, 84],
    [71, 44, 122],
    [59, 81, 139],
    [44, 113, 142],
    [33, 144, 141],
    [39, 173, 129],
    [92, 200, 99],
    [170, 220, 50],
    [253, 231, 37],
];

/// Percentile `q` (0..=100) of already sorted data, interpolating linearly
/// between the two nearest ranks.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Display limits `(vmin, vmax)` from the finite pixels of `data`.
pub fn stretch_limits(data: &Array2<f64>, low: f64, high: f64) -> (f64, f64) {
    let mut values: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
    values.sort_by(f64::total_cmp);
    (percentile(&values, low), percentile(&values, high))
}

/// 将数据映射为 RGBA 图像（百分位拉伸 + viridis）
///
/// Row 0 of `data` ends up at the top of the image. Non-finite pixels are
/// left fully transparent.
pub fn render(data: &Array2<f64>, low: f64, high: f64) -> RgbaImage {
    let (height, width) = data.dim();
    let (vmin, vmax) = stretch_limits(data, low, high);
    let span = vmax - vmin;
    RgbaImage::from_fn(width as u32, height as u32, |x, y| {
        let v = data[(y as usize, x as usize)];
        if !v.is_finite() {
            return Rgba([0, 0, 0, 0]);
        }
        let t = if span > 0.0 { (v - vmin) / span } else { 0.0 };
        viridis(t)
    })
}

fn viridis(t: f64) -> Rgba<u8> {
    let pos = t.clamp(0.0, 1.0) * (VIRIDIS.len() - 1) as f64;
    let i = (pos.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = pos - i as f64;
    let (a, b) = (VIRIDIS[i], VIRIDIS[i + 1]);
    let mix = |k: usize| (a[k] as f64 + (b[k] as f64 - a[k] as f64) * frac).round() as u8;
    Rgba([mix(0), mix(1), mix(2), 255])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates_between_ranks() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&sorted, 0.0), 1.0);
        assert_eq!(percentile(&sorted, 100.0), 5.0);
        assert_eq!(percentile(&sorted, 50.0), 3.0);
        assert!((percentile(&sorted, 3.0) - 1.12).abs() < 1e-12);
        assert!((percentile(&sorted, 99.7) - 4.988).abs() < 1e-12);
    }

    #[test]
    fn percentile_of_empty_is_zero() {
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    #[test]
    fn limits_skip_nan() {
        let data = Array2::from_shape_vec((2, 2), vec![f64::NAN, 0.0, 10.0, 20.0]).unwrap();
        assert_eq!(stretch_limits(&data, 0.0, 100.0), (0.0, 20.0));
    }

    #[test]
    fn render_maps_extremes_to_colormap_ends() {
        let data = Array2::from_shape_vec((1, 3), vec![0.0, 5.0, 10.0]).unwrap();
        let img = render(&data, 0.0, 100.0);
        assert_eq!(img.dimensions(), (3, 1));
        assert_eq!(img.get_pixel(0, 0), &Rgba([68, 1, 84, 255]));
        assert_eq!(img.get_pixel(1, 0), &Rgba([33, 144, 141, 255]));
        assert_eq!(img.get_pixel(2, 0), &Rgba([253, 231, 37, 255]));
    }

    #[test]
    fn render_flat_image_and_nan() {
        let data = Array2::from_shape_vec((2, 1), vec![7.0, f64::NAN]).unwrap();
        let img = render(&data, 3.0, 99.7);
        assert_eq!(img.get_pixel(0, 0), &Rgba([68, 1, 84, 255]));
        assert_eq!(img.get_pixel(0, 1)[3], 0);
    }
}

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

use unistream_core::video::mode::StreamMode;

/// Width of the bright bar that sweeps across the pattern.
const BAR_WIDTH: u32 = 12;

/// Test pattern for frame `n`: a diagonal gradient with a vertical bar that
/// moves one bar width per frame.
pub fn test_pattern(mode: StreamMode, n: u64) -> DynamicImage {
    let g = mode.geometry();
    let bar_x = ((n * BAR_WIDTH as u64) % g.width as u64) as u32;
    let in_bar = move |x: u32| x >= bar_x && x < bar_x + BAR_WIDTH;

    match mode {
        StreamMode::Color => DynamicImage::ImageRgb8(RgbImage::from_fn(g.width, g.height, |x, y| {
            if in_bar(x) {
                Rgb([255, 255, 255])
            } else {
                Rgb([(x * 255 / g.width) as u8, (y * 255 / g.height) as u8, 96])
            }
        })),
        StreamMode::Grayscale => {
            DynamicImage::ImageLuma8(GrayImage::from_fn(g.width, g.height, |x, y| {
                if in_bar(x) {
                    Luma([255])
                } else {
                    Luma([((x + y) * 255 / (g.width + g.height)) as u8])
                }
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_matches_mode_geometry() {
        for mode in StreamMode::ALL {
            let img = test_pattern(mode, 3);
            let g = mode.geometry();
            assert_eq!((img.width(), img.height()), (g.width, g.height));
            assert_eq!(img.color().channel_count(), g.channels);
        }
    }

    #[test]
    fn bar_moves_between_frames() {
        let a = test_pattern(StreamMode::Grayscale, 0);
        let b = test_pattern(StreamMode::Grayscale, 1);
        assert_ne!(a, b);
        assert_eq!(a.as_luma8().unwrap().get_pixel(0, 50).0, [255]);
        assert_eq!(b.as_luma8().unwrap().get_pixel(BAR_WIDTH, 50).0, [255]);
    }
}

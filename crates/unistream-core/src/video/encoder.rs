use image::{imageops, DynamicImage};

use super::decoder::swap_red_blue;
use super::mode::StreamMode;
use crate::error::EncodeError;

/// Build the datagram a rendering application sends for `image`.
///
/// Rgb8 images are sent in color mode, L8 images in grayscale mode. The image
/// must already have the mode's fixed size.
pub fn encode_datagram(image: &DynamicImage) -> Result<Vec<u8>, EncodeError> {
    let (mode, mut flipped) = match image {
        DynamicImage::ImageRgb8(img) => (StreamMode::Color, imageops::flip_vertical(img).into_raw()),
        DynamicImage::ImageLuma8(img) => {
            (StreamMode::Grayscale, imageops::flip_vertical(img).into_raw())
        }
        other => return Err(EncodeError::UnsupportedColor(other.color())),
    };

    let geometry = mode.geometry();
    if (image.width(), image.height()) != (geometry.width, geometry.height) {
        return Err(EncodeError::WrongSize {
            mode,
            expected_width: geometry.width,
            expected_height: geometry.height,
            width: image.width(),
            height: image.height(),
        });
    }

    if mode == StreamMode::Color {
        swap_red_blue(&mut flipped);
    }

    let mut datagram = Vec::with_capacity(flipped.len() + 1);
    datagram.push(mode.to_byte());
    datagram.extend_from_slice(&flipped);
    Ok(datagram)
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Rgb, RgbImage, RgbaImage};

    use super::*;
    use crate::video::decoder::decode_datagram;

    fn gradient_rgb() -> RgbImage {
        RgbImage::from_fn(195, 109, |x, y| {
            Rgb([x as u8, y as u8, (x * 7 + y * 13) as u8])
        })
    }

    #[test]
    fn color_image_survives_the_wire() {
        let original = DynamicImage::ImageRgb8(gradient_rgb());
        let datagram = encode_datagram(&original).unwrap();
        assert_eq!(datagram.len(), 63_766);
        assert_eq!(datagram[0], 3);

        let decoded = decode_datagram(&datagram).unwrap();
        assert_eq!(decoded.image, original);
    }

    #[test]
    fn grayscale_image_survives_the_wire() {
        let original = DynamicImage::ImageLuma8(GrayImage::from_fn(330, 185, |x, y| {
            image::Luma([(x ^ y) as u8])
        }));
        let datagram = encode_datagram(&original).unwrap();
        assert_eq!(datagram[0], 1);
        assert_eq!(decode_datagram(&datagram).unwrap().image, original);
    }

    #[test]
    fn first_wire_row_is_bottom_image_row_in_bgr() {
        let img = gradient_rgb();
        let datagram = encode_datagram(&DynamicImage::ImageRgb8(img.clone())).unwrap();
        let bottom_left = img.get_pixel(0, 108).0;
        assert_eq!(&datagram[1..4], &[bottom_left[2], bottom_left[1], bottom_left[0]]);
    }

    #[test]
    fn rejects_wrong_size() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(330, 185));
        assert_eq!(
            encode_datagram(&img),
            Err(EncodeError::WrongSize {
                mode: StreamMode::Color,
                expected_width: 195,
                expected_height: 109,
                width: 330,
                height: 185,
            })
        );
    }

    #[test]
    fn rejects_unsupported_color_type() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(195, 109));
        assert_eq!(
            encode_datagram(&img),
            Err(EncodeError::UnsupportedColor(image::ColorType::Rgba8))
        );
    }
}

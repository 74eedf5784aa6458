use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Luma, Pixel, Rgba, RgbaImage};

/// Pixel value of white in binarized images.
pub const WHITE: u8 = 255;
/// Pixel value of black in binarized images.
pub const BLACK: u8 = 0;

/// Converts an RGBA image to grayscale with ITU-R BT.601 luma weights.
///
/// Y = 0.299*R + 0.587*G + 0.114*B, rounded to the nearest integer.
pub fn grayscale(img: &RgbaImage) -> GrayImage {
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        let p = img.get_pixel(x, y);
        let luma = 0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64;
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}

/// Binarizes a grayscale image with a fixed global threshold.
///
/// Pixels at or above `white_level` become pure white, everything else pure black.
pub fn binarize(gray: &GrayImage, white_level: u8) -> GrayImage {
    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] >= white_level {
            Luma([WHITE])
        } else {
            Luma([BLACK])
        }
    })
}

/// Produces the grayscale and binarized variants of a screenshot.
pub fn preprocess(img: &RgbaImage, white_level: u8) -> (GrayImage, GrayImage) {
    let gray = grayscale(img);
    let binarized = binarize(&gray, white_level);
    (gray, binarized)
}

/// Converts image to binary by keeping only bright pixels.
///
/// Pixels where R > threshold AND G > threshold AND B > threshold become black (text).
/// All other pixels become white (background).
///
/// The level and master rank badges draw white digits on a dark plate, so this
/// yields dark text on a white background, which is what OCR expects.
pub fn threshold_bright_pixels(img: &RgbaImage, threshold: u8) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut output = ImageBuffer::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        let r = pixel[0];
        let g = pixel[1];
        let b = pixel[2];

        let value = if r > threshold && g > threshold && b > threshold {
            BLACK
        } else {
            WHITE
        };

        output.put_pixel(x, y, Luma([value]));
    }

    output
}

/// Crops a `width × height` window at (x, y), clamped to the image bounds.
pub fn crop_clamped<P>(
    img: &ImageBuffer<P, Vec<P::Subpixel>>,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    let (w, h) = img.dimensions();
    let x0 = x.min(w);
    let y0 = y.min(h);
    let cw = width.min(w - x0);
    let ch = height.min(h - y0);

    imageops::crop_imm(img, x0, y0, cw, ch).to_image()
}

/// Crops a `size × size` square at (x, y); area outside the source is white.
pub fn crop_square_padded(img: &RgbaImage, x: u32, y: u32, size: u32) -> RgbaImage {
    let mut square = RgbaImage::from_pixel(size, size, Rgba([WHITE, WHITE, WHITE, 255]));
    let inner = crop_clamped(img, x, y, size, size);
    imageops::replace(&mut square, &inner, 0, 0);
    square
}

/// Nearest-neighbour rescale.
pub fn scale_nearest<P>(
    img: &ImageBuffer<P, Vec<P::Subpixel>>,
    width: u32,
    height: u32,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    imageops::resize(img, width, height, FilterType::Nearest)
}

//! Image preprocessing: decode, RGB conversion, resize, float tensor.
//!
//! Order of operations matters: color conversion happens before resizing so
//! grayscale and RGBA sources are interpolated as 3-channel RGB.

use std::path::Path;

use image::imageops::FilterType;
use image::io::Reader as ImageReader;
use image::{DynamicImage, GenericImageView, RgbImage};
use leaf_models::Normalization;
use ndarray::Array4;
use tracing::trace;

use crate::error::{InferenceError, InferenceResult};

/// Spatial size a model expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    pub height: u32,
    pub width: u32,
}

impl TargetSize {
    pub const fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    pub const fn square(side: u32) -> Self {
        Self::new(side, side)
    }
}

/// Preprocessed image: shape (1, height, width, 3), RGB, f32.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Array4<f32>,
}

impl ImageTensor {
    /// Wrap an existing NHWC array. Fails unless batch is 1 and channels is 3.
    pub fn from_array(data: Array4<f32>) -> InferenceResult<Self> {
        let shape = data.shape();
        if shape[0] != 1 || shape[3] != 3 {
            return Err(InferenceError::ShapeMismatch {
                expected: vec![1, -1, -1, 3],
                actual: shape.to_vec(),
            });
        }
        Ok(Self { data })
    }

    /// Shape as (batch, height, width, channels).
    pub fn shape(&self) -> [usize; 4] {
        let s = self.data.shape();
        [s[0], s[1], s[2], s[3]]
    }

    pub fn height(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn width(&self) -> usize {
        self.data.shape()[2]
    }

    pub fn as_array(&self) -> &Array4<f32> {
        &self.data
    }

    /// Flattened values in NHWC order.
    pub fn to_nhwc_vec(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }

    /// Flattened values in NCHW order.
    pub fn to_nchw_vec(&self) -> Vec<f32> {
        self.data
            .view()
            .permuted_axes([0, 3, 1, 2])
            .iter()
            .copied()
            .collect()
    }
}

/// Decode raw bytes (format sniffed) and preprocess them.
pub fn preprocess_bytes(
    bytes: &[u8],
    target: TargetSize,
    normalization: Normalization,
) -> InferenceResult<ImageTensor> {
    let img = image::load_from_memory(bytes)?;
    preprocess_image(&img, target, normalization)
}

/// Open an image file and preprocess it.
///
/// The format is sniffed from the content, not the file extension.
pub fn preprocess_path(
    path: &Path,
    target: TargetSize,
    normalization: Normalization,
) -> InferenceResult<ImageTensor> {
    let img = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| match e {
            image::ImageError::IoError(io) => InferenceError::Io(io),
            other => InferenceError::from(other),
        })?;
    preprocess_image(&img, target, normalization)
}

/// Convert to RGB, resize to `target`, normalize and add the batch dimension.
pub fn preprocess_image(
    img: &DynamicImage,
    target: TargetSize,
    normalization: Normalization,
) -> InferenceResult<ImageTensor> {
    if target.height == 0 || target.width == 0 {
        return Err(InferenceError::inference(format!(
            "Invalid target size {}x{}",
            target.height, target.width
        )));
    }

    let rgb = to_rgb(img);
    let resized = image::imageops::resize(&rgb, target.width, target.height, FilterType::Triangle);

    let (src_width, src_height) = img.dimensions();
    trace!(
        src_width,
        src_height,
        width = target.width,
        height = target.height,
        %normalization,
        "Preprocessed image"
    );

    let (h, w) = (target.height as usize, target.width as usize);
    let data = Array4::from_shape_fn((1, h, w, 3), |(_, y, x, c)| {
        let pixel = resized.get_pixel(x as u32, y as u32);
        normalization.apply(pixel[c], c)
    });

    Ok(ImageTensor { data })
}

/// Convert any color mode to 8-bit RGB. Alpha is discarded.
pub fn to_rgb(img: &DynamicImage) -> RgbImage {
    match img {
        DynamicImage::ImageRgb8(rgb) => rgb.clone(),
        other => other.to_rgb8(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageOutputFormat, Luma, Rgb, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode_png(img: &DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_rgb_output_shape() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([10, 20, 30])));
        let bytes = encode_png(&img);

        let tensor = preprocess_bytes(&bytes, TargetSize::new(32, 40), Normalization::None).unwrap();
        assert_eq!(tensor.shape(), [1, 32, 40, 3]);
        assert_eq!(tensor.height(), 32);
        assert_eq!(tensor.width(), 40);
    }

    #[test]
    fn test_raw_pixel_range_preserved() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([255, 128, 0])));
        let tensor = preprocess_image(&img, TargetSize::square(4), Normalization::None).unwrap();

        let data = tensor.as_array();
        assert_eq!(data[[0, 0, 0, 0]], 255.0);
        assert_eq!(data[[0, 3, 3, 1]], 128.0);
        assert_eq!(data[[0, 2, 1, 2]], 0.0);
    }

    #[test]
    fn test_grayscale_becomes_three_channels() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(10, 10, Luma([77])));
        assert_eq!(to_rgb(&gray).get_pixel(0, 0), &Rgb([77, 77, 77]));

        let tensor = preprocess_bytes(&encode_png(&gray), TargetSize::square(5), Normalization::None)
            .unwrap();
        assert_eq!(tensor.shape(), [1, 5, 5, 3]);
        let data = tensor.as_array();
        assert_eq!(data[[0, 1, 1, 0]], 77.0);
        assert_eq!(data[[0, 1, 1, 1]], 77.0);
        assert_eq!(data[[0, 1, 1, 2]], 77.0);
    }

    #[test]
    fn test_rgba_drops_alpha() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(6, 6, Rgba([1, 2, 3, 0])));
        let rgb = to_rgb(&rgba);
        assert_eq!(rgb.get_pixel(5, 5), &Rgb([1, 2, 3]));

        let tensor = preprocess_image(&rgba, TargetSize::square(3), Normalization::None).unwrap();
        assert_eq!(tensor.shape(), [1, 3, 3, 3]);
    }

    #[test]
    fn test_imagenet_normalization_applied() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 255, 255])));
        let tensor = preprocess_image(&img, TargetSize::square(2), Normalization::ImageNet).unwrap();
        let red = tensor.as_array()[[0, 0, 0, 0]];
        assert!((red - (1.0 - 0.485) / 0.229).abs() < 1e-4);
    }

    #[test]
    fn test_malformed_bytes_is_decode_error() {
        let err = preprocess_bytes(b"definitely not an image", TargetSize::square(8), Normalization::None)
            .unwrap_err();
        assert!(matches!(err, InferenceError::Decode(_)));

        let err = preprocess_bytes(&[], TargetSize::square(8), Normalization::None).unwrap_err();
        assert!(matches!(err, InferenceError::Decode(_)));
    }

    #[test]
    fn test_path_format_sniffed_from_content() {
        let dir = tempfile::tempdir().unwrap();
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([40, 200, 60])));
        let png = encode_png(&img);

        for name in ["leaf.jpg", "leaf"] {
            let path = dir.path().join(name);
            std::fs::write(&path, &png).unwrap();

            let tensor = preprocess_path(&path, TargetSize::square(4), Normalization::None).unwrap();
            assert_eq!(tensor.shape(), [1, 4, 4, 3]);
            assert_eq!(tensor.as_array()[[0, 2, 2, 1]], 200.0);
        }
    }

    #[test]
    fn test_path_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = preprocess_path(&dir.path().join("missing.png"), TargetSize::square(4), Normalization::None);
        assert!(matches!(missing, Err(InferenceError::Io(_))));

        let junk = dir.path().join("notes");
        std::fs::write(&junk, b"not an image at all").unwrap();
        let err = preprocess_path(&junk, TargetSize::square(4), Normalization::None).unwrap_err();
        assert!(matches!(err, InferenceError::Decode(_)));
    }

    #[test]
    fn test_zero_target_rejected() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        assert!(preprocess_image(&img, TargetSize::new(0, 4), Normalization::None).is_err());
    }

    #[test]
    fn test_nchw_reordering() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([1, 2, 3]));
        img.put_pixel(1, 0, Rgb([4, 5, 6]));
        let tensor = preprocess_image(
            &DynamicImage::ImageRgb8(img),
            TargetSize::new(1, 2),
            Normalization::None,
        )
        .unwrap();

        assert_eq!(tensor.to_nhwc_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(tensor.to_nchw_vec(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }
}

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use indicatif::ProgressStyle;

use crate::error::{Result, VitalsError};

/// 从内存中解码图片，空数据或无法识别的格式返回 [`VitalsError::BadImage`]
pub fn imdecode(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(VitalsError::bad_image("empty image data"));
    }
    image::load_from_memory(bytes).map_err(VitalsError::bad_image)
}

/// 从文件读取并解码图片
pub fn imread(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let bytes = std::fs::read(path.as_ref())?;
    imdecode(&bytes).map_err(|e| match e {
        VitalsError::BadImage(msg) => {
            VitalsError::BadImage(format!("{}: {}", path.as_ref().display(), msg))
        }
        e => e,
    })
}

/// 按宽度等比缩放后的尺寸，高度为 `round(width * h / w)`，至少为 1
pub fn scaled_size(size: (u32, u32), width: u32) -> (u32, u32) {
    let (w, h) = size;
    let height = (width as f64 * h as f64 / w as f64).round().max(1.) as u32;
    (width, height)
}

/// 按宽度等比缩放图片，`width` 为 0 时不做处理
pub fn resize_to_width(image: DynamicImage, width: u32) -> DynamicImage {
    if width == 0 || image.width() == 0 {
        return image;
    }
    let (w, h) = scaled_size(image.dimensions(), width);
    if (w, h) == image.dimensions() {
        return image;
    }
    image.resize_exact(w, h, FilterType::Triangle)
}

pub fn pb_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
        .expect("valid progress template")
}

#[cfg(test)]
mod tests {
    use image::RgbImage;

    use super::*;

    #[test]
    fn scaled_size_rounds() {
        assert_eq!(scaled_size((300, 300), 150), (150, 150));
        assert_eq!(scaled_size((400, 300), 150), (150, 113));
        assert_eq!(scaled_size((3000, 1), 150), (150, 1));
    }

    #[test]
    fn resize_keeps_aspect_ratio() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(600, 400));
        let resized = resize_to_width(image, 225);
        assert_eq!(resized.dimensions(), (225, 150));
    }

    #[test]
    fn resize_zero_width_is_noop() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(60, 40));
        assert_eq!(resize_to_width(image, 0).dimensions(), (60, 40));
    }

    #[test]
    fn imdecode_rejects_empty_and_garbage() {
        assert!(matches!(imdecode(&[]), Err(VitalsError::BadImage(_))));
        assert!(matches!(imdecode(b"definitely not a png"), Err(VitalsError::BadImage(_))));
    }

    #[test]
    fn imread_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(imread(file.path()), Err(VitalsError::BadImage(_))));
    }
}

use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use log::debug;

use crate::config::SiftOptions;
use crate::error::Result;
use crate::sift::{Detector, Features, SiftDetector};
use crate::utils;

/// 图片特征提取器
///
/// 流程为：解码 -> 按宽度等比缩放 -> 灰度化 -> 特征点检测。
/// 检测器在创建时传入，可以在多个线程间共享。
#[derive(Clone)]
pub struct FeatureExtractor {
    detector: Arc<dyn Detector>,
    /// 库中封面的缩放宽度
    resize_width: u32,
    /// 查询图片的缩放宽度
    query_resize_width: u32,
}

impl FeatureExtractor {
    pub fn new(detector: Arc<dyn Detector>, resize_width: u32, query_resize_width: u32) -> Self {
        Self {
            detector,
            resize_width,
            query_resize_width,
        }
    }

    pub fn resize_width(&self) -> u32 {
        self.resize_width
    }

    pub fn query_resize_width(&self) -> u32 {
        self.query_resize_width
    }

    /// 提取已解码图片的特征，`resize_width` 为 None 或 0 时不缩放
    pub fn detect_image(&self, image: DynamicImage, resize_width: Option<u32>) -> Features {
        let image = utils::resize_to_width(image, resize_width.unwrap_or(0));
        let gray = image.to_luma8();
        let features = self.detector.detect_and_compute(&gray);
        debug!(
            "{}x{} 图片提取到 {} 个特征点",
            gray.width(),
            gray.height(),
            features.len()
        );
        features
    }

    /// 从内存中的图片数据提取特征
    pub fn detect_bytes(&self, bytes: &[u8], resize_width: Option<u32>) -> Result<Features> {
        let image = utils::imdecode(bytes)?;
        Ok(self.detect_image(image, resize_width))
    }

    /// 从图片文件提取特征
    pub fn detect_file(
        &self,
        path: impl AsRef<Path>,
        resize_width: Option<u32>,
    ) -> Result<Features> {
        let image = utils::imread(path)?;
        Ok(self.detect_image(image, resize_width))
    }

    /// 按封面的缩放宽度提取特征
    pub fn detect_cover(&self, bytes: &[u8]) -> Result<Features> {
        self.detect_bytes(bytes, Some(self.resize_width))
    }

    /// 按查询图片的缩放宽度提取特征
    pub fn detect_query(&self, bytes: &[u8]) -> Result<Features> {
        self.detect_bytes(bytes, Some(self.query_resize_width))
    }
}

impl From<&SiftOptions> for FeatureExtractor {
    fn from(opts: &SiftOptions) -> Self {
        Self::new(
            Arc::new(SiftDetector::from(opts)),
            opts.resize_width,
            opts.query_resize_width,
        )
    }
}

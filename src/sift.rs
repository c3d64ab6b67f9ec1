//! SIFT 特征点检测与描述
//!
//! 检测本身交给 `sift_features`，参数与 OpenCV 的默认实现一致：
//! 每组金字塔 3 层，对比度阈值 0.04，边缘阈值 10，描述符为 128 维，取值 0 ~ 255。
//! 这里只负责把结果转换为 [`Features`]，以及按响应保留最强的若干个特征点。

use image::GrayImage;
use ndarray::prelude::*;
use serde::Serialize;
use sift_features::SiftResult;

use crate::config::SiftOptions;
use crate::matrix::{DESCRIPTOR_SIZE, DescriptorMatrix, empty_descriptors};

/// 短边小于该值的图片不做检测
const MIN_IMAGE_SIDE: u32 = 16;

/// 特征点，坐标以输入图片为准
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeyPoint {
    pub x: f32,
    pub y: f32,
    /// 特征点邻域直径
    pub size: f32,
    /// 主方向，单位为度
    pub angle: f32,
    pub response: f32,
}

/// 一张图片的特征点和对应的描述符，两者按行一一对应
#[derive(Debug, Clone)]
pub struct Features {
    pub keypoints: Vec<KeyPoint>,
    pub descriptors: DescriptorMatrix,
}

impl Features {
    pub fn empty() -> Self {
        Self {
            keypoints: vec![],
            descriptors: empty_descriptors(),
        }
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// 保留响应最强的 `n` 个特征点，其余按原有顺序排列，`n` 为 0 时不做处理
    pub fn retain_best(self, n: usize) -> Self {
        if n == 0 || self.len() <= n {
            return self;
        }

        let mut order = (0..self.len()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| {
            self.keypoints[b]
                .response
                .total_cmp(&self.keypoints[a].response)
        });
        order.truncate(n);
        order.sort_unstable();

        Self {
            keypoints: order.iter().map(|&i| self.keypoints[i]).collect(),
            descriptors: self.descriptors.select(Axis(0), &order),
        }
    }
}

/// 特征点检测器
pub trait Detector: Send + Sync {
    fn detect_and_compute(&self, image: &GrayImage) -> Features;
}

#[derive(Debug, Clone, Default)]
pub struct SiftDetector {
    /// 保留响应最强的 N 个特征点，0 表示全部保留
    nfeatures: usize,
}

impl SiftDetector {
    pub fn new(nfeatures: usize) -> Self {
        Self { nfeatures }
    }
}

impl From<&SiftOptions> for SiftDetector {
    fn from(opts: &SiftOptions) -> Self {
        Self::new(opts.sift_nfeatures as usize)
    }
}

impl Detector for SiftDetector {
    fn detect_and_compute(&self, image: &GrayImage) -> Features {
        if image.width().min(image.height()) < MIN_IMAGE_SIDE {
            return Features::empty();
        }

        let SiftResult {
            keypoints,
            descriptors,
        } = sift_features::sift(image, None);

        let keypoints = keypoints
            .iter()
            .map(|kp| KeyPoint {
                x: kp.x,
                y: kp.y,
                size: kp.size,
                angle: kp.angle,
                response: kp.response,
            })
            .collect::<Vec<_>>();
        let data = descriptors.iter().map(|&v| v as f32).collect::<Vec<f32>>();
        let descriptors = Array2::from_shape_vec((keypoints.len(), DESCRIPTOR_SIZE), data)
            .expect("one 128-d descriptor per keypoint");

        Features {
            keypoints,
            descriptors,
        }
        .retain_best(self.nfeatures)
    }
}

use ndarray::prelude::*;

/// SIFT 描述符维数
pub const DESCRIPTOR_SIZE: usize = 128;

/// 描述符矩阵，形状为 (特征点数量, DESCRIPTOR_SIZE)
pub type DescriptorMatrix = Array2<f32>;

/// 返回没有任何特征点的描述符矩阵
pub fn empty_descriptors() -> DescriptorMatrix {
    Array2::zeros((0, DESCRIPTOR_SIZE))
}

/// 将若干行描述符拼接为一个矩阵
pub fn stack_descriptors(rows: &[[f32; DESCRIPTOR_SIZE]]) -> DescriptorMatrix {
    let data = rows.as_flattened().to_vec();
    Array2::from_shape_vec((rows.len(), DESCRIPTOR_SIZE), data)
        .expect("row length is always DESCRIPTOR_SIZE")
}

use ndarray::prelude::*;

/// 计算两个向量的欧氏距离的平方
#[inline(always)]
pub fn l2_squared(va: ArrayView1<f32>, vb: ArrayView1<f32>) -> f32 {
    debug_assert_eq!(va.len(), vb.len(), "vectors must have the same length");
    va.iter().zip(vb.iter()).map(|(a, b)| (a - b) * (a - b)).sum()
}

/// 计算向量 va 和 vb 的欧氏距离，并返回距离最小的 k 个索引和距离
///
/// 参数：
/// - va: 查询向量
/// - vb: 若干行被搜索的向量
/// - k: 返回的最近邻居数量
///
/// 距离相同时保留先出现的行
pub fn knn_l2(va: ArrayView1<f32>, vb: ArrayView2<f32>, k: usize) -> (Vec<usize>, Vec<f32>) {
    assert!((1..=8).contains(&k), "k must be between 1 and 8");
    let mut dis = [f32::INFINITY; 8];
    let mut idx = [0; 8];
    for (i, row) in vb.rows().into_iter().enumerate() {
        let d = l2_squared(va, row);
        if d >= dis[k - 1] {
            continue;
        }
        // 维护一个长度为 k 的单调递增数组，从后往前寻找插入点
        let mut j = k - 1;
        while j > 0 && d < dis[j - 1] {
            dis[j] = dis[j - 1];
            idx[j] = idx[j - 1];
            j -= 1;
        }
        dis[j] = d;
        idx[j] = i;
    }
    idx.into_iter()
        .zip(dis)
        .take(k)
        .filter(|(_, d)| d.is_finite())
        .map(|(i, d)| (i, d.sqrt()))
        .unzip()
}

//! 基于比率测试的暴力匹配
//!
//! 对库中每张封面，查询图片的每个描述符在封面描述符中寻找最近的两个邻居，
//! 只有当最近距离明显小于次近距离时才认为是可信的匹配，匹配数量即为分数。
//!
//! 复杂度为 O(L × N_lib × N_query)，只适用于几十到几百张封面的个人收藏。

use std::cmp::Ordering;

use ndarray::prelude::*;
use rayon::prelude::*;

use crate::knn::knn_l2;
use crate::matrix::DescriptorMatrix;

/// 比率测试的默认阈值
pub const RATIO_THRESHOLD: f32 = 0.75;

/// 统计通过比率测试的匹配数量
///
/// # Arguments
///
/// * `library` - 库中一张封面的描述符
/// * `query` - 查询图片的描述符
/// * `ratio` - 比率阈值，最近距离必须小于 `ratio * 次近距离`
pub fn count_good_matches(library: ArrayView2<f32>, query: ArrayView2<f32>, ratio: f32) -> usize {
    if library.nrows() < 2 {
        return 0;
    }
    query
        .rows()
        .into_iter()
        .filter(|row| {
            let (_, dis) = knn_l2(*row, library, 2);
            matches!(dis.as_slice(), [m, n] if *m < ratio * *n)
        })
        .count()
}

/// 对整个库打分，按分数降序返回 `(catalog, 分数)`，分数相同时按 catalog 升序
pub fn rank_library<'a, I>(query: &DescriptorMatrix, library: I, ratio: f32) -> Vec<(String, usize)>
where
    I: IntoParallelIterator<Item = (&'a String, &'a DescriptorMatrix)>,
{
    let mut scores = library
        .into_par_iter()
        .map(|(catalog, des)| {
            (
                catalog.clone(),
                count_good_matches(des.view(), query.view(), ratio),
            )
        })
        .collect::<Vec<_>>();
    scores.sort_unstable_by(compare_scores);
    scores
}

fn compare_scores(a: &(String, usize), b: &(String, usize)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::matrix::{DESCRIPTOR_SIZE, empty_descriptors};

    fn one_hot(rows: &[usize]) -> DescriptorMatrix {
        let mut m = Array2::zeros((rows.len(), DESCRIPTOR_SIZE));
        for (i, &col) in rows.iter().enumerate() {
            m[[i, col]] = 100.;
        }
        m
    }

    #[test]
    fn distinct_rows_match_themselves() {
        let lib = one_hot(&[0, 1, 2, 3]);
        assert_eq!(count_good_matches(lib.view(), lib.view(), RATIO_THRESHOLD), 4);
    }

    #[test]
    fn ambiguous_rows_rejected() {
        // 两行完全相同，最近和次近距离相等
        let lib = one_hot(&[5, 5]);
        let query = one_hot(&[5]);
        assert_eq!(count_good_matches(lib.view(), query.view(), RATIO_THRESHOLD), 0);
    }

    #[test]
    fn too_few_library_rows() {
        let lib = one_hot(&[0]);
        assert_eq!(count_good_matches(lib.view(), lib.view(), RATIO_THRESHOLD), 0);
    }

    #[test]
    fn empty_query_scores_zero() {
        let lib = one_hot(&[0, 1, 2]);
        let query = empty_descriptors();
        assert_eq!(count_good_matches(lib.view(), query.view(), RATIO_THRESHOLD), 0);
    }

    #[test]
    fn lower_ratio_never_increases_count() {
        let lib = Array2::from_shape_fn((40, DESCRIPTOR_SIZE), |(i, j)| {
            ((i * 31 + j * 7) % 23) as f32
        });
        let query = Array2::from_shape_fn((30, DESCRIPTOR_SIZE), |(i, j)| {
            ((i * 17 + j * 5) % 19) as f32
        });

        let mut last = count_good_matches(lib.view(), query.view(), RATIO_THRESHOLD);
        for ratio in [0.7, 0.6, 0.5, 0.3, 0.1, 0.] {
            let count = count_good_matches(lib.view(), query.view(), ratio);
            assert!(count <= last, "ratio {ratio}: {count} > {last}");
            last = count;
        }
    }

    #[test]
    fn rank_empty_library() {
        let library = BTreeMap::<String, DescriptorMatrix>::new();
        let result = rank_library(&one_hot(&[0, 1]), &library, RATIO_THRESHOLD);
        assert!(result.is_empty());
    }

    #[test]
    fn rank_orders_by_score_then_catalog() {
        let mut library = BTreeMap::new();
        library.insert("B".to_string(), one_hot(&[0, 1]));
        library.insert("A".to_string(), one_hot(&[0, 1]));
        library.insert("C".to_string(), one_hot(&[0, 1, 2, 3]));
        library.insert("D".to_string(), one_hot(&[7, 8]));

        let query = one_hot(&[0, 1, 2, 3]);
        let result = rank_library(&query, &library, RATIO_THRESHOLD);

        let catalogs = result.iter().map(|(c, _)| c.as_str()).collect::<Vec<_>>();
        assert_eq!(catalogs, ["C", "A", "B", "D"]);
        assert_eq!(result[0].1, 4);
    }
}

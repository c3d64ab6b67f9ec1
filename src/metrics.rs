use std::sync::LazyLock;

use prometheus::*;

static METRIC_QUERY_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!("vitals_query_count", "count of the album match queries", &["size"])
        .unwrap()
});

static METRIC_QUERY_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "vitals_query_duration",
        "duration of the per-query extraction and matching in seconds",
        &["size"]
    )
    .unwrap()
});

static METRIC_QUERY_TOP_SCORE: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "vitals_query_top_score",
        "good matches of the best album per query",
        &["size"],
        vec![0., 5., 10., 20., 40., 80., 160., 320., 640.]
    )
    .unwrap()
});

/// 增加查询计数
pub fn inc_query_count(size: (u32, u32)) {
    METRIC_QUERY_COUNT.with_label_values(&[to_fixed_size(size)]).inc();
}

pub fn observe_query_duration(size: (u32, u32), duration: f32) {
    METRIC_QUERY_DURATION
        .with_label_values(&[to_fixed_size(size)])
        .observe(duration as f64);
}

pub fn observe_top_score(size: (u32, u32), score: usize) {
    METRIC_QUERY_TOP_SCORE.with_label_values(&[to_fixed_size(size)]).observe(score as f64);
}

/// 以文本格式导出所有指标
pub fn gather_text() -> anyhow::Result<String> {
    let mut buffer = String::new();
    TextEncoder::new().encode_utf8(&prometheus::gather(), &mut buffer)?;
    Ok(buffer)
}

/// 将图像面积范围调整到几个固定值
fn to_fixed_size((width, height): (u32, u32)) -> &'static str {
    let area = width as u64 * height as u64;
    if area <= 256 * 256 {
        "256"
    } else if area <= 512 * 512 {
        "512"
    } else if area <= 1024 * 1024 {
        "1024"
    } else if area <= 2048 * 2048 {
        "2048"
    } else if area <= 4096 * 4096 {
        "4096"
    } else {
        "4096+"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_size_buckets() {
        assert_eq!(to_fixed_size((100, 100)), "256");
        assert_eq!(to_fixed_size((512, 512)), "512");
        assert_eq!(to_fixed_size((1920, 1080)), "2048");
        assert_eq!(to_fixed_size((5000, 5000)), "4096+");
    }

    #[test]
    fn gathered_text_contains_queries() {
        inc_query_count((640, 480));
        observe_top_score((640, 480), 12);
        let text = gather_text().unwrap();
        assert!(text.contains("vitals_query_count"));
        assert!(text.contains("vitals_query_top_score"));
    }
}

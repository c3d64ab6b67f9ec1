use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use indicatif::{ParallelProgressIterator, ProgressBar};
use log::warn;
use rayon::prelude::*;
use tokio::task::block_in_place;

use crate::cli::{SubCommandExtend, catalog_of, scan_images};
use crate::config::{Opts, SiftOptions};
use crate::extractor::FeatureExtractor;
use crate::utils::pb_style;
use crate::vitals::descriptor_update_sql;

#[derive(Parser, Debug, Clone)]
pub struct CodegenCommand {
    #[command(flatten)]
    pub sift: SiftOptions,
    /// 封面所在目录，文件名去掉扩展名后作为 catalog
    pub path: PathBuf,
    /// 扫描的文件后缀名，多个后缀用逗号分隔
    #[arg(short, long, default_value = "jpg,jpeg,png,webp")]
    pub suffix: String,
}

impl SubCommandExtend for CodegenCommand {
    async fn run(&self, _opts: &Opts) -> Result<()> {
        let entries = scan_images(&self.path, &self.suffix)?;
        let extractor = FeatureExtractor::from(&self.sift);
        let pb = ProgressBar::new(entries.len() as u64).with_style(pb_style());

        // 进度条输出到 stderr，stdout 只有 SQL 语句
        let statements = block_in_place(|| {
            entries
                .par_iter()
                .progress_with(pb.clone())
                .map(|entry| -> Result<Option<String>> {
                    let Some(catalog) = catalog_of(entry) else {
                        return Ok(None);
                    };
                    match extractor.detect_file(entry, Some(extractor.resize_width())) {
                        Ok(features) => {
                            Ok(Some(descriptor_update_sql(&catalog, &features.descriptors)?))
                        }
                        Err(e) => {
                            warn!("计算特征点失败 {}: {}", entry.display(), e);
                            Ok(None)
                        }
                    }
                })
                .collect::<Result<Vec<_>>>()
        })?;
        pb.finish_and_clear();

        for statement in statements.into_iter().flatten() {
            println!("{}", statement);
        }

        Ok(())
    }
}

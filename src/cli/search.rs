use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::debug;
use tokio::task::block_in_place;

use crate::VitalsDBBuilder;
use crate::cli::SubCommandExtend;
use crate::config::{MatchOptions, Opts, SiftOptions};
use crate::db::AlbumMatch;
use crate::extractor::FeatureExtractor;

#[derive(Parser, Debug, Clone)]
pub struct SearchCommand {
    #[command(flatten)]
    pub sift: SiftOptions,
    #[command(flatten)]
    pub matching: MatchOptions,
    /// 在该用户的收藏中搜索
    #[arg(short, long, value_name = "NAME")]
    pub user: String,
    /// 被搜索的图片路径
    pub image: PathBuf,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for SearchCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let extractor = FeatureExtractor::from(&self.sift);
        let features = block_in_place(|| {
            extractor.detect_file(&self.image, Some(extractor.query_resize_width()))
        })?;
        debug!("查询图片共 {} 个特征点", features.keypoints.len());

        let db = VitalsDBBuilder::new(opts.conf_dir.clone()).open().await?;
        let mut result = db
            .search(&self.user, &features.descriptors, self.matching.ratio)
            .await?;
        if self.matching.count > 0 {
            result.truncate(self.matching.count);
        }

        print_result(&result, self)
    }
}

fn print_result(result: &[AlbumMatch], opts: &SearchCommand) -> Result<()> {
    match opts.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?)
        }
        OutputFormat::Table => {
            for m in result {
                println!(
                    "{}\t{}\t{} - {}",
                    m.matches_stat, m.album.catalog, m.album.artist, m.album.title
                );
            }
        }
    }
    Ok(())
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Table,
}

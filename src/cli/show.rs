use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::task::block_in_place;

use crate::cli::SubCommandExtend;
use crate::config::{Opts, SiftOptions};
use crate::extractor::FeatureExtractor;

#[derive(Parser, Debug, Clone)]
pub struct ShowCommand {
    #[command(flatten)]
    pub sift: SiftOptions,
    /// 图片路径
    pub image: PathBuf,
    /// 按查询图片的缩放宽度处理，默认按封面处理
    #[arg(long)]
    pub query: bool,
}

impl SubCommandExtend for ShowCommand {
    async fn run(&self, _opts: &Opts) -> Result<()> {
        let extractor = FeatureExtractor::from(&self.sift);
        let width = match self.query {
            true => extractor.query_resize_width(),
            false => extractor.resize_width(),
        };
        let features = block_in_place(|| extractor.detect_file(&self.image, Some(width)))?;

        println!("{}", serde_json::to_string_pretty(&features.keypoints)?);
        Ok(())
    }
}

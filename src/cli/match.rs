use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::task::block_in_place;

use crate::cli::SubCommandExtend;
use crate::config::{MatchOptions, Opts, SiftOptions};
use crate::extractor::FeatureExtractor;
use crate::matcher::count_good_matches;

#[derive(Parser, Debug, Clone)]
pub struct MatchCommand {
    #[command(flatten)]
    pub sift: SiftOptions,
    #[command(flatten)]
    pub matching: MatchOptions,
    /// 专辑封面，按封面的缩放宽度处理
    pub cover: PathBuf,
    /// 查询照片，按查询图片的缩放宽度处理
    pub query: PathBuf,
}

impl SubCommandExtend for MatchCommand {
    async fn run(&self, _opts: &Opts) -> Result<()> {
        let extractor = FeatureExtractor::from(&self.sift);

        let (cover, query) = block_in_place(|| -> Result<_> {
            let cover = extractor.detect_file(&self.cover, Some(extractor.resize_width()))?;
            let query = extractor.detect_file(&self.query, Some(extractor.query_resize_width()))?;
            Ok((cover, query))
        })?;

        let good = count_good_matches(
            cover.descriptors.view(),
            query.descriptors.view(),
            self.matching.ratio,
        );

        println!("{}: {} keypoints", self.cover.display(), cover.keypoints.len());
        println!("{}: {} keypoints", self.query.display(), query.keypoints.len());
        println!("good matches: {}", good);

        Ok(())
    }
}

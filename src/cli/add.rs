use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use indicatif::{ParallelProgressIterator, ProgressBar};
use log::{info, warn};
use rayon::prelude::*;
use tokio::task::block_in_place;

use crate::VitalsDBBuilder;
use crate::cli::{SubCommandExtend, catalog_of, scan_images};
use crate::config::{Opts, SiftOptions};
use crate::db::NewAlbum;
use crate::extractor::FeatureExtractor;
use crate::utils::pb_style;

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    #[command(flatten)]
    pub sift: SiftOptions,
    /// 封面所在目录，文件名去掉扩展名后作为 catalog
    pub path: PathBuf,
    /// 专辑元数据，格式为 JSON 数组：
    /// `[{"catalog": "...", "title": "...", "artist": "...", "num_discs": 1}]`
    #[arg(short, long, verbatim_doc_comment)]
    pub metadata: PathBuf,
    /// 将专辑加入该用户的收藏，可以重复指定
    #[arg(short, long = "user", value_name = "NAME")]
    pub users: Vec<String>,
    /// 扫描的文件后缀名，多个后缀用逗号分隔
    #[arg(short, long, default_value = "jpg,jpeg,png,webp")]
    pub suffix: String,
    /// 封面未变化时也重新计算描述符
    #[arg(long)]
    pub overwrite: bool,
}

struct PendingCover {
    album: NewAlbum,
    data: Vec<u8>,
    hash: blake3::Hash,
}

impl SubCommandExtend for AddCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let metadata = tokio::fs::read_to_string(&self.metadata).await?;
        let mut metadata = serde_json::from_str::<Vec<NewAlbum>>(&metadata)?
            .into_iter()
            .map(|album| (album.catalog.clone(), album))
            .collect::<HashMap<_, _>>();

        let entries = scan_images(&self.path, &self.suffix)?;
        let db = VitalsDBBuilder::new(opts.conf_dir.clone()).open().await?;

        let mut catalogs = vec![];
        let mut pending = vec![];
        for entry in entries {
            let Some(album) = catalog_of(&entry).and_then(|catalog| metadata.remove(&catalog))
            else {
                warn!("没有找到专辑元数据，跳过: {}", entry.display());
                continue;
            };

            let data = tokio::fs::read(&entry).await?;
            let hash = blake3::hash(&data);
            catalogs.push(album.catalog.clone());

            if !self.overwrite && db.check_cover_hash(&album.catalog, hash.as_bytes()).await? {
                info!("封面未变化，跳过: {}", entry.display());
                db.add_album_metadata(&album).await?;
                continue;
            }
            pending.push(PendingCover {
                album,
                data,
                hash,
            });
        }

        let extractor = FeatureExtractor::from(&self.sift);
        let pb = ProgressBar::new(pending.len() as u64).with_style(pb_style());

        let features = block_in_place(|| {
            pending
                .par_iter()
                .progress_with(pb.clone())
                .map(|cover| extractor.detect_cover(&cover.data))
                .collect::<Vec<_>>()
        });

        let mut added = 0;
        for (cover, features) in pending.iter().zip(features) {
            match features {
                Ok(features) => {
                    db.add_album(&cover.album, cover.hash.as_bytes(), &features.descriptors)
                        .await?;
                    pb.set_message(cover.album.catalog.clone());
                    added += 1;
                }
                Err(e) => {
                    warn!("计算特征点失败 {}: {}", cover.album.catalog, e);
                    catalogs.retain(|catalog| catalog != &cover.album.catalog);
                }
            }
        }

        for user in &self.users {
            for catalog in &catalogs {
                db.add_to_collection(user, catalog).await?;
            }
        }

        pb.finish_with_message("专辑添加完成");
        info!("添加 {} 张专辑，{} 张未变化", added, catalogs.len() - added);

        Ok(())
    }
}

use std::collections::HashMap;
use std::time::Instant;

use log::{debug, error, info};
use rayon::prelude::*;
use tokio::task::block_in_place;

use crate::codec;
use crate::config::ConfDir;
use crate::db::*;
use crate::error::{Result, VitalsError};
use crate::matcher::rank_library;
use crate::matrix::{DescriptorMatrix, empty_descriptors};

pub struct VitalsDBBuilder {
    conf_dir: ConfDir,
}

impl VitalsDBBuilder {
    pub fn new(conf_dir: ConfDir) -> Self {
        Self { conf_dir }
    }

    pub async fn open(self) -> Result<VitalsDB> {
        let db = init_db(self.conf_dir.database()).await?;
        let total: i64 = crud::count_albums(&db).await?;
        info!("数据库中共有 {} 张专辑", total);
        Ok(VitalsDB { db })
    }
}

/// 专辑库，负责封面描述符的存取和用户收藏的匹配
pub struct VitalsDB {
    db: Database,
}

impl VitalsDB {
    pub fn pool(&self) -> &Database {
        &self.db
    }

    pub async fn add_user(&self, username: &str) -> Result<()> {
        crud::add_user(&self.db, username).await?;
        Ok(())
    }

    /// 检查封面是否已经处理过，用于跳过未修改的封面
    pub async fn check_cover_hash(&self, catalog: &str, hash: &[u8]) -> Result<bool> {
        Ok(crud::check_cover_hash(&self.db, catalog, hash).await?)
    }

    /// 添加或更新专辑，同时写入封面的哈希和描述符
    ///
    /// # Arguments
    ///
    /// * `album` - 专辑元数据
    /// * `cover_hash` - 封面文件的哈希
    /// * `descriptors` - 封面的描述符矩阵
    pub async fn add_album(
        &self,
        album: &NewAlbum,
        cover_hash: &[u8],
        descriptors: &DescriptorMatrix,
    ) -> Result<()> {
        let encoded = codec::encode(descriptors)?;

        let mut tx = self.db.begin().await?;
        crud::upsert_album(&mut *tx, album).await?;
        crud::set_descriptor(
            &mut *tx,
            &album.catalog,
            Some(cover_hash),
            Some(encoded.as_str()),
        )
        .await?;
        tx.commit().await?;

        debug!("添加专辑 {}: {} 个描述符", album.catalog, descriptors.nrows());
        Ok(())
    }

    /// 只写入专辑元数据，描述符留空
    pub async fn add_album_metadata(&self, album: &NewAlbum) -> Result<()> {
        crud::upsert_album(&self.db, album).await?;
        Ok(())
    }

    /// 将专辑加入用户收藏，用户不存在时自动创建
    pub async fn add_to_collection(&self, username: &str, catalog: &str) -> Result<()> {
        let mut tx = self.db.begin().await?;
        crud::add_user(&mut *tx, username).await?;
        crud::add_to_collection(&mut *tx, username, catalog).await?;
        tx.commit().await?;
        Ok(())
    }

    /// 读取专辑保存的描述符，没有描述符时返回 None
    pub async fn get_descriptors(&self, catalog: &str) -> Result<Option<DescriptorMatrix>> {
        match crud::get_album(&self.db, catalog).await? {
            Some(AlbumRecord {
                descriptor: Some(encoded),
                ..
            }) => {
                Ok(Some(decode_descriptor(catalog, &encoded)?))
            }
            _ => Ok(None),
        }
    }

    pub async fn count_albums(&self) -> Result<i64> {
        Ok(crud::count_albums(&self.db).await?)
    }

    /// 读取用户收藏的所有专辑及其描述符
    ///
    /// 尚未处理封面的专辑视为没有描述符，任何一个描述符损坏都会导致整个请求失败
    pub async fn load_library(&self, username: &str) -> Result<Vec<LibraryEntry>> {
        let records = crud::get_library(&self.db, username).await?;
        debug!("用户 {} 的收藏中有 {} 张专辑", username, records.len());

        records
            .into_iter()
            .map(|mut record| {
                let descriptor = match record.descriptor.take() {
                    Some(encoded) => decode_descriptor(&record.catalog, &encoded)?,
                    None => empty_descriptors(),
                };
                Ok(LibraryEntry {
                    album: record.into(),
                    descriptor,
                })
            })
            .collect()
    }

    /// 在用户收藏中搜索查询图片的描述符，按匹配数量降序返回
    ///
    /// 打分在 rayon 线程池中进行，需要多线程的 tokio 运行时
    ///
    /// # Arguments
    ///
    /// * `username` - 用户名
    /// * `query` - 查询图片的描述符
    /// * `ratio` - 比率测试阈值
    pub async fn search(
        &self,
        username: &str,
        query: &DescriptorMatrix,
        ratio: f32,
    ) -> Result<Vec<AlbumMatch>> {
        let library = self.load_library(username).await?;

        let start = Instant::now();
        let matches = block_in_place(|| rank_entries(query, &library, ratio));
        debug!(
            "匹配 {} 个描述符，{} 张专辑，耗时 {:.2}ms",
            query.nrows(),
            library.len(),
            start.elapsed().as_secs_f32() * 1000.
        );

        Ok(matches)
    }
}

/// 对已加载的收藏打分
pub fn rank_entries(
    query: &DescriptorMatrix,
    library: &[LibraryEntry],
    ratio: f32,
) -> Vec<AlbumMatch> {
    let albums = library
        .iter()
        .map(|entry| (entry.album.catalog.as_str(), &entry.album))
        .collect::<HashMap<_, _>>();

    let scores = rank_library(
        query,
        library
            .par_iter()
            .map(|entry| (&entry.album.catalog, &entry.descriptor)),
        ratio,
    );

    scores
        .into_iter()
        .filter_map(|(catalog, matches_stat)| {
            albums.get(catalog.as_str()).map(|&album| AlbumMatch {
                album: album.clone(),
                matches_stat,
            })
        })
        .collect()
}

fn decode_descriptor(catalog: &str, encoded: &str) -> Result<DescriptorMatrix> {
    codec::decode(encoded).map_err(|e| {
        error!("专辑 {} 的描述符损坏: {}", catalog, e);
        VitalsError::corrupt(format!("album {catalog}: {e}"))
    })
}

/// 生成把描述符写回 albums 表的 SQL 语句
pub fn descriptor_update_sql(catalog: &str, descriptors: &DescriptorMatrix) -> Result<String> {
    let encoded = codec::encode(descriptors)?;
    Ok(format!(
        "UPDATE albums SET descriptor = '{}' WHERE catalog = '{}' ;",
        encoded.replace('\'', "''"),
        catalog.replace('\'', "''"),
    ))
}

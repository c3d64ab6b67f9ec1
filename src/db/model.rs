use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::matrix::DescriptorMatrix;

/// 专辑记录，descriptor 为编码后的文本，封面尚未处理时为空
#[derive(Debug, Clone, FromRow)]
pub struct AlbumRecord {
    pub catalog: String,
    pub title: String,
    pub artist: String,
    pub num_discs: Option<i64>,
    pub album_cover_url: Option<String>,
    pub descriptor: Option<String>,
}

/// 对外展示的专辑信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Album {
    /// 唱片编号，专辑的唯一标识
    pub catalog: String,
    pub title: String,
    pub artist: String,
    pub num_discs: Option<i64>,
    pub album_cover_url: Option<String>,
}

impl From<AlbumRecord> for Album {
    fn from(record: AlbumRecord) -> Self {
        Self {
            catalog: record.catalog,
            title: record.title,
            artist: record.artist,
            num_discs: record.num_discs,
            album_cover_url: record.album_cover_url,
        }
    }
}

/// 添加专辑时使用的元数据，同时也是 `add --metadata` 文件的格式
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAlbum {
    pub catalog: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub num_discs: Option<i64>,
    #[serde(default)]
    pub discogs_release_id: Option<String>,
    #[serde(default)]
    pub album_cover_url: Option<String>,
}

/// 用户收藏中的一张专辑及其封面描述符
#[derive(Debug, Clone)]
pub struct LibraryEntry {
    pub album: Album,
    pub descriptor: DescriptorMatrix,
}

/// 一次匹配中某张专辑的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AlbumMatch {
    #[serde(flatten)]
    pub album: Album,
    /// 通过比率测试的特征点匹配数量
    pub matches_stat: usize,
}

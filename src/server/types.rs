use axum::body::Bytes;
use axum_typed_multipart::TryFromMultipart;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::AlbumMatch;

/// 匹配请求参数
#[derive(TryFromMultipart)]
pub struct QueryRequest {
    pub query: Option<Bytes>,
}

/// 匹配表单（用于API文档）
#[derive(Debug, ToSchema)]
#[allow(unused)]
pub struct QueryForm {
    /// 拍摄到专辑封面的照片
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub query: String,
}

/// 匹配响应
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QueryResponse {
    /// 用户收藏中的专辑，按匹配数量降序排列
    pub albums: Vec<AlbumMatch>,
}

/// 错误响应
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP 状态码
    pub status: u16,
    pub message: String,
}

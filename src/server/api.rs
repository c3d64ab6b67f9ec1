use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum_auth::AuthBearer;
use axum_typed_multipart::{TypedMultipart, TypedMultipartError};
use log::{debug, info};
use tokio::task::block_in_place;

use super::error::{AppError, Result};
use super::state::AppState;
use super::types::*;
use crate::error::VitalsError;
use crate::vitals::rank_entries;
use crate::{metrics, utils};

/// 发起请求的用户
pub struct CurrentUser(pub String);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = AuthBearer::from_request_parts(parts, state).await.ok();
        match state.resolve_user(token.as_ref().map(|AuthBearer(token)| token.as_str())) {
            Some(user) => Ok(CurrentUser(user.to_string())),
            None => Err(VitalsError::Unauthorized.into()),
        }
    }
}

/// 在当前用户的收藏中匹配一张照片
#[utoipa::path(
    post,
    path = "/query_album_match",
    request_body(content = QueryForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = QueryResponse),
        (status = 400, body = ErrorResponse),
        (status = 401, body = ErrorResponse),
        (status = 500, body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn query_album_match_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(username): CurrentUser,
    data: std::result::Result<TypedMultipart<QueryRequest>, TypedMultipartError>,
) -> Result<Json<QueryResponse>> {
    let data = data.map_err(|e| VitalsError::bad_image(format!("invalid form: {e}")))?;
    let bytes = match data.0.query {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return Err(VitalsError::bad_image("no query image provided").into()),
    };

    let start = Instant::now();

    info!("正在为用户 {} 匹配上传图片", username);

    let (size, features) = block_in_place(|| -> Result<_> {
        let image = utils::imdecode(&bytes)?;
        let size = (image.width(), image.height());
        let features =
            state.extractor.detect_image(image, Some(state.extractor.query_resize_width()));
        Ok((size, features))
    })?;

    let library = state.db.load_library(&username).await?;

    let mut albums =
        block_in_place(|| rank_entries(&features.descriptors, &library, state.matching.ratio));
    if state.matching.count > 0 {
        albums.truncate(state.matching.count);
    }

    let elapsed = start.elapsed().as_secs_f32();
    debug!("匹配完成，耗时 {:.2}ms", elapsed * 1000.);
    metrics::inc_query_count(size);
    metrics::observe_query_duration(size, elapsed);
    metrics::observe_top_score(size, albums.first().map_or(0, |m| m.matches_stat));

    Ok(Json(QueryResponse { albums }))
}

/// 导出 prometheus 指标
pub async fn metrics_handler() -> Result<String> {
    Ok(metrics::gather_text()?)
}

use sqlx::{Executor, Result, Sqlite, SqlitePool};

use super::{AlbumRecord, NewAlbum};

/// 添加用户，已存在时忽略
pub async fn add_user<'c, E>(executor: E, username: &str) -> Result<()>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO users (username) VALUES (?)
        ON CONFLICT (username) DO NOTHING
        "#,
    )
    .bind(username)
    .execute(executor)
    .await?;

    Ok(())
}

/// 添加或更新专辑信息，不修改已有的描述符
pub async fn upsert_album<'c, E>(executor: E, album: &NewAlbum) -> Result<()>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO albums (catalog, title, artist, num_discs, discogs_release_id, album_cover_url)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (catalog) DO UPDATE SET
            title = excluded.title,
            artist = excluded.artist,
            num_discs = excluded.num_discs,
            discogs_release_id = excluded.discogs_release_id,
            album_cover_url = excluded.album_cover_url
        "#,
    )
    .bind(&album.catalog)
    .bind(&album.title)
    .bind(&album.artist)
    .bind(album.num_discs)
    .bind(&album.discogs_release_id)
    .bind(&album.album_cover_url)
    .execute(executor)
    .await?;

    Ok(())
}

/// 设置专辑的封面哈希和描述符
pub async fn set_descriptor<'c, E>(
    executor: E,
    catalog: &str,
    cover_hash: Option<&[u8]>,
    descriptor: Option<&str>,
) -> Result<()>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r#"
        UPDATE albums SET cover_hash = ?, descriptor = ? WHERE catalog = ?
        "#,
    )
    .bind(cover_hash)
    .bind(descriptor)
    .bind(catalog)
    .execute(executor)
    .await?;

    Ok(())
}

/// 将专辑加入用户收藏
pub async fn add_to_collection<'c, E>(executor: E, username: &str, catalog: &str) -> Result<()>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO collections (username, catalog) VALUES (?, ?)
        ON CONFLICT (username, catalog) DO NOTHING
        "#,
    )
    .bind(username)
    .bind(catalog)
    .execute(executor)
    .await?;

    Ok(())
}

/// 检查专辑封面是否已经以相同的哈希处理过
pub async fn check_cover_hash(executor: &SqlitePool, catalog: &str, hash: &[u8]) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM albums
        WHERE catalog = ? AND cover_hash = ? AND descriptor IS NOT NULL
        "#,
    )
    .bind(catalog)
    .bind(hash)
    .fetch_one(executor)
    .await?;

    Ok(count > 0)
}

pub async fn get_album(executor: &SqlitePool, catalog: &str) -> Result<Option<AlbumRecord>> {
    sqlx::query_as(
        r#"
        SELECT catalog, title, artist, num_discs, album_cover_url, descriptor
        FROM albums WHERE catalog = ?
        "#,
    )
    .bind(catalog)
    .fetch_optional(executor)
    .await
}

/// 一次性读取用户收藏中的所有专辑，按 catalog 排序
pub async fn get_library(executor: &SqlitePool, username: &str) -> Result<Vec<AlbumRecord>> {
    sqlx::query_as(
        r#"
        SELECT A.catalog, A.title, A.artist, A.num_discs, A.album_cover_url, A.descriptor
        FROM collections C
        JOIN albums A ON A.catalog = C.catalog
        WHERE C.username = ?
        ORDER BY A.catalog
        "#,
    )
    .bind(username)
    .fetch_all(executor)
    .await
}

/// 查询数据库中的专辑数量
pub async fn count_albums(executor: &SqlitePool) -> Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM albums").fetch_one(executor).await
}

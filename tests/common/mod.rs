#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb, RgbImage, imageops};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const COVER_SIZE: u32 = 300;
/// 照片边长是封面的 1.5 倍，与查询图片的缩放宽度相对应
pub const PHOTO_SIZE: u32 = 450;
pub const PHOTO_OFFSET: i64 = 76;

/// 生成一张由渐变背景、矩形和圆形组成的合成封面
pub fn synthetic_cover(seed: u64) -> RgbImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let tint = [
        rng.random_range(0..128u32),
        rng.random_range(0..128u32),
        rng.random_range(0..128u32),
    ];
    let mut image = RgbImage::from_fn(COVER_SIZE, COVER_SIZE, |x, y| {
        Rgb([
            (tint[0] + x * 96 / COVER_SIZE) as u8,
            (tint[1] + y * 96 / COVER_SIZE) as u8,
            (tint[2] + (x + y) * 48 / COVER_SIZE) as u8,
        ])
    });

    for _ in 0..24 {
        let (x0, y0) = (
            rng.random_range(0..COVER_SIZE - 20),
            rng.random_range(0..COVER_SIZE - 20),
        );
        let (w, h) = (rng.random_range(8..70), rng.random_range(8..70));
        let color = Rgb([rng.random(), rng.random(), rng.random()]);
        for y in y0..(y0 + h).min(COVER_SIZE) {
            for x in x0..(x0 + w).min(COVER_SIZE) {
                image.put_pixel(x, y, color);
            }
        }
    }

    for _ in 0..12 {
        let (cx, cy) = (
            rng.random_range(0..COVER_SIZE) as i64,
            rng.random_range(0..COVER_SIZE) as i64,
        );
        let r = rng.random_range(6..36i64);
        let color = Rgb([rng.random(), rng.random(), rng.random()]);
        for y in (cy - r).max(0)..(cy + r).min(COVER_SIZE as i64) {
            for x in (cx - r).max(0)..(cx + r).min(COVER_SIZE as i64) {
                if (x - cx).pow(2) + (y - cy).pow(2) <= r * r {
                    image.put_pixel(x as u32, y as u32, color);
                }
            }
        }
    }

    image
}

/// 模拟拍摄的照片：封面放在一块更大的灰色背景中间
pub fn photo_of(cover: &RgbImage) -> RgbImage {
    let mut photo = RgbImage::from_pixel(PHOTO_SIZE, PHOTO_SIZE, Rgb([128, 128, 128]));
    imageops::overlay(&mut photo, cover, PHOTO_OFFSET, PHOTO_OFFSET);
    photo
}

pub fn png_bytes(image: &RgbImage) -> Vec<u8> {
    let mut bytes = vec![];
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
    bytes
}

pub fn write_png(dir: &Path, name: &str, image: &RgbImage) -> PathBuf {
    let path = dir.join(name);
    image.save_with_format(&path, ImageFormat::Png).unwrap();
    path
}

/// 库中的专辑编号，第一张是测试照片对应的专辑
pub const CATALOGS: [&str; 4] = ["SP-70040", "ST-2508", "TOCP-6510", "VIJL-60110"];

/// 在目录下写入所有合成封面，文件名为 `<catalog>.png`
pub fn write_covers(dir: &Path) -> Vec<PathBuf> {
    CATALOGS
        .iter()
        .enumerate()
        .map(|(i, catalog)| {
            write_png(
                dir,
                &format!("{catalog}.png"),
                &synthetic_cover(i as u64 + 1),
            )
        })
        .collect()
}

/// 第一张专辑封面的照片
pub fn write_query(dir: &Path) -> PathBuf {
    write_png(dir, "SP-70040.what-is-beat.png", &photo_of(&synthetic_cover(1)))
}

/// `add --metadata` 使用的专辑元数据
pub fn metadata_json() -> String {
    let albums = CATALOGS
        .iter()
        .enumerate()
        .map(|(i, catalog)| {
            serde_json::json!({
                "catalog": catalog,
                "title": format!("Album {i}"),
                "artist": format!("Artist {i}"),
                "num_discs": 1,
                "album_cover_url": format!("https://example.com/{catalog}.jpg"),
            })
        })
        .collect::<Vec<_>>();
    serde_json::to_string(&albums).unwrap()
}

mod add;
mod codegen;
mod r#match;
mod search;
pub mod server;
mod show;

use std::path::{Path, PathBuf};

pub use add::*;
pub use codegen::*;
pub use r#match::*;
pub use search::*;
pub use server::*;
pub use show::*;

use anyhow::Result;
use log::info;
use regex::Regex;
use walkdir::WalkDir;

use crate::config::Opts;

pub trait SubCommandExtend {
    fn run(&self, opts: &Opts) -> impl std::future::Future<Output = anyhow::Result<()>> + Send;
}

/// 扫描目录下符合后缀的图片，按文件名排序
///
/// # Arguments
///
/// * `path` - 图片所在目录
/// * `suffix` - 扫描的文件后缀名，多个后缀用逗号分隔
pub fn scan_images(path: impl AsRef<Path>, suffix: &str) -> Result<Vec<PathBuf>> {
    let re_suf = Regex::new(&format!("(?i)^({})$", suffix.replace(',', "|")))?;

    info!("开始扫描目录: {}", path.as_ref().display());
    let mut entries = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension().is_some_and(|ext| re_suf.is_match(&ext.to_string_lossy()))
        })
        .collect::<Vec<_>>();
    entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    info!("扫描完成，共 {} 张图片", entries.len());

    Ok(entries)
}

/// 封面文件名去掉最后一个扩展名即为 catalog
pub fn catalog_of(path: &Path) -> Option<String> {
    path.file_stem().map(|stem| stem.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_from_file_name() {
        assert_eq!(catalog_of(Path::new("/covers/SP-70040.png")).as_deref(), Some("SP-70040"));
        assert_eq!(
            catalog_of(Path::new("a/SP-70040.what-is-beat.png")).as_deref(),
            Some("SP-70040.what-is-beat")
        );
    }

    #[test]
    fn scan_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        for name in ["b.PNG", "a.jpg", "nested/c.png", "notes.txt", "d.png.bak"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let names = scan_images(dir.path(), "jpg,png")
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, ["a.jpg", "b.PNG", "c.png"]);
    }
}

use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use crate::cli::*;
use crate::matcher::RATIO_THRESHOLD;

static CONF_DIR: LazyLock<ConfDir> = LazyLock::new(|| {
    let proj_dirs = ProjectDirs::from("", "vitals", "vitals").expect("failed to get project dir");
    ConfDir {
        path: proj_dirs.config_dir().to_path_buf(),
    }
});

fn default_config_dir() -> &'static str {
    CONF_DIR.path().to_str().expect("config dir is valid utf-8")
}

/// 封面在库中的默认缩放宽度
pub const RESIZE_WIDTH: u32 = 150;

#[derive(Parser, Debug, Clone)]
pub struct SiftOptions {
    /// SIFT 特征点最大保留数量，0 表示不限制
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub sift_nfeatures: u32,
    /// 封面图片在提取特征前缩放到的宽度，0 表示不缩放
    #[arg(long, value_name = "WIDTH", default_value_t = RESIZE_WIDTH)]
    pub resize_width: u32,
    /// 查询图片在提取特征前缩放到的宽度，0 表示不缩放
    /// 默认假定专辑封面占查询图片的 2/3 左右
    #[arg(
        long,
        value_name = "WIDTH",
        default_value_t = RESIZE_WIDTH * 3 / 2,
        verbatim_doc_comment
    )]
    pub query_resize_width: u32,
}

impl Default for SiftOptions {
    fn default() -> Self {
        Self {
            sift_nfeatures: 0,
            resize_width: RESIZE_WIDTH,
            query_resize_width: RESIZE_WIDTH * 3 / 2,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct MatchOptions {
    /// 比率测试阈值，最近邻距离必须小于次近邻距离乘以该值
    #[arg(
        long,
        value_name = "RATIO",
        default_value_t = RATIO_THRESHOLD,
        value_parser = parse_ratio
    )]
    pub ratio: f32,
    /// 显示的结果数量，0 表示全部显示
    #[arg(long, value_name = "COUNT", default_value_t = 0)]
    pub count: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            ratio: RATIO_THRESHOLD,
            count: 0,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "vitals", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    /// vitals 配置文件目录
    #[arg(short, long, default_value = default_config_dir())]
    pub conf_dir: ConfDir,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 添加专辑封面到数据库
    Add(AddCommand),
    /// 在某个用户的收藏中搜索图片
    Search(SearchCommand),
    /// 比较两张图片的匹配数量
    Match(MatchCommand),
    /// 输出图片的特征点
    Show(ShowCommand),
    /// 生成设置封面描述符的 SQL 语句
    Codegen(CodegenCommand),
    /// 启动 HTTP 服务
    Server(ServerCommand),
}

#[derive(Debug, Clone)]
pub struct ConfDir {
    path: PathBuf,
}

impl ConfDir {
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// 返回数据库文件的路径
    pub fn database(&self) -> PathBuf {
        self.path.join("vitals.db")
    }
}

impl FromStr for ConfDir {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            path: PathBuf::from(s),
        })
    }
}

fn parse_ratio(s: &str) -> anyhow::Result<f32> {
    let ratio: f32 = s.parse()?;
    if !(0. ..=1.).contains(&ratio) {
        return Err(anyhow::anyhow!("比率必须在 0 到 1 之间: {}", s));
    }
    Ok(ratio)
}

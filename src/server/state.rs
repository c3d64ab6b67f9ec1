use std::collections::HashMap;
use std::sync::Arc;

use crate::VitalsDB;
use crate::cli::server::ServerCommand;
use crate::config::MatchOptions;
use crate::extractor::FeatureExtractor;

/// 应用状态
pub struct AppState {
    /// 专辑数据库
    pub db: VitalsDB,
    /// 查询图片的特征提取器
    pub extractor: FeatureExtractor,
    /// 匹配配置选项
    pub matching: MatchOptions,
    /// 鉴权 token 到用户名的映射
    pub tokens: HashMap<String, String>,
    /// 未携带 token 时使用的用户
    pub anonymous_user: Option<String>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(db: VitalsDB, opts: &ServerCommand) -> Arc<Self> {
        Arc::new(AppState {
            db,
            extractor: FeatureExtractor::from(&opts.sift),
            matching: opts.matching.clone(),
            tokens: opts
                .token
                .iter()
                .map(|(user, token)| (token.clone(), user.clone()))
                .collect(),
            anonymous_user: opts.anonymous_user.clone(),
        })
    }

    /// 根据 token 查找用户，找不到时退回匿名用户
    pub fn resolve_user(&self, token: Option<&str>) -> Option<&str> {
        token
            .and_then(|token| self.tokens.get(token))
            .or(self.anonymous_user.as_ref())
            .map(String::as_str)
    }
}

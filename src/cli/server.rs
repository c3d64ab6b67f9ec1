use clap::Parser;
use log::{info, warn};
use tokio::net::TcpListener;

use crate::cli::SubCommandExtend;
use crate::config::{MatchOptions, SiftOptions};
use crate::{Opts, VitalsDBBuilder, server};

#[derive(Parser, Debug, Clone)]
pub struct ServerCommand {
    #[command(flatten)]
    pub sift: SiftOptions,
    #[command(flatten)]
    pub matching: MatchOptions,
    /// 监听地址
    #[arg(long, default_value = "127.0.0.1:8000")]
    pub addr: String,
    /// 请求验证 token，格式为 username:token，可以重复指定
    #[arg(long, value_name = "USER:TOKEN", value_parser = parse_token)]
    pub token: Vec<(String, String)>,
    /// 未携带有效 token 的请求视为该用户
    #[arg(long, value_name = "NAME")]
    pub anonymous_user: Option<String>,
}

impl SubCommandExtend for ServerCommand {
    async fn run(&self, opts: &Opts) -> anyhow::Result<()> {
        let db = VitalsDBBuilder::new(opts.conf_dir.clone()).open().await?;

        if self.token.is_empty() && self.anonymous_user.is_none() {
            warn!("没有设置 token 或匿名用户，所有请求都将被拒绝");
        }

        // 创建应用状态
        let state = server::AppState::new(db, self);

        // 创建应用
        let app = server::create_app(state);

        // 启动服务器
        info!("服务器启动：http://{}", &self.addr);
        let listener = TcpListener::bind(&self.addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

fn parse_token(s: &str) -> anyhow::Result<(String, String)> {
    match s.split_once(':') {
        Some((user, token)) if !user.is_empty() && !token.is_empty() => {
            Ok((user.to_string(), token.to_string()))
        }
        _ => Err(anyhow::anyhow!("token 格式应为 username:token: {}", s)),
    }
}

//! Gallery Host CLI
//!
//! 无界面宿主：加载配置和图集目录，按固定帧率驱动 gallery-runtime 执行脚本会话，
//! 并把阶段变化写入日志。

mod config;
mod session;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use gallery_runtime::{Catalog, Gallery};
use tracing::info;

use config::AppConfig;
use session::{Session, SessionRunner};

/// 命令行参数（优先级高于配置文件）
#[derive(Parser, Debug)]
#[command(name = "host-cli", version, about = "照片画廊过渡编排的无界面宿主")]
struct Cli {
    /// 配置文件路径
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// 图集目录 JSON
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// 脚本会话 JSON（示例见 host-cli/assets/session.json）；未指定时运行内置演示
    #[arg(long)]
    session: Option<PathBuf>,

    /// 模拟帧率
    #[arg(long)]
    fps: Option<u32>,

    /// 日志级别
    #[arg(long)]
    log_level: Option<String>,

    /// 网格散布随机种子
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    /// 命令行参数覆盖配置文件
    fn apply(self, config: &mut AppConfig) {
        if let Some(catalog) = self.catalog {
            config.catalog_path = Some(catalog);
        }
        if let Some(session) = self.session {
            config.session_path = Some(session);
        }
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone();
    let config_found = config_path.exists();

    let mut config = AppConfig::load(&config_path)?;
    cli.apply(&mut config);
    config.validate()?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_filter()?)
        .with_target(false)
        .init();

    if config_found {
        info!(path = ?config_path, "配置文件加载成功");
    } else {
        info!(path = ?config_path, "配置文件不存在，使用默认配置");
    }

    let catalog = load_catalog(&config)?;
    info!(sets = catalog.len(), "图集目录已加载");

    let session = match &config.session_path {
        Some(path) => Session::load(path)?,
        None => Session::demo(&catalog),
    };
    info!(actions = session.actions.len(), fps = config.fps, "开始会话");

    let mut gallery = Gallery::new(catalog, config.gallery_config());
    let report = SessionRunner::new(&mut gallery, config.frame_dt()).run(&session);

    info!(
        frames = report.frames,
        phase_changes = report.phase_changes,
        rejected = report.rejected,
        settled = gallery.is_settled(),
        "会话结束"
    );
    let snapshot = serde_json::to_string_pretty(&gallery.snapshot())?;
    println!("{snapshot}");

    Ok(())
}

fn load_catalog(config: &AppConfig) -> anyhow::Result<Catalog> {
    match &config.catalog_path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("无法读取图集目录 {:?}", path))?;
            Catalog::from_json_str(&json).with_context(|| format!("图集目录 {:?} 无效", path))
        }
        None => Catalog::builtin().context("内置图集目录无效"),
    }
}

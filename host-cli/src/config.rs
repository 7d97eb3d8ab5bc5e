//! # Config 模块
//!
//! 宿主配置管理。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::{Path, PathBuf};

use gallery_runtime::{GalleryConfig, LayoutConfig, Size, TimingTable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 宿主配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 图集目录 JSON 路径；未配置时使用内置目录
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// 脚本会话 JSON 路径；未配置时运行内置演示会话
    #[serde(default)]
    pub session_path: Option<PathBuf>,

    /// 模拟帧率
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// 日志级别（trace / debug / info / warn / error）
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// 视口尺寸
    #[serde(default = "default_viewport")]
    pub viewport: Size,

    /// 网格散布随机种子
    #[serde(default)]
    pub seed: Option<u64>,

    /// 浮动岛品牌文字
    #[serde(default = "default_brand")]
    pub brand: String,

    /// 时间表覆盖
    #[serde(default)]
    pub timing: TimingTable,

    /// 布局覆盖（`viewport` 以顶层字段为准）
    #[serde(default)]
    pub layout: LayoutConfig,
}

// 默认值函数
fn default_fps() -> u32 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_viewport() -> Size {
    Size::new(1440.0, 900.0)
}

fn default_brand() -> String {
    "komplete.chaos".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            session_path: None,
            fps: default_fps(),
            log_level: default_log_level(),
            viewport: default_viewport(),
            seed: None,
            brand: default_brand(),
            timing: TimingTable::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl AppConfig {
    /// 加载配置文件
    ///
    /// 文件不存在时返回默认配置；存在但无法读取或解析时返回错误。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialization(e.to_string()))?;
        fs::write(path, json).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 {
            return Err(ConfigError::Validation("fps 必须大于 0".to_string()));
        }

        if self.viewport.width <= 0.0 || self.viewport.height <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "视口尺寸无效: {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }

        self.log_filter()?;

        if let Some(path) = &self.catalog_path {
            if !path.exists() {
                return Err(ConfigError::Validation(format!(
                    "图集目录文件不存在: {:?}",
                    path
                )));
            }
        }

        if let Some(path) = &self.session_path {
            if !path.exists() {
                return Err(ConfigError::Validation(format!(
                    "会话文件不存在: {:?}",
                    path
                )));
            }
        }

        Ok(())
    }

    /// 解析日志级别
    pub fn log_filter(&self) -> Result<tracing::Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::Validation(format!("未知的日志级别: {}", self.log_level)))
    }

    /// 每帧时长（秒）
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.fps.max(1) as f32
    }

    /// 构建运行时配置
    pub fn gallery_config(&self) -> GalleryConfig {
        let mut layout = self.layout.clone();
        layout.viewport = self.viewport;
        GalleryConfig {
            timing: self.timing.clone(),
            layout,
            seed: self.seed,
            brand: self.brand.clone(),
        }
    }
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    Serialization(String),

    /// 读写失败
    #[error("配置 IO 错误 {path:?}: {message}")]
    Io { path: PathBuf, message: String },

    /// JSON 解析失败
    #[error("配置文件 {path:?} 解析失败: {message}")]
    Parse { path: PathBuf, message: String },

    /// 验证失败
    #[error("配置验证失败: {0}")]
    Validation(String),
}

//! # Error 模块
//!
//! 定义 gallery-runtime 中使用的错误类型。
//!
//! 过渡编排中的失败（锚点缺失、重入、中断）都在本地静默处理，
//! 只以 [`AbortReason`] 的形式写入日志，不会冒泡给调用方。

use thiserror::Error;

/// 图集目录错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// JSON 解析失败
    #[error("图集 JSON 解析失败: {message}")]
    Parse { message: String },

    /// 图集没有任何照片
    #[error("图集 '{set_id}' 的照片列表为空")]
    EmptySet { set_id: String },

    /// 图集 ID 重复
    #[error("图集 ID '{set_id}' 重复")]
    DuplicateSet { set_id: String },

    /// 同一图集内照片 ID 重复
    #[error("图集 '{set_id}' 中照片 ID '{photo_id}' 重复")]
    DuplicatePhoto { set_id: String, photo_id: String },
}

/// 过渡中止原因
///
/// 编排器遇到这些情况时放弃当前步骤，并把共享状态恢复到安全的空闲值。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AbortReason {
    /// 过渡所需的场景锚点不存在
    #[error("锚点 {anchor} 不存在或未挂载")]
    MissingAnchor { anchor: String },

    /// 已有过渡在进行
    #[error("过渡进行中，忽略重入调用")]
    Reentrant,

    /// 目录中不存在该图集
    #[error("图集 '{set_id}' 不存在")]
    UnknownSet { set_id: String },

    /// 动画被取消或覆盖
    #[error("动画被中断")]
    Interrupted,
}

impl AbortReason {
    /// 由锚点构造 MissingAnchor
    pub fn missing(anchor: &impl std::fmt::Display) -> Self {
        Self::MissingAnchor {
            anchor: anchor.to_string(),
        }
    }
}

/// gallery-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GalleryError {
    /// 目录错误
    #[error("目录错误: {0}")]
    Catalog(#[from] CatalogError),

    /// 过渡中止
    #[error("过渡中止: {0}")]
    Abort(#[from] AbortReason),
}

/// Result 类型别名
pub type GalleryResult<T> = Result<T, GalleryError>;

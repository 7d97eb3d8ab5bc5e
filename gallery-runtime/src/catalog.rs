//! # Catalog 模块
//!
//! 只读的图集目录。
//!
//! 目录数据在整个运行期间保持不变，核心只通过以下接口读取：
//! - [`Catalog::all_sets`]：按展示顺序返回全部图集
//! - [`Catalog::get_set`]：按 ID 查找图集
//! - [`PhotoSet::preview_photo`]：图集的预览照片

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// 图集 ID
pub type SetId = String;

/// 照片 ID
pub type PhotoId = String;

/// 内置示例目录
const BUILTIN_CATALOG: &str = include_str!("../assets/catalog.json");

/// 单张照片
///
/// `x`/`y`/`width`/`height`/`rotation`/`scale` 是可选的布局覆盖值，
/// 缺省时由网格使用默认布局。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: PhotoId,
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
}

impl Photo {
    /// 创建没有布局覆盖的照片
    pub fn new(id: impl Into<PhotoId>, src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            src: src.into(),
            alt: alt.into(),
            x: None,
            y: None,
            width: None,
            height: None,
            rotation: None,
            scale: None,
        }
    }
}

/// 图集
///
/// 第一张照片是 hero，其余照片组成详情网格。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoSet {
    pub id: SetId,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub accent: String,
    pub photos: Vec<Photo>,
    /// 指定的预览照片（可选）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_photo_id: Option<PhotoId>,
}

impl PhotoSet {
    /// hero 照片（序列中的第一张）
    pub fn hero(&self) -> Option<&Photo> {
        self.photos.first()
    }

    /// 预览照片
    ///
    /// 指定了 `preview_photo_id` 且该照片存在时返回它，否则回退到第一张。
    pub fn preview_photo(&self) -> Option<&Photo> {
        self.preview_photo_id
            .as_ref()
            .and_then(|id| self.photos.iter().find(|p| &p.id == id))
            .or_else(|| self.photos.first())
    }

    /// 详情网格中的照片（除 hero 以外的全部照片）
    pub fn detail_photos(&self) -> &[Photo] {
        self.photos.get(1..).unwrap_or(&[])
    }
}

/// 图集的预览照片，见 [`PhotoSet::preview_photo`]
pub fn preview_photo(set: &PhotoSet) -> Option<&Photo> {
    set.preview_photo()
}

/// 图集目录
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    sets: Vec<PhotoSet>,
}

impl Catalog {
    /// 从图集列表创建目录（会做校验）
    pub fn new(sets: Vec<PhotoSet>) -> Result<Self, CatalogError> {
        let catalog = Self { sets };
        catalog.validate()?;
        Ok(catalog)
    }

    /// 从 JSON 数组解析目录
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let sets: Vec<PhotoSet> =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse {
                message: e.to_string(),
            })?;
        Self::new(sets)
    }

    /// 内置示例目录
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    /// 校验目录
    ///
    /// - 每个图集至少有一张照片
    /// - 图集 ID 唯一
    /// - 同一图集内照片 ID 唯一
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen_sets = HashSet::new();
        for set in &self.sets {
            if !seen_sets.insert(set.id.as_str()) {
                return Err(CatalogError::DuplicateSet {
                    set_id: set.id.clone(),
                });
            }
            if set.photos.is_empty() {
                return Err(CatalogError::EmptySet {
                    set_id: set.id.clone(),
                });
            }
            let mut seen_photos = HashSet::new();
            for photo in &set.photos {
                if !seen_photos.insert(photo.id.as_str()) {
                    return Err(CatalogError::DuplicatePhoto {
                        set_id: set.id.clone(),
                        photo_id: photo.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// 按展示顺序返回全部图集
    pub fn all_sets(&self) -> &[PhotoSet] {
        &self.sets
    }

    /// 按 ID 查找图集
    pub fn get_set(&self, id: &str) -> Option<&PhotoSet> {
        self.sets.iter().find(|s| s.id == id)
    }

    /// 图集在展示顺序中的位置
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.sets.iter().position(|s| s.id == id)
    }

    /// 图集数量
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// 目录是否为空
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

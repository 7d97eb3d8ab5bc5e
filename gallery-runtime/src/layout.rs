//! # Layout 模块
//!
//! 布局度量：轮播项、浮动岛、网格照片在视口中的自然盒。
//!
//! 这里只描述"元素停在哪里"，动画过程中的偏移由场景的内联样式叠加。

use serde::{Deserialize, Serialize};

use crate::catalog::Photo;
use crate::geometry::{Rect, Size};

/// 浮动岛的内容模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IslandMode {
    /// 品牌标签
    Home,
    /// 关闭按钮 + hero 槽位 + 标题
    Set,
}

/// 布局配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// 初始视口尺寸
    pub viewport: Size,
    /// 轮播项宽度
    pub item_width: f32,
    /// 预览框高度
    pub preview_height: f32,
    /// 预览下方标题区高度
    pub meta_height: f32,
    /// 轮播项间距
    pub item_gap: f32,
    /// 预览框圆角
    pub preview_radius: f32,
    /// 预览框阴影强度
    pub preview_shadow: f32,
    /// 浮动岛距视口顶部的距离
    pub island_top: f32,
    pub island_home: Size,
    pub island_set: Size,
    /// hero 槽位边长
    pub hero_slot: f32,
    /// hero 图片圆角
    pub hero_radius: f32,
    /// 照片没有指定尺寸时的默认尺寸
    pub grid_item: Size,
    pub hover_label: Size,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            viewport: Size::new(1440.0, 900.0),
            item_width: 420.0,
            preview_height: 560.0,
            meta_height: 72.0,
            item_gap: 64.0,
            preview_radius: 18.0,
            preview_shadow: 1.0,
            island_top: 24.0,
            island_home: Size::new(140.0, 44.0),
            island_set: Size::new(360.0, 56.0),
            hero_slot: 40.0,
            hero_radius: 6.0,
            grid_item: Size::new(300.0, 240.0),
            hover_label: Size::new(220.0, 48.0),
        }
    }
}

impl LayoutConfig {
    // ========== 轮播 ==========

    pub fn item_height(&self) -> f32 {
        self.preview_height + self.meta_height
    }

    /// 相邻两项左边缘之间的距离
    pub fn item_pitch(&self) -> f32 {
        self.item_width + self.item_gap
    }

    /// 轨道在视口中的自然盒（垂直居中）
    pub fn track_rect(&self, count: usize, viewport: Size) -> Rect {
        let width = if count == 0 {
            0.0
        } else {
            self.item_pitch() * count as f32 - self.item_gap
        };
        let height = self.item_height();
        Rect::new(0.0, (viewport.height - height) / 2.0, width, height)
    }

    /// 第 `index` 项相对轨道的自然盒
    pub fn item_rect(&self, index: usize) -> Rect {
        Rect::new(
            self.item_pitch() * index as f32,
            0.0,
            self.item_width,
            self.item_height(),
        )
    }

    /// 预览按钮 / 预览框相对轮播项的自然盒
    pub fn preview_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.item_width, self.preview_height)
    }

    /// 标题区相对轮播项的自然盒
    pub fn meta_rect(&self) -> Rect {
        Rect::new(0.0, self.preview_height, self.item_width, self.meta_height)
    }

    /// 让第 `index` 项居中时轨道的水平平移
    ///
    /// `index` 会被限制在 `[0, count - 1]`；没有任何项时返回 0。
    pub fn track_x_for_index(&self, index: usize, count: usize, viewport: Size) -> f32 {
        if count == 0 {
            return 0.0;
        }
        let index = index.min(count - 1);
        let item_center = self.item_rect(index).center().x;
        -(item_center - viewport.width / 2.0)
    }

    // ========== 浮动岛 ==========

    pub fn island_size(&self, mode: IslandMode) -> Size {
        match mode {
            IslandMode::Home => self.island_home,
            IslandMode::Set => self.island_set,
        }
    }

    /// 浮动岛在视口中的自然盒（水平居中）
    pub fn island_rect(&self, mode: IslandMode, viewport: Size) -> Rect {
        let size = self.island_size(mode);
        Rect::new(
            (viewport.width - size.width) / 2.0,
            self.island_top,
            size.width,
            size.height,
        )
    }

    pub fn island_close_button_rect(&self) -> Rect {
        let side = 32.0;
        Rect::new(8.0, (self.island_set.height - side) / 2.0, side, side)
    }

    pub fn island_preview_wrapper_rect(&self) -> Rect {
        Rect::new(
            44.0,
            (self.island_set.height - self.hero_slot) / 2.0,
            self.hero_slot,
            self.hero_slot,
        )
    }

    /// hero 槽位 / hero 图片相对父级的自然盒
    pub fn hero_slot_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.hero_slot, self.hero_slot)
    }

    pub fn island_title_rect(&self) -> Rect {
        let left = 44.0 + self.hero_slot + 8.0;
        let height = 24.0;
        Rect::new(
            left,
            (self.island_set.height - height) / 2.0,
            (self.island_set.width - left - 8.0).max(0.0),
            height,
        )
    }

    // ========== 网格 ==========

    /// 照片在网格中的自然盒
    ///
    /// 照片没有指定尺寸时使用默认尺寸；没有指定位置时在视口中居中。
    pub fn grid_item_rect(&self, photo: &Photo, viewport: Size) -> Rect {
        let width = photo.width.unwrap_or(self.grid_item.width);
        let height = photo.height.unwrap_or(self.grid_item.height);
        let x = photo.x.unwrap_or((viewport.width - width) / 2.0);
        let y = photo.y.unwrap_or((viewport.height - height) / 2.0);
        Rect::new(x, y, width, height)
    }
}

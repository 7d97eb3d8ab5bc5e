//! # Geometry 模块
//!
//! 视口坐标系下的几何类型：点、尺寸、矩形，以及 FLIP 使用的盒快照。
//!
//! 坐标原点在视口左上角，x 向右，y 向下，单位为逻辑像素。

use serde::{Deserialize, Serialize};

/// 二维向量
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// 创建新的向量
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// 零向量
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// 线性插值
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: lerp(self.x, other.x, t),
            y: lerp(self.y, other.y, t),
        }
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// 尺寸
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// 两个尺寸在任一方向上的差值是否超过阈值
    pub fn differs_from(&self, other: &Size, threshold: f32) -> bool {
        (self.width - other.width).abs() > threshold
            || (self.height - other.height).abs() > threshold
    }
}

/// 轴对齐矩形
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// 以原点和尺寸构造
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// 平移
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// 以中心为原点缩放
    pub fn scale_about_center(&self, scale: f32) -> Self {
        let c = self.center();
        let w = self.width * scale;
        let h = self.height * scale;
        Self::new(c.x - w / 2.0, c.y - h / 2.0, w, h)
    }

    /// 点是否落在矩形内（含边界）
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// 点在矩形内的归一化坐标，结果限制在 [0, 1]
    ///
    /// 退化矩形（宽或高不为正）返回 `None`。
    pub fn normalized(&self, point: Vec2) -> Option<Vec2> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some(Vec2::new(
            ((point.x - self.x) / self.width).clamp(0.0, 1.0),
            ((point.y - self.y) / self.height).clamp(0.0, 1.0),
        ))
    }

    /// 水平方向上是否与 `[left - margin, right + margin]` 区间相交
    pub fn overlaps_horizontally(&self, left: f32, right: f32, margin: f32) -> bool {
        self.right() > left - margin && self.left() < right + margin
    }

    /// 线性插值
    pub fn lerp(&self, other: &Rect, t: f32) -> Self {
        Self::new(
            lerp(self.x, other.x, t),
            lerp(self.y, other.y, t),
            lerp(self.width, other.width, t),
            lerp(self.height, other.height, t),
        )
    }

    /// 与另一个矩形是否在误差范围内相等
    pub fn approx_eq(&self, other: &Rect, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.width - other.width).abs() <= epsilon
            && (self.height - other.height).abs() <= epsilon
    }
}

/// 捕获盒快照时需要额外读取的样式属性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureProps {
    pub border_radius: bool,
    pub shadow: bool,
}

impl CaptureProps {
    /// 只捕获盒
    pub const BOX: Self = Self {
        border_radius: false,
        shadow: false,
    };

    /// 捕获盒以及圆角、阴影
    pub const STYLE: Self = Self {
        border_radius: true,
        shadow: true,
    };
}

/// 盒快照
///
/// FLIP 的 "First"：元素在某一时刻的视口坐标盒和选定样式。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSnapshot {
    pub rect: Rect,
    pub border_radius: Option<f32>,
    pub shadow: Option<f32>,
}

impl BoxSnapshot {
    /// 只有盒没有样式的快照
    pub fn of_rect(rect: Rect) -> Self {
        Self {
            rect,
            border_radius: None,
            shadow: None,
        }
    }
}

/// 标量线性插值
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// 视差倾斜角
///
/// `normalized` 是指针在预览框内的归一化位置。返回 `(rotation_x, rotation_y)`（度）：
/// 靠近上沿时上沿抬起，靠近左沿时左沿抬起。
pub fn tilt_for(normalized: Vec2, max_tilt: f32) -> (f32, f32) {
    let rotation_x = lerp(-max_tilt, max_tilt, normalized.y);
    let rotation_y = lerp(max_tilt, -max_tilt, normalized.x);
    (rotation_x, rotation_y)
}

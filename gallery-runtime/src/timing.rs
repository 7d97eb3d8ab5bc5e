//! # Timing 模块
//!
//! 统一的时间参数表：所有动画时长、缓动、错开、延迟和兜底计时器都在这里。
//!
//! 每个分组都可以从配置文件中部分覆盖，缺失的字段使用默认值：
//!
//! ```json
//! { "grid": { "safety_timeout": 3.0 } }
//! ```

use serde::{Deserialize, Serialize};

use crate::animation::EasingFunction;

/// 时间参数表
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingTable {
    pub carousel: CarouselTiming,
    pub parallax: ParallaxTiming,
    pub open: OpenTiming,
    pub grid: GridTiming,
    pub close: CloseTiming,
    pub island: IslandTiming,
    pub hover_label: HoverLabelTiming,
}

/// 轮播切换
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselTiming {
    /// 轨道平移时长（秒）
    pub step_duration: f32,
    pub step_easing: EasingFunction,
    /// 居中预览的缩放
    pub active_scale: f32,
    /// 其余预览的缩放
    pub inactive_scale: f32,
    /// 预览图片的基础放大倍数
    pub image_zoom: f32,
    /// 手势判定阈值（px）
    pub gesture_tolerance: f32,
}

impl Default for CarouselTiming {
    fn default() -> Self {
        Self {
            step_duration: 0.85,
            step_easing: EasingFunction::EaseInOutQuad,
            active_scale: 1.0,
            inactive_scale: 0.8,
            image_zoom: 1.1,
            gesture_tolerance: 12.0,
        }
    }
}

/// 悬停视差
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxTiming {
    pub duration: f32,
    pub easing: EasingFunction,
    /// 最大倾斜角（度）
    pub max_tilt: f32,
    /// 悬停时的纵深（px）
    pub hover_z: f32,
}

impl Default for ParallaxTiming {
    fn default() -> Self {
        Self {
            duration: 0.25,
            easing: EasingFunction::EaseOutCubic,
            max_tilt: 6.0,
            hover_z: 22.0,
        }
    }
}

/// 打开序列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenTiming {
    /// 锁定脉冲：按下的缩放
    pub pulse_scale: f32,
    pub pulse_down: f32,
    pub pulse_up: f32,
    pub pulse_easing: EasingFunction,
    /// 标题文字下沉淡出
    pub meta_duration: f32,
    pub meta_easing: EasingFunction,
    pub meta_offset_y: f32,
    /// 邻居滑出
    pub neighbor_duration: f32,
    pub neighbor_easing: EasingFunction,
    /// 邻居滑出时在视口宽度之外额外移动的距离（px）
    pub offscreen_margin: f32,
    /// 主时间轴的最短保持时间
    pub hold: f32,
    /// 代理飞向 hero 槽位
    pub flip_duration: f32,
    pub flip_easing: EasingFunction,
}

impl Default for OpenTiming {
    fn default() -> Self {
        Self {
            pulse_scale: 0.985,
            pulse_down: 0.08,
            pulse_up: 0.22,
            pulse_easing: EasingFunction::EaseOutQuad,
            meta_duration: 0.4,
            meta_easing: EasingFunction::EaseInQuad,
            meta_offset_y: 20.0,
            neighbor_duration: 0.55,
            neighbor_easing: EasingFunction::EaseInOutCubic,
            offscreen_margin: 80.0,
            hold: 0.55,
            flip_duration: 0.9,
            flip_easing: EasingFunction::EaseInOutCubic,
        }
    }
}

/// 详情网格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridTiming {
    pub entrance_duration: f32,
    pub entrance_easing: EasingFunction,
    pub entrance_stagger: f32,
    pub entrance_delay: f32,
    /// 散落起点在视口底部之下的距离（px）
    pub offscreen_below: f32,
    /// 随机旋转范围（度，±）
    pub max_rotation: f32,
    /// 透明度兜底计时器（秒）
    pub safety_timeout: f32,
    pub exit_duration: f32,
    pub exit_easing: EasingFunction,
    pub exit_stagger: f32,
}

impl Default for GridTiming {
    fn default() -> Self {
        Self {
            entrance_duration: 0.85,
            entrance_easing: EasingFunction::EaseOutCubic,
            entrance_stagger: 0.03,
            entrance_delay: 0.85,
            offscreen_below: 200.0,
            max_rotation: 15.0,
            safety_timeout: 2.2,
            exit_duration: 0.5,
            exit_easing: EasingFunction::EaseInCubic,
            exit_stagger: 0.01,
        }
    }
}

/// 关闭序列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloseTiming {
    /// 邻居判定时视口两侧的额外范围（px）
    pub neighbor_margin: f32,
    pub flip_duration: f32,
    pub flip_easing: EasingFunction,
    pub neighbors_duration: f32,
    pub neighbors_delay: f32,
    pub neighbors_easing: EasingFunction,
    pub meta_duration: f32,
    pub meta_delay: f32,
    pub meta_easing: EasingFunction,
    /// 视差重新启用的兜底计时器（秒）
    pub parallax_fallback: f32,
}

impl Default for CloseTiming {
    fn default() -> Self {
        Self {
            neighbor_margin: 100.0,
            flip_duration: 0.9,
            flip_easing: EasingFunction::EaseInOutCubic,
            neighbors_duration: 0.9,
            neighbors_delay: 0.2,
            neighbors_easing: EasingFunction::EaseInOutCubic,
            meta_duration: 0.6,
            meta_delay: 0.5,
            meta_easing: EasingFunction::EaseOutCubic,
            parallax_fallback: 1.6,
        }
    }
}

/// 浮动岛
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandTiming {
    pub resize_duration: f32,
    pub resize_easing: EasingFunction,
    /// 尺寸变化超过该值才播放缩放动画（px）
    pub resize_threshold: f32,
    pub enter_duration: f32,
    pub enter_easing: EasingFunction,
    pub enter_stagger: f32,
    pub enter_delay: f32,
    /// 入场 / 退场的纵向位移（px）
    pub offset_y: f32,
    /// 入场 / 退场的模糊半径（px）
    pub blur: f32,
    pub wrapper_exit_duration: f32,
    pub wrapper_exit_easing: EasingFunction,
    /// 文字退场在时间轴上的开始时间（秒）
    pub text_exit_at: f32,
    pub text_exit_duration: f32,
    pub text_exit_easing: EasingFunction,
    pub text_exit_stagger: f32,
}

impl Default for IslandTiming {
    fn default() -> Self {
        Self {
            resize_duration: 0.55,
            resize_easing: EasingFunction::EaseInOutCubic,
            resize_threshold: 0.5,
            enter_duration: 0.48,
            enter_easing: EasingFunction::EaseOutCubic,
            enter_stagger: 0.04,
            enter_delay: 0.08,
            offset_y: 10.0,
            blur: 10.0,
            wrapper_exit_duration: 0.18,
            wrapper_exit_easing: EasingFunction::EaseOutQuad,
            text_exit_at: 0.5,
            text_exit_duration: 0.48,
            text_exit_easing: EasingFunction::EaseInCubic,
            text_exit_stagger: 0.04,
        }
    }
}

/// 悬停标签
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverLabelTiming {
    pub show_duration: f32,
    pub show_easing: EasingFunction,
    pub hide_duration: f32,
    pub hide_easing: EasingFunction,
    /// 隐藏状态的缩放
    pub hidden_scale: f32,
    /// 标签在光标下方的距离（px）
    pub offset_y: f32,
}

impl Default for HoverLabelTiming {
    fn default() -> Self {
        Self {
            show_duration: 0.35,
            show_easing: EasingFunction::EaseOutBack,
            hide_duration: 0.25,
            hide_easing: EasingFunction::EaseInBack,
            hidden_scale: 0.5,
            offset_y: 16.0,
        }
    }
}

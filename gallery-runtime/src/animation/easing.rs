//! # Easing 模块
//!
//! 缓动函数库，用于动画的时间插值。
//!
//! 命名沿用常见的 Quad/Cubic 体系：`power2` 对应 Quad，`power3` 对应 Cubic。

use serde::{Deserialize, Serialize};

/// back 缓动的过冲系数
const BACK_OVERSHOOT: f32 = 1.7;

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// 线性（匀速）
    Linear,
    /// 二次缓入
    EaseInQuad,
    /// 二次缓出
    #[default]
    EaseOutQuad,
    /// 二次缓入缓出
    EaseInOutQuad,
    /// 三次缓入
    EaseInCubic,
    /// 三次缓出
    EaseOutCubic,
    /// 三次缓入缓出
    EaseInOutCubic,
    /// 回弹缓入（先向反方向退一点）
    EaseInBack,
    /// 回弹缓出（越过终点再回来）
    EaseOutBack,
}

impl EasingFunction {
    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度 (0.0 - 1.0)
    ///
    /// # 返回
    /// - 缓动后的进度值；back 类缓动可能略微超出 [0, 1]
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseInQuad => t * t,
            EasingFunction::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            EasingFunction::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            EasingFunction::EaseInCubic => t * t * t,
            EasingFunction::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            EasingFunction::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            EasingFunction::EaseInBack => ease_in_back(t),
            EasingFunction::EaseOutBack => 1.0 - ease_in_back(1.0 - t),
        }
    }
}

/// 回弹缓入
fn ease_in_back(t: f32) -> f32 {
    let c3 = BACK_OVERSHOOT + 1.0;
    c3 * t * t * t - BACK_OVERSHOOT * t * t
}

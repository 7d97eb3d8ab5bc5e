//! # Animation 模块
//!
//! 通用动画系统，负责把属性补间组合成时间轴并逐帧推进。
//!
//! ## 核心设计理念
//!
//! 动画系统只负责 **时间轴管理**：
//! - 知道某个锚点的某个属性从 A 到 B 需要在 duration 内变化
//! - 通过 `Animatable` 直接写入目标
//! - **不关心编排**：完成和中断以事件的形式交还给调用方
//!
//! ## 核心概念
//!
//! - `Timeline` / `Segment`: 分段、偏移、错开组合成的时间轴
//! - `Animator`: 动画原语 trait，`AnimationSystem` 是内置实现
//! - `AnimationEvent`: 按句柄分派的完成 / 中断事件
//! - `DelayedCalls`: 与动画共享时钟的延迟调用
//! - `flip_from`: 基于盒快照的 FLIP 动画
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let mut system = AnimationSystem::new();
//! let timeline = Timeline::new().at(
//!     0.0,
//!     Segment::new(0.85, EasingFunction::EaseInOutQuad)
//!         .target(Anchor::Track, vec![PropTween::to(Prop::X, -484.0)]),
//! );
//! let handle = system.play(&mut scene, timeline);
//! ```

mod delayed;
mod easing;
pub mod flip;
mod system;
mod timeline;
mod traits;
mod tween;

pub use delayed::{DelayedCalls, DelayedId};
pub use easing::EasingFunction;
pub use flip::{FlipOptions, flip_from};
pub use system::AnimationSystem;
pub use timeline::{Segment, Timeline};
pub use traits::{Animatable, AnimationHandle, Animator};
pub use tween::{PropTween, Tween, TweenState};

/// 动画事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEvent {
    /// 时间轴按时播放完毕
    Completed(AnimationHandle),
    /// 时间轴被取消
    Interrupted(AnimationHandle),
}

impl AnimationEvent {
    /// 事件对应的句柄
    pub fn handle(&self) -> AnimationHandle {
        match self {
            AnimationEvent::Completed(handle) | AnimationEvent::Interrupted(handle) => *handle,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, AnimationEvent::Interrupted(_))
    }
}

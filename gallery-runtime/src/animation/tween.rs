//! # Tween 模块
//!
//! 单个属性的补间实例。
//!
//! 核心设计：补间只关注某个锚点上一个 f32 属性的时间轴变化，
//! 起始值缺省时在补间真正开始的那一刻从目标读取。

use super::EasingFunction;
use super::traits::Animatable;
use crate::geometry::lerp;
use crate::scene::{Anchor, Prop};

/// 补间状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TweenState {
    /// 等待开始（尚未到达起始时间）
    #[default]
    Pending,
    /// 正在播放
    Playing,
    /// 已完成
    Completed,
}

/// 属性补间描述
///
/// `from` 为 `None` 时表示从当前值开始。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropTween {
    pub prop: Prop,
    pub from: Option<f32>,
    pub to: f32,
}

impl PropTween {
    /// 从当前值补间到 `to`
    pub fn to(prop: Prop, to: f32) -> Self {
        Self {
            prop,
            from: None,
            to,
        }
    }

    /// 从 `from` 补间到 `to`
    pub fn from_to(prop: Prop, from: f32, to: f32) -> Self {
        Self {
            prop,
            from: Some(from),
            to,
        }
    }
}

/// 补间实例
#[derive(Debug, Clone)]
pub struct Tween {
    /// 目标锚点
    pub target: Anchor,
    /// 目标属性
    pub prop: Prop,
    /// 显式起始值
    pub from: Option<f32>,
    /// 目标值
    pub to: f32,
    /// 相对时间轴起点的开始时间（秒）
    pub start: f32,
    /// 时长（秒）
    pub duration: f32,
    /// 缓动函数
    pub easing: EasingFunction,
    /// 当前状态
    pub state: TweenState,
    /// 实际使用的起始值
    resolved_from: f32,
}

impl Tween {
    /// 创建新的补间
    pub fn new(
        target: Anchor,
        tween: PropTween,
        start: f32,
        duration: f32,
        easing: EasingFunction,
    ) -> Self {
        Self {
            target,
            prop: tween.prop,
            from: tween.from,
            to: tween.to,
            start: start.max(0.0),
            duration: duration.max(0.0),
            easing,
            state: TweenState::Pending,
            resolved_from: tween.from.unwrap_or_default(),
        }
    }

    /// 结束时间
    pub fn end(&self) -> f32 {
        self.start + self.duration
    }

    /// 推进到时间轴上的 `time`，并把当前值写入目标
    pub fn advance(&mut self, time: f32, target: &mut dyn Animatable) {
        match self.state {
            TweenState::Completed => return,
            TweenState::Pending => {
                if time < self.start {
                    return;
                }
                self.resolved_from = self
                    .from
                    .or_else(|| target.get_property(&self.target, self.prop))
                    .unwrap_or_else(|| self.prop.default_value());
                self.state = TweenState::Playing;
            }
            TweenState::Playing => {}
        }

        let raw_progress = if self.duration <= 0.0 {
            1.0
        } else {
            ((time - self.start) / self.duration).clamp(0.0, 1.0)
        };

        let value = if raw_progress >= 1.0 {
            self.to
        } else {
            lerp(self.resolved_from, self.to, self.easing.apply(raw_progress))
        };
        target.set_property(&self.target, self.prop, value);

        if raw_progress >= 1.0 {
            self.state = TweenState::Completed;
        }
    }

    /// 是否作用于给定锚点的给定属性
    pub fn targets(&self, anchor: &Anchor, prop: Prop) -> bool {
        &self.target == anchor && self.prop == prop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Rect, Size};
    use crate::scene::{Parent, Scene};

    fn scene() -> Scene {
        let mut scene = Scene::new(Size::new(100.0, 100.0));
        scene.mount(Anchor::Track, Parent::Root, Rect::new(0.0, 0.0, 10.0, 10.0));
        scene
    }

    #[test]
    fn test_tween_waits_for_start() {
        let mut scene = scene();
        let mut tween = Tween::new(
            Anchor::Track,
            PropTween::to(Prop::X, 100.0),
            0.5,
            1.0,
            EasingFunction::Linear,
        );

        tween.advance(0.25, &mut scene);
        assert_eq!(tween.state, TweenState::Pending);
        assert!(!scene.has_inline(&Anchor::Track, Prop::X));

        tween.advance(1.0, &mut scene);
        assert_eq!(tween.state, TweenState::Playing);
        assert_eq!(scene.prop(&Anchor::Track, Prop::X), Some(50.0));

        tween.advance(2.0, &mut scene);
        assert_eq!(tween.state, TweenState::Completed);
        assert_eq!(scene.prop(&Anchor::Track, Prop::X), Some(100.0));
    }

    #[test]
    fn test_tween_resolves_from_at_start() {
        let mut scene = scene();
        let mut tween = Tween::new(
            Anchor::Track,
            PropTween::to(Prop::Opacity, 0.0),
            0.0,
            1.0,
            EasingFunction::Linear,
        );
        scene.set_prop(&Anchor::Track, Prop::Opacity, 0.5);
        tween.advance(0.5, &mut scene);
        assert_eq!(scene.prop(&Anchor::Track, Prop::Opacity), Some(0.25));
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let mut scene = scene();
        let mut tween = Tween::new(
            Anchor::Track,
            PropTween::from_to(Prop::Y, 10.0, 20.0),
            0.0,
            0.0,
            EasingFunction::Linear,
        );
        tween.advance(0.0, &mut scene);
        assert_eq!(tween.state, TweenState::Completed);
        assert_eq!(scene.prop(&Anchor::Track, Prop::Y), Some(20.0));
    }
}

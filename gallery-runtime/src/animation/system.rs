//! # System 模块
//!
//! 内置的动画系统，`Animator` 的确定性实现。
//!
//! ```rust,ignore
//! let mut system = AnimationSystem::new();
//! let handle = system.play(&mut scene, timeline);
//! for event in system.update(&mut scene, dt) {
//!     // 根据 handle 分派完成 / 中断
//! }
//! ```

use std::collections::BTreeMap;

use super::traits::{Animatable, AnimationHandle, Animator};
use super::tween::Tween;
use super::{AnimationEvent, Timeline};
use crate::scene::{Anchor, Prop};

/// 运行中的时间轴
#[derive(Debug)]
struct RunningTimeline {
    tweens: Vec<Tween>,
    elapsed: f32,
    duration: f32,
}

/// 动画系统
///
/// 管理所有时间轴实例，提供统一的更新和查询接口。
///
/// ## 设计理念
///
/// 动画系统只负责：
/// 1. 管理时间轴：知道某个属性从 A 到 B 需要在 duration 内变化
/// 2. 直接设置目标属性（通过 Animatable trait）
/// 3. 时间轴严格按时间结束：被覆盖的补间不会让时间轴提前结束
pub struct AnimationSystem {
    /// 运行中的时间轴（按句柄排序，保证更新顺序确定）
    timelines: BTreeMap<AnimationHandle, RunningTimeline>,
    /// 下一个句柄
    next_handle: u64,
    /// 待处理的事件队列
    events: Vec<AnimationEvent>,
}

impl Default for AnimationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnimationSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationSystem")
            .field("timelines", &self.timelines.len())
            .field("pending_events", &self.events.len())
            .finish()
    }
}

impl AnimationSystem {
    /// 创建新的动画系统
    pub fn new() -> Self {
        Self {
            timelines: BTreeMap::new(),
            next_handle: 1,
            events: Vec::new(),
        }
    }

    /// 生成下一个句柄
    fn next_handle(&mut self) -> AnimationHandle {
        let handle = AnimationHandle::new(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// 移除所有时间轴中作用于同一属性的补间
    fn kill_property(&mut self, anchor: &Anchor, prop: Prop) {
        for timeline in self.timelines.values_mut() {
            timeline.tweens.retain(|t| !t.targets(anchor, prop));
        }
    }

    /// 检查是否有活跃的时间轴
    pub fn has_active_animations(&self) -> bool {
        !self.timelines.is_empty()
    }

    /// 某个锚点上正在运行的补间数量
    pub fn tween_count_of(&self, anchor: &Anchor) -> usize {
        self.timelines
            .values()
            .flat_map(|t| t.tweens.iter())
            .filter(|t| &t.target == anchor)
            .count()
    }

    /// 清空所有时间轴和事件（不产生中断事件）
    pub fn clear(&mut self) {
        self.timelines.clear();
        self.events.clear();
    }
}

impl Animator for AnimationSystem {
    fn play(&mut self, target: &mut dyn Animatable, timeline: Timeline) -> AnimationHandle {
        let handle = self.next_handle();
        let duration = timeline.duration();
        let tweens = timeline.into_tweens();

        // 覆盖：同一属性只保留最新的补间
        for tween in &tweens {
            self.kill_property(&tween.target, tween.prop);
        }

        // 显式起始值立即生效；同一属性取最早开始的那个
        let mut explicit: Vec<&Tween> = tweens.iter().filter(|t| t.from.is_some()).collect();
        explicit.sort_by(|a, b| b.start.total_cmp(&a.start));
        for tween in explicit {
            if let Some(from) = tween.from {
                target.set_property(&tween.target, tween.prop, from);
            }
        }

        self.timelines.insert(
            handle,
            RunningTimeline {
                tweens,
                elapsed: 0.0,
                duration,
            },
        );
        handle
    }

    fn set(&mut self, target: &mut dyn Animatable, anchor: &Anchor, props: &[(Prop, f32)]) {
        for (prop, value) in props {
            self.kill_property(anchor, *prop);
            target.set_property(anchor, *prop, *value);
        }
    }

    fn cancel(&mut self, handle: AnimationHandle) -> bool {
        if self.timelines.remove(&handle).is_some() {
            self.events.push(AnimationEvent::Interrupted(handle));
            true
        } else {
            false
        }
    }

    fn cancel_all(&mut self) {
        let handles: Vec<AnimationHandle> = self.timelines.keys().copied().collect();
        for handle in handles {
            self.cancel(handle);
        }
    }

    fn kill_tweens_of(&mut self, anchor: &Anchor) {
        for timeline in self.timelines.values_mut() {
            timeline.tweens.retain(|t| &t.target != anchor);
        }
    }

    fn update(&mut self, target: &mut dyn Animatable, dt: f32) -> Vec<AnimationEvent> {
        let mut completed = Vec::new();

        for (handle, timeline) in self.timelines.iter_mut() {
            timeline.elapsed += dt.max(0.0);
            for tween in timeline.tweens.iter_mut() {
                tween.advance(timeline.elapsed, target);
            }
            if timeline.elapsed >= timeline.duration {
                completed.push(*handle);
            }
        }

        // 发送完成事件并清理
        for handle in completed {
            self.timelines.remove(&handle);
            self.events.push(AnimationEvent::Completed(handle));
        }

        // 返回并清空事件队列
        std::mem::take(&mut self.events)
    }

    fn is_active(&self, handle: AnimationHandle) -> bool {
        self.timelines.contains_key(&handle)
    }

    fn active_count(&self) -> usize {
        self.timelines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{EasingFunction, PropTween, Segment};
    use crate::geometry::{Rect, Size};
    use crate::scene::{Parent, Scene};

    fn scene() -> Scene {
        let mut scene = Scene::new(Size::new(100.0, 100.0));
        scene.mount(Anchor::Track, Parent::Root, Rect::new(0.0, 0.0, 10.0, 10.0));
        scene.mount(Anchor::Overlay, Parent::Root, Rect::new(0.0, 0.0, 10.0, 10.0));
        scene
    }

    fn move_x(to: f32, duration: f32) -> Timeline {
        Timeline::new().at(
            0.0,
            Segment::new(duration, EasingFunction::Linear)
                .target(Anchor::Track, vec![PropTween::to(Prop::X, to)]),
        )
    }

    #[test]
    fn test_play_and_complete() {
        let mut scene = scene();
        let mut system = AnimationSystem::new();
        let handle = system.play(&mut scene, move_x(100.0, 1.0));

        assert!(system.is_active(handle));
        assert!(system.update(&mut scene, 0.5).is_empty());
        assert_eq!(scene.prop(&Anchor::Track, Prop::X), Some(50.0));

        let events = system.update(&mut scene, 0.5);
        assert_eq!(events, vec![AnimationEvent::Completed(handle)]);
        assert_eq!(scene.prop(&Anchor::Track, Prop::X), Some(100.0));
        assert!(!system.is_active(handle));
        assert!(!system.has_active_animations());
    }

    #[test]
    fn test_explicit_from_applies_immediately() {
        let mut scene = scene();
        let mut system = AnimationSystem::new();
        let timeline = Timeline::new().at(
            0.0,
            Segment::new(0.5, EasingFunction::Linear)
                .target(Anchor::Track, vec![PropTween::from_to(Prop::Opacity, 0.0, 1.0)])
                .delay(1.0),
        );
        system.play(&mut scene, timeline);
        assert_eq!(scene.prop(&Anchor::Track, Prop::Opacity), Some(0.0));
    }

    #[test]
    fn test_cancel_emits_interrupted() {
        let mut scene = scene();
        let mut system = AnimationSystem::new();
        let handle = system.play(&mut scene, move_x(100.0, 1.0));
        system.update(&mut scene, 0.25);

        assert!(system.cancel(handle));
        assert!(!system.cancel(handle));
        let events = system.update(&mut scene, 0.25);
        assert_eq!(events, vec![AnimationEvent::Interrupted(handle)]);
        assert_eq!(scene.prop(&Anchor::Track, Prop::X), Some(25.0));
    }

    #[test]
    fn test_overwrite_keeps_timeline_alive() {
        let mut scene = scene();
        let mut system = AnimationSystem::new();
        let first = system.play(&mut scene, move_x(100.0, 1.0));
        let second = system.play(&mut scene, move_x(-100.0, 0.5));
        assert_eq!(system.tween_count_of(&Anchor::Track), 1);

        let events = system.update(&mut scene, 0.5);
        assert_eq!(events, vec![AnimationEvent::Completed(second)]);
        assert_eq!(scene.prop(&Anchor::Track, Prop::X), Some(-100.0));

        // 被覆盖的时间轴仍然按时结束，且不再改写属性
        let events = system.update(&mut scene, 0.5);
        assert_eq!(events, vec![AnimationEvent::Completed(first)]);
        assert_eq!(scene.prop(&Anchor::Track, Prop::X), Some(-100.0));
    }

    #[test]
    fn test_set_kills_conflicting_tween() {
        let mut scene = scene();
        let mut system = AnimationSystem::new();
        system.play(&mut scene, move_x(100.0, 1.0));
        system.set(&mut scene, &Anchor::Track, &[(Prop::X, 7.0)]);
        system.update(&mut scene, 0.5);
        assert_eq!(scene.prop(&Anchor::Track, Prop::X), Some(7.0));
    }

    #[test]
    fn test_kill_tweens_of_is_silent() {
        let mut scene = scene();
        let mut system = AnimationSystem::new();
        let handle = system.play(&mut scene, move_x(100.0, 1.0));
        system.kill_tweens_of(&Anchor::Track);
        assert_eq!(system.tween_count_of(&Anchor::Track), 0);
        assert!(system.is_active(handle));
        assert!(system.update(&mut scene, 0.5).is_empty());
        assert!(!scene.has_inline(&Anchor::Track, Prop::X));
    }

    #[test]
    fn test_cancel_all() {
        let mut scene = scene();
        let mut system = AnimationSystem::new();
        let a = system.play(&mut scene, move_x(1.0, 1.0));
        let b = system.play(&mut scene, Timeline::new().hold(0.0, 2.0));
        system.cancel_all();
        assert_eq!(system.active_count(), 0);
        let events = system.update(&mut scene, 0.0);
        assert_eq!(
            events,
            vec![AnimationEvent::Interrupted(a), AnimationEvent::Interrupted(b)]
        );
    }

    #[test]
    fn test_empty_timeline_completes_on_next_update() {
        let mut scene = scene();
        let mut system = AnimationSystem::new();
        let handle = system.play(&mut scene, Timeline::new());
        let events = system.update(&mut scene, 0.0);
        assert_eq!(events, vec![AnimationEvent::Completed(handle)]);
    }
}

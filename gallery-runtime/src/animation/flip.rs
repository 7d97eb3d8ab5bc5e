//! # Flip 模块
//!
//! First-Last-Invert-Play：让一个已经换到新位置的元素，
//! 从旧位置平滑地"飞"到新位置。
//!
//! 1. First：调用方在改动结构之前用 [`Scene::capture_box`] 捕获快照
//! 2. Last：改动结构之后（重新挂载、换父级），测量元素的自然盒
//! 3. Invert：用平移和显式尺寸把元素摆回快照的位置
//! 4. Play：把平移归零、尺寸还原到自然盒
//!
//! 尺寸通过 `Width`/`Height` 而不是缩放反转，圆角在过程中不会被拉伸。

use super::timeline::{Segment, Timeline};
use super::traits::{AnimationHandle, Animator};
use super::{EasingFunction, PropTween};
use crate::geometry::BoxSnapshot;
use crate::scene::{Anchor, Prop, Scene};

/// FLIP 动画参数
#[derive(Debug, Clone)]
pub struct FlipOptions {
    pub duration: f32,
    pub easing: EasingFunction,
    /// 终点圆角；起点取快照中的值
    pub border_radius: Option<f32>,
    /// 终点阴影；起点取快照中的值
    pub shadow: Option<f32>,
    /// 和 FLIP 同时开始的附加分段（例如代理图片的缩放）
    pub extra: Vec<Segment>,
}

impl FlipOptions {
    pub fn new(duration: f32, easing: EasingFunction) -> Self {
        Self {
            duration,
            easing,
            border_radius: None,
            shadow: None,
            extra: Vec::new(),
        }
    }

    pub fn border_radius(mut self, radius: f32) -> Self {
        self.border_radius = Some(radius);
        self
    }

    pub fn shadow(mut self, shadow: f32) -> Self {
        self.shadow = Some(shadow);
        self
    }

    pub fn with(mut self, segment: Segment) -> Self {
        self.extra.push(segment);
        self
    }
}

/// 盒属性，FLIP 开始前会被清除
const BOX_PROPS: [Prop; 5] = [Prop::X, Prop::Y, Prop::Width, Prop::Height, Prop::Scale];

/// 从快照 `first` 飞到 `target` 当前的自然盒
///
/// `target` 未挂载到视口时返回 `None`，此时不会播放任何动画。
pub fn flip_from<A: Animator + ?Sized>(
    animator: &mut A,
    scene: &mut Scene,
    target: &Anchor,
    first: &BoxSnapshot,
    options: FlipOptions,
) -> Option<AnimationHandle> {
    if !scene.is_attached(target) {
        return None;
    }

    animator.kill_tweens_of(target);
    scene.clear_props(target, &BOX_PROPS);
    let last = scene.visual_rect(target)?;

    let mut props = vec![
        PropTween::from_to(Prop::X, first.rect.x - last.x, 0.0),
        PropTween::from_to(Prop::Y, first.rect.y - last.y, 0.0),
        PropTween::from_to(Prop::Width, first.rect.width, last.width),
        PropTween::from_to(Prop::Height, first.rect.height, last.height),
    ];
    if let Some(radius) = options.border_radius {
        props.push(match first.border_radius {
            Some(from) => PropTween::from_to(Prop::BorderRadius, from, radius),
            None => PropTween::to(Prop::BorderRadius, radius),
        });
    }
    if let Some(shadow) = options.shadow {
        props.push(match first.shadow {
            Some(from) => PropTween::from_to(Prop::Shadow, from, shadow),
            None => PropTween::to(Prop::Shadow, shadow),
        });
    }

    let mut timeline = Timeline::new().at(
        0.0,
        Segment::new(options.duration, options.easing).target(target.clone(), props),
    );
    for segment in options.extra {
        timeline = timeline.at(0.0, segment);
    }

    Some(animator.play(scene, timeline))
}

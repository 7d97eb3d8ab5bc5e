//! # Timeline 模块
//!
//! 时间轴：把多个分段按时间偏移组合成一个可播放的整体。
//!
//! - 同一偏移的分段并发播放
//! - 不同偏移的分段按偏移顺序开始
//! - 分段内多个目标可以错开（stagger），也可以从最后一个开始错开
//!
//! 时间轴的时长等于所有分段结束时间的最大值，
//! 空分段用于占位（保持时间轴至少持续一段时间）。

use super::EasingFunction;
use super::tween::{PropTween, Tween};
use crate::scene::Anchor;

/// 时间轴分段
#[derive(Debug, Clone, Default)]
pub struct Segment {
    targets: Vec<(Anchor, Vec<PropTween>)>,
    duration: f32,
    easing: EasingFunction,
    delay: f32,
    stagger: f32,
    from_end: bool,
}

impl Segment {
    /// 创建新的分段
    pub fn new(duration: f32, easing: EasingFunction) -> Self {
        Self {
            targets: Vec::new(),
            duration: duration.max(0.0),
            easing,
            delay: 0.0,
            stagger: 0.0,
            from_end: false,
        }
    }

    /// 添加一个目标及其属性补间
    pub fn target(mut self, anchor: Anchor, props: Vec<PropTween>) -> Self {
        self.targets.push((anchor, props));
        self
    }

    /// 添加多个使用相同属性补间的目标
    pub fn targets(mut self, anchors: impl IntoIterator<Item = Anchor>, props: &[PropTween]) -> Self {
        for anchor in anchors {
            self.targets.push((anchor, props.to_vec()));
        }
        self
    }

    /// 延迟（秒）
    pub fn delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    /// 每个目标之间的错开时间（秒）
    pub fn stagger(mut self, each: f32) -> Self {
        self.stagger = each.max(0.0);
        self
    }

    /// 从最后一个目标开始错开
    pub fn from_end(mut self) -> Self {
        self.from_end = true;
        self
    }

    /// 目标数量
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// 分段跨度：延迟 + 错开 + 时长
    pub fn span(&self) -> f32 {
        let count = self.targets.len().max(1);
        self.delay + self.stagger * (count - 1) as f32 + self.duration
    }

    /// 第 `index` 个目标相对分段起点的开始时间
    fn start_of(&self, index: usize) -> f32 {
        let count = self.targets.len();
        let order = if self.from_end {
            count.saturating_sub(1 + index)
        } else {
            index
        };
        self.delay + self.stagger * order as f32
    }
}

/// 时间轴
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    entries: Vec<(f32, Segment)>,
}

impl Timeline {
    /// 创建空时间轴
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// 在当前末尾追加分段
    pub fn then(self, segment: Segment) -> Self {
        let offset = self.duration();
        self.at(offset, segment)
    }

    /// 在指定偏移处添加分段
    pub fn at(mut self, offset: f32, segment: Segment) -> Self {
        self.entries.push((offset.max(0.0), segment));
        self
    }

    /// 在指定偏移处占位 `duration` 秒
    pub fn hold(self, offset: f32, duration: f32) -> Self {
        self.at(offset, Segment::new(duration, EasingFunction::Linear))
    }

    /// 时间轴总时长
    pub fn duration(&self) -> f32 {
        self.entries
            .iter()
            .map(|(offset, segment)| offset + segment.span())
            .fold(0.0, f32::max)
    }

    /// 时间轴涉及的全部目标
    pub fn targets(&self) -> impl Iterator<Item = &Anchor> {
        self.entries
            .iter()
            .flat_map(|(_, segment)| segment.targets.iter().map(|(anchor, _)| anchor))
    }

    /// 是否没有任何补间
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, segment)| segment.is_empty())
    }

    /// 展开为补间列表
    pub fn into_tweens(self) -> Vec<Tween> {
        let mut tweens = Vec::new();
        for (offset, segment) in self.entries {
            for (index, (anchor, props)) in segment.targets.iter().enumerate() {
                let start = offset + segment.start_of(index);
                for prop in props {
                    tweens.push(Tween::new(
                        anchor.clone(),
                        *prop,
                        start,
                        segment.duration,
                        segment.easing,
                    ));
                }
            }
        }
        tweens
    }
}

//! # Traits 模块
//!
//! 动画系统与外部世界之间的两个接缝：
//!
//! - `Animatable`: 可被补间驱动的属性存储（场景实现它）
//! - `Animator`: 动画原语（播放时间轴、立即设置、取消、逐帧推进）
//!
//! 编排逻辑只依赖 `Animator`，测试中可以注入假的实现。

use std::fmt;

use super::AnimationEvent;
use super::timeline::Timeline;
use crate::scene::{Anchor, Prop};

/// 可动画对象接口
pub trait Animatable {
    /// 读取属性当前值；锚点不存在时返回 `None`
    fn get_property(&self, anchor: &Anchor, prop: Prop) -> Option<f32>;

    /// 写入属性值；锚点不存在时返回 `false`
    fn set_property(&mut self, anchor: &Anchor, prop: Prop, value: f32) -> bool;
}

/// 动画句柄
///
/// `play` 返回的唯一标识，完成和中断事件都携带它。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationHandle(u64);

impl AnimationHandle {
    /// 创建句柄
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AnimationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnimationHandle({})", self.0)
    }
}

/// 动画原语
pub trait Animator {
    /// 播放时间轴
    ///
    /// 显式起始值立即写入目标；与其他时间轴中同一属性冲突的补间被覆盖（静默移除）。
    fn play(&mut self, target: &mut dyn Animatable, timeline: Timeline) -> AnimationHandle;

    /// 立即设置属性，并移除这些属性上正在运行的补间
    fn set(&mut self, target: &mut dyn Animatable, anchor: &Anchor, props: &[(Prop, f32)]);

    /// 取消时间轴
    ///
    /// 返回 `true` 表示句柄仍在运行，下一次 `update` 会带出 `Interrupted` 事件。
    fn cancel(&mut self, handle: AnimationHandle) -> bool;

    /// 取消全部时间轴
    fn cancel_all(&mut self);

    /// 静默移除作用于锚点的全部补间（所属时间轴照常结束）
    fn kill_tweens_of(&mut self, anchor: &Anchor);

    /// 推进 `dt` 秒，返回期间产生的事件
    fn update(&mut self, target: &mut dyn Animatable, dt: f32) -> Vec<AnimationEvent>;

    /// 句柄是否仍在运行
    fn is_active(&self, handle: AnimationHandle) -> bool;

    /// 运行中的时间轴数量
    fn active_count(&self) -> usize;
}

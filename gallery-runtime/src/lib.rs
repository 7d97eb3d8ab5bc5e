//! # Gallery Runtime
//!
//! 照片画廊过渡编排引擎的核心库。
//!
//! ## 架构概述
//!
//! `gallery-runtime` 是纯逻辑核心，不依赖任何 IO 或渲染引擎。
//! 宿主输入事件并逐帧推进，核心修改内存中的 [`Scene`]，宿主再把场景映射到真实 UI：
//!
//! ```text
//! Host                          Runtime
//!   │                              │
//!   │──── 指针 / 手势 / 点击 ─────►│
//!   │──── tick(dt) ──────────────►│ 动画推进 → 步骤处理 → 阶段转换
//!   │◄─── scene() ────────────────│
//!   │                              │
//! ```
//!
//! ## 核心类型
//!
//! - [`Gallery`]：门面，持有全部状态
//! - [`TransitionPhase`]：`idle → opening → open → closing → idle` 阶段机
//! - [`NavigationStore`]：当前图集、浮动岛图集、过渡锁、关闭阶段
//! - [`Animator`]：动画原语 trait，[`AnimationSystem`] 是内置实现
//! - [`Catalog`]：只读图集目录
//!
//! ## 使用示例
//!
//! ```ignore
//! use gallery_runtime::{Catalog, Gallery, GalleryConfig};
//!
//! let mut gallery = Gallery::new(Catalog::builtin()?, GalleryConfig::default());
//! gallery.click_preview("dunes")?;
//! loop {
//!     gallery.tick(1.0 / 60.0);
//!     host.render(gallery.scene());
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`animation`]：时间轴、补间、缓动、延迟调用、FLIP
//! - [`scene`]：场景树和几何捕获
//! - [`phase`] / [`navigation`]：阶段机和导航状态
//! - [`carousel`] / [`grid`] / [`island`]：三个组件
//! - [`orchestrator`]：打开 / 关闭序列和代理租约

pub mod animation;
pub mod carousel;
pub mod catalog;
pub mod error;
pub mod gallery;
pub mod geometry;
pub mod grid;
pub mod island;
pub mod layout;
pub mod navigation;
pub mod orchestrator;
pub mod phase;
pub mod scene;
pub mod timing;

pub use animation::{
    AnimationEvent, AnimationHandle, AnimationSystem, Animator, EasingFunction, Segment, Timeline,
};
pub use carousel::GestureInput;
pub use catalog::{Catalog, Photo, PhotoId, PhotoSet, SetId};
pub use error::{AbortReason, CatalogError, GalleryError, GalleryResult};
pub use gallery::{Gallery, GalleryConfig};
pub use geometry::{Rect, Size, Vec2};
pub use layout::{IslandMode, LayoutConfig};
pub use navigation::{ClosePhase, NavigationSnapshot, NavigationStore};
pub use orchestrator::{ProxyLease, ProxySlot};
pub use phase::{CloseStage, OpenStage, PhaseEvent, TransitionPhase};
pub use scene::{Anchor, Prop, Scene};
pub use timing::TimingTable;

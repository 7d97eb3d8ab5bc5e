//! # Gallery 模块
//!
//! 画廊的门面：持有目录、场景、动画器、导航状态和各组件状态，
//! 宿主通过它输入事件并逐帧推进。
//!
//! ## 主循环
//!
//! ```text
//! Host                          Gallery
//!   │                              │
//!   │── pointer / gesture / click ─▶│ 启动动画（记录句柄 → 步骤）
//!   │── tick(dt) ─────────────────▶│ Animator::update
//!   │                              │   └─ 完成 / 中断事件 → 步骤处理 → 阶段转换
//!   │                              │ DelayedCalls::advance → 兜底计时器
//!   │◀─ scene() ───────────────────│ 宿主把场景映射到真实 UI
//! ```
//!
//! 组件的操作分布在 `carousel`、`grid`、`island`、`orchestrator` 模块中，
//! 都是 `impl Gallery` 块。

use std::collections::HashMap;
use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::animation::{AnimationEvent, AnimationHandle, AnimationSystem, Animator, DelayedCalls};
use crate::carousel::CarouselState;
use crate::catalog::{Catalog, SetId};
use crate::error::AbortReason;
use crate::geometry::{Rect, Size};
use crate::grid::GridState;
use crate::island::IslandState;
use crate::layout::{IslandMode, LayoutConfig};
use crate::navigation::{NavigationSnapshot, NavigationStore};
use crate::orchestrator::{ProxyLease, ProxySlot, Step};
use crate::phase::{self, PhaseEvent, TransitionPhase};
use crate::scene::{Anchor, Parent, Prop, Scene};
use crate::timing::TimingTable;

/// 画廊配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub timing: TimingTable,
    pub layout: LayoutConfig,
    /// 网格散布的随机种子；`None` 时从操作系统取种子
    pub seed: Option<u64>,
    /// 浮动岛首页模式的品牌文字
    pub brand: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            timing: TimingTable::default(),
            layout: LayoutConfig::default(),
            seed: None,
            brand: "komplete.chaos".to_string(),
        }
    }
}

/// 与动画共享时钟的延迟调用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DelayedCall {
    /// 网格透明度兜底
    GridSafety,
    /// 关闭后视差重新启用的兜底
    ParallaxFallback,
}

/// 画廊
pub struct Gallery<A: Animator = AnimationSystem> {
    pub(crate) catalog: Catalog,
    pub(crate) timing: TimingTable,
    pub(crate) layout: LayoutConfig,
    pub(crate) brand: String,
    pub(crate) store: NavigationStore,
    pub(crate) phase: TransitionPhase,
    pub(crate) scene: Scene,
    pub(crate) animator: A,
    pub(crate) delayed: DelayedCalls<DelayedCall>,
    /// 动画句柄 → 编排步骤
    pub(crate) steps: HashMap<AnimationHandle, Step>,
    pub(crate) carousel: CarouselState,
    pub(crate) grid: GridState,
    pub(crate) island: IslandState,
    pub(crate) proxy: ProxySlot,
    pub(crate) proxy_lease: Option<ProxyLease>,
    pub(crate) rng: StdRng,
}

impl Gallery<AnimationSystem> {
    /// 创建使用内置动画系统的画廊
    pub fn new(catalog: Catalog, config: GalleryConfig) -> Self {
        Self::with_animator(catalog, config, AnimationSystem::new())
    }
}

impl<A: Animator> Gallery<A> {
    /// 创建使用指定动画器的画廊
    pub fn with_animator(catalog: Catalog, config: GalleryConfig, animator: A) -> Self {
        let viewport = config.layout.viewport;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut gallery = Self {
            catalog,
            timing: config.timing,
            layout: config.layout,
            brand: config.brand,
            store: NavigationStore::new(),
            phase: TransitionPhase::Idle,
            scene: Scene::new(viewport),
            animator,
            delayed: DelayedCalls::new(),
            steps: HashMap::new(),
            carousel: CarouselState::new(),
            grid: GridState::default(),
            island: IslandState::default(),
            proxy: ProxySlot::default(),
            proxy_lease: None,
            rng,
        };

        gallery
            .scene
            .mount(Anchor::Overlay, Parent::Root, Rect::from_size(viewport));
        let label = Rect::from_size(gallery.layout.hover_label);
        gallery.scene.mount(Anchor::HoverLabel, Parent::Root, label);
        gallery
            .scene
            .set_prop(&Anchor::HoverLabel, Prop::Opacity, 0.0);
        gallery.mount_island();
        gallery.mount_carousel();

        info!(
            sets = gallery.catalog.len(),
            viewport = ?viewport,
            "画廊已创建"
        );
        gallery
    }

    // ========== 读取 ==========

    pub fn store(&self) -> &NavigationStore {
        &self.store
    }

    pub fn snapshot(&self) -> NavigationSnapshot {
        self.store.snapshot()
    }

    pub fn phase(&self) -> &TransitionPhase {
        &self.phase
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn animator(&self) -> &A {
        &self.animator
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn timing(&self) -> &TimingTable {
        &self.timing
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// 居中的预览索引
    pub fn carousel_index(&self) -> usize {
        self.carousel.index
    }

    /// 轮播是否正在切换
    pub fn is_stepping(&self) -> bool {
        self.carousel.stepping.is_some()
    }

    pub fn parallax_enabled(&self) -> bool {
        self.carousel.parallax_enabled
    }

    pub fn island_mode(&self) -> IslandMode {
        self.island.mode
    }

    /// 代理是否被租用
    pub fn proxy_leased(&self) -> bool {
        self.proxy.is_leased()
    }

    /// 正在跟踪的编排步骤数量
    pub fn pending_steps(&self) -> usize {
        self.steps.len()
    }

    /// 没有过渡、没有跟踪中的步骤
    pub fn is_settled(&self) -> bool {
        self.steps.is_empty() && !self.store.is_transitioning()
    }

    pub(crate) fn set_ids(&self) -> Vec<SetId> {
        self.catalog
            .all_sets()
            .iter()
            .map(|set| set.id.clone())
            .collect()
    }

    // ========== 主循环 ==========

    /// 推进 `dt` 秒
    pub fn tick(&mut self, dt: f32) {
        let events = self.animator.update(&mut self.scene, dt);
        self.dispatch(events);

        for call in self.delayed.advance(dt) {
            match call {
                DelayedCall::GridSafety => self.force_grid_visible(),
                DelayedCall::ParallaxFallback => {
                    if !self.store.is_transitioning() {
                        self.enable_parallax();
                    }
                }
            }
        }
    }

    /// 强制中断所有进行中的动画
    ///
    /// 每个被中断的步骤都会执行它的中断处理，恢复过渡锁、代理和隐藏的元素。
    pub fn interrupt(&mut self) {
        info!(phase = %self.phase, steps = self.steps.len(), "中断全部动画");
        self.animator.cancel_all();
        let events = self.animator.update(&mut self.scene, 0.0);
        self.dispatch(events);
    }

    /// 视口尺寸变化
    pub fn resize(&mut self, viewport: Size) {
        debug!(?viewport, "视口尺寸变化");
        self.scene.set_viewport(viewport);
        self.scene
            .set_layout(&Anchor::Overlay, Rect::from_size(viewport));
        self.relayout_island();
        self.relayout_detail();
        self.refresh_layout();
    }

    fn dispatch(&mut self, events: Vec<AnimationEvent>) {
        for event in events {
            let Some(step) = self.steps.remove(&event.handle()) else {
                continue;
            };
            self.on_step(step, event.is_interrupted());
        }
    }

    // ========== 阶段 ==========

    /// 应用阶段事件；事件不合法时返回 `false`
    pub(crate) fn transition(&mut self, event: PhaseEvent) -> bool {
        match self.phase.next(&event) {
            Some(next) => {
                debug!(from = %self.phase, to = %next, ?event, "阶段转换");
                phase::enter(&next, &mut self.store);
                self.phase = next;
                true
            }
            None => {
                debug!(phase = %self.phase, ?event, "忽略非法的阶段事件");
                false
            }
        }
    }

    /// 中止当前过渡并回到最近的稳定阶段
    pub(crate) fn abort(&mut self, reason: AbortReason) -> bool {
        match &reason {
            AbortReason::MissingAnchor { .. } | AbortReason::UnknownSet { .. } => {
                warn!(%reason, phase = %self.phase, "过渡中止");
            }
            AbortReason::Reentrant | AbortReason::Interrupted => {
                debug!(%reason, phase = %self.phase, "过渡中止");
            }
        }
        self.transition(PhaseEvent::Abort)
    }

    /// 让挂载的视图跟上导航状态
    ///
    /// - `active_set_id` 为 `Some` 时挂载详情视图，否则挂载轮播
    /// - 浮动岛跟随 `island_set_id`
    pub(crate) fn sync_views(&mut self) {
        let active = self.store.active_set_id().cloned();

        if self.grid.set_id != active {
            if self.grid.set_id.is_some() {
                self.unmount_detail();
            }
            if let Some(id) = &active {
                self.mount_detail(id);
            }
        }

        match (active.is_none(), self.carousel_mounted()) {
            (true, false) => self.mount_carousel(),
            (false, true) => self.unmount_carousel(),
            _ => {}
        }

        self.sync_island();
    }
}

impl<A: Animator> fmt::Debug for Gallery<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gallery")
            .field("phase", &self.phase)
            .field("store", &self.store)
            .field("carousel_index", &self.carousel.index)
            .field("steps", &self.steps.len())
            .field("animations", &self.animator.active_count())
            .field("proxy_leased", &self.proxy.is_leased())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gallery() -> Gallery {
        let catalog = Catalog::builtin().unwrap();
        let config = GalleryConfig {
            seed: Some(1),
            ..GalleryConfig::default()
        };
        Gallery::new(catalog, config)
    }

    #[test]
    fn test_new_gallery_mounts_landing() {
        let gallery = gallery();
        assert!(gallery.store().is_idle());
        assert!(gallery.phase().is_idle());
        assert!(gallery.scene().is_attached(&Anchor::Track));
        assert!(gallery.scene().is_attached(&Anchor::Overlay));
        assert!(gallery.scene().is_attached(&Anchor::IslandHomeLabel));
        assert_eq!(
            gallery.scene().text(&Anchor::IslandHomeLabel),
            Some("komplete.chaos")
        );
        assert_eq!(gallery.island_mode(), IslandMode::Home);
        assert!(!gallery.proxy_leased());
        assert!(gallery.is_settled());
    }

    #[test]
    fn test_config_partial_json() {
        let config: GalleryConfig =
            serde_json::from_str(r#"{ "seed": 9, "timing": { "grid": { "safety_timeout": 3.0 } } }"#)
                .unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.timing.grid.safety_timeout, 3.0);
        assert_eq!(config.timing.grid.exit_duration, 0.5);
        assert_eq!(config.brand, "komplete.chaos");
    }

    #[test]
    fn test_resize_recenters_island() {
        let mut gallery = gallery();
        gallery.resize(Size::new(1000.0, 700.0));
        let island = gallery.scene().visual_rect(&Anchor::Island).unwrap();
        let expected = gallery
            .layout()
            .island_rect(IslandMode::Home, Size::new(1000.0, 700.0));
        assert!(island.approx_eq(&expected, 0.01));
        assert_eq!(
            gallery.scene().layout(&Anchor::Overlay),
            Some(Rect::new(0.0, 0.0, 1000.0, 700.0))
        );
    }
}

//! # Orchestrator 模块
//!
//! 过渡编排：把轮播、网格和浮动岛串成打开 / 关闭两条序列。
//!
//! ## 打开
//!
//! ```text
//! 点击预览 ─▶ 代理覆盖源预览 ─▶ 邻居滑出 + 锁定脉冲 ─▶ 提交 active_set_id
//!         ─▶ 代理 FLIP 到浮动岛 hero 槽位 + 网格入场 ─▶ Open
//! ```
//!
//! ## 关闭
//!
//! ```text
//! 关闭请求 ─▶ 网格退场 ─▶ 代理接管 hero 槽位，清空 active_set_id（轮播重新挂载）
//!         ─▶ 代理 FLIP 回预览框 + 邻居归位 ─▶ Idle
//! ```
//!
//! 每个动画句柄对应一个 [`Step`]，完成和中断都经由 [`Gallery::on_step`] 分派。
//! 中断处理与完成处理恢复同样的共享状态：过渡锁释放、代理脱离、隐藏的元素恢复。

use tracing::{debug, warn};

use crate::animation::{
    Animator, FlipOptions, PropTween, Segment, Timeline, flip_from,
};
use crate::catalog::SetId;
use crate::error::AbortReason;
use crate::gallery::{DelayedCall, Gallery};
use crate::geometry::{BoxSnapshot, CaptureProps, Rect};
use crate::navigation::{CloseOwner, CloseRoute};
use crate::phase::PhaseEvent;
use crate::scene::{Anchor, ImageRef, Parent, Prop, Scene};

/// 动画句柄对应的编排步骤
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Step {
    /// 轮播切换
    CarouselStep { to: usize },
    /// 打开：邻居滑出、锁定脉冲、标题淡出
    OpenNeighbors { set_id: SetId, neighbors: Vec<Anchor> },
    /// 打开：代理飞向 hero 槽位
    OpenHeroFlip { set_id: SetId },
    /// 网格入场
    GridEntrance,
    /// 关闭：网格退场
    CloseGridExit { set_id: SetId },
    /// 关闭：代理飞回预览框
    CloseHeroFlip { set_id: SetId, has_neighbors: bool },
    /// 关闭：邻居归位
    CloseNeighborsReturn { items: Vec<Anchor> },
    /// 关闭：预览标题淡入
    CloseMetaReturn { set_id: SetId },
    /// 浮动岛尺寸动画
    IslandResize,
    /// 浮动岛内容入场
    IslandEntrance { targets: Vec<Anchor> },
    /// 浮动岛退场
    IslandExit,
}

// ========== 代理 ==========

/// 代理租约
///
/// 持有者独占代理元素，直到把租约交还给 [`ProxySlot::release`]。
#[derive(Debug)]
pub struct ProxyLease {
    _private: (),
}

/// 代理槽位：场景中唯一的代理元素
#[derive(Debug, Default)]
pub struct ProxySlot {
    leased: bool,
}

impl ProxySlot {
    /// 租用代理
    ///
    /// 代理元素在第一次租用时挂载（脱离状态）；已经被租用时返回 `None`。
    pub fn acquire(&mut self, scene: &mut Scene) -> Option<ProxyLease> {
        if self.leased {
            return None;
        }
        if !scene.contains(&Anchor::Proxy) {
            scene.mount(Anchor::Proxy, Parent::Detached, Rect::default());
            scene.mount(
                Anchor::ProxyImage,
                Parent::Element(Anchor::Proxy),
                Rect::default(),
            );
        }
        self.leased = true;
        Some(ProxyLease { _private: () })
    }

    /// 交还租约
    pub fn release(&mut self, lease: ProxyLease) {
        drop(lease);
        self.leased = false;
    }

    pub fn is_leased(&self) -> bool {
        self.leased
    }
}

impl<A: Animator> Gallery<A> {
    // ========== 入口 ==========

    /// 点击预览
    ///
    /// 非居中的预览只会被切换到中间；居中的预览打开其图集。
    pub fn click_preview(&mut self, set_id: &str) -> Result<(), AbortReason> {
        if self.store.is_transitioning() {
            debug!(set = set_id, "过渡进行中，忽略点击");
            return Err(AbortReason::Reentrant);
        }
        let Some(index) = self.catalog.index_of(set_id) else {
            warn!(set = set_id, "点击了未知图集");
            return Err(AbortReason::UnknownSet {
                set_id: set_id.to_string(),
            });
        };
        if index != self.carousel.index {
            self.activate_index(index);
            return Ok(());
        }
        self.open_set(set_id)
    }

    /// 打开图集
    ///
    /// 任何检查失败时不修改任何状态。
    pub fn open_set(&mut self, set_id: &str) -> Result<(), AbortReason> {
        if self.store.is_transitioning() {
            debug!(set = set_id, "过渡进行中，忽略打开");
            return Err(AbortReason::Reentrant);
        }
        let Some(index) = self.catalog.index_of(set_id) else {
            warn!(set = set_id, "打开未知图集");
            return Err(AbortReason::UnknownSet {
                set_id: set_id.to_string(),
            });
        };
        let id: SetId = set_id.to_string();
        let event = PhaseEvent::OpenRequested(id.clone());
        if self.phase.next(&event).is_none() || self.carousel.stepping.is_some() {
            debug!(phase = %self.phase, set = set_id, "当前不能打开");
            return Err(AbortReason::Reentrant);
        }
        if self.proxy.is_leased() {
            debug!(set = set_id, "代理已被租用，忽略打开");
            return Err(AbortReason::Reentrant);
        }

        let button = Anchor::PreviewButton(id.clone());
        let Some(first) = self.scene.capture_box(&button, CaptureProps::BOX) else {
            let reason = AbortReason::missing(&button);
            warn!(%reason, "打开中止");
            return Err(reason);
        };
        if !self.scene.is_attached(&Anchor::Overlay) {
            let reason = AbortReason::missing(&Anchor::Overlay);
            warn!(%reason, "打开中止");
            return Err(reason);
        }

        self.transition(event);
        // 上一次关闭的标题淡入不再负责恢复标题
        self.steps
            .retain(|_, step| !matches!(step, Step::CloseMetaReturn { .. }));
        self.settle_parallax();
        self.disable_parallax();
        self.hide_hover_label();
        self.carousel.index = index;

        // 代理覆盖在源预览上
        if !self.lease_proxy() {
            self.abort(AbortReason::Reentrant);
            self.enable_parallax();
            return Err(AbortReason::Reentrant);
        }
        self.place_proxy(Parent::Element(Anchor::Overlay), first.rect);
        self.scene
            .set_prop(&Anchor::Proxy, Prop::BorderRadius, self.layout.preview_radius);
        self.scene
            .set_prop(&Anchor::Proxy, Prop::Shadow, self.layout.preview_shadow);
        if let Some(photo) = self.catalog.get_set(&id).and_then(|set| set.preview_photo()) {
            let image = ImageRef {
                src: photo.src.clone(),
                alt: photo.alt.clone(),
            };
            self.scene.set_image(&Anchor::ProxyImage, image);
        }
        self.scene.set_prop(
            &Anchor::ProxyImage,
            Prop::Scale,
            self.timing.carousel.image_zoom,
        );
        self.animator.set(
            &mut self.scene,
            &Anchor::PreviewFrame(id.clone()),
            &[(Prop::Opacity, 0.0)],
        );

        // 主时间轴：邻居滑出、锁定脉冲、标题淡出
        let open = self.timing.open.clone();
        let viewport = self.scene.viewport();
        let clicked_center = first.rect.center().x;
        let mut timeline = Timeline::new();
        let mut neighbors = Vec::new();
        for other in self.set_ids() {
            if other == id {
                continue;
            }
            let item = Anchor::CarouselItem(other);
            let Some(rect) = self.scene.visual_rect(&item) else {
                continue;
            };
            if !rect.overlaps_horizontally(0.0, viewport.width, 0.0) {
                continue;
            }
            let distance = viewport.width + open.offscreen_margin + rect.width;
            let dx = if rect.center().x < clicked_center {
                -distance
            } else {
                distance
            };
            timeline = timeline.at(
                0.0,
                Segment::new(open.neighbor_duration, open.neighbor_easing).target(
                    item.clone(),
                    vec![PropTween::to(Prop::X, dx), PropTween::to(Prop::Opacity, 0.0)],
                ),
            );
            neighbors.push(item);
        }

        let timeline = timeline
            .at(
                0.0,
                Segment::new(open.pulse_down, open.pulse_easing).target(
                    button.clone(),
                    vec![PropTween::to(Prop::Scale, open.pulse_scale)],
                ),
            )
            .at(
                open.pulse_down,
                Segment::new(open.pulse_up, open.pulse_easing)
                    .target(button, vec![PropTween::to(Prop::Scale, 1.0)]),
            )
            .at(
                0.0,
                Segment::new(open.meta_duration, open.meta_easing).target(
                    Anchor::PreviewMeta(id.clone()),
                    vec![
                        PropTween::to(Prop::Y, open.meta_offset_y),
                        PropTween::to(Prop::Opacity, 0.0),
                    ],
                ),
            )
            .hold(0.0, open.hold);

        debug!(set = %id, neighbors = neighbors.len(), "打开：邻居滑出");
        let handle = self.animator.play(&mut self.scene, timeline);
        self.steps.insert(
            handle,
            Step::OpenNeighbors {
                set_id: id,
                neighbors,
            },
        );
        Ok(())
    }

    /// 请求关闭当前图集
    ///
    /// 详情视图注册了关闭处理器时走完整的关闭序列；否则直接清空 `active_set_id`。
    pub fn request_close(&mut self) -> Result<(), AbortReason> {
        match self.store.request_close() {
            CloseRoute::Handler(CloseOwner::DetailView) => {
                self.island.close_requested = true;
                self.close_set()
            }
            CloseRoute::Direct => {
                debug!("没有关闭处理器，直接关闭");
                self.sync_views();
                Ok(())
            }
        }
    }

    /// 关闭序列第一步：网格退场
    fn close_set(&mut self) -> Result<(), AbortReason> {
        if self.store.is_transitioning() {
            debug!("过渡进行中，忽略关闭");
            self.island.close_requested = false;
            return Err(AbortReason::Reentrant);
        }
        let set_id = match (
            self.phase.next(&PhaseEvent::CloseRequested),
            self.phase.set_id().cloned(),
        ) {
            (Some(_), Some(set_id)) => set_id,
            _ => {
                debug!(phase = %self.phase, "当前不能关闭");
                self.island.close_requested = false;
                return Err(AbortReason::Reentrant);
            }
        };

        self.transition(PhaseEvent::CloseRequested);
        self.disable_parallax();
        if let Some(index) = self.catalog.index_of(&set_id) {
            self.carousel.index = index;
        }
        self.cancel_grid_entrance();

        if !self.detail_mounted() {
            let reason = AbortReason::missing(&Anchor::DetailView);
            self.transition(PhaseEvent::GridExitDone);
            self.abort(reason.clone());
            self.sync_views();
            self.enable_parallax();
            return Err(reason);
        }

        debug!(set = %set_id, "关闭：网格退场");
        let handle = self.play_grid_exit();
        self.steps.insert(handle, Step::CloseGridExit { set_id });
        Ok(())
    }

    // ========== 步骤分派 ==========

    pub(crate) fn on_step(&mut self, step: Step, interrupted: bool) {
        match step {
            Step::CarouselStep { to } => self.finish_carousel_step(to, interrupted),
            Step::OpenNeighbors { set_id, neighbors } => {
                self.on_open_neighbors(set_id, &neighbors, interrupted)
            }
            Step::OpenHeroFlip { set_id } => self.on_open_hero_flip(&set_id, interrupted),
            Step::GridEntrance => self.finish_grid_entrance(interrupted),
            Step::CloseGridExit { set_id } => self.on_close_grid_exit(set_id, interrupted),
            Step::CloseHeroFlip {
                set_id,
                has_neighbors,
            } => self.on_close_hero_flip(&set_id, has_neighbors, interrupted),
            Step::CloseNeighborsReturn { items } => self.on_close_neighbors_return(&items),
            Step::CloseMetaReturn { set_id } => self.on_close_meta_return(&set_id),
            Step::IslandResize => self.finish_island_resize(),
            Step::IslandEntrance { targets } => self.finish_island_entrance(&targets),
            Step::IslandExit => self.finish_island_exit(),
        }
    }

    // ========== 打开 ==========

    fn on_open_neighbors(&mut self, set_id: SetId, neighbors: &[Anchor], interrupted: bool) {
        if interrupted || !self.transition(PhaseEvent::NeighborsDone) {
            self.restore_open_source(&set_id, neighbors);
            self.release_proxy();
            self.abort(AbortReason::Interrupted);
            self.enable_parallax();
            return;
        }

        // Opening(HeroFlip) 已提交 active_set_id：详情视图和浮动岛图集内容挂载
        self.sync_views();
        self.animator.set(
            &mut self.scene,
            &Anchor::IslandHeroImage,
            &[(Prop::Opacity, 0.0)],
        );

        let Some(first) = self.scene.capture_box(&Anchor::Proxy, CaptureProps::STYLE) else {
            self.abort_hero_flip(AbortReason::missing(&Anchor::Proxy));
            return;
        };
        if !self.scene.is_attached(&Anchor::IslandHeroSlot) {
            self.abort_hero_flip(AbortReason::missing(&Anchor::IslandHeroSlot));
            return;
        }

        self.place_proxy(
            Parent::Element(Anchor::IslandHeroSlot),
            self.layout.hero_slot_rect(),
        );
        let open = self.timing.open.clone();
        let options = FlipOptions::new(open.flip_duration, open.flip_easing)
            .border_radius(self.layout.hero_radius)
            .shadow(0.0)
            .with(
                Segment::new(open.flip_duration, open.flip_easing)
                    .target(Anchor::ProxyImage, vec![PropTween::to(Prop::Scale, 1.0)]),
            );

        match flip_from(
            &mut self.animator,
            &mut self.scene,
            &Anchor::Proxy,
            &first,
            options,
        ) {
            Some(handle) => {
                debug!(set = %set_id, "打开：代理飞向 hero 槽位");
                self.steps
                    .insert(handle, Step::OpenHeroFlip { set_id });
                self.play_grid_entrance();
            }
            None => self.abort_hero_flip(AbortReason::missing(&Anchor::Proxy)),
        }
    }

    /// 打开的 FLIP 阶段无法继续：详情保持打开
    fn abort_hero_flip(&mut self, reason: AbortReason) {
        self.scene
            .clear_props(&Anchor::IslandHeroImage, &[Prop::Opacity]);
        self.release_proxy();
        self.abort(reason);
        self.play_grid_entrance();
    }

    fn on_open_hero_flip(&mut self, set_id: &SetId, interrupted: bool) {
        self.scene
            .clear_props(&Anchor::IslandHeroImage, &[Prop::Opacity]);
        self.release_proxy();
        self.scene
            .clear_props(&Anchor::PreviewFrame(set_id.clone()), &[Prop::Opacity]);
        if interrupted {
            self.abort(AbortReason::Interrupted);
        } else {
            self.transition(PhaseEvent::HeroFlipDone);
        }
    }

    /// 打开在第一步被中止时恢复轮播
    fn restore_open_source(&mut self, set_id: &SetId, neighbors: &[Anchor]) {
        for item in neighbors {
            self.animator.kill_tweens_of(item);
            self.scene.clear_props(item, &[Prop::X, Prop::Opacity]);
        }
        let meta = Anchor::PreviewMeta(set_id.clone());
        let button = Anchor::PreviewButton(set_id.clone());
        for anchor in [&meta, &button] {
            self.animator.kill_tweens_of(anchor);
        }
        self.scene.clear_props(&meta, &[Prop::Y, Prop::Opacity]);
        self.scene.set_prop(&button, Prop::Scale, 1.0);
        self.scene
            .clear_props(&Anchor::PreviewFrame(set_id.clone()), &[Prop::Opacity]);
    }

    // ========== 关闭 ==========

    fn on_close_grid_exit(&mut self, set_id: SetId, interrupted: bool) {
        if interrupted {
            self.restore_grid_rest();
            self.island.close_requested = false;
            self.abort(AbortReason::Interrupted);
            self.enable_parallax();
            return;
        }

        let Some(slot) = self
            .scene
            .capture_box(&Anchor::IslandHeroSlot, CaptureProps::BOX)
        else {
            let reason = AbortReason::missing(&Anchor::IslandHeroSlot);
            self.transition(PhaseEvent::GridExitDone);
            self.abort(reason);
            self.sync_views();
            self.enable_parallax();
            return;
        };
        let first = BoxSnapshot {
            rect: slot.rect,
            border_radius: Some(self.layout.hero_radius),
            shadow: Some(0.0),
        };

        // 代理接管 hero 槽位
        if !self.lease_proxy() {
            self.transition(PhaseEvent::GridExitDone);
            self.abort(AbortReason::Reentrant);
            self.sync_views();
            self.enable_parallax();
            return;
        }
        self.place_proxy(Parent::Element(Anchor::Overlay), slot.rect);
        self.scene
            .set_prop(&Anchor::Proxy, Prop::BorderRadius, self.layout.hero_radius);
        self.scene.set_prop(&Anchor::Proxy, Prop::Opacity, 1.0);
        if let Some(hero) = self.catalog.get_set(&set_id).and_then(|set| set.hero()) {
            let image = ImageRef {
                src: hero.src.clone(),
                alt: hero.alt.clone(),
            };
            self.scene.set_image(&Anchor::ProxyImage, image);
        }
        self.scene.set_prop(&Anchor::ProxyImage, Prop::Scale, 1.0);
        self.animator.set(
            &mut self.scene,
            &Anchor::IslandHeroImage,
            &[(Prop::Opacity, 0.0)],
        );

        // Closing(HeroExit) 清空 active_set_id：详情卸载、轮播重新挂载、浮动岛开始退场
        self.transition(PhaseEvent::GridExitDone);
        self.sync_views();

        let frame = Anchor::PreviewFrame(set_id.clone());
        let Some(frame_rect) = self.scene.visual_rect(&frame) else {
            self.release_proxy();
            self.scene
                .clear_props(&Anchor::IslandHeroImage, &[Prop::Opacity]);
            self.abort(AbortReason::missing(&frame));
            self.sync_views();
            self.enable_parallax();
            return;
        };

        let close = self.timing.close.clone();
        let offscreen = self.timing.open.offscreen_margin;
        let viewport = self.scene.viewport();
        let clicked_center = frame_rect.center().x;

        // 邻居立即移到屏幕外
        let mut items = Vec::new();
        for other in self.set_ids() {
            if other == set_id {
                continue;
            }
            let item = Anchor::CarouselItem(other);
            let Some(rect) = self.scene.visual_rect(&item) else {
                continue;
            };
            if !rect.overlaps_horizontally(0.0, viewport.width, close.neighbor_margin) {
                continue;
            }
            let distance = viewport.width + offscreen + rect.width;
            let dx = if rect.center().x < clicked_center {
                -distance
            } else {
                distance
            };
            self.animator
                .set(&mut self.scene, &item, &[(Prop::X, dx), (Prop::Opacity, 0.0)]);
            items.push(item);
        }

        // 代理落地之前，缩略图不显示图片也不显示外框
        self.animator
            .set(&mut self.scene, &frame, &[(Prop::Opacity, 0.0)]);
        self.animator.set(
            &mut self.scene,
            &Anchor::PreviewImage(set_id.clone()),
            &[(Prop::Opacity, 0.0)],
        );
        self.animator.set(
            &mut self.scene,
            &Anchor::PreviewButton(set_id.clone()),
            &[(Prop::Shadow, 0.0)],
        );

        let meta = Timeline::new().at(
            0.0,
            Segment::new(close.meta_duration, close.meta_easing)
                .target(
                    Anchor::PreviewMeta(set_id.clone()),
                    vec![
                        PropTween::from_to(Prop::Opacity, 0.0, 1.0),
                        PropTween::from_to(Prop::Y, self.timing.open.meta_offset_y, 0.0),
                    ],
                )
                .delay(close.meta_delay),
        );
        let handle = self.animator.play(&mut self.scene, meta);
        self.steps.insert(
            handle,
            Step::CloseMetaReturn {
                set_id: set_id.clone(),
            },
        );

        // 代理飞回预览框
        self.place_proxy(Parent::Element(Anchor::Overlay), frame_rect);
        let zoom = self.timing.carousel.image_zoom;
        let options = FlipOptions::new(close.flip_duration, close.flip_easing)
            .border_radius(self.layout.preview_radius)
            .shadow(self.layout.preview_shadow)
            .with(
                Segment::new(close.flip_duration, close.flip_easing).target(
                    Anchor::ProxyImage,
                    vec![PropTween::from_to(Prop::Scale, 1.0, zoom)],
                ),
            );
        let has_neighbors = !items.is_empty();
        match flip_from(
            &mut self.animator,
            &mut self.scene,
            &Anchor::Proxy,
            &first,
            options,
        ) {
            Some(handle) => {
                self.steps.insert(
                    handle,
                    Step::CloseHeroFlip {
                        set_id: set_id.clone(),
                        has_neighbors,
                    },
                );
            }
            None => {
                self.on_close_hero_flip(&set_id, has_neighbors, true);
            }
        }

        if has_neighbors {
            let segment = Segment::new(close.neighbors_duration, close.neighbors_easing)
                .targets(
                    items.iter().cloned(),
                    &[PropTween::to(Prop::X, 0.0), PropTween::to(Prop::Opacity, 1.0)],
                )
                .delay(close.neighbors_delay);
            let handle = self
                .animator
                .play(&mut self.scene, Timeline::new().at(0.0, segment));
            self.steps
                .insert(handle, Step::CloseNeighborsReturn { items });
        }

        self.delayed
            .schedule(close.parallax_fallback, DelayedCall::ParallaxFallback);
        debug!(set = %set_id, has_neighbors, "关闭：代理飞回预览框");
    }

    fn on_close_hero_flip(&mut self, set_id: &SetId, has_neighbors: bool, interrupted: bool) {
        self.release_proxy();
        self.scene.clear_props(
            &Anchor::PreviewImage(set_id.clone()),
            &[Prop::Opacity],
        );
        self.scene.clear_props(
            &Anchor::PreviewFrame(set_id.clone()),
            &[Prop::Opacity],
        );
        self.scene
            .clear_props(&Anchor::IslandHeroImage, &[Prop::Opacity]);
        self.scene.set_prop(
            &Anchor::PreviewButton(set_id.clone()),
            Prop::Shadow,
            self.layout.preview_shadow,
        );

        if interrupted {
            self.abort(AbortReason::Interrupted);
            self.enable_parallax();
        } else {
            self.transition(PhaseEvent::HeroExitDone);
            if !has_neighbors {
                self.enable_parallax();
            }
        }
        self.sync_views();
    }

    fn on_close_neighbors_return(&mut self, items: &[Anchor]) {
        for item in items {
            self.scene.clear_props(item, &[Prop::X, Prop::Opacity]);
        }
        self.enable_parallax();
    }

    /// 标题淡入结束（完成或被中断）：回到静止值
    fn on_close_meta_return(&mut self, set_id: &SetId) {
        self.scene.clear_props(
            &Anchor::PreviewMeta(set_id.clone()),
            &[Prop::Y, Prop::Opacity],
        );
    }

    // ========== 代理辅助 ==========

    /// 租用代理；已被租用时返回 `false`，不影响现有租约
    fn lease_proxy(&mut self) -> bool {
        match self.proxy.acquire(&mut self.scene) {
            Some(lease) => {
                self.proxy_lease = Some(lease);
                true
            }
            None => false,
        }
    }

    /// 把代理放到 `parent` 下的 `rect`，代理图片铺满代理
    fn place_proxy(&mut self, parent: Parent, rect: Rect) {
        self.scene.reparent(&Anchor::Proxy, parent, rect);
        self.scene.reparent(
            &Anchor::ProxyImage,
            Parent::Element(Anchor::Proxy),
            Rect::from_size(rect.size()),
        );
    }

    /// 停止代理动画、脱离场景并交还租约
    pub(crate) fn release_proxy(&mut self) {
        let Some(lease) = self.proxy_lease.take() else {
            return;
        };
        for anchor in [Anchor::Proxy, Anchor::ProxyImage] {
            self.animator.kill_tweens_of(&anchor);
            self.scene.clear_all_props(&anchor);
        }
        self.scene.detach(&Anchor::Proxy);
        self.proxy.release(lease);
        debug!("代理已交还");
    }
}

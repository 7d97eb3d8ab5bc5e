//! # Island 模块
//!
//! 浮动岛：常驻顶部的指示器，在首页模式（品牌标签）和图集模式
//! （关闭按钮 + hero 槽位 + 标题）之间变形。
//!
//! ## 生命周期
//!
//! ```text
//! island_set_id: None ──Some(id)──▶ 挂载图集内容 + 尺寸动画 + 入场
//!                                          │
//!        关闭阶段 HeroExit 且关闭来自浮动岛 ─┘─▶ 退场时间轴
//!                                                  │ 完成 / 中断
//!                                                  ▼
//!                         清空 island_set_id，回到首页模式，品牌标签入场
//! ```

use tracing::debug;

use crate::animation::{AnimationHandle, Animator, PropTween, Segment, Timeline};
use crate::catalog::SetId;
use crate::gallery::Gallery;
use crate::geometry::Rect;
use crate::layout::IslandMode;
use crate::navigation::ClosePhase;
use crate::orchestrator::Step;
use crate::scene::{Anchor, ImageRef, Parent, Prop};

/// 图集模式下的全部内容锚点（不含 hero 槽位内部）
const SET_CONTENT: [Anchor; 3] = [
    Anchor::IslandCloseButton,
    Anchor::IslandPreviewWrapper,
    Anchor::IslandTitle,
];

/// 入场动画的属性；清除后即为入场终点
const ENTER_PROPS: [Prop; 3] = [Prop::Opacity, Prop::Y, Prop::Blur];

/// 浮动岛状态
#[derive(Debug, Clone)]
pub struct IslandState {
    pub(crate) mode: IslandMode,
    /// 当前挂载了内容的图集
    pub(crate) shown_set: Option<SetId>,
    /// 关闭是否由浮动岛发起
    pub(crate) close_requested: bool,
    /// 下一次回到首页模式时播放品牌标签入场
    pub(crate) home_enter_requested: bool,
    pub(crate) resize: Option<AnimationHandle>,
    pub(crate) entrance: Option<AnimationHandle>,
    pub(crate) exit: Option<AnimationHandle>,
}

impl Default for IslandState {
    fn default() -> Self {
        Self {
            mode: IslandMode::Home,
            shown_set: None,
            close_requested: false,
            home_enter_requested: false,
            resize: None,
            entrance: None,
            exit: None,
        }
    }
}

impl<A: Animator> Gallery<A> {
    // ========== 挂载 ==========

    pub(crate) fn mount_island(&mut self) {
        let rect = self
            .layout
            .island_rect(IslandMode::Home, self.scene.viewport());
        self.scene.mount(Anchor::Island, Parent::Root, rect);
        self.mount_island_home();
    }

    fn clear_island_content(&mut self) {
        self.cancel_island_entrance();
        self.scene.remove_subtree(&Anchor::IslandHomeLabel);
        for anchor in &SET_CONTENT {
            self.animator.kill_tweens_of(anchor);
            self.scene.remove_subtree(anchor);
        }
    }

    fn mount_island_home(&mut self) {
        self.clear_island_content();
        let size = self.layout.island_home;
        self.scene.mount(
            Anchor::IslandHomeLabel,
            Parent::Element(Anchor::Island),
            Rect::from_size(size),
        );
        self.scene
            .set_text(&Anchor::IslandHomeLabel, self.brand.clone());
        self.island.mode = IslandMode::Home;
        self.island.shown_set = None;
    }

    fn mount_island_set(&mut self, set_id: &SetId) {
        self.clear_island_content();
        let Some(set) = self.catalog.get_set(set_id) else {
            return;
        };
        let island = Parent::Element(Anchor::Island);

        self.scene.mount(
            Anchor::IslandCloseButton,
            island.clone(),
            self.layout.island_close_button_rect(),
        );
        self.scene.mount(
            Anchor::IslandPreviewWrapper,
            island.clone(),
            self.layout.island_preview_wrapper_rect(),
        );
        self.scene.mount(
            Anchor::IslandHeroSlot,
            Parent::Element(Anchor::IslandPreviewWrapper),
            self.layout.hero_slot_rect(),
        );
        self.scene.mount(
            Anchor::IslandHeroImage,
            Parent::Element(Anchor::IslandHeroSlot),
            self.layout.hero_slot_rect(),
        );
        self.scene.set_prop(
            &Anchor::IslandHeroImage,
            Prop::BorderRadius,
            self.layout.hero_radius,
        );
        if let Some(hero) = set.hero() {
            self.scene.set_image(
                &Anchor::IslandHeroImage,
                ImageRef {
                    src: hero.src.clone(),
                    alt: String::new(),
                },
            );
        }
        self.scene.mount(
            Anchor::IslandTitle,
            island,
            self.layout.island_title_rect(),
        );
        self.scene.set_text(&Anchor::IslandTitle, set.name.clone());

        self.island.mode = IslandMode::Set;
        self.island.shown_set = Some(set_id.clone());
    }

    /// 视口变化后重新居中
    pub(crate) fn relayout_island(&mut self) {
        let rect = self
            .layout
            .island_rect(self.island.mode, self.scene.viewport());
        self.scene.set_layout(&Anchor::Island, rect);
    }

    // ========== 同步 ==========

    /// 让浮动岛的内容跟上 `island_set_id`，并处理退场条件
    pub(crate) fn sync_island(&mut self) {
        let desired = self.store.island_set_id().cloned();
        if desired != self.island.shown_set {
            let from = self.island_size();
            match &desired {
                Some(id) => {
                    // 上一次关闭的退场还没结束：它不能再清空新的图集
                    if let Some(handle) = self.island.exit.take() {
                        self.steps.remove(&handle);
                        self.animator.cancel(handle);
                        self.island.close_requested = false;
                    }
                    self.mount_island_set(id);
                    self.resize_island(from);
                    self.play_island_entrance();
                }
                None => {
                    self.mount_island_home();
                    self.resize_island(from);
                    if self.island.home_enter_requested {
                        self.island.home_enter_requested = false;
                        self.play_home_entrance();
                    }
                }
            }
            debug!(island = ?desired, mode = ?self.island.mode, "浮动岛内容切换");
        }

        let close_phase = self.store.close_phase();
        if self.store.island_set_id().is_none() && close_phase == ClosePhase::Idle {
            self.island.close_requested = false;
        }

        if self.island.close_requested
            && close_phase == ClosePhase::HeroExit
            && self.island.exit.is_none()
            && self.island.shown_set.is_some()
        {
            self.play_island_exit();
        } else if self.phase.is_idle()
            && self.store.active_set_id().is_none()
            && self.store.island_set_id().is_some()
            && self.island.exit.is_none()
        {
            // 没有退场动画会来清理的残留图集内容
            debug!("清理残留的浮动岛图集");
            self.store.set_island_set_id(None);
            self.sync_island();
        }
    }

    /// 浮动岛当前的视觉尺寸（包含进行中的尺寸动画）
    fn island_size(&self) -> crate::geometry::Size {
        self.scene
            .visual_rect(&Anchor::Island)
            .map(|rect| rect.size())
            .unwrap_or(self.layout.island_home)
    }

    /// 从 `from` 尺寸过渡到当前模式的自然尺寸
    fn resize_island(&mut self, from: crate::geometry::Size) {
        let viewport = self.scene.viewport();
        let to = self.layout.island_size(self.island.mode);
        self.scene.set_layout(
            &Anchor::Island,
            self.layout.island_rect(self.island.mode, viewport),
        );

        if let Some(handle) = self.island.resize.take() {
            self.steps.remove(&handle);
            self.animator.cancel(handle);
        }
        self.animator.kill_tweens_of(&Anchor::Island);
        self.scene
            .clear_props(&Anchor::Island, &[Prop::Width, Prop::Height]);

        let timing = &self.timing.island;
        if !from.differs_from(&to, timing.resize_threshold) {
            return;
        }
        let timeline = Timeline::new().at(
            0.0,
            Segment::new(timing.resize_duration, timing.resize_easing).target(
                Anchor::Island,
                vec![
                    PropTween::from_to(Prop::Width, from.width, to.width),
                    PropTween::from_to(Prop::Height, from.height, to.height),
                ],
            ),
        );
        let handle = self.animator.play(&mut self.scene, timeline);
        self.steps.insert(handle, Step::IslandResize);
        self.island.resize = Some(handle);
    }

    pub(crate) fn finish_island_resize(&mut self) {
        self.island.resize = None;
        self.scene
            .clear_props(&Anchor::Island, &[Prop::Width, Prop::Height]);
    }

    // ========== 入场 / 退场 ==========

    fn fade_in_props(&self) -> Vec<PropTween> {
        let timing = &self.timing.island;
        vec![
            PropTween::from_to(Prop::Opacity, 0.0, 1.0),
            PropTween::from_to(Prop::Y, timing.offset_y, 0.0),
            PropTween::from_to(Prop::Blur, timing.blur, 0.0),
        ]
    }

    /// 图集内容入场
    ///
    /// 过渡进行中时代理占据 hero 槽位，预览包裹层不参与入场、直接可见。
    fn play_island_entrance(&mut self) {
        let transitioning = self.store.is_transitioning();
        let targets: Vec<Anchor> = if transitioning {
            self.animator.set(
                &mut self.scene,
                &Anchor::IslandPreviewWrapper,
                &[(Prop::Opacity, 1.0), (Prop::Y, 0.0), (Prop::Blur, 0.0)],
            );
            vec![Anchor::IslandCloseButton, Anchor::IslandTitle]
        } else {
            SET_CONTENT.to_vec()
        };

        let timing = self.timing.island.clone();
        let segment = Segment::new(timing.enter_duration, timing.enter_easing)
            .targets(targets.clone(), &self.fade_in_props())
            .stagger(timing.enter_stagger)
            .delay(timing.enter_delay);
        self.track_island_entrance(segment, targets);
    }

    fn play_home_entrance(&mut self) {
        let timing = self.timing.island.clone();
        let segment = Segment::new(timing.enter_duration, timing.enter_easing)
            .target(Anchor::IslandHomeLabel, self.fade_in_props())
            .delay(timing.enter_delay);
        self.animator.kill_tweens_of(&Anchor::IslandHomeLabel);
        self.track_island_entrance(segment, vec![Anchor::IslandHomeLabel]);
    }

    fn track_island_entrance(&mut self, segment: Segment, targets: Vec<Anchor>) {
        self.cancel_island_entrance();
        let handle = self
            .animator
            .play(&mut self.scene, Timeline::new().at(0.0, segment));
        self.steps.insert(handle, Step::IslandEntrance { targets });
        self.island.entrance = Some(handle);
    }

    /// 静默取消入场，不触发结束处理
    fn cancel_island_entrance(&mut self) {
        if let Some(handle) = self.island.entrance.take() {
            self.steps.remove(&handle);
            self.animator.cancel(handle);
        }
    }

    /// 入场结束（完成或被中断）：内容停在终点
    pub(crate) fn finish_island_entrance(&mut self, targets: &[Anchor]) {
        self.island.entrance = None;
        for anchor in targets {
            self.scene.clear_props(anchor, &ENTER_PROPS);
        }
    }

    /// 图集内容退场：包裹层先淡出，随后关闭按钮和标题从后往前淡出
    fn play_island_exit(&mut self) {
        self.cancel_island_entrance();
        for anchor in &SET_CONTENT {
            self.animator.kill_tweens_of(anchor);
        }
        let timing = self.timing.island.clone();
        let timeline = Timeline::new()
            .at(
                0.0,
                Segment::new(timing.wrapper_exit_duration, timing.wrapper_exit_easing).target(
                    Anchor::IslandPreviewWrapper,
                    vec![PropTween::to(Prop::Opacity, 0.0)],
                ),
            )
            .at(
                timing.text_exit_at,
                Segment::new(timing.text_exit_duration, timing.text_exit_easing)
                    .targets(
                        [Anchor::IslandCloseButton, Anchor::IslandTitle],
                        &[
                            PropTween::to(Prop::Opacity, 0.0),
                            PropTween::to(Prop::Y, timing.offset_y),
                            PropTween::to(Prop::Blur, timing.blur),
                        ],
                    )
                    .stagger(timing.text_exit_stagger)
                    .from_end(),
            );
        let handle = self.animator.play(&mut self.scene, timeline);
        self.steps.insert(handle, Step::IslandExit);
        self.island.exit = Some(handle);
        debug!("浮动岛退场");
    }

    /// 退场结束（完成或被中断）：回到首页模式
    pub(crate) fn finish_island_exit(&mut self) {
        self.island.exit = None;
        self.island.home_enter_requested = true;
        self.store.set_island_set_id(None);
        self.sync_island();
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::Catalog;
    use crate::gallery::{Gallery, GalleryConfig};
    use crate::layout::IslandMode;
    use crate::navigation::ClosePhase;
    use crate::phase::TransitionPhase;
    use crate::scene::{Anchor, Prop};

    fn open_gallery() -> Gallery {
        let config = GalleryConfig {
            seed: Some(3),
            ..GalleryConfig::default()
        };
        let mut gallery = Gallery::new(Catalog::builtin().unwrap(), config);
        gallery.click_preview("dunes").unwrap();
        advance(&mut gallery, 3.0);
        assert!(matches!(gallery.phase, TransitionPhase::Open { .. }));
        gallery
    }

    fn advance(gallery: &mut Gallery, seconds: f32) {
        let frames = (seconds * 60.0).ceil() as usize;
        for _ in 0..frames {
            gallery.tick(1.0 / 60.0);
        }
    }

    #[test]
    fn test_exit_requires_island_close_request() {
        let mut gallery = open_gallery();
        gallery.request_close().unwrap();
        gallery.island.close_requested = false;

        let mut reached_hero_exit = false;
        for _ in 0..180 {
            gallery.tick(1.0 / 60.0);
            if gallery.store.close_phase() == ClosePhase::HeroExit {
                reached_hero_exit = true;
                assert!(gallery.island.exit.is_none());
                assert_eq!(gallery.island.mode, IslandMode::Set);
            }
            if gallery.phase.is_idle() {
                break;
            }
        }
        assert!(reached_hero_exit);

        // 没有退场动画时，空闲后由残留清理回到首页
        assert!(gallery.phase.is_idle());
        assert_eq!(gallery.island.mode, IslandMode::Home);
        assert!(gallery.store.island_set_id().is_none());
        assert!(gallery.island.exit.is_none());
    }

    #[test]
    fn test_idle_resets_close_request() {
        let config = GalleryConfig {
            seed: Some(3),
            ..GalleryConfig::default()
        };
        let mut gallery = Gallery::new(Catalog::builtin().unwrap(), config);
        gallery.island.close_requested = true;
        gallery.sync_island();
        assert!(!gallery.island.close_requested);

        // 残留的请求不会让下一次打开后的浮动岛退场
        gallery.click_preview("dunes").unwrap();
        advance(&mut gallery, 3.0);
        assert!(gallery.island.exit.is_none());
        assert_eq!(gallery.island.mode, IslandMode::Set);
    }

    #[test]
    fn test_interrupted_entrance_lands_content() {
        let config = GalleryConfig {
            seed: Some(3),
            ..GalleryConfig::default()
        };
        let mut gallery = Gallery::new(Catalog::builtin().unwrap(), config);
        gallery.click_preview("dunes").unwrap();
        for _ in 0..60 {
            gallery.tick(1.0 / 60.0);
            if gallery.island.entrance.is_some() {
                break;
            }
        }
        assert!(gallery.island.entrance.is_some());
        assert_eq!(
            gallery.scene.prop(&Anchor::IslandTitle, Prop::Opacity),
            Some(0.0)
        );

        gallery.interrupt();
        assert!(gallery.island.entrance.is_none());
        for anchor in [Anchor::IslandCloseButton, Anchor::IslandTitle] {
            assert!(!gallery.scene.has_inline(&anchor, Prop::Opacity));
            assert_eq!(gallery.scene.prop(&anchor, Prop::Opacity), Some(1.0));
            assert_eq!(gallery.scene.prop(&anchor, Prop::Blur), Some(0.0));
        }
    }
}

//! # 过渡编排集成测试
//!
//! 通过公开的 `Gallery` API 驱动完整的打开 / 关闭序列。
//! 使用内置目录和固定种子，时间只通过 `tick` 推进。

use gallery_runtime::animation::{
    Animatable, AnimationEvent, AnimationHandle, AnimationSystem, Animator, Timeline,
};
use gallery_runtime::{
    AbortReason, Anchor, Catalog, ClosePhase, CloseStage, Gallery, GalleryConfig, GestureInput,
    IslandMode, NavigationSnapshot, OpenStage, Prop, Size, TransitionPhase, Vec2,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::Cell;
use std::rc::Rc;

const FRAME: f32 = 1.0 / 60.0;

fn config() -> GalleryConfig {
    GalleryConfig {
        seed: Some(7),
        ..GalleryConfig::default()
    }
}

fn gallery() -> Gallery {
    Gallery::new(Catalog::builtin().unwrap(), config())
}

/// 按 60fps 推进 `seconds` 秒
fn run<A: Animator>(gallery: &mut Gallery<A>, seconds: f32) {
    let frames = (seconds / FRAME).ceil() as usize;
    for _ in 0..frames {
        gallery.tick(FRAME);
    }
}

/// 推进直到条件成立，最多 `max_seconds` 秒
fn run_until<A: Animator>(
    gallery: &mut Gallery<A>,
    max_seconds: f32,
    done: impl Fn(&Gallery<A>) -> bool,
) -> bool {
    let frames = (max_seconds / FRAME).ceil() as usize;
    for _ in 0..frames {
        if done(gallery) {
            return true;
        }
        gallery.tick(FRAME);
    }
    done(gallery)
}

fn is_hero_exit<A: Animator>(gallery: &Gallery<A>) -> bool {
    matches!(
        gallery.phase(),
        TransitionPhase::Closing {
            stage: CloseStage::HeroExit,
            ..
        }
    )
}

/// 打开图集并等待所有动画结束
fn open_and_settle(gallery: &mut Gallery, set_id: &str) {
    gallery.click_preview(set_id).unwrap();
    run(gallery, 3.0);
    assert_eq!(
        gallery.phase(),
        &TransitionPhase::Open {
            set_id: set_id.to_string()
        }
    );
}

fn idle_snapshot() -> NavigationSnapshot {
    NavigationSnapshot {
        active_set_id: None,
        island_set_id: None,
        is_transitioning: false,
        close_phase: ClosePhase::Idle,
    }
}

// ========== 打开 ==========

#[test]
fn test_open_dunes_from_first_position() {
    let mut gallery = gallery();
    assert_eq!(gallery.carousel_index(), 0);

    gallery.click_preview("dunes").unwrap();
    assert!(!gallery.is_stepping());
    assert!(matches!(
        gallery.phase(),
        TransitionPhase::Opening {
            stage: OpenStage::Neighbors,
            ..
        }
    ));
    assert!(gallery.store().is_transitioning());
    assert!(gallery.proxy_leased());
    assert!(gallery.scene().is_attached(&Anchor::Proxy));
    assert_eq!(
        gallery
            .scene()
            .prop(&Anchor::PreviewFrame("dunes".into()), Prop::Opacity),
        Some(0.0)
    );

    run(&mut gallery, 3.0);

    assert_eq!(
        gallery.store().active_set_id().map(String::as_str),
        Some("dunes")
    );
    assert_eq!(
        gallery.store().island_set_id().map(String::as_str),
        Some("dunes")
    );
    assert!(!gallery.store().is_transitioning());
    assert_eq!(gallery.carousel_index(), 0);
    assert!(!gallery.proxy_leased());
    assert!(!gallery.scene().is_attached(&Anchor::Proxy));
    assert!(!gallery.scene().is_attached(&Anchor::Track));
    assert_eq!(gallery.island_mode(), IslandMode::Set);
    assert_eq!(
        gallery.scene().text(&Anchor::IslandTitle),
        Some("Dunes Afterlight")
    );

    let items = gallery.grid_anchors();
    assert_eq!(items.len(), 4);
    for item in &items {
        assert_eq!(gallery.scene().prop(item, Prop::Opacity), Some(1.0));
        assert_eq!(gallery.scene().prop(item, Prop::X), Some(0.0));
        assert_eq!(gallery.scene().prop(item, Prop::Y), Some(0.0));
    }
    assert!(gallery.is_settled());
}

#[test]
fn test_click_off_center_recenters_without_opening() {
    let mut gallery = gallery();
    gallery.click_preview("ice").unwrap();
    assert!(gallery.is_stepping());
    assert!(gallery.phase().is_idle());
    assert!(!gallery.proxy_leased());

    run(&mut gallery, 1.0);
    assert_eq!(gallery.carousel_index(), 2);
    assert!(gallery.store().is_idle());

    gallery.click_preview("ice").unwrap();
    assert!(gallery.store().is_transitioning());
}

#[test]
fn test_second_open_ignored_while_opening() {
    let mut gallery = gallery();
    gallery.click_preview("dunes").unwrap();
    let before = gallery.snapshot();

    assert_eq!(gallery.open_set("ice"), Err(AbortReason::Reentrant));
    assert_eq!(gallery.click_preview("nocturnes"), Err(AbortReason::Reentrant));
    assert_eq!(gallery.snapshot(), before);
    assert_eq!(
        gallery.phase().set_id().map(String::as_str),
        Some("dunes")
    );
}

#[test]
fn test_open_unknown_set() {
    let mut gallery = gallery();
    assert_eq!(
        gallery.open_set("missing"),
        Err(AbortReason::UnknownSet {
            set_id: "missing".to_string()
        })
    );
    assert_eq!(gallery.snapshot(), idle_snapshot());
    assert!(gallery.is_settled());
}

#[test]
fn test_interrupt_during_neighbors_restores_carousel() {
    let mut gallery = gallery();
    gallery.click_preview("dunes").unwrap();
    run(&mut gallery, 0.2);

    gallery.interrupt();

    assert!(gallery.phase().is_idle());
    assert_eq!(gallery.snapshot(), idle_snapshot());
    assert!(!gallery.proxy_leased());
    assert!(!gallery.scene().is_attached(&Anchor::Proxy));
    assert!(gallery.parallax_enabled());
    assert!(gallery.scene().is_attached(&Anchor::Track));

    let scene = gallery.scene();
    assert_eq!(
        scene.prop(&Anchor::PreviewFrame("dunes".into()), Prop::Opacity),
        Some(1.0)
    );
    let neighbor = Anchor::CarouselItem("nocturnes".into());
    assert_eq!(scene.prop(&neighbor, Prop::X), Some(0.0));
    assert_eq!(scene.prop(&neighbor, Prop::Opacity), Some(1.0));
}

// ========== 关闭 ==========

#[test]
fn test_open_then_close_returns_to_idle() {
    let mut gallery = gallery();
    open_and_settle(&mut gallery, "dunes");

    gallery.request_close().unwrap();
    assert!(matches!(
        gallery.phase(),
        TransitionPhase::Closing {
            stage: CloseStage::GridExit,
            ..
        }
    ));
    assert_eq!(gallery.store().close_phase(), ClosePhase::GridExit);

    run(&mut gallery, 4.0);

    assert_eq!(gallery.snapshot(), idle_snapshot());
    assert!(gallery.phase().is_idle());
    assert!(gallery.scene().is_attached(&Anchor::Track));
    assert!(!gallery.scene().contains(&Anchor::DetailView));
    assert!(!gallery.proxy_leased());
    assert!(gallery.parallax_enabled());
    assert_eq!(gallery.island_mode(), IslandMode::Home);

    let scene = gallery.scene();
    assert_eq!(
        scene.prop(&Anchor::PreviewFrame("dunes".into()), Prop::Opacity),
        Some(1.0)
    );
    assert_eq!(
        scene.prop(&Anchor::PreviewImage("dunes".into()), Prop::Opacity),
        Some(1.0)
    );
    assert_eq!(
        scene.prop(&Anchor::PreviewButton("dunes".into()), Prop::Shadow),
        Some(gallery.layout().preview_shadow)
    );
    assert_eq!(
        scene.prop(&Anchor::CarouselItem("nocturnes".into()), Prop::X),
        Some(0.0)
    );
    assert!(gallery.is_settled());
}

#[test]
fn test_close_restores_carousel_index() {
    let mut gallery = gallery();
    assert!(gallery.activate_index(2));
    run(&mut gallery, 1.0);
    open_and_settle(&mut gallery, "ice");

    gallery.request_close().unwrap();
    run(&mut gallery, 4.0);

    assert_eq!(gallery.carousel_index(), 2);
    let expected = gallery.layout().track_x_for_index(
        2,
        gallery.catalog().len(),
        gallery.scene().viewport(),
    );
    assert_eq!(gallery.scene().prop(&Anchor::Track, Prop::X), Some(expected));
    assert_eq!(gallery.snapshot(), idle_snapshot());
}

#[test]
fn test_interrupt_mid_hero_exit() {
    let mut gallery = gallery();
    open_and_settle(&mut gallery, "dunes");
    gallery.request_close().unwrap();

    assert!(run_until(&mut gallery, 2.0, is_hero_exit));
    run(&mut gallery, 0.2);
    assert!(gallery.scene().is_attached(&Anchor::Proxy));

    gallery.interrupt();

    assert!(!gallery.store().is_transitioning());
    assert_eq!(gallery.store().close_phase(), ClosePhase::Idle);
    assert!(!gallery.proxy_leased());
    assert!(!gallery.scene().is_attached(&Anchor::Proxy));
    assert!(gallery.phase().is_idle());
    assert!(gallery.parallax_enabled());

    run(&mut gallery, 2.0);
    assert_eq!(gallery.snapshot(), idle_snapshot());
}

#[test]
fn test_island_exit_waits_for_hero_exit() {
    let mut gallery = gallery();
    open_and_settle(&mut gallery, "dunes");
    gallery.request_close().unwrap();
    assert_eq!(gallery.island_mode(), IslandMode::Set);

    assert!(run_until(&mut gallery, 2.0, is_hero_exit));
    assert_eq!(gallery.store().active_set_id(), None);
    assert_eq!(
        gallery.store().island_set_id().map(String::as_str),
        Some("dunes")
    );
    assert_eq!(gallery.island_mode(), IslandMode::Set);

    run(&mut gallery, 0.3);
    assert_eq!(gallery.island_mode(), IslandMode::Set);

    run(&mut gallery, 2.0);
    assert_eq!(gallery.island_mode(), IslandMode::Home);
    assert_eq!(gallery.store().island_set_id(), None);
    assert!(gallery.scene().is_attached(&Anchor::IslandHomeLabel));
    assert!(!gallery.scene().contains(&Anchor::IslandTitle));
}

#[test]
fn test_request_close_without_handler() {
    let mut gallery = gallery();
    assert_eq!(gallery.request_close(), Ok(()));
    assert_eq!(gallery.snapshot(), idle_snapshot());
    assert!(gallery.phase().is_idle());
}

#[test]
fn test_close_rejected_while_opening() {
    let mut gallery = gallery();
    gallery.click_preview("dunes").unwrap();
    run(&mut gallery, 0.7);
    assert!(matches!(
        gallery.phase(),
        TransitionPhase::Opening {
            stage: OpenStage::HeroFlip,
            ..
        }
    ));

    assert_eq!(gallery.request_close(), Err(AbortReason::Reentrant));
    run(&mut gallery, 3.0);
    assert_eq!(
        gallery.phase(),
        &TransitionPhase::Open {
            set_id: "dunes".to_string()
        }
    );
    assert_eq!(gallery.island_mode(), IslandMode::Set);
}

// ========== 轮播 ==========

#[test]
fn test_activate_index_is_idempotent() {
    let mut gallery = gallery();
    assert!(gallery.activate_index(1));
    assert_eq!(gallery.animator().active_count(), 1);

    assert!(!gallery.activate_index(1));
    assert_eq!(gallery.animator().active_count(), 1);

    run(&mut gallery, 1.0);
    assert_eq!(gallery.carousel_index(), 1);
    assert!(!gallery.activate_index(1));
    assert_eq!(gallery.animator().active_count(), 0);
}

#[test]
fn test_activate_index_clamps() {
    let mut gallery = gallery();
    assert!(gallery.activate_index(99));
    run(&mut gallery, 1.0);
    assert_eq!(gallery.carousel_index(), gallery.catalog().len() - 1);
}

#[test]
fn test_gesture_steps_one_item() {
    let mut gallery = gallery();
    assert!(!gallery.gesture(GestureInput::new(4.0, 6.0)));
    assert!(gallery.gesture(GestureInput::new(2.0, 40.0)));
    assert!(!gallery.gesture(GestureInput::new(2.0, 40.0)));

    run(&mut gallery, 1.0);
    assert_eq!(gallery.carousel_index(), 1);

    assert!(gallery.gesture(GestureInput::new(-30.0, 0.0)));
    run(&mut gallery, 1.0);
    assert_eq!(gallery.carousel_index(), 0);
}

#[test]
fn test_hover_parallax_tilts_and_returns() {
    let mut gallery = gallery();
    let frame = Anchor::PreviewFrame("dunes".into());
    let rect = gallery.scene().visual_rect(&frame).unwrap();
    let corner = Vec2::new(rect.x + 1.0, rect.y + 1.0);

    gallery.pointer_move(corner);
    run(&mut gallery, 0.5);
    let tilt_x = gallery.scene().prop(&frame, Prop::RotationX).unwrap();
    let tilt_y = gallery.scene().prop(&frame, Prop::RotationY).unwrap();
    assert!(tilt_x < -5.0);
    assert!(tilt_y > 5.0);
    assert!(gallery.scene().prop(&Anchor::HoverLabel, Prop::Opacity).unwrap() > 0.9);

    gallery.pointer_move(Vec2::new(2.0, 2.0));
    run(&mut gallery, 0.5);
    assert_eq!(gallery.scene().prop(&frame, Prop::RotationX), Some(0.0));
    assert_eq!(gallery.scene().prop(&frame, Prop::Z), Some(0.0));
}

// ========== 压力 ==========

#[test]
fn test_rapid_random_input_always_unlocks() {
    let ids: Vec<String> = gallery()
        .catalog()
        .all_sets()
        .iter()
        .map(|set| set.id.clone())
        .collect();

    for seed in 0..8u64 {
        let mut gallery = gallery();
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..300 {
            match rng.random_range(0..7) {
                0 => {
                    let id = &ids[rng.random_range(0..ids.len())];
                    let _ = gallery.click_preview(id);
                }
                1 => {
                    let _ = gallery.request_close();
                }
                2 => {
                    let dy = if rng.random_bool(0.5) { 40.0 } else { -40.0 };
                    gallery.gesture(GestureInput::new(0.0, dy));
                }
                3 => {
                    let x = rng.random_range(0.0..1440.0);
                    let y = rng.random_range(0.0..900.0);
                    gallery.pointer_move(Vec2::new(x, y));
                }
                4 => {
                    if rng.random_range(0..5) == 0 {
                        gallery.interrupt();
                    }
                }
                5 => {
                    let width = rng.random_range(800.0..1600.0);
                    gallery.resize(Size::new(width, 900.0));
                }
                _ => gallery.tick(rng.random_range(0.0..0.3)),
            }
        }

        run(&mut gallery, 10.0);

        assert!(!gallery.store().is_transitioning(), "seed {seed}");
        assert_eq!(gallery.store().close_phase(), ClosePhase::Idle, "seed {seed}");
        assert!(!gallery.proxy_leased(), "seed {seed}");
        assert!(!gallery.scene().is_attached(&Anchor::Proxy), "seed {seed}");
        assert!(gallery.is_settled(), "seed {seed}");
        match gallery.phase() {
            TransitionPhase::Idle => assert!(gallery.store().is_idle(), "seed {seed}"),
            TransitionPhase::Open { set_id } => {
                assert_eq!(gallery.store().active_set_id(), Some(set_id), "seed {seed}")
            }
            other => panic!("seed {seed}: 停在过渡阶段 {other}"),
        }
    }
}

// ========== 网格兜底 ==========

/// 冻结部分时间轴的动画器
///
/// 开关打开后，触及 `freeze` 所选锚点的时间轴只写入显式起始值，永远不完成。
struct Freezer {
    inner: AnimationSystem,
    freeze: fn(&Anchor) -> bool,
    armed: Rc<Cell<bool>>,
    frozen: Vec<AnimationHandle>,
    next_frozen: u64,
}

impl Freezer {
    fn new(freeze: fn(&Anchor) -> bool, armed: Rc<Cell<bool>>) -> Self {
        Self {
            inner: AnimationSystem::new(),
            freeze,
            armed,
            frozen: Vec::new(),
            next_frozen: 1_000_000,
        }
    }
}

impl Animator for Freezer {
    fn play(&mut self, target: &mut dyn Animatable, timeline: Timeline) -> AnimationHandle {
        let frozen = self.armed.get() && timeline.targets().any(|anchor| (self.freeze)(anchor));
        if !frozen {
            return self.inner.play(target, timeline);
        }
        for tween in timeline.into_tweens() {
            if let Some(from) = tween.from {
                self.inner.set(target, &tween.target, &[(tween.prop, from)]);
            }
        }
        self.next_frozen += 1;
        let handle = AnimationHandle::new(self.next_frozen);
        self.frozen.push(handle);
        handle
    }

    fn set(&mut self, target: &mut dyn Animatable, anchor: &Anchor, props: &[(Prop, f32)]) {
        self.inner.set(target, anchor, props);
    }

    fn cancel(&mut self, handle: AnimationHandle) -> bool {
        self.frozen.retain(|h| *h != handle);
        self.inner.cancel(handle)
    }

    fn cancel_all(&mut self) {
        self.frozen.clear();
        self.inner.cancel_all();
    }

    fn kill_tweens_of(&mut self, anchor: &Anchor) {
        self.inner.kill_tweens_of(anchor);
    }

    fn update(&mut self, target: &mut dyn Animatable, dt: f32) -> Vec<AnimationEvent> {
        self.inner.update(target, dt)
    }

    fn is_active(&self, handle: AnimationHandle) -> bool {
        self.frozen.contains(&handle) || self.inner.is_active(handle)
    }

    fn active_count(&self) -> usize {
        self.frozen.len() + self.inner.active_count()
    }
}

#[test]
fn test_grid_safety_timeout_forces_opacity() {
    let freezer = Freezer::new(
        |anchor| matches!(anchor, Anchor::GridItem(_)),
        Rc::new(Cell::new(true)),
    );
    let mut gallery = Gallery::with_animator(Catalog::builtin().unwrap(), config(), freezer);
    gallery.click_preview("dunes").unwrap();

    run(&mut gallery, 2.0);
    assert!(matches!(gallery.phase(), TransitionPhase::Open { .. }));
    let items = gallery.grid_anchors();
    assert_eq!(items.len(), 4);
    for item in &items {
        assert_eq!(gallery.scene().prop(item, Prop::Opacity), Some(0.0));
    }
    assert_eq!(gallery.pending_steps(), 1);

    run(&mut gallery, 1.0);
    let catalog = Catalog::builtin().unwrap();
    let photos = catalog.get_set("dunes").unwrap().detail_photos();
    for (item, photo) in items.iter().zip(photos) {
        assert_eq!(gallery.scene().prop(item, Prop::Opacity), Some(1.0));
        assert_eq!(gallery.scene().prop(item, Prop::X), Some(0.0));
        assert_eq!(gallery.scene().prop(item, Prop::Y), Some(0.0));
        assert_eq!(
            gallery.scene().prop(item, Prop::Rotation),
            Some(photo.rotation.unwrap_or(0.0))
        );
    }
}

#[test]
fn test_parallax_fallback_when_neighbors_never_return() {
    let armed = Rc::new(Cell::new(false));
    let freezer = Freezer::new(
        |anchor| matches!(anchor, Anchor::CarouselItem(_)),
        armed.clone(),
    );
    let mut gallery = Gallery::with_animator(Catalog::builtin().unwrap(), config(), freezer);
    gallery.click_preview("dunes").unwrap();
    run(&mut gallery, 3.0);
    assert!(matches!(gallery.phase(), TransitionPhase::Open { .. }));

    // 邻居归位的时间轴永远不会完成
    armed.set(true);
    gallery.request_close().unwrap();
    assert!(run_until(&mut gallery, 3.0, is_hero_exit));
    assert!(run_until(&mut gallery, 3.0, |g| g.phase().is_idle()));
    assert!(!gallery.parallax_enabled());
    assert!(!gallery.is_settled());

    run(&mut gallery, 1.0);
    assert!(gallery.parallax_enabled());
}

// ========== 中断后的静止状态 ==========

#[test]
fn test_interrupt_during_hero_flip_lands_grid() {
    let mut reference = gallery();
    open_and_settle(&mut reference, "dunes");

    let mut gallery = gallery();
    gallery.click_preview("dunes").unwrap();
    run(&mut gallery, 0.7);
    assert!(matches!(
        gallery.phase(),
        TransitionPhase::Opening {
            stage: OpenStage::HeroFlip,
            ..
        }
    ));

    gallery.interrupt();
    assert_eq!(
        gallery.phase(),
        &TransitionPhase::Open {
            set_id: "dunes".to_string()
        }
    );

    let viewport = gallery.scene().viewport();
    let items = gallery.grid_anchors();
    assert_eq!(items.len(), 4);
    for _ in 0..2 {
        for item in &items {
            assert_eq!(gallery.scene().prop(item, Prop::Opacity), Some(1.0));
            assert_eq!(gallery.scene().prop(item, Prop::X), Some(0.0));
            assert_eq!(gallery.scene().prop(item, Prop::Y), Some(0.0));

            let rect = gallery.scene().visual_rect(item).unwrap();
            assert!(rect.x < viewport.width && rect.right() > 0.0, "{item} 横向不在视口内");
            assert!(rect.y < viewport.height && rect.bottom() > 0.0, "{item} 纵向不在视口内");
            assert_eq!(Some(rect), reference.scene().visual_rect(item));
        }
        run(&mut gallery, 5.0);
    }

    // 浮动岛的入场同样停在终点
    for anchor in [Anchor::IslandCloseButton, Anchor::IslandTitle] {
        assert_eq!(gallery.scene().prop(&anchor, Prop::Opacity), Some(1.0));
        assert_eq!(gallery.scene().prop(&anchor, Prop::Y), Some(0.0));
        assert_eq!(gallery.scene().prop(&anchor, Prop::Blur), Some(0.0));
    }
    assert!(gallery.is_settled());
}

#[test]
fn test_interrupt_mid_hero_exit_restores_meta() {
    let mut gallery = gallery();
    open_and_settle(&mut gallery, "dunes");
    gallery.request_close().unwrap();
    assert!(run_until(&mut gallery, 3.0, is_hero_exit));
    run(&mut gallery, 0.2);

    let meta = Anchor::PreviewMeta("dunes".into());
    assert_eq!(gallery.scene().prop(&meta, Prop::Opacity), Some(0.0));

    gallery.interrupt();
    assert!(gallery.phase().is_idle());
    assert_eq!(gallery.scene().prop(&meta, Prop::Opacity), Some(1.0));
    assert_eq!(gallery.scene().prop(&meta, Prop::Y), Some(0.0));

    run(&mut gallery, 3.0);
    assert_eq!(gallery.scene().prop(&meta, Prop::Opacity), Some(1.0));
    assert!(gallery.is_settled());
}

#[test]
fn test_island_wrapper_visible_while_proxy_in_slot() {
    let mut gallery = gallery();
    gallery.click_preview("dunes").unwrap();
    assert!(run_until(&mut gallery, 2.0, |g| matches!(
        g.phase(),
        TransitionPhase::Opening {
            stage: OpenStage::HeroFlip,
            ..
        }
    )));
    assert!(gallery.proxy_leased());

    let wrapper = Anchor::IslandPreviewWrapper;
    assert_eq!(gallery.scene().prop(&wrapper, Prop::Opacity), Some(1.0));
    assert_eq!(gallery.scene().prop(&wrapper, Prop::Y), Some(0.0));
    assert_eq!(gallery.scene().prop(&wrapper, Prop::Blur), Some(0.0));
    let button = gallery
        .scene()
        .prop(&Anchor::IslandCloseButton, Prop::Opacity)
        .unwrap();
    assert!(button < 0.5);

    // 入场过程中包裹层始终可见
    run(&mut gallery, 0.3);
    assert_eq!(gallery.scene().prop(&wrapper, Prop::Opacity), Some(1.0));
    run(&mut gallery, 2.0);
    assert_eq!(
        gallery.scene().prop(&Anchor::IslandCloseButton, Prop::Opacity),
        Some(1.0)
    );
}

#[test]
fn test_open_snaps_hover_tilt_to_neutral() {
    let mut gallery = gallery();
    let frame = Anchor::PreviewFrame("dunes".into());
    let rect = gallery.scene().visual_rect(&frame).unwrap();
    gallery.pointer_move(Vec2::new(rect.x + 10.0, rect.y + 10.0));
    run(&mut gallery, 0.1);
    let tilted = gallery.scene().prop(&frame, Prop::RotationX).unwrap();
    assert!(tilted.abs() > 0.0);

    gallery.click_preview("dunes").unwrap();
    for prop in [Prop::RotationX, Prop::RotationY, Prop::Z] {
        assert_eq!(gallery.scene().prop(&frame, prop), Some(0.0));
    }

    // 视差补间已停止，不会再把预览拉回倾斜状态
    run(&mut gallery, 0.2);
    for prop in [Prop::RotationX, Prop::RotationY, Prop::Z] {
        assert_eq!(gallery.scene().prop(&frame, prop), Some(0.0));
    }
}

#[test]
fn test_grid_items_end_at_photo_overrides() {
    let mut gallery = gallery();
    open_and_settle(&mut gallery, "dunes");

    let catalog = Catalog::builtin().unwrap();
    let photos = catalog.get_set("dunes").unwrap().detail_photos();
    assert!(photos.iter().any(|photo| photo.rotation.is_some()));
    assert!(photos.iter().any(|photo| photo.scale.is_some()));
    for photo in photos {
        let anchor = Anchor::GridItem(photo.id.clone());
        let rotation = gallery.scene().prop(&anchor, Prop::Rotation).unwrap();
        let scale = gallery.scene().prop(&anchor, Prop::Scale).unwrap();
        assert!(
            (rotation - photo.rotation.unwrap_or(0.0)).abs() < 1e-3,
            "{} 旋转 {rotation}",
            photo.id
        );
        assert!(
            (scale - photo.scale.unwrap_or(1.0)).abs() < 1e-3,
            "{} 缩放 {scale}",
            photo.id
        );
    }
}

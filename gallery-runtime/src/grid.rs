//! # Grid 模块
//!
//! 图集详情网格：除 hero 以外的照片按各自的布局覆盖值摆放，
//! 入场时从视口下方散落飞入，退场时散落飞出。
//!
//! 入场附带一个透明度兜底计时器：即使完成事件丢失，到时也会把照片强制设为可见。

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::animation::{AnimationHandle, Animator, DelayedId, PropTween, Segment, Timeline};
use crate::catalog::SetId;
use crate::gallery::{DelayedCall, Gallery};
use crate::navigation::CloseOwner;
use crate::orchestrator::Step;
use crate::scene::{Anchor, ImageRef, Parent, Prop};

/// 散落的水平位置
///
/// 把 `width` 均分成 `count` 段，每段内取一个随机位置，再打乱顺序。
pub fn scatter_positions<R: Rng>(count: usize, width: f32, rng: &mut R) -> Vec<f32> {
    if count == 0 {
        return Vec::new();
    }
    let band = (width / count as f32).max(0.0);
    let mut positions: Vec<f32> = (0..count)
        .map(|i| i as f32 * band + rng.random_range(0.0..=band))
        .collect();
    positions.shuffle(rng);
    positions
}

/// `[-max, max]` 内的随机旋转角
pub fn random_rotation<R: Rng>(rng: &mut R, max: f32) -> f32 {
    if max <= 0.0 {
        return 0.0;
    }
    rng.random_range(-max..=max)
}

/// 网格状态
#[derive(Debug, Clone, Default)]
pub struct GridState {
    /// 已挂载的图集
    pub(crate) set_id: Option<SetId>,
    /// 正在播放的入场动画
    pub(crate) entrance: Option<AnimationHandle>,
    /// 透明度兜底计时器
    pub(crate) safety: Option<DelayedId>,
}

/// 网格中的一张照片：锚点和静止时的旋转角
struct GridItem {
    anchor: Anchor,
    rotation: f32,
}

impl<A: Animator> Gallery<A> {
    // ========== 挂载 ==========

    /// 挂载详情视图并注册关闭处理器
    pub(crate) fn mount_detail(&mut self, set_id: &SetId) {
        let Some(set) = self.catalog.get_set(set_id) else {
            return;
        };
        let viewport = self.scene.viewport();
        let full = crate::geometry::Rect::from_size(viewport);

        self.scene.mount(Anchor::DetailView, Parent::Root, full);
        self.scene
            .mount(Anchor::Grid, Parent::Element(Anchor::DetailView), full);

        for photo in set.detail_photos() {
            let anchor = Anchor::GridItem(photo.id.clone());
            self.scene.mount(
                anchor.clone(),
                Parent::Element(Anchor::Grid),
                self.layout.grid_item_rect(photo, viewport),
            );
            self.scene
                .set_prop(&anchor, Prop::Rotation, photo.rotation.unwrap_or(0.0));
            self.scene
                .set_prop(&anchor, Prop::Scale, photo.scale.unwrap_or(1.0));
            self.scene.set_image(
                &anchor,
                ImageRef {
                    src: photo.src.clone(),
                    alt: photo.alt.clone(),
                },
            );
        }

        debug!(set = %set_id, items = set.detail_photos().len(), "详情视图已挂载");
        self.grid.set_id = Some(set_id.clone());
        self.store.register_close_handler(CloseOwner::DetailView);
    }

    /// 卸载详情视图并注销关闭处理器
    pub(crate) fn unmount_detail(&mut self) {
        self.cancel_grid_entrance();
        self.scene.remove_subtree(&Anchor::DetailView);
        self.grid.set_id = None;
        self.store.unregister_close_handler(CloseOwner::DetailView);
        debug!("详情视图已卸载");
    }

    pub(crate) fn detail_mounted(&self) -> bool {
        self.scene.is_attached(&Anchor::DetailView)
    }

    /// 视口变化后重新摆放
    pub(crate) fn relayout_detail(&mut self) {
        let Some(set) = self
            .grid
            .set_id
            .as_ref()
            .and_then(|id| self.catalog.get_set(id))
        else {
            return;
        };
        let viewport = self.scene.viewport();
        let full = crate::geometry::Rect::from_size(viewport);
        self.scene.set_layout(&Anchor::DetailView, full);
        self.scene.set_layout(&Anchor::Grid, full);
        for photo in set.detail_photos() {
            self.scene.set_layout(
                &Anchor::GridItem(photo.id.clone()),
                self.layout.grid_item_rect(photo, viewport),
            );
        }
    }

    /// 已挂载的网格照片
    fn grid_items(&self) -> Vec<GridItem> {
        self.grid
            .set_id
            .as_ref()
            .and_then(|id| self.catalog.get_set(id))
            .map(|set| {
                set.detail_photos()
                    .iter()
                    .map(|photo| GridItem {
                        anchor: Anchor::GridItem(photo.id.clone()),
                        rotation: photo.rotation.unwrap_or(0.0),
                    })
                    .filter(|item| self.scene.contains(&item.anchor))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 网格照片的锚点
    pub fn grid_anchors(&self) -> Vec<Anchor> {
        self.grid_items().into_iter().map(|item| item.anchor).collect()
    }

    // ========== 入场 ==========

    /// 播放网格入场，并启动透明度兜底计时器
    pub(crate) fn play_grid_entrance(&mut self) {
        let items = self.grid_items();
        if items.is_empty() {
            return;
        }

        // 网格容器本身必须可见，否则照片动画结束后仍然看不见
        self.animator.kill_tweens_of(&Anchor::Grid);
        self.animator
            .set(&mut self.scene, &Anchor::Grid, &[(Prop::Opacity, 1.0)]);

        let viewport = self.scene.viewport();
        let grid = self.timing.grid.clone();
        let positions = scatter_positions(items.len(), viewport.width, &mut self.rng);

        let mut segment = Segment::new(grid.entrance_duration, grid.entrance_easing)
            .stagger(grid.entrance_stagger)
            .delay(grid.entrance_delay);
        for (item, start_x) in items.into_iter().zip(positions) {
            let Some(rect) = self.scene.visual_rect(&item.anchor) else {
                continue;
            };
            let from_rotation = random_rotation(&mut self.rng, grid.max_rotation);
            segment = segment.target(
                item.anchor,
                vec![
                    PropTween::from_to(Prop::X, start_x - rect.center().x, 0.0),
                    PropTween::from_to(
                        Prop::Y,
                        viewport.height + grid.offscreen_below - rect.top(),
                        0.0,
                    ),
                    PropTween::from_to(Prop::Rotation, from_rotation, item.rotation),
                    PropTween::from_to(Prop::Opacity, 0.0, 1.0),
                ],
            );
        }
        let count = segment.target_count();

        let handle = self
            .animator
            .play(&mut self.scene, Timeline::new().at(0.0, segment));
        self.steps.insert(handle, Step::GridEntrance);
        self.grid.entrance = Some(handle);
        self.grid.safety = Some(
            self.delayed
                .schedule(grid.safety_timeout, DelayedCall::GridSafety),
        );
        debug!(count, "网格入场");
    }

    /// 入场结束（完成或被中断）
    ///
    /// 被中断时照片停在半路甚至屏幕外，直接放回静止位置。
    pub(crate) fn finish_grid_entrance(&mut self, interrupted: bool) {
        self.grid.entrance = None;
        if interrupted {
            self.restore_grid_rest();
            return;
        }
        for item in self.grid_items() {
            self.scene.clear_props(&item.anchor, &[Prop::Opacity]);
        }
    }

    /// 兜底：强制所有网格照片回到静止位置并可见
    pub(crate) fn force_grid_visible(&mut self) {
        self.grid.safety = None;
        debug!(count = self.grid_items().len(), "网格透明度兜底");
        self.restore_grid_rest();
    }

    /// 静默取消入场动画和兜底计时器
    ///
    /// 不会触发入场的结束处理，退场中的照片不会被重新设为可见。
    pub(crate) fn cancel_grid_entrance(&mut self) {
        if let Some(handle) = self.grid.entrance.take() {
            self.steps.remove(&handle);
            self.animator.cancel(handle);
        }
        if let Some(id) = self.grid.safety.take() {
            self.delayed.cancel(id);
        }
    }

    // ========== 退场 ==========

    /// 播放网格退场
    ///
    /// 没有照片时返回一个空时间轴的句柄，它会在下一帧完成。
    pub(crate) fn play_grid_exit(&mut self) -> AnimationHandle {
        let items = self.grid_items();
        let viewport = self.scene.viewport();
        let grid = self.timing.grid.clone();
        let positions = scatter_positions(items.len(), viewport.width, &mut self.rng);

        let mut segment = Segment::new(grid.exit_duration, grid.exit_easing).stagger(grid.exit_stagger);
        for (item, end_x) in items.into_iter().zip(positions) {
            let Some(rect) = self.scene.visual_rect(&item.anchor) else {
                continue;
            };
            let x = self.scene.prop(&item.anchor, Prop::X).unwrap_or(0.0);
            let y = self.scene.prop(&item.anchor, Prop::Y).unwrap_or(0.0);
            let rotation = random_rotation(&mut self.rng, grid.max_rotation);
            segment = segment.target(
                item.anchor,
                vec![
                    PropTween::to(Prop::X, x + end_x - rect.center().x),
                    PropTween::to(
                        Prop::Y,
                        y + viewport.height + grid.offscreen_below - rect.top(),
                    ),
                    PropTween::to(Prop::Rotation, rotation),
                    PropTween::to(Prop::Opacity, 0.0),
                ],
            );
        }

        debug!(count = segment.target_count(), "网格退场");
        self.animator
            .play(&mut self.scene, Timeline::new().at(0.0, segment))
    }

    /// 把网格照片恢复到静止状态
    pub(crate) fn restore_grid_rest(&mut self) {
        for item in self.grid_items() {
            self.animator.set(
                &mut self.scene,
                &item.anchor,
                &[
                    (Prop::X, 0.0),
                    (Prop::Y, 0.0),
                    (Prop::Rotation, item.rotation),
                    (Prop::Opacity, 1.0),
                ],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_scatter_positions_cover_bands() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut positions = scatter_positions(4, 1000.0, &mut rng);
        assert_eq!(positions.len(), 4);
        positions.sort_by(f32::total_cmp);
        for (i, x) in positions.iter().enumerate() {
            let band = i as f32 * 250.0;
            assert!(*x >= band && *x <= band + 250.0, "{x} 不在第 {i} 段");
        }
    }

    #[test]
    fn test_scatter_positions_empty() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(scatter_positions(0, 1000.0, &mut rng).is_empty());
    }

    #[test]
    fn test_random_rotation_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let r = random_rotation(&mut rng, 15.0);
            assert!((-15.0..=15.0).contains(&r));
        }
        assert_eq!(random_rotation(&mut rng, 0.0), 0.0);
    }
}

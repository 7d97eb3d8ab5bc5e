//! # Carousel 模块
//!
//! 首页横向预览轮播：轨道平移、激活缩放、手势映射、悬停视差和悬停标签。
//!
//! ## 交互规则
//!
//! - 切换期间（`stepping`）忽略手势和新的切换请求
//! - 过渡期间（`is_transitioning`）忽略一切轮播输入
//! - 视差只在 `parallax_enabled` 且没有过渡时生效

use tracing::debug;

use crate::animation::{Animator, PropTween, Segment, Timeline};
use crate::catalog::SetId;
use crate::gallery::Gallery;
use crate::geometry::{Vec2, tilt_for};
use crate::orchestrator::Step;
use crate::scene::{Anchor, ImageRef, Parent, Prop};

/// 手势输入（滚轮 / 触控板 / 触摸的位移量）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureInput {
    pub dx: f32,
    pub dy: f32,
}

impl GestureInput {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

/// 把手势映射为切换步数
///
/// 两个方向都小于阈值时返回 `None`；否则由位移更大的方向决定，正向为 `+1`。
pub fn gesture_steps(input: GestureInput, tolerance: f32) -> Option<i32> {
    let (ax, ay) = (input.dx.abs(), input.dy.abs());
    if ax < tolerance && ay < tolerance {
        return None;
    }
    let dominant = if ay >= ax { input.dy } else { input.dx };
    Some(if dominant > 0.0 { 1 } else { -1 })
}

/// 轮播状态
#[derive(Debug, Clone)]
pub struct CarouselState {
    /// 居中的预览
    pub(crate) index: usize,
    /// 正在进行的切换
    pub(crate) stepping: Option<crate::animation::AnimationHandle>,
    pub(crate) parallax_enabled: bool,
    /// 最近一次已知的指针位置
    pub(crate) pointer: Option<Vec2>,
    /// 指针下方的预览
    pub(crate) hovered: Option<SetId>,
    /// 悬停标签当前显示的图集
    pub(crate) label: Option<SetId>,
}

impl Default for CarouselState {
    fn default() -> Self {
        Self::new()
    }
}

impl CarouselState {
    pub fn new() -> Self {
        Self {
            index: 0,
            stepping: None,
            parallax_enabled: true,
            pointer: None,
            hovered: None,
            label: None,
        }
    }
}

impl<A: Animator> Gallery<A> {
    // ========== 挂载 ==========

    /// 挂载轨道和全部轮播项，并居中到记住的索引
    pub(crate) fn mount_carousel(&mut self) {
        let viewport = self.scene.viewport();
        let count = self.catalog.len();
        if count > 0 {
            self.carousel.index = self.carousel.index.min(count - 1);
        }

        self.scene.mount(
            Anchor::Track,
            Parent::Root,
            self.layout.track_rect(count, viewport),
        );

        let timing = &self.timing.carousel;
        for (i, set) in self.catalog.all_sets().iter().enumerate() {
            let id = set.id.clone();
            let item = Anchor::CarouselItem(id.clone());
            let button = Anchor::PreviewButton(id.clone());
            let frame = Anchor::PreviewFrame(id.clone());
            let image = Anchor::PreviewImage(id.clone());
            let meta = Anchor::PreviewMeta(id);

            self.scene.mount(
                item.clone(),
                Parent::Element(Anchor::Track),
                self.layout.item_rect(i),
            );
            self.scene.mount(
                button.clone(),
                Parent::Element(item.clone()),
                self.layout.preview_rect(),
            );
            self.scene.set_prop(&button, Prop::Shadow, self.layout.preview_shadow);

            self.scene.mount(
                frame.clone(),
                Parent::Element(button),
                self.layout.preview_rect(),
            );
            self.scene
                .set_prop(&frame, Prop::BorderRadius, self.layout.preview_radius);
            self.scene
                .set_prop(&frame, Prop::Shadow, self.layout.preview_shadow);
            let scale = if i == self.carousel.index {
                timing.active_scale
            } else {
                timing.inactive_scale
            };
            self.scene.set_prop(&frame, Prop::Scale, scale);

            self.scene.mount(
                image.clone(),
                Parent::Element(frame),
                self.layout.preview_rect(),
            );
            self.scene.set_prop(&image, Prop::Scale, timing.image_zoom);
            if let Some(photo) = set.preview_photo() {
                self.scene.set_image(
                    &image,
                    ImageRef {
                        src: photo.src.clone(),
                        alt: photo.alt.clone(),
                    },
                );
            }

            self.scene
                .mount(meta.clone(), Parent::Element(item), self.layout.meta_rect());
            self.scene.set_text(&meta, set.name.clone());
        }

        let x = self
            .layout
            .track_x_for_index(self.carousel.index, count, viewport);
        self.scene.set_prop(&Anchor::Track, Prop::X, x);
        debug!(index = self.carousel.index, count, "轮播已挂载");
    }

    /// 卸载轨道
    pub(crate) fn unmount_carousel(&mut self) {
        if let Some(handle) = self.carousel.stepping.take() {
            self.steps.remove(&handle);
            self.animator.cancel(handle);
        }
        self.hide_hover_label();
        self.carousel.hovered = None;
        self.scene.remove_subtree(&Anchor::Track);
        debug!("轮播已卸载");
    }

    pub(crate) fn carousel_mounted(&self) -> bool {
        self.scene.is_attached(&Anchor::Track)
    }

    /// 按索引重新应用激活 / 非激活缩放
    pub(crate) fn apply_preview_scales(&mut self, active: usize) {
        let timing = &self.timing.carousel;
        for (i, set) in self.catalog.all_sets().iter().enumerate() {
            let scale = if i == active {
                timing.active_scale
            } else {
                timing.inactive_scale
            };
            self.animator.set(
                &mut self.scene,
                &Anchor::PreviewFrame(set.id.clone()),
                &[(Prop::Scale, scale)],
            );
        }
    }

    // ========== 切换 ==========

    /// 居中到第 `index` 项
    ///
    /// 索引会被限制在有效范围内。与当前索引相同、正在切换或正在过渡时不做任何事。
    /// 返回是否开始了切换动画。
    pub fn activate_index(&mut self, index: usize) -> bool {
        let count = self.catalog.len();
        if count == 0 {
            return false;
        }
        let target = index.min(count - 1);
        let current = self.carousel.index;
        if target == current {
            return false;
        }
        if self.carousel.stepping.is_some() || self.store.is_transitioning() {
            debug!(target, "轮播忙，忽略切换");
            return false;
        }
        if !self.carousel_mounted() {
            return false;
        }

        self.disable_parallax();
        self.settle_parallax();

        let sets: Vec<SetId> = self.set_ids();
        let timing = self.timing.carousel.clone();
        for (i, id) in sets.iter().enumerate() {
            let scale = if i == current {
                timing.active_scale
            } else {
                timing.inactive_scale
            };
            self.animator.set(
                &mut self.scene,
                &Anchor::PreviewFrame(id.clone()),
                &[(Prop::Scale, scale)],
            );
        }

        let x = self
            .layout
            .track_x_for_index(target, count, self.scene.viewport());
        let segment = || Segment::new(timing.step_duration, timing.step_easing);
        let timeline = Timeline::new()
            .at(
                0.0,
                segment().target(Anchor::Track, vec![PropTween::to(Prop::X, x)]),
            )
            .at(
                0.0,
                segment().target(
                    Anchor::PreviewFrame(sets[current].clone()),
                    vec![PropTween::to(Prop::Scale, timing.inactive_scale)],
                ),
            )
            .at(
                0.0,
                segment().target(
                    Anchor::PreviewFrame(sets[target].clone()),
                    vec![PropTween::to(Prop::Scale, timing.active_scale)],
                ),
            );

        let handle = self.animator.play(&mut self.scene, timeline);
        self.steps.insert(handle, Step::CarouselStep { to: target });
        self.carousel.stepping = Some(handle);
        debug!(from = current, to = target, "轮播切换");
        true
    }

    /// 相对当前索引切换 `delta` 步
    pub fn step(&mut self, delta: i32) -> bool {
        if self.carousel.stepping.is_some() {
            return false;
        }
        let count = self.catalog.len() as i64;
        if count == 0 {
            return false;
        }
        let target = (self.carousel.index as i64 + delta as i64).clamp(0, count - 1);
        self.activate_index(target as usize)
    }

    /// 滚轮 / 触控手势
    pub fn gesture(&mut self, input: GestureInput) -> bool {
        if self.carousel.stepping.is_some() {
            return false;
        }
        match gesture_steps(input, self.timing.carousel.gesture_tolerance) {
            Some(delta) => self.step(delta),
            None => false,
        }
    }

    /// 切换结束（完成或被中断）
    pub(crate) fn finish_carousel_step(&mut self, to: usize, interrupted: bool) {
        if !interrupted {
            self.carousel.index = to;
        }
        self.apply_preview_scales(self.carousel.index);
        self.carousel.stepping = None;
        self.enable_parallax();
    }

    /// 重新测量布局（窗口尺寸变化、图片加载完成）
    pub fn refresh_layout(&mut self) {
        if !self.carousel_mounted() {
            return;
        }
        let viewport = self.scene.viewport();
        let count = self.catalog.len();
        self.scene
            .set_layout(&Anchor::Track, self.layout.track_rect(count, viewport));
        for (i, id) in self.set_ids().into_iter().enumerate() {
            self.scene
                .set_layout(&Anchor::CarouselItem(id), self.layout.item_rect(i));
        }
        let x = self
            .layout
            .track_x_for_index(self.carousel.index, count, viewport);
        self.animator
            .set(&mut self.scene, &Anchor::Track, &[(Prop::X, x)]);
        self.apply_preview_scales(self.carousel.index);
    }

    // ========== 视差 ==========

    /// 当前是否响应悬停视差
    fn parallax_active(&self) -> bool {
        self.carousel.parallax_enabled && !self.store.is_transitioning()
    }

    /// 立即把所有预览恢复到平整状态，并停止视差补间
    pub fn settle_parallax(&mut self) {
        let zoom = self.timing.carousel.image_zoom;
        for id in self.set_ids() {
            self.animator.set(
                &mut self.scene,
                &Anchor::PreviewFrame(id.clone()),
                &[(Prop::RotationX, 0.0), (Prop::RotationY, 0.0), (Prop::Z, 0.0)],
            );
            self.animator
                .set(&mut self.scene, &Anchor::PreviewImage(id), &[(Prop::Scale, zoom)]);
        }
    }

    pub(crate) fn disable_parallax(&mut self) {
        self.carousel.parallax_enabled = false;
    }

    /// 重新启用视差，并对静止光标下的预览补一次视差
    pub(crate) fn enable_parallax(&mut self) {
        self.carousel.parallax_enabled = true;
        self.kick_parallax();
    }

    /// 光标静止时，对滑到光标下方的预览应用视差和悬停标签
    fn kick_parallax(&mut self) {
        if !self.parallax_active() || !self.carousel_mounted() {
            return;
        }
        let Some(point) = self.carousel.pointer else {
            return;
        };
        if let Some(id) = self.preview_at(point) {
            self.carousel.hovered = Some(id.clone());
            self.show_hover_label(&id);
            self.apply_tilt(&id, point, true);
        }
    }

    /// 视口坐标下的预览
    fn preview_at(&self, point: Vec2) -> Option<SetId> {
        let buttons: Vec<Anchor> = self
            .set_ids()
            .into_iter()
            .map(Anchor::PreviewButton)
            .collect();
        match self.scene.hit_test(point, buttons.iter()) {
            Some(Anchor::PreviewButton(id)) => Some(id.clone()),
            _ => None,
        }
    }

    /// 单个属性的追随补间
    fn chase(&mut self, anchor: Anchor, props: Vec<PropTween>) {
        let parallax = &self.timing.parallax;
        let timeline = Timeline::new().at(
            0.0,
            Segment::new(parallax.duration, parallax.easing).target(anchor, props),
        );
        self.animator.play(&mut self.scene, timeline);
    }

    fn apply_tilt(&mut self, id: &SetId, point: Vec2, lift: bool) {
        let frame = Anchor::PreviewFrame(id.clone());
        let Some(normalized) = self
            .scene
            .visual_rect(&frame)
            .and_then(|rect| rect.normalized(point))
        else {
            return;
        };
        let parallax = self.timing.parallax.clone();
        let (rotation_x, rotation_y) = tilt_for(normalized, parallax.max_tilt);

        let mut props = vec![
            PropTween::to(Prop::RotationX, rotation_x),
            PropTween::to(Prop::RotationY, rotation_y),
        ];
        if lift {
            let zoom = self.timing.carousel.image_zoom;
            props.push(PropTween::to(Prop::Z, parallax.hover_z));
            self.chase(
                Anchor::PreviewImage(id.clone()),
                vec![PropTween::to(Prop::Scale, zoom)],
            );
        }
        self.chase(frame, props);
    }

    // ========== 指针 ==========

    /// 指针进入预览
    pub fn pointer_enter(&mut self, set_id: &str, point: Vec2) {
        self.carousel.pointer = Some(point);
        self.update_label_position();
        if !self.parallax_active() || self.catalog.get_set(set_id).is_none() {
            return;
        }
        let id: SetId = set_id.to_string();
        self.carousel.hovered = Some(id.clone());
        self.show_hover_label(&id);
        self.apply_tilt(&id, point, true);
    }

    /// 指针移动
    ///
    /// 命中的预览发生变化时，依次触发离开和进入。
    pub fn pointer_move(&mut self, point: Vec2) {
        self.carousel.pointer = Some(point);
        self.update_label_position();
        if !self.carousel_mounted() {
            return;
        }

        let hit = self.preview_at(point);
        if hit != self.carousel.hovered {
            if let Some(old) = self.carousel.hovered.clone() {
                self.pointer_leave(&old);
            }
            if let Some(new) = hit {
                self.pointer_enter(&new, point);
            }
            return;
        }

        if let Some(id) = hit {
            if self.parallax_active() {
                self.apply_tilt(&id, point, false);
            }
        }
    }

    /// 指针离开预览
    pub fn pointer_leave(&mut self, set_id: &str) {
        if self.store.is_transitioning() {
            return;
        }
        if self.carousel.hovered.as_deref() == Some(set_id) {
            self.carousel.hovered = None;
        }
        self.hide_hover_label();

        let Some(index) = self.catalog.index_of(set_id) else {
            return;
        };
        let timing = self.timing.carousel.clone();
        let scale = if index == self.carousel.index {
            timing.active_scale
        } else {
            timing.inactive_scale
        };
        let id: SetId = set_id.to_string();
        self.chase(
            Anchor::PreviewFrame(id.clone()),
            vec![
                PropTween::to(Prop::RotationX, 0.0),
                PropTween::to(Prop::RotationY, 0.0),
                PropTween::to(Prop::Scale, scale),
                PropTween::to(Prop::Z, 0.0),
            ],
        );
        self.chase(
            Anchor::PreviewImage(id),
            vec![PropTween::to(Prop::Scale, timing.image_zoom)],
        );
    }

    // ========== 悬停标签 ==========

    fn update_label_position(&mut self) {
        let Some(point) = self.carousel.pointer else {
            return;
        };
        let offset = self.timing.hover_label.offset_y;
        self.scene.set_prop(&Anchor::HoverLabel, Prop::X, point.x);
        self.scene
            .set_prop(&Anchor::HoverLabel, Prop::Y, point.y + offset);
    }

    pub(crate) fn show_hover_label(&mut self, id: &SetId) {
        if self.carousel.label.as_ref() == Some(id) {
            return;
        }
        let Some(set) = self.catalog.get_set(id) else {
            return;
        };
        let text = format!("{}\n{}", set.name, set.location);
        self.scene.set_text(&Anchor::HoverLabel, text);
        self.update_label_position();

        let label = &self.timing.hover_label;
        let timeline = Timeline::new().at(
            0.0,
            Segment::new(label.show_duration, label.show_easing).target(
                Anchor::HoverLabel,
                vec![
                    PropTween::from_to(Prop::Opacity, 0.0, 1.0),
                    PropTween::from_to(Prop::Scale, label.hidden_scale, 1.0),
                ],
            ),
        );
        self.animator.kill_tweens_of(&Anchor::HoverLabel);
        self.animator.play(&mut self.scene, timeline);
        self.carousel.label = Some(id.clone());
    }

    pub(crate) fn hide_hover_label(&mut self) {
        if self.carousel.label.take().is_none() {
            return;
        }
        let label = &self.timing.hover_label;
        let timeline = Timeline::new().at(
            0.0,
            Segment::new(label.hide_duration, label.hide_easing).target(
                Anchor::HoverLabel,
                vec![
                    PropTween::to(Prop::Opacity, 0.0),
                    PropTween::to(Prop::Scale, label.hidden_scale),
                ],
            ),
        );
        self.animator.kill_tweens_of(&Anchor::HoverLabel);
        self.animator.play(&mut self.scene, timeline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gesture_below_tolerance() {
        assert_eq!(gesture_steps(GestureInput::new(5.0, -11.0), 12.0), None);
    }

    #[test]
    fn test_gesture_axis_lock() {
        assert_eq!(gesture_steps(GestureInput::new(3.0, 40.0), 12.0), Some(1));
        assert_eq!(gesture_steps(GestureInput::new(3.0, -40.0), 12.0), Some(-1));
        assert_eq!(gesture_steps(GestureInput::new(-30.0, 10.0), 12.0), Some(-1));
        assert_eq!(gesture_steps(GestureInput::new(30.0, -10.0), 12.0), Some(1));
    }
}

//! # Session 模块
//!
//! 脚本会话：一串按顺序执行的输入动作，由固定帧率驱动画廊。
//!
//! 会话文件是 JSON 数组，每个元素以 `action` 字段区分类型：
//!
//! ```json
//! [
//!   { "action": "click", "set_id": "dunes" },
//!   { "action": "wait", "seconds": 2.5 },
//!   { "action": "close" }
//! ]
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context;
use gallery_runtime::{
    Animator, Catalog, Gallery, GestureInput, NavigationSnapshot, Size, TransitionPhase, Vec2,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// 会话动作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// 点击预览（不居中时先居中）
    Click { set_id: String },
    /// 通过浮动岛关闭按钮请求关闭
    Close,
    /// 滚轮 / 触控板手势
    Gesture { dx: f32, dy: f32 },
    /// 相对移动轮播
    Step { delta: i32 },
    /// 直接居中某个索引
    Activate { index: usize },
    /// 指针进入预览
    PointerEnter { set_id: String, x: f32, y: f32 },
    /// 指针移动
    PointerMove { x: f32, y: f32 },
    /// 指针离开预览
    PointerLeave { set_id: String },
    /// 视口尺寸变化
    Resize { width: f32, height: f32 },
    /// 中断全部动画
    Interrupt,
    /// 推进若干秒
    Wait { seconds: f32 },
}

/// 一次会话
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session {
    pub actions: Vec<Action>,
}

impl Session {
    /// 从 JSON 文件加载
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("无法读取会话文件 {:?}", path))?;
        Self::from_json_str(&content).with_context(|| format!("会话文件 {:?} 无效", path))
    }

    /// 解析并校验 JSON
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let session: Self = serde_json::from_str(json)?;
        session.validate()?;
        Ok(session)
    }

    /// 校验动作参数
    pub fn validate(&self) -> anyhow::Result<()> {
        for (index, action) in self.actions.iter().enumerate() {
            match action {
                Action::Wait { seconds } if !seconds.is_finite() || *seconds < 0.0 => {
                    anyhow::bail!("第 {} 个动作: wait 秒数无效 ({})", index, seconds);
                }
                Action::Resize { width, height }
                    if !(width.is_finite() && height.is_finite() && *width > 0.0 && *height > 0.0) =>
                {
                    anyhow::bail!("第 {} 个动作: 视口尺寸无效 ({}x{})", index, width, height);
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// 内置演示：打开第一个图集再关闭，随后在第二个图集的打开过程中打断
    pub fn demo(catalog: &Catalog) -> Self {
        let sets = catalog.all_sets();
        let mut actions = Vec::new();

        if let Some(first) = sets.first() {
            actions.extend([
                Action::PointerEnter {
                    set_id: first.id.clone(),
                    x: 720.0,
                    y: 450.0,
                },
                Action::Wait { seconds: 0.5 },
                Action::Click {
                    set_id: first.id.clone(),
                },
                Action::Wait { seconds: 3.5 },
                Action::Close,
                Action::Wait { seconds: 3.0 },
            ]);
        }

        if let Some(second) = sets.get(1) {
            actions.extend([
                Action::Gesture { dx: 0.0, dy: 120.0 },
                Action::Wait { seconds: 1.0 },
                Action::Click {
                    set_id: second.id.clone(),
                },
                Action::Wait { seconds: 0.3 },
                Action::Interrupt,
                Action::Wait { seconds: 2.0 },
            ]);
        }

        Self { actions }
    }
}

/// 会话统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionReport {
    /// 推进的帧数
    pub frames: u64,
    /// 观察到的阶段变化次数
    pub phase_changes: usize,
    /// 被拒绝的动作数
    pub rejected: usize,
}

/// 以固定帧率执行会话
pub struct SessionRunner<'a, A: Animator> {
    gallery: &'a mut Gallery<A>,
    dt: f32,
    last_phase: TransitionPhase,
    last_snapshot: NavigationSnapshot,
    report: SessionReport,
}

impl<'a, A: Animator> SessionRunner<'a, A> {
    pub fn new(gallery: &'a mut Gallery<A>, dt: f32) -> Self {
        let last_phase = gallery.phase().clone();
        let last_snapshot = gallery.snapshot();
        Self {
            gallery,
            dt,
            last_phase,
            last_snapshot,
            report: SessionReport::default(),
        }
    }

    /// 执行全部动作并返回统计
    pub fn run(mut self, session: &Session) -> SessionReport {
        for action in &session.actions {
            self.apply(action);
        }
        self.report
    }

    fn apply(&mut self, action: &Action) {
        debug!(?action, "执行动作");
        let ok = match action {
            Action::Click { set_id } => accepted(self.gallery.click_preview(set_id)),
            Action::Close => accepted(self.gallery.request_close()),
            Action::Gesture { dx, dy } => self.gallery.gesture(GestureInput::new(*dx, *dy)),
            Action::Step { delta } => self.gallery.step(*delta),
            Action::Activate { index } => self.gallery.activate_index(*index),
            Action::PointerEnter { set_id, x, y } => {
                self.gallery.pointer_enter(set_id, Vec2::new(*x, *y));
                true
            }
            Action::PointerMove { x, y } => {
                self.gallery.pointer_move(Vec2::new(*x, *y));
                true
            }
            Action::PointerLeave { set_id } => {
                self.gallery.pointer_leave(set_id);
                true
            }
            Action::Resize { width, height } => {
                self.gallery.resize(Size::new(*width, *height));
                true
            }
            Action::Interrupt => {
                self.gallery.interrupt();
                true
            }
            Action::Wait { seconds } => {
                self.wait(*seconds);
                true
            }
        };

        if !ok {
            self.report.rejected += 1;
            debug!(?action, "动作未生效");
        }
        self.observe();
    }

    fn wait(&mut self, seconds: f32) {
        if !seconds.is_finite() || seconds <= 0.0 {
            return;
        }
        let frames = (seconds / self.dt).ceil().max(0.0) as u64;
        for _ in 0..frames {
            self.gallery.tick(self.dt);
            self.report.frames += 1;
            self.observe();
        }
    }

    /// 记录阶段和导航状态的变化
    fn observe(&mut self) {
        let phase = self.gallery.phase();
        if *phase != self.last_phase {
            info!(from = ?self.last_phase, to = ?phase, frame = self.report.frames, "阶段变化");
            self.last_phase = phase.clone();
            self.report.phase_changes += 1;
        }

        let snapshot = self.gallery.snapshot();
        if snapshot != self.last_snapshot {
            match serde_json::to_string(&snapshot) {
                Ok(json) => debug!(snapshot = %json, "导航状态"),
                Err(e) => warn!(error = %e, "导航状态序列化失败"),
            }
            self.last_snapshot = snapshot;
        }
    }
}

fn accepted<E: std::fmt::Display>(result: Result<(), E>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "动作被拒绝");
            false
        }
    }
}

//! # Phase 模块
//!
//! 过渡阶段状态机。
//!
//! ```text
//! Idle ──OpenRequested──▶ Opening(Neighbors) ──NeighborsDone──▶ Opening(HeroFlip)
//!   ▲                                                               │
//!   │                                                          HeroFlipDone
//!   │                                                               ▼
//! Closing(HeroExit) ◀──GridExitDone── Closing(GridExit) ◀──CloseRequested── Open
//! ```
//!
//! 状态转换是纯函数 [`TransitionPhase::next`]；进入某个阶段时对导航状态的修改
//! 集中在 [`enter`]。`Abort` 把任何过渡阶段退回到最近的稳定阶段：
//! 详情视图尚未挂载时回到 `Idle`，已经挂载时回到 `Open`。

use std::fmt;

use tracing::debug;

use crate::catalog::SetId;
use crate::navigation::{ClosePhase, NavigationStore};

/// 打开阶段的子步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenStage {
    /// 邻居滑出、锁定脉冲、标题淡出
    Neighbors,
    /// 代理飞向浮动岛 hero 槽位
    HeroFlip,
}

/// 关闭阶段的子步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseStage {
    /// 网格照片退场
    GridExit,
    /// 代理飞回轮播
    HeroExit,
}

/// 过渡阶段
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TransitionPhase {
    /// 首页轮播可交互
    #[default]
    Idle,
    Opening {
        set_id: SetId,
        stage: OpenStage,
    },
    /// 详情网格已挂载
    Open { set_id: SetId },
    Closing {
        set_id: SetId,
        stage: CloseStage,
    },
}

/// 阶段事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseEvent {
    OpenRequested(SetId),
    NeighborsDone,
    HeroFlipDone,
    CloseRequested,
    GridExitDone,
    HeroExitDone,
    /// 中断或锚点缺失
    Abort,
}

impl TransitionPhase {
    /// 计算下一个阶段
    ///
    /// 事件在当前阶段不合法时返回 `None`。
    pub fn next(&self, event: &PhaseEvent) -> Option<TransitionPhase> {
        use TransitionPhase::*;

        let next = match (self, event) {
            (Idle, PhaseEvent::OpenRequested(set_id)) => Opening {
                set_id: set_id.clone(),
                stage: OpenStage::Neighbors,
            },
            (
                Opening {
                    set_id,
                    stage: OpenStage::Neighbors,
                },
                PhaseEvent::NeighborsDone,
            ) => Opening {
                set_id: set_id.clone(),
                stage: OpenStage::HeroFlip,
            },
            (
                Opening {
                    set_id,
                    stage: OpenStage::HeroFlip,
                },
                PhaseEvent::HeroFlipDone,
            ) => Open {
                set_id: set_id.clone(),
            },
            (Open { set_id }, PhaseEvent::CloseRequested) => Closing {
                set_id: set_id.clone(),
                stage: CloseStage::GridExit,
            },
            (
                Closing {
                    set_id,
                    stage: CloseStage::GridExit,
                },
                PhaseEvent::GridExitDone,
            ) => Closing {
                set_id: set_id.clone(),
                stage: CloseStage::HeroExit,
            },
            (
                Closing {
                    stage: CloseStage::HeroExit,
                    ..
                },
                PhaseEvent::HeroExitDone,
            ) => Idle,

            // 中止：回到最近的稳定阶段
            (
                Opening {
                    stage: OpenStage::Neighbors,
                    ..
                },
                PhaseEvent::Abort,
            ) => Idle,
            (
                Opening {
                    set_id,
                    stage: OpenStage::HeroFlip,
                },
                PhaseEvent::Abort,
            ) => Open {
                set_id: set_id.clone(),
            },
            (
                Closing {
                    set_id,
                    stage: CloseStage::GridExit,
                },
                PhaseEvent::Abort,
            ) => Open {
                set_id: set_id.clone(),
            },
            (
                Closing {
                    stage: CloseStage::HeroExit,
                    ..
                },
                PhaseEvent::Abort,
            ) => Idle,

            _ => return None,
        };
        Some(next)
    }

    /// 当前涉及的图集
    pub fn set_id(&self) -> Option<&SetId> {
        match self {
            TransitionPhase::Idle => None,
            TransitionPhase::Opening { set_id, .. }
            | TransitionPhase::Open { set_id }
            | TransitionPhase::Closing { set_id, .. } => Some(set_id),
        }
    }

    /// 是否处于过渡中
    pub fn is_transitioning(&self) -> bool {
        matches!(
            self,
            TransitionPhase::Opening { .. } | TransitionPhase::Closing { .. }
        )
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, TransitionPhase::Idle)
    }
}

impl fmt::Display for TransitionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionPhase::Idle => write!(f, "idle"),
            TransitionPhase::Opening { set_id, stage } => {
                write!(f, "opening({set_id}, {stage:?})")
            }
            TransitionPhase::Open { set_id } => write!(f, "open({set_id})"),
            TransitionPhase::Closing { set_id, stage } => {
                write!(f, "closing({set_id}, {stage:?})")
            }
        }
    }
}

/// 进入阶段时对导航状态的修改
///
/// 只通过 setter 修改导航状态。
pub fn enter(phase: &TransitionPhase, store: &mut NavigationStore) {
    debug!(phase = %phase, "进入过渡阶段");
    match phase {
        TransitionPhase::Idle => {
            store.set_transitioning(false);
            store.set_close_phase(ClosePhase::Idle);
        }
        TransitionPhase::Opening {
            stage: OpenStage::Neighbors,
            ..
        } => {
            store.set_transitioning(true);
        }
        TransitionPhase::Opening {
            set_id,
            stage: OpenStage::HeroFlip,
        } => {
            store.set_transitioning(true);
            store.set_active_set_id(Some(set_id.clone()));
        }
        TransitionPhase::Open { .. } => {
            store.set_transitioning(false);
            store.set_close_phase(ClosePhase::Idle);
        }
        TransitionPhase::Closing {
            stage: CloseStage::GridExit,
            ..
        } => {
            store.set_transitioning(true);
            store.set_close_phase(ClosePhase::GridExit);
        }
        TransitionPhase::Closing {
            stage: CloseStage::HeroExit,
            ..
        } => {
            store.set_transitioning(true);
            store.set_close_phase(ClosePhase::HeroExit);
            store.set_active_set_id(None);
        }
    }
}

//! # Navigation 模块
//!
//! 画廊导航状态：当前打开的图集、浮动岛显示的图集、过渡锁和关闭阶段。
//!
//! ## 设计原则
//!
//! - 单一实例，由 `Gallery` 持有
//! - 字段私有，只能通过 setter 修改
//! - `active_set_id` 和 `island_set_id` 的联动规则集中在 [`NavigationStore::set_active_set_id`]

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::SetId;

/// 关闭阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClosePhase {
    /// 没有正在进行的关闭
    #[default]
    Idle,
    /// 网格照片正在退场
    GridExit,
    /// 代理正从浮动岛飞回轮播
    HeroExit,
}

/// 关闭处理器的持有者
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseOwner {
    /// 详情视图（挂载时注册，卸载时注销）
    DetailView,
}

/// 关闭请求的去向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseRoute {
    /// 交给已注册的处理器
    Handler(CloseOwner),
    /// 没有处理器，直接清空 `active_set_id`
    Direct,
}

/// 导航状态快照（用于日志和调试）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationSnapshot {
    pub active_set_id: Option<SetId>,
    pub island_set_id: Option<SetId>,
    pub is_transitioning: bool,
    pub close_phase: ClosePhase,
}

/// 导航状态
#[derive(Debug, Clone, Default)]
pub struct NavigationStore {
    active_set_id: Option<SetId>,
    island_set_id: Option<SetId>,
    is_transitioning: bool,
    close_phase: ClosePhase,
    close_handler: Option<CloseOwner>,
}

impl NavigationStore {
    /// 创建空闲状态的导航状态
    pub fn new() -> Self {
        Self::default()
    }

    // ========== 读取 ==========

    pub fn active_set_id(&self) -> Option<&SetId> {
        self.active_set_id.as_ref()
    }

    pub fn island_set_id(&self) -> Option<&SetId> {
        self.island_set_id.as_ref()
    }

    pub fn is_transitioning(&self) -> bool {
        self.is_transitioning
    }

    pub fn close_phase(&self) -> ClosePhase {
        self.close_phase
    }

    pub fn close_handler(&self) -> Option<CloseOwner> {
        self.close_handler
    }

    /// 没有图集打开、没有过渡、没有关闭进行中
    pub fn is_idle(&self) -> bool {
        self.active_set_id.is_none()
            && self.island_set_id.is_none()
            && !self.is_transitioning
            && self.close_phase == ClosePhase::Idle
    }

    pub fn snapshot(&self) -> NavigationSnapshot {
        NavigationSnapshot {
            active_set_id: self.active_set_id.clone(),
            island_set_id: self.island_set_id.clone(),
            is_transitioning: self.is_transitioning,
            close_phase: self.close_phase,
        }
    }

    // ========== 修改 ==========

    /// 设置当前打开的图集
    ///
    /// - `Some(id)`：浮动岛同步显示该图集
    /// - `None`：只有在没有关闭进行中时才清空浮动岛，
    ///   关闭过程中浮动岛保留旧图集，直到它自己的退场动画结束
    pub fn set_active_set_id(&mut self, id: Option<SetId>) {
        debug!(active = ?id, close_phase = ?self.close_phase, "设置当前图集");
        match &id {
            Some(id) => self.island_set_id = Some(id.clone()),
            None if self.close_phase == ClosePhase::Idle => self.island_set_id = None,
            None => {}
        }
        self.active_set_id = id;
    }

    pub fn set_island_set_id(&mut self, id: Option<SetId>) {
        debug!(island = ?id, "设置浮动岛图集");
        self.island_set_id = id;
    }

    pub fn set_transitioning(&mut self, value: bool) {
        if self.is_transitioning != value {
            debug!(transitioning = value, "过渡锁变化");
        }
        self.is_transitioning = value;
    }

    pub fn set_close_phase(&mut self, phase: ClosePhase) {
        if self.close_phase != phase {
            debug!(from = ?self.close_phase, to = ?phase, "关闭阶段变化");
        }
        self.close_phase = phase;
    }

    // ========== 关闭处理器 ==========

    /// 注册关闭处理器（覆盖已有的）
    pub fn register_close_handler(&mut self, owner: CloseOwner) {
        self.close_handler = Some(owner);
    }

    /// 注销关闭处理器
    ///
    /// 只有当前处理器属于 `owner` 时才会注销。
    pub fn unregister_close_handler(&mut self, owner: CloseOwner) {
        if self.close_handler == Some(owner) {
            self.close_handler = None;
        }
    }

    /// 请求关闭
    ///
    /// 有处理器时返回 [`CloseRoute::Handler`]，由调用方转交；
    /// 没有处理器时直接清空 `active_set_id`。
    pub fn request_close(&mut self) -> CloseRoute {
        match self.close_handler {
            Some(owner) => CloseRoute::Handler(owner),
            None => {
                self.set_active_set_id(None);
                CloseRoute::Direct
            }
        }
    }
}

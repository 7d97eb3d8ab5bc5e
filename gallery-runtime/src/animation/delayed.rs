//! # Delayed 模块
//!
//! 延迟调用队列：在经过指定秒数后取出一个负载。
//!
//! 用于兜底计时器（网格透明度保护、视差重新启用），
//! 时间只随 `advance(dt)` 推进，和动画系统共享同一个时钟。

/// 延迟调用 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DelayedId(u64);

impl DelayedId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Pending<T> {
    id: DelayedId,
    remaining: f32,
    payload: T,
}

/// 延迟调用队列
#[derive(Debug, Clone)]
pub struct DelayedCalls<T> {
    pending: Vec<Pending<T>>,
    next_id: u64,
}

impl<T> Default for DelayedCalls<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DelayedCalls<T> {
    /// 创建空队列
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 1,
        }
    }

    /// 在 `delay` 秒后触发 `payload`
    pub fn schedule(&mut self, delay: f32, payload: T) -> DelayedId {
        let id = DelayedId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            remaining: delay.max(0.0),
            payload,
        });
        id
    }

    /// 取消尚未触发的调用
    pub fn cancel(&mut self, id: DelayedId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// 推进 `dt` 秒，按到期先后返回已触发的负载
    pub fn advance(&mut self, dt: f32) -> Vec<T> {
        let dt = dt.max(0.0);
        for pending in &mut self.pending {
            pending.remaining -= dt;
        }

        let (mut due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.remaining <= 0.0);
        self.pending = rest;

        due.sort_by(|a, b| a.remaining.total_cmp(&b.remaining).then(a.id.cmp(&b.id)));
        due.into_iter().map(|p| p.payload).collect()
    }

    /// 清空队列
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, id: DelayedId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_delay() {
        let mut calls = DelayedCalls::new();
        calls.schedule(2.2, "safety");
        assert!(calls.advance(1.0).is_empty());
        assert!(calls.advance(1.0).is_empty());
        assert_eq!(calls.advance(0.25), vec!["safety"]);
        assert!(calls.is_empty());
    }

    #[test]
    fn test_cancel() {
        let mut calls = DelayedCalls::new();
        let id = calls.schedule(1.0, 1);
        assert!(calls.is_pending(id));
        assert!(calls.cancel(id));
        assert!(!calls.cancel(id));
        assert!(calls.advance(5.0).is_empty());
    }

    #[test]
    fn test_due_order() {
        let mut calls = DelayedCalls::new();
        calls.schedule(1.6, "late");
        calls.schedule(0.5, "early");
        assert_eq!(calls.advance(2.0), vec!["early", "late"]);
    }
}

//! 保存タイマーのスケジューラ
//!
//! デバウンス保存は「予約済みタスクは常に最大1件」で成り立つ。
//! 新しい予約のハンドルで古いハンドルを置き換えれば、古い予約は
//! drop 時に取り消される。

use std::cell::RefCell;
use std::rc::Rc;

use gloo::timers::callback::Timeout;

/// 予約済みタスクのハンドル。cancel または drop で予約を取り消す。
pub struct TaskHandle {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl TaskHandle {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// 予約を明示的に取り消す
    pub fn cancel(mut self) {
        if let Some(f) = self.cancel.take() {
            f();
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        if let Some(f) = self.cancel.take() {
            f();
        }
    }
}

/// 遅延タスクの予約先
pub trait SaveScheduler {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskHandle;
}

/// setTimeout 相当による実装（ブラウザ用）
pub struct TimeoutScheduler;

impl SaveScheduler for TimeoutScheduler {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskHandle {
        let timeout = Timeout::new(delay_ms, move || task());
        TaskHandle::new(move || drop(timeout))
    }
}

/// 手動発火スケジューラ（ネイティブ実行・テスト用）
///
/// clone しても予約キューは共有される。
#[derive(Default, Clone)]
pub struct ManualScheduler {
    inner: Rc<RefCell<ManualInner>>,
}

#[derive(Default)]
struct ManualInner {
    next_id: u64,
    tasks: Vec<(u64, Box<dyn FnOnce()>)>,
}

impl ManualInner {
    fn pop_front(&mut self) -> Option<Box<dyn FnOnce()>> {
        if self.tasks.is_empty() {
            None
        } else {
            Some(self.tasks.remove(0).1)
        }
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 予約中のタスク数
    pub fn pending(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    /// 予約中のタスクを古い順にすべて発火する
    pub fn fire_all(&self) {
        // タスク実行中に再予約されても borrow が衝突しないよう、
        // 1件ずつ取り出してから実行する
        while let Some(task) = self.inner.borrow_mut().pop_front() {
            task();
        }
    }
}

impl SaveScheduler for ManualScheduler {
    fn schedule(&self, _delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskHandle {
        let id = {
            let mut inner = self.inner.borrow_mut();
            inner.next_id += 1;
            let id = inner.next_id;
            inner.tasks.push((id, task));
            id
        };
        let weak = Rc::downgrade(&self.inner);
        TaskHandle::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().tasks.retain(|(tid, _)| *tid != id);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_fire_all_runs_tasks_in_order() {
        let scheduler = ManualScheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let o1 = order.clone();
        let o2 = order.clone();
        let h1 = scheduler.schedule(100, Box::new(move || o1.borrow_mut().push(1)));
        let h2 = scheduler.schedule(100, Box::new(move || o2.borrow_mut().push(2)));
        assert_eq!(scheduler.pending(), 2);
        scheduler.fire_all();
        assert_eq!(*order.borrow(), vec![1, 2]);
        assert_eq!(scheduler.pending(), 0);
        // 発火済みタスクのハンドルを落としても何も起きない
        drop(h1);
        h2.cancel();
    }

    #[test]
    fn test_cancel_removes_task() {
        let scheduler = ManualScheduler::new();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        let handle = scheduler.schedule(100, Box::new(move || f.set(true)));
        handle.cancel();
        assert_eq!(scheduler.pending(), 0);
        scheduler.fire_all();
        assert!(!fired.get());
    }

    #[test]
    fn test_drop_cancels_task() {
        let scheduler = ManualScheduler::new();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        {
            let _handle = scheduler.schedule(100, Box::new(move || f.set(true)));
        }
        scheduler.fire_all();
        assert!(!fired.get());
    }

    #[test]
    fn test_replacing_handle_cancels_previous() {
        let scheduler = ManualScheduler::new();
        let count = Rc::new(Cell::new(0));
        let mut slot: Option<TaskHandle> = None;
        for _ in 0..3 {
            let c = count.clone();
            slot = Some(scheduler.schedule(100, Box::new(move || c.set(c.get() + 1))));
        }
        assert_eq!(scheduler.pending(), 1);
        scheduler.fire_all();
        assert_eq!(count.get(), 1);
        drop(slot);
    }
}

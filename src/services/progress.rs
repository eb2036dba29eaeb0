//! 进度通知
//!
//! 观察者显式传入分发器和编排层，没有观察者时所有上报都是空操作

use std::sync::{Arc, Mutex};

/// 进度观察者，`percent` 取值 0..=100
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, percent: u8, message: &str);
}

impl<F> ProgressObserver for F
where
    F: Fn(u8, &str) + Send + Sync,
{
    fn on_progress(&self, percent: u8, message: &str) {
        self(percent, message)
    }
}

/// 一段进度区间，例如整体任务中的 20% → 80%
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressRange {
    pub start: u8,
    pub end: u8,
}

impl ProgressRange {
    pub fn new(start: u8, end: u8) -> Self {
        let start = start.min(100);
        Self {
            start,
            end: end.clamp(start, 100),
        }
    }

    /// 线性插值：已完成 `done` / 共 `total`
    pub fn at(&self, done: usize, total: usize) -> u8 {
        if total == 0 {
            return self.end;
        }
        let span = (self.end - self.start) as usize;
        let offset = span * done.min(total) / total;
        self.start + offset as u8
    }
}

/// 进度上报器
///
/// 保证上报的百分比单调不减，即使任务完成顺序不确定
#[derive(Clone, Default)]
pub struct Progress {
    observer: Option<Arc<dyn ProgressObserver>>,
    last: Arc<Mutex<u8>>,
}

impl Progress {
    pub fn new(observer: Arc<dyn ProgressObserver>) -> Self {
        Self {
            observer: Some(observer),
            last: Arc::new(Mutex::new(0)),
        }
    }

    /// 不上报任何进度
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn report(&self, percent: u8, message: &str) {
        let Some(observer) = &self.observer else {
            return;
        };
        // 持锁回调，并发上报时也保持顺序
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        *last = (*last).max(percent.min(100));
        observer.on_progress(*last, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_interpolation() {
        let range = ProgressRange::new(20, 80);
        assert_eq!(range.at(0, 10), 20);
        assert_eq!(range.at(5, 10), 50);
        assert_eq!(range.at(10, 10), 80);
        assert_eq!(range.at(12, 10), 80);
        assert_eq!(range.at(0, 0), 80);
        assert_eq!(ProgressRange::new(90, 10), ProgressRange::new(90, 90));
    }

    #[test]
    fn test_reports_never_go_backwards() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let progress = Progress::new(Arc::new(move |p: u8, _: &str| {
            sink.lock().unwrap().push(p);
        }));

        progress.report(30, "a");
        progress.report(10, "b");
        progress.report(55, "c");

        assert_eq!(*seen.lock().unwrap(), vec![30, 30, 55]);
    }

    #[test]
    fn test_silent_progress_is_noop() {
        Progress::silent().report(50, "ignored");
    }
}

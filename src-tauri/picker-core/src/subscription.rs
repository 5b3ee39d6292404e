//! Activity 结果订阅
//!
//! 宿主把每个 onActivityResult 发布到 [`ActivityResultBus`]；一次 present 持有一个
//! [`ActivityResultSubscription`]，订阅在 `release` 或 drop 时注销，且只注销一次。

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

use crate::host::ActivityResult;

/// Activity 结果事件总线
pub struct ActivityResultBus {
    /// subscription id -> 发送端
    listeners: Mutex<HashMap<u64, mpsc::UnboundedSender<ActivityResult>>>,
    next_id: AtomicU64,
    released: AtomicUsize,
}

impl ActivityResultBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            listeners: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            released: AtomicUsize::new(0),
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u64, mpsc::UnboundedSender<ActivityResult>>> {
        // 监听表里只有 Sender，持锁期间不会 panic；中毒时直接沿用内部数据
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 注册监听器，返回独占的订阅对象
    pub fn subscribe(self: &Arc<Self>) -> ActivityResultSubscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        let count = {
            let mut listeners = self.lock();
            listeners.insert(id, tx);
            listeners.len()
        };
        log::debug!(
            "ActivityResultBus::subscribe id={}, 当前监听器数: {}",
            id,
            count
        );
        ActivityResultSubscription {
            id,
            bus: Arc::clone(self),
            rx,
            active: true,
        }
    }

    /// 把结果分发给所有监听器，返回送达数量
    pub fn publish(&self, result: ActivityResult) -> usize {
        let listeners = self.lock();
        listeners
            .values()
            .filter(|tx| tx.send(result.clone()).is_ok())
            .count()
    }

    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    /// 累计注销次数（用于核对每个订阅只注销一次）
    pub fn released_count(&self) -> usize {
        self.released.load(Ordering::Relaxed)
    }

    fn unsubscribe(&self, id: u64) -> bool {
        let removed = self.lock().remove(&id).is_some();
        if removed {
            self.released.fetch_add(1, Ordering::Relaxed);
            log::debug!("ActivityResultBus::unsubscribe id={}", id);
        }
        removed
    }
}

/// 单次 present 期间持有的订阅
pub struct ActivityResultSubscription {
    id: u64,
    bus: Arc<ActivityResultBus>,
    rx: mpsc::UnboundedReceiver<ActivityResult>,
    active: bool,
}

impl ActivityResultSubscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// 等待下一个 request_code 匹配的结果；其他请求码的结果直接跳过。
    /// 总线被销毁时返回 None。
    pub async fn recv_for(&mut self, request_code: i32) -> Option<ActivityResult> {
        while let Some(result) = self.rx.recv().await {
            if result.request_code == request_code {
                return Some(result);
            }
            log::debug!(
                "subscription {} 忽略 request_code={} 的结果",
                self.id,
                result.request_code
            );
        }
        None
    }

    /// 立即注销
    pub fn release(mut self) {
        self.deregister();
    }

    fn deregister(&mut self) {
        if self.active {
            self.active = false;
            self.rx.close();
            self.bus.unsubscribe(self.id);
        }
    }
}

impl Drop for ActivityResultSubscription {
    fn drop(&mut self) {
        self.deregister();
    }
}

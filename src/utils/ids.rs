//! 客户端ID生成
//!
//! 基于毫秒时间戳，同一毫秒内靠计数器区分。

use std::sync::atomic::{AtomicU64, Ordering};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// 生成形如 `cat-1718000000000-3` 的ID
pub fn next_client_id(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}", prefix, millis, seq)
}

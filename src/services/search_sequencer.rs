//! 搜索请求编号
//!
//! 边输入边搜索时旧请求不会被取消，响应可能乱序到达。
//! 每个请求领取一个递增编号，只接受比已应用编号更新的响应。

use std::sync::atomic::{AtomicU64, Ordering};

/// 请求编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchToken(u64);

impl SearchToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// 编号发放器
#[derive(Debug, Default)]
pub struct SearchSequencer {
    issued: AtomicU64,
}

impl SearchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为新请求领取编号
    pub fn issue(&self) -> SearchToken {
        SearchToken(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// 带编号的数据
///
/// 已应用编号和数据放在一起，由同一把锁保护，比较与写入不会被其它响应插队。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequenced<T> {
    value: T,
    applied: u64,
}

impl<T> Sequenced<T> {
    pub fn new(value: T) -> Self {
        Self { value, applied: 0 }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// 最近一次应用的编号，还没有应用过时为 0
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// 编号比已应用的新时执行更新，否则丢弃
    pub fn apply(&mut self, token: SearchToken, update: impl FnOnce(&mut T)) -> bool {
        if token.0 <= self.applied {
            return false;
        }
        update(&mut self.value);
        self.applied = token.0;
        true
    }
}

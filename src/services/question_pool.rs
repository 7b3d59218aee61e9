//! 题库浏览 - 业务能力层
//!
//! 负责拉取可选题目并按难度、科目在本地筛选，不关心题目被分配到哪个部分。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::clients::{QuestionQuery, QuestionSource};
use crate::error::AppResult;
use crate::models::{BankQuestion, Difficulty, Draft};
use crate::services::search_sequencer::{SearchSequencer, Sequenced};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// 拉取到的完整题目池
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionPool {
    questions: Vec<BankQuestion>,
    /// 全局唯一的内容版本，新建或替换时重新领取，用于判断缓存是否过期
    generation: u64,
}

impl Default for QuestionPool {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl QuestionPool {
    pub fn new(questions: Vec<BankQuestion>) -> Self {
        Self {
            questions,
            generation: next_generation(),
        }
    }

    pub fn replace(&mut self, questions: Vec<BankQuestion>) {
        self.questions = questions;
        self.generation = next_generation();
    }

    pub fn questions(&self) -> &[BankQuestion] {
        &self.questions
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, id: &str) -> Option<&BankQuestion> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// 按草稿中的筛选条件过滤题目
///
/// 难度为“任一命中”；科目筛选只在选择了多个科目时生效。空筛选表示不过滤。
pub fn filter_questions<'a>(pool: &'a [BankQuestion], draft: &Draft) -> Vec<&'a BankQuestion> {
    pool.iter().filter(|q| matches_filters(q, draft)).collect()
}

fn matches_filters(question: &BankQuestion, draft: &Draft) -> bool {
    let difficulty_ok = draft.difficulty.is_empty()
        || question
            .difficulty
            .map(|d| draft.difficulty.contains(&d))
            .unwrap_or(false);

    let subject_ok = draft.subjects.len() <= 1
        || draft.filter_subjects.is_empty()
        || question
            .subject
            .as_ref()
            .map(|s| draft.filter_subjects.contains(s))
            .unwrap_or(false);

    difficulty_ok && subject_ok
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FilterKey {
    generation: u64,
    difficulty: Vec<Difficulty>,
    filter_subjects: Vec<String>,
    multi_subject: bool,
}

impl FilterKey {
    fn new(pool: &QuestionPool, draft: &Draft) -> Self {
        Self {
            generation: pool.generation(),
            difficulty: draft.difficulty.clone(),
            filter_subjects: draft.filter_subjects.clone(),
            multi_subject: draft.subjects.len() > 1,
        }
    }
}

/// 带缓存的筛选结果
///
/// 只有题目池或筛选条件变化时才重新扫描。
#[derive(Debug, Default)]
pub struct FilteredPool {
    key: Option<FilterKey>,
    indices: Vec<usize>,
}

impl FilteredPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view<'p>(&mut self, pool: &'p QuestionPool, draft: &Draft) -> Vec<&'p BankQuestion> {
        let key = FilterKey::new(pool, draft);
        if self.key.as_ref() != Some(&key) {
            self.indices = pool
                .questions()
                .iter()
                .enumerate()
                .filter(|(_, q)| matches_filters(q, draft))
                .map(|(i, _)| i)
                .collect();
            debug!("重新筛选题目池: {} / {}", self.indices.len(), pool.questions().len());
            self.key = Some(key);
        }
        self.indices
            .iter()
            .filter_map(|&i| pool.questions().get(i))
            .collect()
    }
}

/// 题库浏览器
///
/// 每次搜索领取编号，过期的响应不会覆盖较新的题目池。
pub struct PoolBrowser<S> {
    source: Arc<S>,
    sequencer: SearchSequencer,
    pool: Mutex<Sequenced<QuestionPool>>,
}

impl<S: QuestionSource> PoolBrowser<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            sequencer: SearchSequencer::new(),
            pool: Mutex::new(Sequenced::new(QuestionPool::default())),
        }
    }

    /// 按草稿的科目和题型搜索
    ///
    /// 返回本次响应是否被采用。请求失败时题目池保持不变。
    pub async fn search(&self, draft: &Draft, search: Option<&str>) -> AppResult<bool> {
        let query = QuestionQuery {
            subject_ids: draft.subjects.clone(),
            question_type: draft.question_type,
            search: search.map(str::to_string),
        };
        let token = self.sequencer.issue();

        let response = match self.source.fetch_questions(&query).await {
            Ok(response) => response,
            Err(e) => {
                warn!("⚠️ 题目查询失败 (#{}): {}", token.value(), e);
                return Err(e);
            }
        };

        let questions = response.into_pool();
        let count = questions.len();
        // 比较编号和替换题目池在同一把锁内完成
        let applied = self
            .lock_pool()
            .apply(token, |pool| pool.replace(questions));

        if applied {
            info!("✓ 题目池更新 (#{}): {} 道题", token.value(), count);
        } else {
            debug!("丢弃过期的搜索结果 #{}", token.value());
        }
        Ok(applied)
    }

    /// 当前题目池的快照
    pub fn snapshot(&self) -> QuestionPool {
        self.lock_pool().get().clone()
    }

    fn lock_pool(&self) -> MutexGuard<'_, Sequenced<QuestionPool>> {
        // 锁内没有会 panic 的操作，中毒时直接取回数据
        self.pool.lock().unwrap_or_else(|e| e.into_inner())
    }
}

use serde::{Deserialize, Serialize};

use crate::models::category::Category;
use crate::models::question::{Difficulty, QuestionType};

/// 组卷草稿
///
/// 只存在于本次组卷会话的内存中，提交成功后重置。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub question_type: Option<QuestionType>,
    #[serde(default)]
    pub question_bank_type: Option<String>,
    /// 已选科目（按选择顺序，无重复）
    #[serde(default)]
    pub subjects: Vec<String>,
    /// 全卷题目上限；`None` 表示不限
    #[serde(default)]
    pub question_count: Option<u32>,
    /// 难度筛选（仅用于浏览题库，空表示不筛选）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub difficulty: Vec<Difficulty>,
    /// 科目筛选（仅在选择了多个科目时生效）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter_subjects: Vec<String>,
}

impl Draft {
    /// 是否还能再加 `additional` 道题
    pub fn has_room_for(&self, current_total: usize, additional: usize) -> bool {
        match self.question_count {
            Some(max) => current_total + additional <= max as usize,
            None => true,
        }
    }
}

/// `POST question-sets` 的请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSetPayload {
    pub title: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question_bank_type: String,
    pub subjects: Vec<String>,
    pub question_count: Option<u32>,
    pub categories: Vec<Category>,
}

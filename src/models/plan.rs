//! 组卷计划
//!
//! 一份 TOML 描述一套试卷：基本信息 + 各部分的题库题目和自定义题目。
//! 计划只是输入，加载后仍要经过组卷流程的全部校验。

use serde::{Deserialize, Serialize};

use crate::models::question::Difficulty;

fn default_mark() -> u32 {
    1
}

fn default_min_questions() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionPlan {
    pub title: String,
    /// "MCQ" 或 "WRITTEN"
    #[serde(rename = "type")]
    pub question_type: String,
    pub question_bank_type: String,
    #[serde(default)]
    pub subjects: Vec<String>,
    /// 原样保留输入，按输入框规则转换（非正数视为不限）
    #[serde(default)]
    pub question_count: Option<i64>,
    #[serde(default)]
    pub difficulty: Vec<Difficulty>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub parts: Vec<PlanPart>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPart {
    pub name: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default = "default_min_questions")]
    pub min_questions: u32,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub custom_questions: Vec<PlanCustomQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanCustomQuestion {
    pub question_text: String,
    #[serde(default = "default_mark")]
    pub mark: u32,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub sub_questions: Vec<PlanSubQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSubQuestion {
    pub text: String,
    #[serde(default = "default_mark")]
    pub mark: u32,
}

impl CompositionPlan {
    pub fn with_file_path(mut self, file_path: String) -> Self {
        self.file_path = Some(file_path);
        self
    }

    /// 计划中的题目总数
    pub fn question_total(&self) -> usize {
        self.parts
            .iter()
            .map(|p| p.questions.len() + p.custom_questions.len())
            .sum()
    }
}

use serde::{Deserialize, Serialize};

use crate::models::question::CustomQuestion;

fn default_min_questions() -> u32 {
    1
}

/// 卷子中的一个部分（Part）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default = "default_min_questions")]
    pub min_questions: u32,
    /// 题库题目ID，无重复
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub custom_questions: Vec<CustomQuestion>,
}

/// 部分的填充状态，仅用于展示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryStatus {
    Empty,
    PartiallyFilled,
    AtMinimum,
    OverMinimum,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>, min_questions: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            condition: String::new(),
            min_questions,
            questions: Vec::new(),
            custom_questions: Vec::new(),
        }
    }

    /// 题库题目与自定义题目的总数
    pub fn total(&self) -> usize {
        self.questions.len() + self.custom_questions.len()
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.questions.iter().any(|q| q == question_id)
    }

    pub fn status(&self) -> CategoryStatus {
        let total = self.total();
        let min = self.min_questions as usize;
        if total == 0 {
            CategoryStatus::Empty
        } else if total < min {
            CategoryStatus::PartiallyFilled
        } else if total == min {
            CategoryStatus::AtMinimum
        } else {
            CategoryStatus::OverMinimum
        }
    }

    /// 可提交：名称非空且题目数不少于最少题数
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && self.total() >= self.min_questions as usize
    }
}

/// 所有部分的题目总数
pub fn total_questions(categories: &[Category]) -> usize {
    categories.iter().map(Category::total).sum()
}

/// 可提交的部分
pub fn valid_categories(categories: &[Category]) -> Vec<Category> {
    categories.iter().filter(|c| c.is_valid()).cloned().collect()
}

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuestionType {
    /// 选择题
    Mcq,
    /// 主观题（可带小问）
    Written,
}

static QUESTION_TYPE_LABELS: phf::Map<&'static str, QuestionType> = phf::phf_map! {
    "MCQ" => QuestionType::Mcq,
    "mcq" => QuestionType::Mcq,
    "WRITTEN" => QuestionType::Written,
    "written" => QuestionType::Written,
};

impl QuestionType {
    /// 接口使用的字符串
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Mcq => "MCQ",
            QuestionType::Written => "WRITTEN",
        }
    }

    /// 从标签解析题型
    pub fn from_label(label: &str) -> Option<Self> {
        QUESTION_TYPE_LABELS.get(label.trim()).copied()
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

static DIFFICULTY_LABELS: phf::Map<&'static str, Difficulty> = phf::phf_map! {
    "EASY" => Difficulty::Easy,
    "easy" => Difficulty::Easy,
    "MEDIUM" => Difficulty::Medium,
    "medium" => Difficulty::Medium,
    "HARD" => Difficulty::Hard,
    "hard" => Difficulty::Hard,
};

impl Difficulty {
    pub fn from_label(label: &str) -> Option<Self> {
        DIFFICULTY_LABELS.get(label.trim()).copied()
    }
}

fn default_mark() -> u32 {
    1
}

/// 小问
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubQuestion {
    #[serde(default, alias = "_id")]
    pub id: String,
    pub sub_question_text: String,
    #[serde(default = "default_mark")]
    pub mark: u32,
}

/// 题库中的题目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankQuestion {
    #[serde(rename = "_id")]
    pub id: String,
    pub question_text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub sub_questions: Vec<SubQuestion>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    /// 科目ID（接口可能返回字符串或 `{_id, name}` 对象）
    #[serde(default, deserialize_with = "deserialize_subject_id")]
    pub subject: Option<String>,
    #[serde(default, alias = "points")]
    pub mark: Option<u32>,
}

/// 自定义题目（组卷时现场编写）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomQuestion {
    pub id: String,
    pub question_text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default = "default_mark")]
    pub mark: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_questions: Vec<SubQuestion>,
}

impl CustomQuestion {
    /// 新建空白自定义题目，题型继承自草稿
    pub fn blank(id: impl Into<String>, question_type: QuestionType) -> Self {
        Self {
            id: id.into(),
            question_text: String::new(),
            question_type,
            mark: 1,
            options: Vec::new(),
            correct_answer: String::new(),
            sub_questions: Vec::new(),
        }
    }
}

/// 题目的统一视图：题库题目或自定义题目
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Question<'a> {
    Bank(&'a BankQuestion),
    Custom(&'a CustomQuestion),
}

impl<'a> Question<'a> {
    /// 题目唯一键：自定义题目用 `id`，题库题目用 `_id`
    pub fn key(&self) -> &'a str {
        match self {
            Question::Bank(q) => &q.id,
            Question::Custom(q) => &q.id,
        }
    }

    /// 题目总分
    ///
    /// 题库题目优先取小问分值之和，其次取自带分值，默认 1 分。
    pub fn marks(&self) -> u32 {
        match self {
            Question::Bank(q) if !q.sub_questions.is_empty() => {
                q.sub_questions
                    .iter()
                    .fold(0u32, |acc, s| acc.saturating_add(s.mark))
            }
            Question::Bank(q) => q.mark.unwrap_or(1),
            Question::Custom(q) => q.mark,
        }
    }

    pub fn text(&self) -> &'a str {
        match self {
            Question::Bank(q) => &q.question_text,
            Question::Custom(q) => &q.question_text,
        }
    }

    pub fn question_type(&self) -> QuestionType {
        match self {
            Question::Bank(q) => q.question_type,
            Question::Custom(q) => q.question_type,
        }
    }

    pub fn options(&self) -> &'a [String] {
        match self {
            Question::Bank(q) => &q.options,
            Question::Custom(q) => &q.options,
        }
    }

    /// 正确答案（空字符串视为没有）
    pub fn correct_answer(&self) -> Option<&'a str> {
        let answer = match self {
            Question::Bank(q) => q.correct_answer.as_deref()?,
            Question::Custom(q) => q.correct_answer.as_str(),
        };
        (!answer.is_empty()).then_some(answer)
    }

    pub fn sub_questions(&self) -> &'a [SubQuestion] {
        match self {
            Question::Bank(q) => &q.sub_questions,
            Question::Custom(q) => &q.sub_questions,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Question::Custom(_))
    }
}

/// `GET questions` 的返回结构
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionsResponse {
    #[serde(default)]
    pub questions: Vec<BankQuestion>,
    #[serde(default)]
    pub subject_ids: Vec<String>,
    #[serde(default)]
    pub questions_by_subject: HashMap<String, Vec<BankQuestion>>,
}

impl QuestionsResponse {
    /// 合并后的题目池
    ///
    /// `questions` 为空时从 `questionsBySubject` 按 `subjectIds` 顺序拼出，重复 `_id` 只保留第一次出现。
    pub fn into_pool(self) -> Vec<BankQuestion> {
        if !self.questions.is_empty() {
            return self.questions;
        }

        let mut by_subject = self.questions_by_subject;
        let mut order: Vec<String> = self.subject_ids;
        let mut rest: Vec<String> = by_subject
            .keys()
            .filter(|k| !order.contains(k))
            .cloned()
            .collect();
        rest.sort();
        order.extend(rest);

        let mut pool: Vec<BankQuestion> = Vec::new();
        for subject_id in order {
            for q in by_subject.remove(&subject_id).unwrap_or_default() {
                if !pool.iter().any(|p| p.id == q.id) {
                    pool.push(q);
                }
            }
        }
        pool
    }
}

// 科目字段既可能是ID字符串，也可能是展开后的对象
fn deserialize_subject_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SubjectRef {
        Id(String),
        Object {
            #[serde(rename = "_id", alias = "id")]
            id: String,
        },
    }

    let subject = Option::<SubjectRef>::deserialize(deserializer)?;
    Ok(subject.map(|s| match s {
        SubjectRef::Id(id) => id,
        SubjectRef::Object { id } => id,
    }))
}

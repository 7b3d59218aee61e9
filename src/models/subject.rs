use serde::{Deserialize, Serialize};

/// 科目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// 课程体系
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Curriculum {
    #[serde(default)]
    pub subject_type: String,
}

/// 题库类型：限定可选科目范围
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBankType {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub curriculum: Option<Curriculum>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

impl QuestionBankType {
    /// 可供选择的科目
    pub fn active_subjects(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.iter().filter(|s| s.is_active)
    }

    /// 科目名称（用于渲染已选科目标签）
    pub fn subject_name(&self, subject_id: &str) -> Option<&str> {
        self.subjects
            .iter()
            .find(|s| s.id == subject_id)
            .map(|s| s.name.as_str())
    }

    /// 显示名称：课程体系类型，没有则用ID
    pub fn label(&self) -> &str {
        self.curriculum
            .as_ref()
            .map(|c| c.subject_type.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.id)
    }
}

//! 基本信息步骤
//!
//! 负责标题、题型、题库类型、科目和题目上限的录入与校验。
//! 全部是纯函数：`reduce(&Draft, action) -> Draft`，有效性按需计算。

use crate::error::ValidationError;
use crate::models::{Difficulty, Draft, QuestionType};

/// 基本信息步骤的操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BasicInfoAction {
    SetTitle(String),
    SetType(QuestionType),
    /// 切换题库类型会清空已选科目
    SetQuestionBankType(String),
    /// 选中/取消科目
    ToggleSubject(String),
    /// 移除科目标签
    RemoveSubject(String),
    /// 输入框原始文本，非正数或非数字视为不限
    SetQuestionCountInput(String),
    SetQuestionCount(Option<u32>),
    ToggleDifficulty(Difficulty),
    ToggleFilterSubject(String),
}

/// 应用一次操作，返回新的草稿
pub fn reduce(draft: &Draft, action: BasicInfoAction) -> Draft {
    let mut next = draft.clone();
    match action {
        BasicInfoAction::SetTitle(title) => next.title = title,
        BasicInfoAction::SetType(question_type) => next.question_type = Some(question_type),
        BasicInfoAction::SetQuestionBankType(bank_type) => {
            next.question_bank_type = Some(bank_type).filter(|b| !b.is_empty());
            next.subjects.clear();
            next.filter_subjects.clear();
        }
        BasicInfoAction::ToggleSubject(subject_id) => {
            // 未选题库类型时不能选科目
            if next.question_bank_type.is_some() {
                toggle(&mut next.subjects, subject_id);
                retain_known_filters(&mut next);
            }
        }
        BasicInfoAction::RemoveSubject(subject_id) => {
            next.subjects.retain(|s| *s != subject_id);
            retain_known_filters(&mut next);
        }
        BasicInfoAction::SetQuestionCountInput(input) => {
            next.question_count = parse_question_count(&input)
        }
        BasicInfoAction::SetQuestionCount(count) => {
            next.question_count = count.filter(|c| *c > 0)
        }
        BasicInfoAction::ToggleDifficulty(difficulty) => {
            toggle(&mut next.difficulty, difficulty);
            next.difficulty.sort();
        }
        BasicInfoAction::ToggleFilterSubject(subject_id) => {
            if next.subjects.contains(&subject_id) {
                toggle(&mut next.filter_subjects, subject_id);
            }
        }
    }
    next
}

/// 解析题目上限输入
pub fn parse_question_count(input: &str) -> Option<u32> {
    input.trim().parse::<i64>().ok().filter(|n| *n > 0).map(|n| n.min(u32::MAX as i64) as u32)
}

/// 草稿是否可以进入下一步
pub fn is_valid(draft: &Draft) -> bool {
    validate(draft).is_ok()
}

/// 校验草稿，返回第一个不满足的条件
pub fn validate(draft: &Draft) -> Result<(), ValidationError> {
    if draft.title.trim().is_empty() {
        return Err(ValidationError::MissingField { field: "Title" });
    }
    if draft.question_type.is_none() {
        return Err(ValidationError::MissingField { field: "Question type" });
    }
    if draft.question_bank_type.is_none() {
        return Err(ValidationError::MissingField { field: "Question bank type" });
    }
    if draft.subjects.is_empty() {
        return Err(ValidationError::MissingField { field: "Subjects" });
    }
    if draft.question_count == Some(0) {
        return Err(ValidationError::MissingField { field: "Question count" });
    }
    Ok(())
}

fn toggle<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if let Some(pos) = items.iter().position(|i| *i == item) {
        items.remove(pos);
    } else {
        items.push(item);
    }
}

fn retain_known_filters(draft: &mut Draft) {
    let subjects = &draft.subjects;
    draft.filter_subjects.retain(|s| subjects.contains(s));
}

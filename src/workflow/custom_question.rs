//! 自定义题目编辑
//!
//! 选项按下标编辑，小问按ID编辑。保存前由 [`finalize`] 做校验和补全。

use crate::error::ValidationError;
use crate::models::{CustomQuestion, QuestionType, SubQuestion};
use crate::utils::ids::next_client_id;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    SetText(String),
    SetMark(u32),
    AddOption,
    ChangeOption { index: usize, text: String },
    RemoveOption(usize),
    SelectCorrectAnswer(String),
    AddSubQuestion,
    ChangeSubQuestion {
        id: String,
        text: Option<String>,
        mark: Option<u32>,
    },
    RemoveSubQuestion(String),
}

/// 应用一次编辑操作
///
/// 选项操作只对选择题生效，小问操作只对主观题生效，其余情况原样返回。
pub fn reduce(question: &CustomQuestion, action: EditorAction) -> CustomQuestion {
    let mut next = question.clone();
    let is_mcq = next.question_type == QuestionType::Mcq;

    match action {
        EditorAction::SetText(text) => next.question_text = text,
        EditorAction::SetMark(mark) => next.mark = mark,
        EditorAction::AddOption if is_mcq => next.options.push(String::new()),
        EditorAction::ChangeOption { index, text } if is_mcq => {
            if let Some(option) = next.options.get_mut(index) {
                // 正确答案跟随被修改的选项
                if !next.correct_answer.is_empty() && *option == next.correct_answer {
                    next.correct_answer = text.clone();
                }
                *option = text;
            }
        }
        EditorAction::RemoveOption(index) if is_mcq => {
            if index < next.options.len() {
                let removed = next.options.remove(index);
                if removed == next.correct_answer {
                    next.correct_answer.clear();
                }
            }
        }
        EditorAction::SelectCorrectAnswer(answer) if is_mcq => {
            if next.options.contains(&answer) {
                next.correct_answer = answer;
            }
        }
        EditorAction::AddSubQuestion if !is_mcq => next.sub_questions.push(SubQuestion {
            id: next_client_id("sub"),
            sub_question_text: String::new(),
            mark: 1,
        }),
        EditorAction::ChangeSubQuestion { id, text, mark } if !is_mcq => {
            if let Some(sub) = next.sub_questions.iter_mut().find(|s| s.id == id) {
                if let Some(text) = text {
                    sub.sub_question_text = text;
                }
                if let Some(mark) = mark {
                    sub.mark = mark;
                }
            }
        }
        EditorAction::RemoveSubQuestion(id) if !is_mcq => {
            next.sub_questions.retain(|s| s.id != id)
        }
        _ => {}
    }
    next
}

/// 保存前校验并补全
///
/// 顺序：题干必填；选择题至少两个非空选项且已选正确答案；
/// 主观题没有小问时，用题干和分值合成一个小问。
pub fn finalize(question: &CustomQuestion) -> Result<CustomQuestion, ValidationError> {
    let mut saved = question.clone();
    saved.question_text = saved.question_text.trim().to_string();

    if saved.question_text.is_empty() {
        return Err(ValidationError::EmptyQuestionText);
    }
    if saved.mark == 0 {
        return Err(ValidationError::InvalidMark);
    }

    match saved.question_type {
        QuestionType::Mcq => {
            saved.options.retain(|o| !o.trim().is_empty());
            saved.sub_questions.clear();
            if saved.options.len() < 2 {
                return Err(ValidationError::NotEnoughOptions);
            }
            if saved.correct_answer.is_empty() {
                return Err(ValidationError::MissingCorrectAnswer);
            }
            if !saved.options.contains(&saved.correct_answer) {
                return Err(ValidationError::CorrectAnswerNotAnOption);
            }
        }
        QuestionType::Written => {
            saved.options.clear();
            saved.correct_answer.clear();
            if saved.sub_questions.iter().any(|s| s.mark == 0) {
                return Err(ValidationError::InvalidMark);
            }
            if saved.sub_questions.is_empty() {
                saved.sub_questions.push(SubQuestion {
                    id: next_client_id("sub"),
                    sub_question_text: saved.question_text.clone(),
                    mark: saved.mark,
                });
            }
        }
    }

    Ok(saved)
}

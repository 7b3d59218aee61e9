//! 部分与题目步骤
//!
//! 组卷流程中状态最多的一步：管理各部分（Part），把题库题目和自定义题目分配进去，
//! 并在所有部分之间执行全卷题目上限。
//!
//! 所有操作都是纯函数 `(state, draft, action) -> Result<state, ValidationError>`：
//! 被拒绝的操作返回提示，调用方保留原状态。

use tracing::debug;

use crate::error::ValidationError;
use crate::models::{total_questions, valid_categories, Category, CustomQuestion, Draft, QuestionSetPayload, QuestionType};
use crate::utils::ids::next_client_id;
use crate::workflow::custom_question::{self, EditorAction};

/// 新建部分时的默认名称
pub const DEFAULT_PART_NAME: &str = "Part A";
/// 默认部分的最少题数
pub const DEFAULT_PART_MIN_QUESTIONS: u32 = 3;

/// 部分编辑弹窗中的表单
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryForm {
    pub name: String,
    pub condition: String,
    pub min_questions: u32,
    /// `Some(i)` 表示编辑第 i 个部分，否则新建
    pub editing_index: Option<usize>,
}

impl Default for CategoryForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            condition: String::new(),
            min_questions: 1,
            editing_index: None,
        }
    }
}

/// 自定义题目编辑弹窗
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionForm {
    pub question: CustomQuestion,
    pub editing_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartsState {
    pub categories: Vec<Category>,
    pub active: Option<usize>,
    pub category_form: Option<CategoryForm>,
    pub question_form: Option<QuestionForm>,
}

impl Default for PartsState {
    fn default() -> Self {
        Self::new()
    }
}

impl PartsState {
    /// 初始状态：一个默认部分并处于选中状态
    pub fn new() -> Self {
        Self {
            categories: vec![Category::new(
                next_client_id("cat"),
                DEFAULT_PART_NAME,
                DEFAULT_PART_MIN_QUESTIONS,
            )],
            active: Some(0),
            category_form: None,
            question_form: None,
        }
    }

    pub fn active_category(&self) -> Option<&Category> {
        self.active.and_then(|i| self.categories.get(i))
    }

    /// 全卷题目总数
    pub fn total(&self) -> usize {
        total_questions(&self.categories)
    }

    /// 该题已分配到的其它部分（不含当前选中的部分）
    pub fn assigned_elsewhere(&self, question_id: &str) -> Option<usize> {
        self.categories
            .iter()
            .enumerate()
            .find(|(i, c)| Some(*i) != self.active && c.contains(question_id))
            .map(|(i, _)| i)
    }

    /// 该题是否在当前部分中
    pub fn is_selected(&self, question_id: &str) -> bool {
        self.active_category()
            .map(|c| c.contains(question_id))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartsAction {
    SelectCategory(usize),
    ToggleQuestion(String),
    OpenAddCategory,
    OpenEditCategory(usize),
    SetCategoryName(String),
    SetCategoryCondition(String),
    SetCategoryMinQuestions(u32),
    SaveCategory,
    CancelCategory,
    RemoveCategory(usize),
    OpenAddCustomQuestion,
    OpenEditCustomQuestion(usize),
    EditCustomQuestion(EditorAction),
    SaveCustomQuestion,
    CancelCustomQuestion,
    RemoveCustomQuestion(usize),
}

/// 应用一次操作
pub fn reduce(
    state: &PartsState,
    draft: &Draft,
    action: PartsAction,
) -> Result<PartsState, ValidationError> {
    debug!("部分操作: {:?}", action);
    match action {
        PartsAction::SelectCategory(index) => apply_select_category(state, index),
        PartsAction::ToggleQuestion(id) => apply_toggle_question(state, draft, &id),
        PartsAction::OpenAddCategory => Ok(PartsState {
            category_form: Some(CategoryForm::default()),
            ..state.clone()
        }),
        PartsAction::OpenEditCategory(index) => apply_open_edit_category(state, index),
        PartsAction::SetCategoryName(name) => {
            apply_category_form(state, |form| form.name = name)
        }
        PartsAction::SetCategoryCondition(condition) => {
            apply_category_form(state, |form| form.condition = condition)
        }
        PartsAction::SetCategoryMinQuestions(min) => {
            apply_category_form(state, |form| form.min_questions = min)
        }
        PartsAction::SaveCategory => apply_save_category(state),
        PartsAction::CancelCategory => Ok(PartsState {
            category_form: None,
            ..state.clone()
        }),
        PartsAction::RemoveCategory(index) => apply_remove_category(state, index),
        PartsAction::OpenAddCustomQuestion => apply_open_add_custom_question(state, draft),
        PartsAction::OpenEditCustomQuestion(index) => {
            apply_open_edit_custom_question(state, index)
        }
        PartsAction::EditCustomQuestion(edit) => {
            let mut next = state.clone();
            let form = next.question_form.as_mut().ok_or(ValidationError::InvalidStep)?;
            form.question = custom_question::reduce(&form.question, edit);
            Ok(next)
        }
        PartsAction::SaveCustomQuestion => apply_save_custom_question(state),
        PartsAction::CancelCustomQuestion => Ok(PartsState {
            question_form: None,
            ..state.clone()
        }),
        PartsAction::RemoveCustomQuestion(index) => apply_remove_custom_question(state, index),
    }
}

pub fn apply_select_category(state: &PartsState, index: usize) -> Result<PartsState, ValidationError> {
    if index >= state.categories.len() {
        return Err(ValidationError::IndexOutOfRange { index });
    }
    Ok(PartsState {
        active: Some(index),
        ..state.clone()
    })
}

/// 在当前部分中选中/取消题库题目
///
/// 已在当前部分：移除。已在其它部分：拒绝（需先从原部分移除）。
/// 加入后超过全卷上限：拒绝。
pub fn apply_toggle_question(
    state: &PartsState,
    draft: &Draft,
    question_id: &str,
) -> Result<PartsState, ValidationError> {
    let active = state.active.ok_or(ValidationError::NoActiveCategory)?;
    let mut next = state.clone();
    let category = next
        .categories
        .get_mut(active)
        .ok_or(ValidationError::NoActiveCategory)?;

    if category.contains(question_id) {
        category.questions.retain(|q| q != question_id);
        return Ok(next);
    }

    if state.assigned_elsewhere(question_id).is_some() {
        return Err(ValidationError::AlreadyAssigned {
            question_id: question_id.to_string(),
        });
    }

    if !draft.has_room_for(state.total(), 1) {
        return Err(cap_reached(draft));
    }

    category.questions.push(question_id.to_string());
    Ok(next)
}

fn apply_open_edit_category(state: &PartsState, index: usize) -> Result<PartsState, ValidationError> {
    let category = state
        .categories
        .get(index)
        .ok_or(ValidationError::IndexOutOfRange { index })?;
    Ok(PartsState {
        category_form: Some(CategoryForm {
            name: category.name.clone(),
            condition: category.condition.clone(),
            min_questions: category.min_questions,
            editing_index: Some(index),
        }),
        ..state.clone()
    })
}

fn apply_category_form(
    state: &PartsState,
    edit: impl FnOnce(&mut CategoryForm),
) -> Result<PartsState, ValidationError> {
    let mut next = state.clone();
    let form = next.category_form.as_mut().ok_or(ValidationError::InvalidStep)?;
    edit(form);
    Ok(next)
}

/// 保存部分：新建时追加并选中，编辑时原位替换（保留已分配的题目）
pub fn apply_save_category(state: &PartsState) -> Result<PartsState, ValidationError> {
    let form = state.category_form.as_ref().ok_or(ValidationError::InvalidStep)?;
    let name = form.name.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingField { field: "Part name" });
    }
    if form.min_questions == 0 {
        return Err(ValidationError::InvalidMinQuestions);
    }

    let mut next = state.clone();
    match form.editing_index {
        Some(index) => {
            let category = next
                .categories
                .get_mut(index)
                .ok_or(ValidationError::IndexOutOfRange { index })?;
            category.name = name.to_string();
            category.condition = form.condition.clone();
            category.min_questions = form.min_questions;
        }
        None => {
            let mut category = Category::new(next_client_id("cat"), name, form.min_questions);
            category.condition = form.condition.clone();
            next.categories.push(category);
            next.active = Some(next.categories.len() - 1);
        }
    }
    next.category_form = None;
    Ok(next)
}

/// 删除部分；若删除的是当前部分，回退到第一个部分（没有则为空）
pub fn apply_remove_category(state: &PartsState, index: usize) -> Result<PartsState, ValidationError> {
    if index >= state.categories.len() {
        return Err(ValidationError::IndexOutOfRange { index });
    }
    let mut next = state.clone();
    next.categories.remove(index);
    next.active = match state.active {
        Some(active) if active == index => (!next.categories.is_empty()).then_some(0),
        Some(active) if active > index => Some(active - 1),
        other => other,
    };
    Ok(next)
}

fn apply_open_add_custom_question(state: &PartsState, draft: &Draft) -> Result<PartsState, ValidationError> {
    if state.active_category().is_none() {
        return Err(ValidationError::NoActiveCategory);
    }
    if !draft.has_room_for(state.total(), 1) {
        return Err(cap_reached(draft));
    }
    let question_type = draft.question_type.unwrap_or(QuestionType::Mcq);
    Ok(PartsState {
        question_form: Some(QuestionForm {
            question: CustomQuestion::blank(next_client_id("custom"), question_type),
            editing_index: None,
        }),
        ..state.clone()
    })
}

fn apply_open_edit_custom_question(state: &PartsState, index: usize) -> Result<PartsState, ValidationError> {
    let category = state.active_category().ok_or(ValidationError::NoActiveCategory)?;
    let question = category
        .custom_questions
        .get(index)
        .ok_or(ValidationError::IndexOutOfRange { index })?;
    Ok(PartsState {
        question_form: Some(QuestionForm {
            question: question.clone(),
            editing_index: Some(index),
        }),
        ..state.clone()
    })
}

/// 保存自定义题目到当前部分（编辑按下标替换，新建追加）
pub fn apply_save_custom_question(state: &PartsState) -> Result<PartsState, ValidationError> {
    let form = state.question_form.as_ref().ok_or(ValidationError::InvalidStep)?;
    let saved = custom_question::finalize(&form.question)?;

    let active = state.active.ok_or(ValidationError::NoActiveCategory)?;
    let mut next = state.clone();
    let category = next
        .categories
        .get_mut(active)
        .ok_or(ValidationError::NoActiveCategory)?;

    match form.editing_index {
        Some(index) => {
            let slot = category
                .custom_questions
                .get_mut(index)
                .ok_or(ValidationError::IndexOutOfRange { index })?;
            *slot = saved;
        }
        None => category.custom_questions.push(saved),
    }
    next.question_form = None;
    Ok(next)
}

fn apply_remove_custom_question(state: &PartsState, index: usize) -> Result<PartsState, ValidationError> {
    let active = state.active.ok_or(ValidationError::NoActiveCategory)?;
    let mut next = state.clone();
    let category = next
        .categories
        .get_mut(active)
        .ok_or(ValidationError::NoActiveCategory)?;
    if index >= category.custom_questions.len() {
        return Err(ValidationError::IndexOutOfRange { index });
    }
    category.custom_questions.remove(index);
    Ok(next)
}

/// 生成提交内容：只保留有效部分，一个都没有则拒绝
pub fn build_submission(draft: &Draft, state: &PartsState) -> Result<QuestionSetPayload, ValidationError> {
    let categories = valid_categories(&state.categories);
    if categories.is_empty() {
        return Err(ValidationError::NoValidCategories);
    }

    Ok(QuestionSetPayload {
        title: draft.title.trim().to_string(),
        question_type: draft
            .question_type
            .ok_or(ValidationError::MissingField { field: "Question type" })?,
        question_bank_type: draft
            .question_bank_type
            .clone()
            .ok_or(ValidationError::MissingField { field: "Question bank type" })?,
        subjects: draft.subjects.clone(),
        question_count: draft.question_count,
        categories,
    })
}

fn cap_reached(draft: &Draft) -> ValidationError {
    ValidationError::CapReached {
        max: draft.question_count.unwrap_or_default(),
    }
}

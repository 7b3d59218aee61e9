//! 组卷流程编排
//!
//! 两步向导：基本信息 → 部分与题目，最后把草稿和有效部分交给题集创建接口。
//! 被拒绝的操作只记录提示，状态保持不变。

use serde_json::Value;
use tracing::{error, info, warn};

use crate::clients::QuestionSetGateway;
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{BankQuestion, Draft, QuestionSetPayload};
use crate::workflow::basic_info::{self, BasicInfoAction};
use crate::workflow::parts::{self, PartsAction, PartsState};
use crate::workflow::preview::{render_preview, Preview};

/// 向导步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Step {
    #[default]
    BasicInfo,
    Details,
}

/// 组卷会话状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposerState {
    pub step: Step,
    pub draft: Draft,
    pub parts: PartsState,
}

/// 提交结果
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// 创建成功，本地状态已重置
    Created(Value),
    /// 本地校验未通过，没有调用接口
    Rejected(ValidationError),
}

/// 组卷器
///
/// 持有会话状态和题集创建接口；除提交外的操作都是同步的。
pub struct Composer<G> {
    state: ComposerState,
    gateway: G,
    notice: Option<String>,
}

impl<G: QuestionSetGateway> Composer<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            state: ComposerState::default(),
            gateway,
            notice: None,
        }
    }

    pub fn state(&self) -> &ComposerState {
        &self.state
    }

    pub fn step(&self) -> Step {
        self.state.step
    }

    pub fn draft(&self) -> &Draft {
        &self.state.draft
    }

    pub fn parts(&self) -> &PartsState {
        &self.state.parts
    }

    /// 取出最近一次的提示
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// 基本信息是否已完整
    pub fn can_advance(&self) -> bool {
        basic_info::is_valid(&self.state.draft)
    }

    /// 修改基本信息
    ///
    /// 已有题目时不允许更换题型：题目池和自定义题目都依赖题型。
    pub fn update_basic_info(&mut self, action: BasicInfoAction) -> Result<(), ValidationError> {
        if let BasicInfoAction::SetType(question_type) = &action {
            let changes_type = self.state.draft.question_type.is_some_and(|t| t != *question_type);
            if changes_type && self.state.parts.total() > 0 {
                return self.reject(ValidationError::TypeLocked);
            }
        }
        self.state.draft = basic_info::reduce(&self.state.draft, action);
        Ok(())
    }

    /// 进入部分与题目步骤
    pub fn next(&mut self) -> Result<(), ValidationError> {
        if self.state.step != Step::BasicInfo {
            return self.reject(ValidationError::InvalidStep);
        }
        if let Err(e) = basic_info::validate(&self.state.draft) {
            return self.reject(e);
        }
        self.state.step = Step::Details;
        info!("➡️ 进入部分与题目步骤: {}", self.state.draft.title);
        Ok(())
    }

    /// 返回基本信息步骤，已分配的题目保留
    pub fn back(&mut self) {
        if self.state.step == Step::Details {
            self.state.step = Step::BasicInfo;
        }
    }

    /// 在部分与题目步骤中执行一次操作
    pub fn dispatch(&mut self, action: PartsAction) -> Result<(), ValidationError> {
        if self.state.step != Step::Details {
            return self.reject(ValidationError::InvalidStep);
        }
        match parts::reduce(&self.state.parts, &self.state.draft, action) {
            Ok(next) => {
                self.state.parts = next;
                Ok(())
            }
            Err(e) => self.reject(e),
        }
    }

    /// 生成当前预览
    pub fn preview<'a>(&'a self, bank_questions: &'a [BankQuestion]) -> Option<Preview<'a>> {
        let question_type = self.state.draft.question_type?;
        Some(render_preview(
            bank_questions,
            &self.state.parts.categories,
            &self.state.draft.title,
            question_type,
        ))
    }

    /// 组装提交内容（不调用接口）
    pub fn submission(&self) -> Result<QuestionSetPayload, ValidationError> {
        basic_info::validate(&self.state.draft)?;
        parts::build_submission(&self.state.draft, &self.state.parts)
    }

    /// 提交题集
    ///
    /// 没有有效部分时不调用接口；接口失败时保留全部状态以便重试，成功后重置会话。
    pub async fn submit(&mut self) -> AppResult<SubmitOutcome> {
        let payload = match self.submission() {
            Ok(payload) => payload,
            Err(e) => {
                self.note(&e);
                return Ok(SubmitOutcome::Rejected(e));
            }
        };

        info!(
            "📤 提交题集: {} ({} 个部分)",
            payload.title,
            payload.categories.len()
        );

        match self.gateway.create_question_set(&payload).await {
            Ok(created) => {
                info!("✓ 题集创建成功，重置组卷状态");
                self.state = ComposerState::default();
                self.notice = None;
                Ok(SubmitOutcome::Created(created))
            }
            Err(e) => {
                error!("❌ 题集创建失败: {}", e);
                self.notice = Some(e.user_message());
                Err(e)
            }
        }
    }

    fn note(&mut self, err: &ValidationError) {
        warn!("⚠️ {}", err);
        self.notice = Some(err.to_string());
    }

    fn reject<T>(&mut self, err: ValidationError) -> Result<T, ValidationError> {
        self.note(&err);
        Err(err)
    }
}

impl SubmitOutcome {
    /// 把本地拒绝也当作错误
    pub fn into_result(self) -> AppResult<Value> {
        match self {
            SubmitOutcome::Created(value) => Ok(value),
            SubmitOutcome::Rejected(e) => Err(AppError::Validation(e)),
        }
    }
}

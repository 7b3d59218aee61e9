pub mod api_client;

pub use api_client::{ApiClient, QuestionQuery};

use std::future::Future;

use crate::error::AppResult;
use crate::models::{QuestionBankType, QuestionSetPayload, QuestionsResponse};

/// 题目来源：按条件拉取题库题目
pub trait QuestionSource {
    fn fetch_questions(
        &self,
        query: &QuestionQuery,
    ) -> impl Future<Output = AppResult<QuestionsResponse>> + Send;
}

/// 题库类型目录：限定每种题库类型可选的科目
pub trait BankTypeCatalog {
    fn list_question_bank_types(
        &self,
    ) -> impl Future<Output = AppResult<Vec<QuestionBankType>>> + Send;
}

/// 题集创建接口
pub trait QuestionSetGateway {
    fn create_question_set(
        &self,
        payload: &QuestionSetPayload,
    ) -> impl Future<Output = AppResult<serde_json::Value>> + Send;
}

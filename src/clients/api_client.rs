/// 题库 API 客户端
///
/// 封装题库类型、题目查询和创建题集三个接口
use crate::clients::{BankTypeCatalog, QuestionSetGateway, QuestionSource};
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{QuestionBankType, QuestionSetPayload, QuestionType, QuestionsResponse};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 题目查询条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionQuery {
    pub subject_ids: Vec<String>,
    pub question_type: Option<QuestionType>,
    pub search: Option<String>,
}

impl QuestionQuery {
    /// 转成查询参数；科目按 `subjectIds[]` 重复传递
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = self
            .subject_ids
            .iter()
            .map(|id| ("subjectIds[]", id.clone()))
            .collect();
        if let Some(question_type) = self.question_type {
            pairs.push(("type", question_type.as_str().to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}

/// 题库 API 客户端
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: Config,
}

impl ApiClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        config.validate()?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::api_request_failed(&config.api_base_url, e))?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// 获取题库类型列表
    pub async fn list_question_bank_types(&self) -> AppResult<Vec<QuestionBankType>> {
        let endpoint = self.config.endpoint("question-bank-types");
        let body = self.send(self.http.get(&endpoint), &endpoint).await?;
        let types: Vec<QuestionBankType> = decode(unwrap_data(body))?;
        info!("✓ 获取到 {} 个题库类型", types.len());
        Ok(types)
    }

    /// 按科目、题型和关键字查询题目
    pub async fn fetch_questions(&self, query: &QuestionQuery) -> AppResult<QuestionsResponse> {
        let endpoint = self.config.endpoint("questions");
        debug!("查询题目: {:?}", query);
        let request = self.http.get(&endpoint).query(&query.to_pairs());
        let body = self.send(request, &endpoint).await?;
        decode(unwrap_data(body))
    }

    /// 创建题集
    pub async fn create_question_set(&self, payload: &QuestionSetPayload) -> AppResult<Value> {
        let endpoint = self.config.endpoint("question-sets");
        debug!("创建题集 Payload: {}", serde_json::to_string(payload)?);
        let body = self.send(self.http.post(&endpoint).json(payload), &endpoint).await?;
        info!("✓ 题集创建成功: {}", payload.title);
        Ok(body)
    }

    /// 发送请求并解析 JSON；非 2xx 时提取服务端 message
    async fn send(&self, request: RequestBuilder, endpoint: &str) -> AppResult<Value> {
        let request = match &self.config.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        if !status.is_success() {
            let message = extract_error_message(&text);
            warn!("⚠️ 接口返回错误 {} ({}): {:?}", endpoint, status, message);
            return Err(ApiError::BadResponse {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message,
            }
            .into());
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

impl QuestionSource for ApiClient {
    async fn fetch_questions(&self, query: &QuestionQuery) -> AppResult<QuestionsResponse> {
        ApiClient::fetch_questions(self, query).await
    }
}

impl BankTypeCatalog for ApiClient {
    async fn list_question_bank_types(&self) -> AppResult<Vec<QuestionBankType>> {
        ApiClient::list_question_bank_types(self).await
    }
}

impl QuestionSetGateway for ApiClient {
    async fn create_question_set(&self, payload: &QuestionSetPayload) -> AppResult<Value> {
        ApiClient::create_question_set(self, payload).await
    }
}

/// 部分接口把结果包在 `data` 里
fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") && !map.contains_key("questions") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> AppResult<T> {
    Ok(serde_json::from_value(value)?)
}

/// 错误响应体形如 `{data:{message}}` 或 `{message}`
fn extract_error_message(text: &str) -> Option<String> {
    let body: Value = serde_json::from_str(text).ok()?;
    body.pointer("/data/message")
        .or_else(|| body.get("message"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .filter(|m| !m.trim().is_empty())
}

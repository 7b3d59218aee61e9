use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 组卷校验错误（本地、可恢复）
    #[error("{0}")]
    Validation(#[from] ValidationError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 返回错误响应
    #[error("API返回错误响应 ({endpoint}): status={status}, message={message:?}")]
    BadResponse {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    /// JSON 解析失败
    #[error("JSON解析失败: {source}")]
    JsonParseFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

/// 组卷过程中的校验错误
///
/// `Display` 即为展示给用户的提示文案；这些错误只阻止当前操作，其余状态保持不变。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("Maximum {max} questions reached")]
    CapReached { max: u32 },
    #[error("MCQ questions need at least 2 options")]
    NotEnoughOptions,
    #[error("Please select the correct answer")]
    MissingCorrectAnswer,
    #[error("Correct answer must match one of the options")]
    CorrectAnswerNotAnOption,
    #[error("Question text is required")]
    EmptyQuestionText,
    #[error("Add at least one valid part before submitting")]
    NoValidCategories,
    #[error("Question is already assigned to another part")]
    AlreadyAssigned { question_id: String },
    #[error("Select a part first")]
    NoActiveCategory,
    #[error("Mark must be at least 1")]
    InvalidMark,
    #[error("Minimum questions must be at least 1")]
    InvalidMinQuestions,
    #[error("Question type cannot change once questions are added")]
    TypeLocked,
    #[error("Complete the basic information first")]
    InvalidStep,
    #[error("Nothing to edit at index {index}")]
    IndexOutOfRange { index: usize },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置值不合法
    #[error("配置项 {var_name} 不合法: 值 '{value}' 应为 {expected}")]
    InvalidValue {
        var_name: String,
        value: String,
        expected: String,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

/// 服务端未给出 message 时使用的提示
pub const GENERIC_CREATE_FAILURE: &str = "Failed to create question set";

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建 TOML 解析错误
    pub fn toml_parse_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 是否为本地校验错误（可由用户修改后重试）
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }

    /// 展示给用户的提示
    ///
    /// 服务端拒绝时优先使用服务端 message，否则使用通用提示。
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::Api(ApiError::BadResponse {
                message: Some(message),
                ..
            }) if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_CREATE_FAILURE.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

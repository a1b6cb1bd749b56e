use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 上游 API 调用错误
    #[error("Upstream API error: {0}")]
    Api(#[from] ApiError),
    /// LLM 服务错误
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    /// LLM 返回内容解析错误
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    /// 文件操作错误
    #[error("File error: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// 请求中缺少 prompt
    #[error("Prompt is required")]
    PromptRequired,
    /// 其他错误（用于包装第三方库错误）
    #[error("Error: {0}")]
    Other(String),
}

/// 上游 API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("Request to {endpoint} failed: {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 上游返回非 2xx 状态
    #[error("Upstream {endpoint} responded with status={status}, body={body}")]
    BadResponse {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// 获取访问令牌失败
    #[error("Access token exchange failed: {message}")]
    TokenExchangeFailed { message: String },
    /// 上游凭证未配置
    #[error("Missing credentials: {provider} is not set")]
    MissingCredentials { provider: String },
    /// JSON 解析失败
    #[error("Invalid JSON: {source}")]
    JsonParseFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM call failed (model: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回结果为空
    #[error("LLM returned no choices (model: {model})")]
    EmptyResponse { model: String },
    /// 返回内容为空
    #[error("LLM returned empty content (model: {model})")]
    EmptyContent { model: String },
    /// 构建请求失败
    #[error("Failed to build LLM request: {message}")]
    RequestBuildFailed { message: String },
}

/// LLM 返回内容解析错误
#[derive(Debug, Error)]
pub enum ParseError {
    /// 三轮修复后仍找不到任何 JSON 对象
    #[error("Failed to parse response as JSON")]
    NoJsonObjects,
    /// 上游返回的结构里找不到生成文本
    #[error("No generated text in upstream response")]
    MissingGeneratedText,
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("Invalid TOML in {path}: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("Environment variable {var_name}='{value}' is not a valid {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 监听地址无效
    #[error("Invalid bind address: {addr}")]
    InvalidBindAddr { addr: String },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|url| url.to_string())
            .unwrap_or_default();
        AppError::Api(ApiError::RequestFailed {
            endpoint,
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 是否属于调用方的输入错误（HTTP 层映射为 400）
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::PromptRequired)
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_required_message_is_wire_compatible() {
        assert_eq!(AppError::PromptRequired.to_string(), "Prompt is required");
        assert!(AppError::PromptRequired.is_client_error());
    }

    #[test]
    fn test_nested_errors_keep_source() {
        let err: AppError = ApiError::BadResponse {
            endpoint: "/ml/v1/text/generation".to_string(),
            status: 503,
            body: "unavailable".to_string(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("unavailable"));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_page_facing_messages_are_not_chinese() {
        let errors: Vec<AppError> = vec![
            LlmError::EmptyContent { model: "gpt-4o".to_string() }.into(),
            ParseError::MissingGeneratedText.into(),
            ApiError::MissingCredentials { provider: "OPENAI_API_KEY".to_string() }.into(),
            AppError::Other("x".to_string()),
        ];
        for err in errors {
            let msg = err.to_string();
            assert!(
                !msg.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c)),
                "{}",
                msg
            );
        }
    }

    #[test]
    fn test_no_json_objects_message() {
        let err: AppError = ParseError::NoJsonObjects.into();
        assert!(err.to_string().contains("Failed to parse response as JSON"));
    }
}

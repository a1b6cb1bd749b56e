use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::{AppResult, ConfigError, FileError};

/// 默认的改写提示词
pub const DEFAULT_PARA_PROMPT: &str =
    "أعد صياغة الجملة التالية بخمس طرق غير متشابهة واجعل كل جملة في سطر جديد :";

/// 改写请求走哪个上游
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynonymBackend {
    /// 基于 IAM 令牌的文本生成接口
    Watson,
    /// OpenAI 兼容的聊天接口
    OpenAi,
}

impl SynonymBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "watson" => Some(SynonymBackend::Watson),
            "openai" | "chat" => Some(SynonymBackend::OpenAi),
            _ => None,
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP 监听地址
    pub bind_addr: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 聊天接口配置 ---
    pub openai_api_key: String,
    pub openai_api_base: String,
    pub openai_model: String,
    pub temperature: f32,
    /// 校对请求前缀提示词，会拼接在用户文本之前
    pub fixed_prompt: String,
    /// 改写请求前缀提示词
    pub para_prompt: String,
    // --- 文本生成接口配置 ---
    pub watson_api_key: String,
    pub watson_iam_url: String,
    pub watson_url: String,
    pub watson_project_id: String,
    pub watson_model_id: String,
    pub watson_version: String,
    pub watson_max_new_tokens: u32,
    /// 改写上游；为空时有 watson 凭证就用 watson
    pub synonym_backend: Option<SynonymBackend>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            verbose_logging: false,
            openai_api_key: String::new(),
            openai_api_base: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-4o".to_string(),
            temperature: 0.7,
            fixed_prompt: String::new(),
            para_prompt: DEFAULT_PARA_PROMPT.to_string(),
            watson_api_key: String::new(),
            watson_iam_url: "https://iam.cloud.ibm.com/identity/token".to_string(),
            watson_url: "https://eu-de.ml.cloud.ibm.com".to_string(),
            watson_project_id: String::new(),
            watson_model_id: "sdaia/allam-1-13b-instruct".to_string(),
            watson_version: "2023-05-29".to_string(),
            watson_max_new_tokens: 400,
            synonym_backend: None,
        }
    }
}

impl Config {
    /// 从环境变量加载配置；设置了 `CONFIG_FILE` 时先读取该 TOML 文件作为底层
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var("CONFIG_FILE") {
            Ok(path) if !path.trim().is_empty() => Self::from_toml_file(Path::new(&path))?,
            _ => Self::default(),
        };
        Ok(base.with_env())
    }

    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// 读取 TOML 配置文件，未出现的字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| FileError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| FileError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })?;
        Ok(config)
    }

    /// 用环境变量覆盖已有配置
    pub fn with_env(self) -> Self {
        let base = self;
        Self {
            bind_addr: env_string("BIND_ADDR").unwrap_or(base.bind_addr),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(base.verbose_logging),
            openai_api_key: env_string("OPENAI_API_KEY").unwrap_or(base.openai_api_key),
            openai_api_base: env_string("OPENAI_API_BASE").unwrap_or(base.openai_api_base),
            openai_model: env_string("OPENAI_MODEL").unwrap_or(base.openai_model),
            temperature: env_parse("LLM_TEMPERATURE").unwrap_or(base.temperature),
            fixed_prompt: env_string("FIXED_PROMPT").unwrap_or(base.fixed_prompt),
            para_prompt: env_string("PARA_PROMPT").unwrap_or(base.para_prompt),
            watson_api_key: env_string("WATSON_API_KEY").unwrap_or(base.watson_api_key),
            watson_iam_url: env_string("WATSON_IAM_URL").unwrap_or(base.watson_iam_url),
            watson_url: env_string("WATSON_URL").unwrap_or(base.watson_url),
            watson_project_id: env_string("WATSON_PROJECT_ID").unwrap_or(base.watson_project_id),
            watson_model_id: env_string("WATSON_MODEL_ID").unwrap_or(base.watson_model_id),
            watson_version: env_string("WATSON_VERSION").unwrap_or(base.watson_version),
            watson_max_new_tokens: env_parse("WATSON_MAX_NEW_TOKENS")
                .unwrap_or(base.watson_max_new_tokens),
            synonym_backend: env_with("SYNONYM_BACKEND", "watson | openai", SynonymBackend::parse)
                .or(base.synonym_backend),
        }
    }

    /// 实际使用的改写上游
    pub fn effective_synonym_backend(&self) -> SynonymBackend {
        match self.synonym_backend {
            Some(backend) => backend,
            None if !self.watson_api_key.is_empty() => SynonymBackend::Watson,
            None => SynonymBackend::OpenAi,
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_with(name, std::any::type_name::<T>(), |v| v.trim().parse().ok())
}

/// 读取并转换环境变量；转换失败时记一条警告并返回 `None`，由调用方回退到原值
fn env_with<T>(name: &str, expected_type: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let value = std::env::var(name).ok()?;
    let parsed = parse(&value);
    if parsed.is_none() {
        let err = ConfigError::EnvVarParseFailed {
            var_name: name.to_string(),
            value,
            expected_type: expected_type.to_string(),
        };
        warn!("⚠️ {}，使用原值", err);
    }
    parsed
}

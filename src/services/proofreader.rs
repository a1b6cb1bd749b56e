//! 校对服务
//!
//! 只负责"把一段文本交给模型并拿回错误列表"，不关心界面

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::clients::{LlmClient, TextGenerator};
use crate::config::Config;
use crate::error::{AppError, AppResult, ParseError};
use crate::models::ErrorItem;
use crate::services::normalizer::{extract_generated_text, normalize_errors};
use crate::utils::truncate_text;

/// 校对时的系统消息
pub const PROOFREAD_SYSTEM_MESSAGE: &str = "أنت مدقق لغوي عربي محترف. مهمتك هي تحديد الأخطاء اللغوية في النص المقدم وتصحيحها. قدم الإجابة بتنسيق JSON.";

/// 校对服务
pub struct Proofreader {
    generator: Arc<dyn TextGenerator>,
    fixed_prompt: String,
}

impl Proofreader {
    pub fn new(generator: Arc<dyn TextGenerator>, fixed_prompt: impl Into<String>) -> Self {
        Self {
            generator,
            fixed_prompt: fixed_prompt.into(),
        }
    }

    /// 使用聊天接口创建
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(LlmClient::new(config)), config.fixed_prompt.clone())
    }

    /// 拼接固定前缀后请求上游，返回原始响应
    pub async fn proofread_raw(&self, prompt: &str) -> AppResult<Value> {
        if prompt.trim().is_empty() {
            return Err(AppError::PromptRequired);
        }

        let full_prompt = format!("{}{}", self.fixed_prompt, prompt);
        debug!("校对 prompt: {}", truncate_text(&full_prompt, 200));

        self.generator
            .generate(&full_prompt, Some(PROOFREAD_SYSTEM_MESSAGE))
            .await
    }

    /// 校对文本，返回规整后的错误列表
    pub async fn proofread(&self, text: &str) -> AppResult<Vec<ErrorItem>> {
        info!(
            "📝 开始校对，{} 个字符 (上游: {})",
            text.chars().count(),
            self.generator.name()
        );

        let payload = self.proofread_raw(text).await?;
        let content = extract_generated_text(&payload).ok_or(ParseError::MissingGeneratedText)?;
        let errors = normalize_errors(&content)?;

        info!("✓ 校对完成，发现 {} 处错误", errors.len());
        Ok(errors)
    }
}

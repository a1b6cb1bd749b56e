//! 改写服务
//!
//! 对选中的文本请求多种不同的表述

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::clients::{LlmClient, TextGenerator, WatsonClient};
use crate::config::{Config, SynonymBackend};
use crate::error::{AppError, AppResult, ParseError};
use crate::models::SynonymList;
use crate::services::normalizer::extract_generated_text;
use crate::utils::truncate_text;

/// 走聊天接口时的系统消息
pub const PARAPHRASE_SYSTEM_MESSAGE: &str = "أنت خبير في اللغة العربية. مهمتك هي إعادة صياغة النص المقدم بطرق مختلفة مع الحفاظ على المعنى الأصلي.";

/// 改写服务
pub struct Paraphraser {
    generator: Arc<dyn TextGenerator>,
    para_prompt: String,
}

impl Paraphraser {
    pub fn new(generator: Arc<dyn TextGenerator>, para_prompt: impl Into<String>) -> Self {
        Self {
            generator,
            para_prompt: para_prompt.into(),
        }
    }

    /// 按配置选择上游
    pub fn from_config(config: &Config) -> Self {
        let generator: Arc<dyn TextGenerator> = match config.effective_synonym_backend() {
            SynonymBackend::Watson => Arc::new(WatsonClient::new(config)),
            SynonymBackend::OpenAi => Arc::new(LlmClient::new(config)),
        };
        Self::new(generator, config.para_prompt.clone())
    }

    /// 原样转发 prompt（调用方已经拼好前缀），返回原始响应
    pub async fn paraphrase_raw(&self, prompt: &str) -> AppResult<Value> {
        if prompt.trim().is_empty() {
            return Err(AppError::PromptRequired);
        }
        debug!("改写 prompt: {}", truncate_text(prompt, 200));

        self.generator
            .generate(prompt, Some(PARAPHRASE_SYSTEM_MESSAGE))
            .await
    }

    /// 对选中文本生成改写列表
    pub async fn paraphrase(&self, selected: &str) -> AppResult<SynonymList> {
        let selected = selected.trim();
        if selected.is_empty() {
            return Err(AppError::PromptRequired);
        }
        info!(
            "✍️ 开始改写: {} (上游: {})",
            truncate_text(selected, 40),
            self.generator.name()
        );

        let prompt = format!("{}{}", self.para_prompt, selected);
        let payload = self.paraphrase_raw(&prompt).await?;
        let text = extract_generated_text(&payload).ok_or(ParseError::MissingGeneratedText)?;
        let synonyms = SynonymList::parse(&text);

        info!("✓ 改写完成，得到 {} 个候选", synonyms.len());
        Ok(synonyms)
    }
}

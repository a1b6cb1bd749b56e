//! 聊天接口客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::clients::TextGenerator;
use crate::config::Config;
use crate::error::{AppError, AppResult, ApiError, LlmError};

/// LLM 客户端
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    has_key: bool,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.openai_api_key)
            .with_api_base(&config.openai_api_base);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.openai_model.clone(),
            temperature: config.temperature,
            has_key: !config.openai_api_key.is_empty(),
        }
    }

    /// 组装聊天请求
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    fn build_request(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> AppResult<CreateChatCompletionRequest> {
        if !self.has_key {
            return Err(ApiError::MissingCredentials {
                provider: "OPENAI_API_KEY".to_string(),
            }
            .into());
        }

        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.chars().count());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(build_failed)?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(build_failed)?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(build_failed)
    }

    /// 发送聊天请求，返回解析后的响应
    pub async fn chat(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> AppResult<CreateChatCompletionResponse> {
        let request = self.build_request(user_message, system_message)?;
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| self.call_failed(e))?;

        debug!("LLM API 调用成功");
        Ok(response)
    }

    /// 发送聊天请求，原样返回上游 JSON（不经过类型化的响应结构）
    pub async fn chat_raw(&self, user_message: &str, system_message: Option<&str>) -> AppResult<Value> {
        let request = self.build_request(user_message, system_message)?;
        let payload: Value = self
            .client
            .chat()
            .create_byot(&request)
            .await
            .map_err(|e| self.call_failed(e))?;

        debug!("LLM API 调用成功（原始响应）");
        Ok(payload)
    }

    fn call_failed(&self, err: OpenAIError) -> AppError {
        warn!("LLM API 调用失败: {}", err);
        AppError::llm_api_failed(&self.model_name, err)
    }

    /// 发送聊天请求，只返回第一条回复的文本
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> AppResult<String> {
        let response = self.chat(user_message, system_message).await?;

        let choice = response.choices.first().ok_or_else(|| LlmError::EmptyResponse {
            model: self.model_name.clone(),
        })?;
        let content = choice
            .message
            .content
            .clone()
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    fn name(&self) -> &str {
        "chat"
    }

    async fn generate(&self, prompt: &str, system_message: Option<&str>) -> AppResult<Value> {
        self.chat_raw(prompt, system_message).await
    }
}

fn build_failed(err: impl std::fmt::Display) -> AppError {
    AppError::Llm(LlmError::RequestBuildFailed {
        message: err.to_string(),
    })
}

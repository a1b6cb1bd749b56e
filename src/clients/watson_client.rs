//! 文本生成接口客户端
//!
//! 先用 API key 到 IAM 换取 bearer token，再调用文本生成接口。
//! 每次请求都重新换取令牌，不做缓存。

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::clients::TextGenerator;
use crate::config::Config;
use crate::error::{ApiError, AppResult};

const IAM_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";
const GENERATION_PATH: &str = "/ml/v1/text/generation";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// 文本生成客户端
pub struct WatsonClient {
    http: reqwest::Client,
    api_key: String,
    iam_url: String,
    base_url: String,
    project_id: String,
    model_id: String,
    version: String,
    max_new_tokens: u32,
}

impl WatsonClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.watson_api_key.clone(),
            iam_url: config.watson_iam_url.clone(),
            base_url: config.watson_url.trim_end_matches('/').to_string(),
            project_id: config.watson_project_id.clone(),
            model_id: config.watson_model_id.clone(),
            version: config.watson_version.clone(),
            max_new_tokens: config.watson_max_new_tokens,
        }
    }

    /// 用 API key 换取访问令牌
    async fn access_token(&self) -> AppResult<String> {
        if self.api_key.is_empty() {
            return Err(ApiError::MissingCredentials {
                provider: "WATSON_API_KEY".to_string(),
            }
            .into());
        }

        debug!("请求 IAM 访问令牌: {}", self.iam_url);
        let response = self
            .http
            .post(&self.iam_url)
            .header("Accept", "application/json")
            .form(&[("grant_type", IAM_GRANT_TYPE), ("apikey", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("IAM 令牌请求失败: {} {}", status, body);
            return Err(ApiError::TokenExchangeFailed {
                message: format!("status={}, body={}", status.as_u16(), body),
            }
            .into());
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// 调用文本生成接口，返回上游原始 JSON
    pub async fn generate_text(&self, input: &str) -> AppResult<Value> {
        let token = self.access_token().await?;
        let endpoint = format!("{}{}", self.base_url, GENERATION_PATH);

        let body = json!({
            "input": input,
            "parameters": {
                "decoding_method": "greedy",
                "max_new_tokens": self.max_new_tokens,
                "repetition_penalty": 1.05
            },
            "model_id": self.model_id,
            "project_id": self.project_id,
        });

        debug!("调用文本生成接口，模型: {}", self.model_id);
        let response = self
            .http
            .post(&endpoint)
            .query(&[("version", self.version.as_str())])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("文本生成接口返回错误: {} {}", status, body);
            return Err(ApiError::BadResponse {
                endpoint,
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let payload: Value = response.json().await?;
        debug!("文本生成接口调用成功");
        Ok(payload)
    }
}

#[async_trait]
impl TextGenerator for WatsonClient {
    fn name(&self) -> &str {
        "watson"
    }

    /// 文本生成接口没有系统消息，直接使用 prompt
    async fn generate(&self, prompt: &str, _system_message: Option<&str>) -> AppResult<Value> {
        self.generate_text(prompt).await
    }
}

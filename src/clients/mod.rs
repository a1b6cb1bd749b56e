//! 上游客户端
//!
//! 两个上游都实现 [`TextGenerator`]，服务层只依赖这个 trait。

pub mod llm_client;
pub mod watson_client;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppResult;

pub use llm_client::LlmClient;
pub use watson_client::WatsonClient;

/// 能把 prompt 变成上游原始 JSON 响应的生成器
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 日志里使用的名字
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, system_message: Option<&str>) -> AppResult<Value>;
}

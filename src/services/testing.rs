//! 单元测试用的假上游

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::clients::TextGenerator;
use crate::error::{AppError, AppResult};

/// 按顺序返回预设结果，并记录每次调用的 (prompt, system_message)
pub(crate) struct ScriptedGenerator {
    responses: Mutex<VecDeque<AppResult<Value>>>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl ScriptedGenerator {
    pub(crate) fn new(responses: Vec<AppResult<Value>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str, system_message: Option<&str>) -> AppResult<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), system_message.map(str::to_string)));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Other("没有预设响应".to_string())))
    }
}

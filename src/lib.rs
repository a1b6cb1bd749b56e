//! # Arabic Proofreader
//!
//! 阿拉伯语校对与改写服务：把用户文本交给大模型，规整模型返回的
//! 错误列表，在文本中标注出错误并支持一键 / 批量修正；选中一段文本
//! 还可以请求多种改写。
//!
//! ## 架构设计
//!
//! ### ① 上游客户端（Clients）
//! - `clients/` - 只负责和上游通信，返回原始 JSON
//! - `LlmClient` - OpenAI 兼容的聊天接口
//! - `WatsonClient` - 基于 IAM 令牌的文本生成接口
//!
//! ### ② 业务能力层（Services）
//! - `normalizer` - 把不规范的模型输出规整成错误列表
//! - `annotator` - 在文本上标注错误、执行修正和选区替换
//! - `Proofreader` / `Paraphraser` - 拼 prompt、调上游、解析结果
//!
//! ### ③ 流程层（Workflow）
//! - `EditorSession` - 一个编辑区的完整状态与操作
//!
//! ### ④ 接口层（HTTP）
//! - `http/` - 代理接口、校对 / 改写 / 修正接口和编辑器页面
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Correction, ErrorItem, Selection, SynonymList};
pub use services::{normalize_errors, AnnotatedDocument, Paraphraser, Proofreader};
pub use workflow::{ActionOutcome, EditorSession};

//! HTTP 层
//!
//! - `/api/watson`、`/api/watson/synonyms`：原样转发上游响应
//! - `/api/proofread` 等：在服务端完成规整、标注和修正，页面只负责展示

pub mod page;
pub mod routes;
pub mod server;

pub use routes::{build_router, AppState};
pub use server::serve;

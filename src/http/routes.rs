use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::http::page::INDEX_HTML;
use crate::models::{Correction, ErrorItem, Selection, SynonymList};
use crate::services::{AnnotatedDocument, Edit, Mark, Paraphraser, Proofreader};

/// 所有 handler 共享的状态
#[derive(Clone)]
pub struct AppState {
    proofreader: Arc<Proofreader>,
    paraphraser: Arc<Paraphraser>,
}

impl AppState {
    pub fn new(proofreader: Arc<Proofreader>, paraphraser: Arc<Paraphraser>) -> Self {
        Self {
            proofreader,
            paraphraser,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(Proofreader::from_config(config)),
            Arc::new(Paraphraser::from_config(config)),
        )
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(health))
        .route("/api/watson", post(proxy_proofread))
        .route("/api/watson/synonyms", post(proxy_synonyms))
        .route("/api/proofread", post(proofread))
        .route("/api/paraphrase", post(paraphrase))
        .route("/api/annotate", post(annotate))
        .route("/api/correct", post(correct))
        .route("/api/replace", post(replace))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// ========== 错误响应 ==========

/// 统一的错误响应：`{ "error": message }`
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    message: String,
}

impl ApiFailure {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<AppError> for ApiFailure {
    fn from(err: AppError) -> Self {
        if err.is_client_error() {
            return Self::bad_request(err.to_string());
        }
        error!("请求处理失败: {}", err);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiFailure {
    fn from(rejection: JsonRejection) -> Self {
        warn!("请求体无法解析: {}", rejection.body_text());
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiFailure>;

// ========== 请求 / 响应体 ==========

#[derive(Debug, Deserialize)]
pub struct PromptBody {
    #[serde(default)]
    pub prompt: Option<String>,
}

impl PromptBody {
    fn into_prompt(self) -> Result<String, ApiFailure> {
        match self.prompt {
            Some(prompt) if !prompt.trim().is_empty() => Ok(prompt),
            _ => Err(AppError::PromptRequired.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct AnnotateBody {
    pub text: String,
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
pub struct CorrectBody {
    pub text: String,
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
    pub corrections: Vec<Correction>,
    #[serde(default)]
    pub selection: Option<Selection>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceBody {
    pub text: String,
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
    pub selection: Selection,
    pub replacement: String,
}

#[derive(Debug, Serialize)]
pub struct DocumentPayload {
    pub text: String,
    pub html: String,
    pub marks: Vec<Mark>,
}

impl From<&AnnotatedDocument> for DocumentPayload {
    fn from(doc: &AnnotatedDocument) -> Self {
        Self {
            text: doc.plain_text().to_string(),
            html: doc.to_html(),
            marks: doc.marks().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProofreadPayload {
    pub errors: Vec<ErrorItem>,
    #[serde(flatten)]
    pub document: DocumentPayload,
}

#[derive(Debug, Serialize)]
pub struct ParaphrasePayload {
    pub synonyms: SynonymList,
}

#[derive(Debug, Serialize)]
pub struct EditPayload {
    #[serde(flatten)]
    pub document: DocumentPayload,
    pub applied: usize,
    pub selection: Option<Selection>,
}

// ========== handlers ==========

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": env!("CARGO_PKG_NAME") }))
}

/// 校对代理：拼接固定前缀后转发，返回上游原始 JSON
async fn proxy_proofread(
    State(state): State<AppState>,
    body: Result<Json<PromptBody>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = body?;
    let prompt = body.into_prompt()?;
    info!("收到校对代理请求，{} 个字符", prompt.chars().count());
    Ok(Json(state.proofreader.proofread_raw(&prompt).await?))
}

/// 改写代理：prompt 原样转发
async fn proxy_synonyms(
    State(state): State<AppState>,
    body: Result<Json<PromptBody>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = body?;
    let prompt = body.into_prompt()?;
    info!("收到改写代理请求，{} 个字符", prompt.chars().count());
    Ok(Json(state.paraphraser.paraphrase_raw(&prompt).await?))
}

async fn proofread(
    State(state): State<AppState>,
    body: Result<Json<TextBody>, JsonRejection>,
) -> ApiResult<ProofreadPayload> {
    let Json(body) = body?;
    let errors = state.proofreader.proofread(&body.text).await?;
    let doc = AnnotatedDocument::annotate(&body.text, &errors);
    Ok(Json(ProofreadPayload {
        document: DocumentPayload::from(&doc),
        errors,
    }))
}

async fn paraphrase(
    State(state): State<AppState>,
    body: Result<Json<TextBody>, JsonRejection>,
) -> ApiResult<ParaphrasePayload> {
    let Json(body) = body?;
    let synonyms = state.paraphraser.paraphrase(&body.text).await?;
    Ok(Json(ParaphrasePayload { synonyms }))
}

async fn annotate(body: Result<Json<AnnotateBody>, JsonRejection>) -> ApiResult<DocumentPayload> {
    let Json(body) = body?;
    let doc = AnnotatedDocument::annotate(&body.text, &body.errors);
    Ok(Json(DocumentPayload::from(&doc)))
}

/// 单条修正传一条 correction，全部修正传整张列表
async fn correct(body: Result<Json<CorrectBody>, JsonRejection>) -> ApiResult<EditPayload> {
    let Json(body) = body?;
    let mut doc = AnnotatedDocument::annotate(&body.text, &body.errors);
    let edits = doc.apply_all(&body.corrections);
    let selection = body
        .selection
        .map(|sel| Edit::remap_all(&edits, sel.clamp(body.text.chars().count())));
    Ok(Json(EditPayload {
        document: DocumentPayload::from(&doc),
        applied: edits.len(),
        selection,
    }))
}

async fn replace(body: Result<Json<ReplaceBody>, JsonRejection>) -> ApiResult<EditPayload> {
    let Json(body) = body?;
    if body.selection.is_collapsed() {
        return Err(ApiFailure::bad_request("Selection is required"));
    }
    let mut doc = AnnotatedDocument::annotate(&body.text, &body.errors);
    let edit = doc.replace_range(body.selection, &body.replacement);
    Ok(Json(EditPayload {
        document: DocumentPayload::from(&doc),
        applied: 1,
        selection: Some(edit.caret_after()),
    }))
}

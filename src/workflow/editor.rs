//! 编辑会话 - 流程层
//!
//! 对应页面上的一个编辑区：当前文本、错误面板、改写面板、选区，
//! 以及两个"正在请求"标记。每类操作同一时间只允许一个请求在途，
//! 第二次触发直接返回 `Busy`，不排队、不取消。
//!
//! 失败不会中断会话，只会把错误文案记下来给界面显示。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{info, warn};

use crate::models::{Correction, ErrorItem, Selection, SynonymList};
use crate::services::{AnnotatedDocument, Edit, Mark, Paraphraser, Proofreader};

/// 错误面板标题
pub const ERRORS_PANEL_TITLE: &str = "الأخطاء و الملاحظات";
/// 改写面板标题
pub const SYNONYMS_PANEL_TITLE: &str = "إعادة الصياغة";

/// 一次用户操作的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// 请求完成，状态已更新
    Completed,
    /// 同类请求仍在途
    Busy,
    /// 没有选中文本，未发请求
    NothingSelected,
    /// 请求失败，文案已记录
    Failed(String),
}

/// 给界面渲染用的快照
#[derive(Debug, Clone, Serialize)]
pub struct EditorView {
    pub text: String,
    pub html: String,
    pub marks: Vec<Mark>,
    pub panel_title: &'static str,
    pub errors: Vec<ErrorItem>,
    pub synonyms: SynonymList,
    pub selection: Option<Selection>,
    pub selected_text: String,
    pub error_message: Option<String>,
    pub proofreading: bool,
    pub paraphrasing: bool,
}

#[derive(Debug, Default)]
struct EditorState {
    document: AnnotatedDocument,
    errors: Vec<ErrorItem>,
    synonyms: SynonymList,
    selection: Option<Selection>,
    selected_text: String,
    error_message: Option<String>,
}

impl EditorState {
    fn remap_selection(&mut self, edits: &[Edit]) {
        if let Some(selection) = self.selection {
            self.selection = Some(Edit::remap_all(edits, selection));
        }
    }
}

/// 请求结束（包括出错）时复位标记
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// 编辑会话
pub struct EditorSession {
    proofreader: Arc<Proofreader>,
    paraphraser: Arc<Paraphraser>,
    state: Mutex<EditorState>,
    proofreading: AtomicBool,
    paraphrasing: AtomicBool,
}

impl EditorSession {
    pub fn new(proofreader: Arc<Proofreader>, paraphraser: Arc<Paraphraser>) -> Self {
        Self {
            proofreader,
            paraphraser,
            state: Mutex::new(EditorState::default()),
            proofreading: AtomicBool::new(false),
            paraphrasing: AtomicBool::new(false),
        }
    }

    fn state(&self) -> MutexGuard<'_, EditorState> {
        // 状态里没有跨 await 的不变量，中毒后继续使用即可
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 用户输入：替换全文，清空两个面板和选区
    pub fn set_text(&self, text: impl Into<String>) {
        let mut state = self.state();
        state.document = AnnotatedDocument::plain(text);
        state.errors.clear();
        state.synonyms = SynonymList::default();
        state.selection = None;
        state.selected_text.clear();
    }

    /// 记录选区；选中文本会去掉首尾空白
    pub fn select(&self, selection: Selection) {
        let mut state = self.state();
        let selection = selection.clamp(state.document.char_len());
        state.selected_text = selection.slice(state.document.plain_text()).trim().to_string();
        state.selection = Some(selection);
    }

    /// 校对当前文本
    pub async fn proofread(&self) -> ActionOutcome {
        let Some(_guard) = InFlight::acquire(&self.proofreading) else {
            return ActionOutcome::Busy;
        };

        let text = {
            let mut state = self.state();
            state.error_message = None;
            state.document.plain_text().to_string()
        };

        match self.proofreader.proofread(&text).await {
            Ok(errors) => {
                let mut state = self.state();
                // 请求期间文本可能被改过，按当前文本重新标注
                let current = state.document.plain_text().to_string();
                state.document = AnnotatedDocument::annotate(&current, &errors);
                state.errors = errors;
                state.synonyms = SynonymList::default();
                ActionOutcome::Completed
            }
            Err(e) => {
                warn!("校对失败: {}", e);
                let message = e.to_string();
                self.state().error_message = Some(message.clone());
                ActionOutcome::Failed(message)
            }
        }
    }

    /// 对选中文本请求改写
    pub async fn paraphrase(&self) -> ActionOutcome {
        let selected = self.state().selected_text.clone();
        if selected.is_empty() {
            info!("没有选中文本，跳过改写");
            return ActionOutcome::NothingSelected;
        }

        let Some(_guard) = InFlight::acquire(&self.paraphrasing) else {
            return ActionOutcome::Busy;
        };
        self.state().error_message = None;

        match self.paraphraser.paraphrase(&selected).await {
            Ok(synonyms) => {
                let mut state = self.state();
                state.synonyms = synonyms;
                state.errors.clear();
                ActionOutcome::Completed
            }
            Err(e) => {
                warn!("改写失败: {}", e);
                let message = e.to_string();
                self.state().error_message = Some(message.clone());
                ActionOutcome::Failed(message)
            }
        }
    }

    /// 单条修正
    pub fn correct(&self, word: &str, correction: &str) -> bool {
        let mut state = self.state();
        match state.document.apply_correction(word, correction) {
            Some(edit) => {
                state.remap_selection(&[edit]);
                true
            }
            None => false,
        }
    }

    /// 按当前错误列表全部修正，返回实际替换的处数
    pub fn correct_all(&self) -> usize {
        let mut state = self.state();
        let corrections: Vec<Correction> =
            state.errors.iter().map(ErrorItem::to_correction).collect();
        let edits = state.document.apply_all(&corrections);
        state.remap_selection(&edits);
        edits.len()
    }

    /// 用改写结果替换选区；没有选中文本时不做任何事
    pub fn replace_selection(&self, synonym: &str) -> bool {
        let mut state = self.state();
        let Some(selection) = state.selection else {
            return false;
        };
        if state.selected_text.is_empty() {
            return false;
        }
        state.document.replace_range(selection, synonym);
        state.selection = None;
        state.selected_text.clear();
        true
    }

    pub fn is_proofreading(&self) -> bool {
        self.proofreading.load(Ordering::Acquire)
    }

    pub fn is_paraphrasing(&self) -> bool {
        self.paraphrasing.load(Ordering::Acquire)
    }

    pub fn view(&self) -> EditorView {
        let state = self.state();
        let panel_title = if state.synonyms.is_empty() {
            ERRORS_PANEL_TITLE
        } else {
            SYNONYMS_PANEL_TITLE
        };
        EditorView {
            text: state.document.plain_text().to_string(),
            html: state.document.to_html(),
            marks: state.document.marks().to_vec(),
            panel_title,
            errors: state.errors.clone(),
            synonyms: state.synonyms.clone(),
            selection: state.selection,
            selected_text: state.selected_text.clone(),
            error_message: state.error_message.clone(),
            proofreading: self.is_proofreading(),
            paraphrasing: self.is_paraphrasing(),
        }
    }
}

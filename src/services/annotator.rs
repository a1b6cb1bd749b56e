//! 文本标注
//!
//! 把规整后的错误列表落到用户文本上：找出每个错误词的出现位置，
//! 生成带 `data-*` 元数据的高亮 span，并支持单条 / 批量修正以及
//! 选区替换。所有偏移都按字符计，和编辑器里的选区一致。

use serde::Serialize;
use tracing::debug;

use crate::models::selection::char_to_byte;
use crate::models::{Correction, ErrorItem, Selection};

/// 错误词两侧允许出现的分隔符（空白之外）
const BOUNDARY_PUNCTUATION: [char; 5] = ['.', '،', '؛', ':', '-'];

fn is_boundary(c: char) -> bool {
    c.is_whitespace() || BOUNDARY_PUNCTUATION.contains(&c)
}

/// 文本中一处被标记的错误
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Mark {
    pub start: usize,
    pub end: usize,
    pub word: String,
    pub kind: String,
    pub correction: String,
}

impl Mark {
    fn from_error(start: usize, end: usize, error: &ErrorItem) -> Self {
        Self {
            start,
            end,
            word: error.word().to_string(),
            kind: error.kind().to_string(),
            correction: error.correction().to_string(),
        }
    }

    fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

/// 一次文本替换：`[start, end)` 被替换成 `inserted` 个字符
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub inserted: usize,
}

impl Edit {
    /// 把编辑前的选区映射到编辑后
    pub fn remap(&self, selection: Selection) -> Selection {
        selection.remap(self.start, self.end, self.inserted)
    }

    /// 编辑后的光标：落在新内容末尾
    pub fn caret_after(&self) -> Selection {
        Selection::caret(self.start + self.inserted)
    }

    /// 依次应用多次编辑
    pub fn remap_all(edits: &[Edit], selection: Selection) -> Selection {
        edits.iter().fold(selection, |sel, edit| edit.remap(sel))
    }
}

/// 渲染时的片段
#[derive(Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Mark(&'a Mark, &'a str),
}

/// 带错误标记的文档
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnnotatedDocument {
    text: String,
    /// 按 start 升序，互不重叠
    marks: Vec<Mark>,
}

impl AnnotatedDocument {
    /// 没有任何标记的文档
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    /// 在文本中标记所有错误
    ///
    /// 长的错误词先匹配，短词不会再落进已经标记的区间里；
    /// 错误词按字面匹配，两侧必须是文本边界、空白或分隔标点。
    pub fn annotate(text: &str, errors: &[ErrorItem]) -> Self {
        let mut sorted: Vec<&ErrorItem> = errors.iter().filter(|e| e.is_actionable()).collect();
        sorted.sort_by_key(|e| std::cmp::Reverse(e.word().chars().count()));

        let mut marks: Vec<Mark> = Vec::new();
        for error in sorted {
            let word = error.word();
            let word_chars = word.chars().count();
            // 被拒绝的候选只前进一个字符，和它重叠的下一处出现仍然可能合法
            let mut from = 0;
            while let Some(offset) = text[from..].find(word) {
                let byte_start = from + offset;
                let byte_end = byte_start + word.len();
                let before_ok = text[..byte_start].chars().next_back().map_or(true, is_boundary);
                let after_ok = text[byte_end..].chars().next().map_or(true, is_boundary);
                let start = text[..byte_start].chars().count();
                let end = start + word_chars;

                if before_ok && after_ok && !marks.iter().any(|m| m.overlaps(start, end)) {
                    marks.push(Mark::from_error(start, end, error));
                    from = byte_end;
                } else {
                    from = byte_start + text[byte_start..].chars().next().map_or(1, char::len_utf8);
                }
            }
        }
        marks.sort_by_key(|m| m.start);

        debug!("标注完成: {} 个错误条目, {} 处标记", errors.len(), marks.len());
        Self {
            text: text.to_string(),
            marks,
        }
    }

    /// 纯文本内容
    pub fn plain_text(&self) -> &str {
        &self.text
    }

    /// 字符长度
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// 按文档顺序输出片段
    pub fn segments(&self) -> Vec<Segment<'_>> {
        let mut segments = Vec::with_capacity(self.marks.len() * 2 + 1);
        let mut cursor = 0;
        for mark in &self.marks {
            let start = char_to_byte(&self.text, mark.start);
            let end = char_to_byte(&self.text, mark.end);
            if start > cursor {
                segments.push(Segment::Text(&self.text[cursor..start]));
            }
            segments.push(Segment::Mark(mark, &self.text[start..end]));
            cursor = end;
        }
        if cursor < self.text.len() {
            segments.push(Segment::Text(&self.text[cursor..]));
        }
        segments
    }

    /// 渲染成可直接嵌入编辑区的 HTML
    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(self.text.len() + self.marks.len() * 96);
        for segment in self.segments() {
            match segment {
                Segment::Text(text) => html.push_str(&escape_html(text)),
                Segment::Mark(mark, text) => {
                    html.push_str(&format!(
                        r#"<span class="error-word" data-error-type="{}" data-word="{}" data-correction="{}">{}</span>"#,
                        escape_html(&mark.kind),
                        escape_html(&mark.word),
                        escape_html(&mark.correction),
                        escape_html(text),
                    ));
                }
            }
        }
        html
    }

    /// 单条修正：把第一个错误词为 `word` 的标记替换成 `correction`
    ///
    /// # 返回
    /// 找到标记时返回这次编辑，可用来重新映射选区
    pub fn apply_correction(&mut self, word: &str, correction: &str) -> Option<Edit> {
        let index = self.marks.iter().position(|m| m.word == word)?;
        let mark = self.marks.remove(index);
        Some(self.splice(mark.start, mark.end, correction))
    }

    /// 批量修正：每条修正按顺序应用一次，找不到标记的跳过
    pub fn apply_all(&mut self, corrections: &[Correction]) -> Vec<Edit> {
        corrections
            .iter()
            .filter_map(|c| self.apply_correction(&c.error_word, &c.correction))
            .collect()
    }

    /// 用 `replacement` 替换选区内容（改写替换）
    ///
    /// 与选区相交的标记会被取消；空选区等于在光标处插入。
    pub fn replace_range(&mut self, selection: Selection, replacement: &str) -> Edit {
        let selection = selection.clamp(self.char_len());
        let (start, end) = (selection.start, selection.end);
        self.marks.retain(|m| {
            if start == end {
                !(m.start < start && start < m.end)
            } else {
                !m.overlaps(start, end)
            }
        });
        self.splice(start, end, replacement)
    }

    /// 替换文本区间并平移其后的标记；调用方保证区间内已无标记
    fn splice(&mut self, start: usize, end: usize, replacement: &str) -> Edit {
        let byte_start = char_to_byte(&self.text, start);
        let byte_end = char_to_byte(&self.text, end);
        self.text.replace_range(byte_start..byte_end, replacement);

        let edit = Edit {
            start,
            end,
            inserted: replacement.chars().count(),
        };
        for mark in self.marks.iter_mut().filter(|m| m.start >= end) {
            mark.start = mark.start - (end - start) + edit.inserted;
            mark.end = mark.end - (end - start) + edit.inserted;
        }
        edit
    }
}

/// 转义后才能放进 HTML 文本或属性
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

use serde::{Deserialize, Serialize};

/// 纯文本上的选区，`[start, end)` 按字符计；`start == end` 即光标
///
/// 反序列化时同样经过 [`Selection::new`]，保证 `start <= end`。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSelection")]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

#[derive(Deserialize)]
struct RawSelection {
    start: usize,
    end: usize,
}

impl From<RawSelection> for Selection {
    fn from(raw: RawSelection) -> Self {
        Selection::new(raw.start, raw.end)
    }
}

impl Selection {
    /// 构造时自动规整顺序
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn caret(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// 把选区限制在长度为 `len` 的文本内
    pub fn clamp(self, len: usize) -> Self {
        Self::new(self.start.min(len), self.end.min(len))
    }

    /// 文本中 `[edit_start, edit_end)` 被替换为 `inserted` 个字符后，重新映射选区
    ///
    /// 编辑区之前的偏移不变，之后的偏移按长度差平移，落在编辑区内部的偏移
    /// 收到新内容末尾。
    pub fn remap(self, edit_start: usize, edit_end: usize, inserted: usize) -> Self {
        let map = |offset: usize| {
            if offset <= edit_start {
                offset
            } else if offset >= edit_end {
                offset - (edit_end - edit_start) + inserted
            } else {
                edit_start + inserted
            }
        };
        Self::new(map(self.start), map(self.end))
    }

    /// 取出选区对应的文本
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        let start = char_to_byte(text, self.start);
        let end = char_to_byte(text, self.end);
        &text[start..end]
    }
}

/// 字符偏移转字节偏移，超出时返回文本长度
pub(crate) fn char_to_byte(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remap_before_inside_after() {
        // 把 [4, 8) 替换成 2 个字符
        assert_eq!(Selection::caret(2).remap(4, 8, 2), Selection::caret(2));
        assert_eq!(Selection::caret(6).remap(4, 8, 2), Selection::caret(6));
        assert_eq!(Selection::caret(10).remap(4, 8, 2), Selection::caret(8));
        assert_eq!(Selection::new(1, 10).remap(4, 8, 2), Selection::new(1, 8));
    }

    #[test]
    fn test_remap_growing_edit() {
        assert_eq!(Selection::new(5, 9).remap(0, 3, 6), Selection::new(8, 12));
    }

    #[test]
    fn test_deserialized_selection_is_ordered() {
        let sel: Selection = serde_json::from_str(r#"{"start": 7, "end": 2}"#).unwrap();
        assert_eq!(sel, Selection::new(2, 7));
        assert_eq!(sel.slice("0123456789"), "23456");
    }

    #[test]
    fn test_slice_uses_char_offsets() {
        let text = "مرحبا بالعالم";
        assert_eq!(Selection::new(6, 13).slice(text), "بالعالم");
        assert_eq!(Selection::new(0, 100).clamp(5).slice(text), "مرحبا");
    }
}

//! 改写结果列表

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// 行首编号前缀：数字（含阿拉伯-印度数字）、空白以及 . ، ؛ : -
fn enumeration_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\d\s.،؛:\-]+").expect("静态正则"))
}

/// 由一段文本按行拆出的候选改写
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SynonymList(Vec<String>);

impl SynonymList {
    /// 按换行拆分，去掉空行和编号前缀
    pub fn parse(text: &str) -> Self {
        let items = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| enumeration_prefix().replace(line, "").trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        Self(items)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl<'a> IntoIterator for &'a SynonymList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_numbering() {
        let list = SynonymList::parse("1. ذهب الولد إلى المدرسة\n\n2- مضى الصبي نحو المدرسة\n  ٣، توجه الفتى إلى المدرسة  \n");
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(0), Some("ذهب الولد إلى المدرسة"));
        assert_eq!(list.get(1), Some("مضى الصبي نحو المدرسة"));
        assert_eq!(list.get(2), Some("توجه الفتى إلى المدرسة"));
    }

    #[test]
    fn test_parse_keeps_unnumbered_lines() {
        let list = SynonymList::parse("جملة أولى\r\nجملة ثانية");
        assert_eq!(list.into_inner(), vec!["جملة أولى", "جملة ثانية"]);
    }

    #[test]
    fn test_parse_drops_lines_that_are_only_numbers() {
        let list = SynonymList::parse("1.\n2. نص");
        assert_eq!(list.len(), 1);
        assert!(SynonymList::parse("  \n\n").is_empty());
    }
}

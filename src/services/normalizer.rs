//! LLM 响应规整
//!
//! 模型被要求返回 JSON，但实际输出经常是若干个对象之间缺逗号、
//! 没有外层方括号、或者包在 markdown 代码块里。这里按三轮逐步放宽：
//! 严格解析 → 补分隔符 → 逐个抽取扁平对象。

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::models::ErrorItem;
use crate::utils::truncate_text;

fn missing_delimiter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\}\s*,?\s*\{").expect("静态正则"))
}

fn flat_object() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[^{}]*\}").expect("静态正则"))
}

fn code_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^```[A-Za-z0-9_-]*\s*\n?(.*?)\n?\s*```$").expect("静态正则"))
}

/// 把模型返回的文本规整为错误列表
///
/// # 返回
/// 能恢复出的条目（可能为空列表）；完全找不到 JSON 对象时返回 `ParseError::NoJsonObjects`
pub fn normalize_errors(text: &str) -> Result<Vec<ErrorItem>, ParseError> {
    let text = strip_code_fence(text.trim());

    // 第一轮：原样解析
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        if let Some(items) = items_from_value(&value) {
            debug!("响应是合法 JSON，得到 {} 条", items.len());
            return Ok(items);
        }
    }

    // 第二轮：补上对象之间缺失的逗号并包一层数组
    let repaired = format!("[{}]", missing_delimiter().replace_all(text, "}, {"));
    if let Ok(Value::Array(values)) = serde_json::from_str::<Value>(&repaired) {
        let items = actionable_items(&values);
        if !items.is_empty() || values.is_empty() {
            debug!("补全分隔符后解析成功，得到 {} 条", items.len());
            return Ok(items);
        }
    }

    // 第三轮：逐个抽取扁平对象，丢弃坏的
    let mut items = Vec::new();
    let mut seen_any = false;
    for candidate in flat_object().find_iter(text) {
        seen_any = true;
        match serde_json::from_str::<Value>(candidate.as_str()) {
            Ok(value) => {
                if let Some(item) = ErrorItem::from_value(&value).filter(ErrorItem::is_actionable) {
                    items.push(item);
                }
            }
            Err(e) => {
                warn!(
                    "丢弃无法解析的 JSON 对象: {} ({})",
                    truncate_text(candidate.as_str(), 80),
                    e
                );
            }
        }
    }

    if !seen_any || items.is_empty() {
        warn!("无法从响应中提取 JSON 对象: {}", truncate_text(text, 120));
        return Err(ParseError::NoJsonObjects);
    }

    debug!("逐个抽取得到 {} 条", items.len());
    Ok(items)
}

/// 严格解析结果转条目列表
///
/// - 数组：逐个转换
/// - 带可识别字段的对象：单个条目
/// - 其他对象：取第一个数组字段当作包装（`{"errors": []}` 即没有错误），
///   没有数组字段时视为没有错误
fn items_from_value(value: &Value) -> Option<Vec<ErrorItem>> {
    match value {
        Value::Array(values) => Some(actionable_items(values)),
        Value::Object(map) if ErrorItem::has_known_field(map) => {
            let item = ErrorItem::from_map(map);
            Some(if item.is_actionable() { vec![item] } else { Vec::new() })
        }
        Value::Object(map) => {
            let wrapped = map.values().find_map(Value::as_array);
            if wrapped.is_none() {
                debug!("响应对象中没有错误字段，按无错误处理");
            }
            Some(wrapped.map(|values| actionable_items(values)).unwrap_or_default())
        }
        _ => None,
    }
}

/// 只保留能在文本中定位的条目
fn actionable_items(values: &[Value]) -> Vec<ErrorItem> {
    values
        .iter()
        .filter_map(ErrorItem::from_value)
        .filter(ErrorItem::is_actionable)
        .collect()
}

fn strip_code_fence(text: &str) -> &str {
    code_fence()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or(text)
}

/// 从上游原始响应中取出生成文本
///
/// 支持两种结构：
/// - 文本生成接口：`results[0].generated_text`
/// - 聊天接口：`choices[0].message.content`
pub fn extract_generated_text(payload: &Value) -> Option<String> {
    payload
        .pointer("/results/0/generated_text")
        .or_else(|| payload.pointer("/choices/0/message/content"))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const WELL_FORMED: &str = r#"[
        {"الكلمة_الخاطئة": "ذهبو", "نوع_الخطأ": "إملائي", "تصحيح_الكلمة": "ذهبوا"},
        {"الكلمة_الخاطئة": "مدرسه", "نوع_الخطأ": "إملائي", "تصحيح_الكلمة": "مدرسة"}
    ]"#;

    #[test]
    fn test_missing_commas_recover_same_list() {
        let malformed = r#"{"الكلمة_الخاطئة": "ذهبو", "نوع_الخطأ": "إملائي", "تصحيح_الكلمة": "ذهبوا"}
{"الكلمة_الخاطئة": "مدرسه", "نوع_الخطأ": "إملائي", "تصحيح_الكلمة": "مدرسة"}"#;
        assert_eq!(
            normalize_errors(malformed).unwrap(),
            normalize_errors(WELL_FORMED).unwrap()
        );
    }

    #[test]
    fn test_objects_with_commas_but_no_brackets() {
        let text = r#"{"خطأ": "أ", "تصحيح الكلمة": "ب"}, {"خطأ": "ج", "تصحيح الكلمة": "د"}"#;
        let items = normalize_errors(text).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].word(), "ج");
        assert_eq!(items[1].correction(), "د");
    }

    #[test]
    fn test_code_fence_is_stripped() {
        let fenced = format!("```json\n{}\n```", WELL_FORMED);
        assert_eq!(normalize_errors(&fenced).unwrap().len(), 2);
    }

    #[test]
    fn test_prose_around_objects_keeps_valid_ones() {
        let text = r#"إليك الأخطاء:
{"خطأ": "ذهبو", "تصحيح الكلمة": "ذهبوا"}
و هذا كائن تالف {"خطأ": "x" "تصحيح الكلمة"}
{"خطأ": "مدرسه", "تصحيح الكلمة": "مدرسة"}"#;
        let items = normalize_errors(text).unwrap();
        let words: Vec<&str> = items.iter().map(ErrorItem::word).collect();
        assert_eq!(words, vec!["ذهبو", "مدرسه"]);
    }

    #[test]
    fn test_no_objects_fails() {
        assert!(matches!(
            normalize_errors("لا توجد أخطاء في النص"),
            Err(ParseError::NoJsonObjects)
        ));
        assert!(matches!(
            normalize_errors("{not json}"),
            Err(ParseError::NoJsonObjects)
        ));
    }

    #[test]
    fn test_empty_array_is_valid() {
        assert!(normalize_errors("[]").unwrap().is_empty());
    }

    #[test]
    fn test_single_object_and_wrapped_list() {
        let single = normalize_errors(r#"{"خطأ": "أ", "نوع الخطأ": "نحوي", "تصحيح الكلمة": "ب"}"#).unwrap();
        assert_eq!(single, vec![ErrorItem::new("أ", "نحوي", "ب")]);

        let wrapped = normalize_errors(&format!(r#"{{"errors": {}}}"#, WELL_FORMED)).unwrap();
        assert_eq!(wrapped.len(), 2);
    }

    #[test]
    fn test_wrapped_empty_list_means_no_errors() {
        assert!(normalize_errors(r#"{"errors": []}"#).unwrap().is_empty());
        assert!(normalize_errors("```json\n{\"الأخطاء\": []}\n```").unwrap().is_empty());
    }

    #[test]
    fn test_object_without_known_fields_yields_nothing() {
        assert!(normalize_errors(r#"{"result": "لا توجد أخطاء"}"#).unwrap().is_empty());
    }

    #[test]
    fn test_items_without_word_are_dropped() {
        let text = r#"[{"خطأ": "", "تصحيح الكلمة": "ب"}, {"نوع الخطأ": "نحوي"}, {"خطأ": "أ", "تصحيح الكلمة": "ب"}]"#;
        let items = normalize_errors(text).unwrap();
        assert_eq!(items, vec![ErrorItem::new("أ", "", "ب")]);

        let single = normalize_errors(r#"{"نوع الخطأ": "نحوي"}"#).unwrap();
        assert!(single.is_empty());
    }

    #[test]
    fn test_extract_generated_text_both_shapes() {
        let watson = json!({"results": [{"generated_text": " 1. أ\n2. ب "}]});
        let chat = json!({"choices": [{"message": {"role": "assistant", "content": "نص"}}]});
        assert_eq!(extract_generated_text(&watson).as_deref(), Some("1. أ\n2. ب"));
        assert_eq!(extract_generated_text(&chat).as_deref(), Some("نص"));
        assert_eq!(extract_generated_text(&json!({"results": []})), None);
    }
}

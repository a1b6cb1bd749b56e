//! 错误条目
//!
//! 上游模型返回的 JSON 键名并不稳定（有空格、下划线、不同措辞），
//! 这里按别名表统一成三个字段。

use phf::phf_map;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Word,
    Kind,
    Correction,
}

/// 别名 -> (字段, 优先级)，同一字段出现多个别名时优先级小的胜出
static FIELD_ALIASES: phf::Map<&'static str, (Field, u8)> = phf_map! {
    "خطأ" => (Field::Word, 0),
    "الكلمة_الخاطئة" => (Field::Word, 1),
    "الكلمة الخاطئة" => (Field::Word, 2),
    "error" => (Field::Word, 3),
    "word" => (Field::Word, 4),
    "نوع_الخطأ" => (Field::Kind, 0),
    "نوع الخطأ" => (Field::Kind, 1),
    "type" => (Field::Kind, 2),
    "error_type" => (Field::Kind, 3),
    "تصحيح_الكلمة" => (Field::Correction, 0),
    "تصحيح الكلمة" => (Field::Correction, 1),
    "correction" => (Field::Correction, 2),
    "suggestion" => (Field::Correction, 3),
};

/// 一条语法/拼写错误
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ErrorItem {
    #[serde(rename = "الكلمة_الخاطئة")]
    word: String,
    #[serde(rename = "نوع_الخطأ")]
    kind: String,
    #[serde(rename = "تصحيح_الكلمة")]
    correction: String,
}

impl ErrorItem {
    pub fn new(
        word: impl Into<String>,
        kind: impl Into<String>,
        correction: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into(),
            kind: kind.into(),
            correction: correction.into(),
        }
    }

    /// 从任意 JSON 值构造，只有对象才会得到条目
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().map(Self::from_map)
    }

    /// 对象里是否至少有一个可识别的字段名
    pub fn has_known_field(map: &Map<String, Value>) -> bool {
        map.keys().any(|key| FIELD_ALIASES.contains_key(key.trim()))
    }

    /// 按别名表读取字段，缺失的字段为空字符串
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let mut best: [Option<(u8, String)>; 3] = [None, None, None];

        for (key, value) in map {
            let Some(&(field, priority)) = FIELD_ALIASES.get(key.trim()) else {
                continue;
            };
            let Some(text) = scalar_to_string(value) else {
                continue;
            };
            // 空字符串等同于缺失，交给下一个别名
            if text.is_empty() {
                continue;
            }
            let slot = &mut best[field as usize];
            if slot.as_ref().map_or(true, |(p, _)| priority < *p) {
                *slot = Some((priority, text));
            }
        }

        let [word, kind, correction] = best.map(|slot| slot.map(|(_, text)| text).unwrap_or_default());
        Self {
            word,
            kind,
            correction,
        }
    }

    /// 错误词
    pub fn word(&self) -> &str {
        &self.word
    }

    /// 错误类型
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// 建议的修正
    pub fn correction(&self) -> &str {
        &self.correction
    }

    /// 错误词为空的条目无法在文本中定位
    pub fn is_actionable(&self) -> bool {
        !self.word.trim().is_empty()
    }

    pub fn to_correction(&self) -> Correction {
        Correction::new(self.word.clone(), self.correction.clone())
    }
}

impl<'de> Deserialize<'de> for ErrorItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        ErrorItem::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom("error item must be a JSON object"))
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// 一次替换：把错误词换成修正
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    #[serde(rename = "errorWord", alias = "error_word")]
    pub error_word: String,
    pub correction: String,
}

impl Correction {
    pub fn new(error_word: impl Into<String>, correction: impl Into<String>) -> Self {
        Self {
            error_word: error_word.into(),
            correction: correction.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_spaced_alias_keys() {
        let item = ErrorItem::from_value(&json!({
            "خطأ": "ذهبو",
            "نوع الخطأ": "إملائي",
            "تصحيح الكلمة": "ذهبوا"
        }))
        .unwrap();
        assert_eq!(item.word(), "ذهبو");
        assert_eq!(item.kind(), "إملائي");
        assert_eq!(item.correction(), "ذهبوا");
    }

    #[test]
    fn test_underscore_key_spelling() {
        let item: ErrorItem = serde_json::from_value(json!({
            "الكلمة_الخاطئة": "مدرسه",
            "نوع_الخطأ": "إملائي",
            "تصحيح_الكلمة": "مدرسة"
        }))
        .unwrap();
        assert_eq!(item, ErrorItem::new("مدرسه", "إملائي", "مدرسة"));
    }

    #[test]
    fn test_alias_priority_and_empty_fallthrough() {
        let item = ErrorItem::from_value(&json!({
            "الكلمة الخاطئة": "ثالث",
            "الكلمة_الخاطئة": "ثاني",
            "خطأ": ""
        }))
        .unwrap();
        // "خطأ" 为空，退到下一个别名
        assert_eq!(item.word(), "ثاني");
        assert_eq!(item.kind(), "");
        assert!(item.is_actionable());
    }

    #[test]
    fn test_non_object_and_non_scalar_values() {
        assert!(ErrorItem::from_value(&json!(["خطأ"])).is_none());

        let item = ErrorItem::from_value(&json!({ "خطأ": { "x": 1 }, "نوع_الخطأ": 3 })).unwrap();
        assert_eq!(item.word(), "");
        assert_eq!(item.kind(), "3");
        assert!(!item.is_actionable());
    }

    #[test]
    fn test_serializes_canonical_keys() {
        let value = serde_json::to_value(ErrorItem::new("أ", "ب", "ج")).unwrap();
        assert_eq!(value["الكلمة_الخاطئة"], "أ");
        assert_eq!(value["نوع_الخطأ"], "ب");
        assert_eq!(value["تصحيح_الكلمة"], "ج");
    }

    #[test]
    fn test_correction_accepts_both_key_styles() {
        let a: Correction = serde_json::from_value(json!({"errorWord": "x", "correction": "y"})).unwrap();
        let b: Correction = serde_json::from_value(json!({"error_word": "x", "correction": "y"})).unwrap();
        assert_eq!(a, b);
        assert_eq!(ErrorItem::new("x", "t", "y").to_correction(), a);
    }
}

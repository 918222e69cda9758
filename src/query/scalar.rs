//! Scalar result normalization

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

/// 单值查询结果
///
/// 区分"确实为 0"、"没有值"和"值不是数字"三种情况。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ScalarOutcome {
    Value(i64),
    /// 没有返回行，或第一列为 NULL
    Empty,
    /// 返回了无法解释为数字的值（原文）
    Unparseable(String),
}

impl ScalarOutcome {
    /// Empty 与 Unparseable 都归一化为 0
    pub fn value_or_zero(&self) -> i64 {
        match self {
            ScalarOutcome::Value(v) => *v,
            ScalarOutcome::Empty | ScalarOutcome::Unparseable(_) => 0,
        }
    }
}

/// 浮点数向零截断，越界时饱和
pub fn truncate_f64(value: f64) -> Option<i64> {
    if value.is_nan() {
        return None;
    }
    // `as` 对越界值饱和，对无穷大取 i64::MIN/MAX
    Some(value.trunc() as i64)
}

/// 定点数向零截断；超出 i64 时饱和
pub fn truncate_decimal(value: Decimal) -> i64 {
    let truncated = value.trunc();
    truncated.to_i64().unwrap_or(if truncated.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// 解析文本形式的数字（整数、定点数或科学计数法）
pub fn parse_numeric_text(text: &str) -> Option<i64> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    if let Ok(d) = s.parse::<Decimal>() {
        return Some(truncate_decimal(d));
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() => truncate_f64(f),
        _ => None,
    }
}

/// 文本值归类
pub fn classify_text(text: String) -> ScalarOutcome {
    match parse_numeric_text(&text) {
        Some(v) => ScalarOutcome::Value(v),
        None => ScalarOutcome::Unparseable(text),
    }
}

use serde::Serialize;

/// Значение поля заголовка для табличного/JSON вывода.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    UInt(u64),
    Float(f64),
    Bool(bool),
}

/// Упорядоченный дамп полей заголовка: `(имя, значение)` в порядке на диске.
pub type FieldMap = Vec<(&'static str, FieldValue)>;

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::UInt(v as u64)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::UInt(v)
    }
}

impl From<u8> for FieldValue {
    fn from(v: u8) -> Self {
        FieldValue::UInt(v as u64)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float(v as f64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            FieldValue::UInt(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v:.3}"),
            FieldValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::from(56_000u32).to_string(), "56000");
        assert_eq!(FieldValue::from(0.5f32).to_string(), "0.500");
        assert_eq!(FieldValue::from(true).to_string(), "true");
    }

    #[test]
    fn test_serialize_untagged() {
        let json = serde_json::to_string(&FieldValue::from(633u32)).unwrap();
        assert_eq!(json, "633");

        let json = serde_json::to_string(&FieldValue::from(false)).unwrap();
        assert_eq!(json, "false");
    }
}

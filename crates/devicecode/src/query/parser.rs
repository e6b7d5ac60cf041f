//! Statement parsing: `name[?k:v;...]=value`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{DeviceCodeError, Result};

use super::field::{FilterField, FilterValue};

/// One statement after validation. A year range produces several values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub field: FilterField,
    pub values: Vec<FilterValue>,
    /// Side table; the last value given for a key wins.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub params: IndexMap<String, String>,
}

/// Parse one lowercased token.
pub fn parse_statement(token: &str) -> Result<Statement> {
    let Some((name_params, value)) = token.split_once('=') else {
        return Err(DeviceCodeError::query(token, "expected name=value"));
    };

    let (name, params) = match name_params.split_once('?') {
        Some((name, params)) => (name, Some(params)),
        None => (name_params, None),
    };
    let field: FilterField = name
        .parse()
        .map_err(|e: String| DeviceCodeError::query(token, e))?;

    let params = match params {
        Some(raw) => parse_params(token, field, raw)?,
        None => IndexMap::new(),
    };
    let values = field
        .parse_value(value)
        .map_err(|e| DeviceCodeError::query(token, e))?;

    Ok(Statement {
        field,
        values,
        params,
    })
}

fn parse_params(token: &str, field: FilterField, raw: &str) -> Result<IndexMap<String, String>> {
    let mut params = IndexMap::new();
    for pair in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((key, value)) = pair.split_once(':') else {
            return Err(DeviceCodeError::query(
                token,
                format!("parameter '{}' is not key:value", pair),
            ));
        };
        let key = key.trim();
        if !field.params().contains(&key) {
            return Err(DeviceCodeError::query(
                token,
                format!("'{}' takes no parameter '{}'", field, key),
            ));
        }
        params.insert(key.to_string(), value.trim().to_string());
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Tristate;

    #[test]
    fn test_parse_simple_statement() {
        let stmt = parse_statement("brand=asus").unwrap();
        assert_eq!(stmt.field, FilterField::Brand);
        assert_eq!(stmt.values, vec![FilterValue::Text("asus".to_string())]);
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_parameter_last_value_wins() {
        let stmt = parse_statement("jtag?populated:yes;populated:no=yes").unwrap();
        assert_eq!(stmt.values, vec![FilterValue::Presence(Tristate::Yes)]);
        assert_eq!(stmt.params.len(), 1);
        assert_eq!(stmt.params.get("populated").map(String::as_str), Some("no"));
    }

    #[test]
    fn test_value_may_contain_equals() {
        let stmt = parse_statement("package=a=b").unwrap();
        assert_eq!(stmt.values, vec![FilterValue::Text("a=b".to_string())]);
    }

    #[test]
    fn test_parse_errors_name_the_token() {
        for bad in ["brand", "vendor=asus", "brand?version:1=asus", "serial?populated=yes", "baud=fast"] {
            match parse_statement(bad) {
                Err(DeviceCodeError::Query { token, .. }) => assert_eq!(token, bad),
                other => panic!("expected query error for {}, got {:?}", bad, other),
            }
        }
    }
}

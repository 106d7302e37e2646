use serde_json::{Map, Value};
use crate::error::{InventoryError, Result};

/// A machine record exactly as the API returned it. No schema is imposed;
/// field order is preserved.
pub type Machine = Map<String, Value>;

/// Field used as the inventory host name
pub const NAME_FIELD: &str = "Name";

/// Prefix for host variables copied from record fields
pub const VARIABLE_PREFIX: &str = "rackn_";

const EXCERPT_LIMIT: usize = 200;

pub fn prefixed_variable(field: &str) -> String {
    format!("{}{}", VARIABLE_PREFIX, field)
}

/// The host key of a record. Missing, non-string and empty names are rejected.
pub fn machine_name(machine: &Machine) -> std::result::Result<String, String> {
    match machine.get(NAME_FIELD) {
        None => Err(format!("record has no '{}' field", NAME_FIELD)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(format!("record has an empty '{}'", NAME_FIELD)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(format!("record '{}' is not a string: {}", NAME_FIELD, other)),
    }
}

/// Decode a response body that must be a JSON array of objects.
pub fn decode_machines(body: &str) -> Result<Vec<Machine>> {
    let value: Value = serde_json::from_str(body).map_err(
        |e| InventoryError::Decode(format!("response is not JSON ({}): {}", e, excerpt(body)))
    )?;
    let items = match value {
        Value::Array(items) => items,
        other => return Err(InventoryError::Decode(format!(
            "expected a JSON array of machines, got: {}", excerpt(&other.to_string())
        ))),
    };
    let mut machines = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(map) => machines.push(map),
            other => return Err(InventoryError::Decode(format!(
                "machine {} is not a JSON object: {}", index, excerpt(&other.to_string())
            ))),
        }
    }
    Ok(machines)
}

/// First part of a body for error messages, on a char boundary.
pub fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(EXCERPT_LIMIT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn machine(value: Value) -> Machine {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_machine_name() {
        assert_eq!(machine_name(&machine(json!({"Name": "d00-11"}))).unwrap(), "d00-11");
        assert!(machine_name(&machine(json!({"Uuid": "x"}))).unwrap_err().contains("no 'Name'"));
        assert!(machine_name(&machine(json!({"Name": ""}))).unwrap_err().contains("empty"));
        assert!(machine_name(&machine(json!({"Name": 7}))).unwrap_err().contains("not a string"));
    }

    #[test]
    fn test_decode_array_of_objects_keeps_order() {
        let machines = decode_machines(r#"[{"Name":"b","Stage":"boot","Address":"10.0.0.2"},{"Name":"a"}]"#).unwrap();
        assert_eq!(machines.len(), 2);
        let keys: Vec<&String> = machines[0].keys().collect();
        assert_eq!(keys, vec!["Name", "Stage", "Address"]);
    }

    #[test]
    fn test_decode_empty_array() {
        assert!(decode_machines("[]").unwrap().is_empty());
    }

    #[test]
    fn test_decode_html_is_error() {
        let err = decode_machines("<html><body>502 Bad Gateway</body></html>").unwrap_err();
        assert!(matches!(err, InventoryError::Decode(_)));
        assert!(err.to_string().contains("502 Bad Gateway"));
    }

    #[test]
    fn test_decode_object_is_error() {
        let err = decode_machines(r#"{"Error":"nope"}"#).unwrap_err();
        assert!(err.to_string().contains("expected a JSON array"));
    }

    #[test]
    fn test_decode_non_object_item_is_error() {
        let err = decode_machines(r#"[{"Name":"a"}, "b"]"#).unwrap_err();
        assert!(err.to_string().contains("machine 1"));
    }

    #[test]
    fn test_excerpt_truncates() {
        let long = "x".repeat(500);
        let short = excerpt(&long);
        assert_eq!(short.len(), EXCERPT_LIMIT + 3);
        assert!(short.ends_with("..."));
    }
}

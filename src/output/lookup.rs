use serde_json::{Map, Value};

/// Render a scalar as text. Integral numbers print without a fraction;
/// arrays of scalars are joined with `", "`. Objects and null have no text.
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                        (f as i64).to_string()
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Option<Vec<String>> = items
                .iter()
                .map(|item| match item {
                    Value::Array(_) | Value::Object(_) => None,
                    other => value_as_text(other),
                })
                .collect();
            parts.filter(|p| !p.is_empty()).map(|p| p.join(", "))
        }
        Value::Null | Value::Object(_) => None,
    }
}

/// Interpret a value as a flag. Strings accept `true/yes/1` and
/// `false/no/0` in any case; numbers are true when non-zero.
pub fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Case-insensitive lookup over an ordered list of candidate field names.
pub trait FieldLookup {
    /// Values for each candidate key that is present, in candidate order.
    fn candidates<'a>(&'a self, keys: &[&str]) -> Vec<&'a Value>;

    fn first_value(&self, keys: &[&str]) -> Option<&Value> {
        self.candidates(keys).into_iter().next()
    }

    /// First present candidate that renders as text.
    fn first_string(&self, keys: &[&str]) -> Option<String> {
        self.candidates(keys).into_iter().find_map(value_as_text)
    }

    /// First present candidate that reads as a flag.
    fn first_bool(&self, keys: &[&str]) -> Option<bool> {
        self.candidates(keys).into_iter().find_map(value_as_bool)
    }
}

impl FieldLookup for Map<String, Value> {
    fn candidates<'a>(&'a self, keys: &[&str]) -> Vec<&'a Value> {
        keys.iter()
            .filter_map(|wanted| {
                self.get(*wanted).or_else(|| {
                    self.iter()
                        .find(|(actual, _)| actual.to_lowercase() == wanted.to_lowercase())
                        .map(|(_, v)| v)
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn keys_match_case_insensitively() {
        let m = map(json!({"ContainerID": "abc", "NAME": "web"}));
        assert_eq!(m.first_string(&["id", "containerid"]).as_deref(), Some("abc"));
        assert_eq!(m.first_string(&["name"]).as_deref(), Some("web"));
    }

    #[test]
    fn candidate_order_wins_over_map_order() {
        let m = map(json!({"a": "first-in-map", "z": "preferred"}));
        assert_eq!(m.first_string(&["z", "a"]).as_deref(), Some("preferred"));
    }

    #[test]
    fn integral_numbers_render_without_fraction() {
        let m = map(json!({"b": 123, "f": 2.0, "g": 2.5, "neg": -4}));
        assert_eq!(m.first_string(&["b"]).as_deref(), Some("123"));
        assert_eq!(m.first_string(&["f"]).as_deref(), Some("2"));
        assert_eq!(m.first_string(&["g"]).as_deref(), Some("2.5"));
        assert_eq!(m.first_string(&["neg"]).as_deref(), Some("-4"));
    }

    #[test]
    fn null_and_objects_are_skipped_for_text() {
        let m = map(json!({"id": null, "uuid": "u-1", "nested": {"x": 1}}));
        assert_eq!(m.first_string(&["nested", "id", "uuid"]).as_deref(), Some("u-1"));
        assert!(m.first_value(&["id"]).is_some());
    }

    #[test]
    fn scalar_arrays_are_joined() {
        let m = map(json!({"Names": ["web", "frontend"], "Mixed": [1, {"a": 1}]}));
        assert_eq!(m.first_string(&["names"]).as_deref(), Some("web, frontend"));
        assert_eq!(m.first_string(&["mixed"]), None);
    }

    #[test]
    fn bools_accept_strings_and_numbers() {
        let m = map(json!({"a": "Yes", "b": "0", "c": 1, "d": false, "e": "maybe"}));
        assert_eq!(m.first_bool(&["a"]), Some(true));
        assert_eq!(m.first_bool(&["b"]), Some(false));
        assert_eq!(m.first_bool(&["c"]), Some(true));
        assert_eq!(m.first_bool(&["d"]), Some(false));
        assert_eq!(m.first_bool(&["e"]), None);
    }

    #[test]
    fn missing_keys_yield_none() {
        let m = map(json!({"a": 1}));
        assert_eq!(m.first_string(&["b", "c"]), None);
        assert_eq!(m.first_bool(&[]), None);
    }
}

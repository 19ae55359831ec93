//! Null-safe navigation over nested API JSON.
//!
//! All record extraction goes through `lookup`: a missing key, a `null`, or a
//! non-object anywhere along the path ends the walk with `None`.

use serde_json::Value;

/// Follow `path` through nested objects.
pub fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = root;
    for key in path {
        current = current.as_object()?.get(*key)?;
    }
    if current.is_null() { None } else { Some(current) }
}

pub fn lookup_str(root: &Value, path: &[&str]) -> Option<String> {
    lookup(root, path)?.as_str().map(str::to_owned)
}

pub fn lookup_f64(root: &Value, path: &[&str]) -> Option<f64> {
    lookup(root, path)?.as_f64()
}

pub fn lookup_u64(root: &Value, path: &[&str]) -> Option<u64> {
    lookup(root, path)?.as_u64()
}

/// Integer value, also accepting a numeric string (`"2019"`).
pub fn lookup_i64_lenient(root: &Value, path: &[&str]) -> Option<i64> {
    match lookup(root, path)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn lookup_array<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Vec<Value>> {
    lookup(root, path)?.as_array()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_stops_on_missing_null_or_scalar() {
        let doc = json!({"a": {"b": {"c": 5}, "n": null, "s": "text"}});

        assert_eq!(lookup_u64(&doc, &["a", "b", "c"]), Some(5));
        assert!(lookup(&doc, &["a", "x", "c"]).is_none());
        assert!(lookup(&doc, &["a", "n"]).is_none());
        assert!(lookup(&doc, &["a", "n", "deeper"]).is_none());
        assert!(lookup(&doc, &["a", "s", "deeper"]).is_none());
    }

    #[test]
    fn test_lenient_integer_accepts_numeric_strings_only() {
        let doc = json!({"y1": 2019, "y2": "2020", "y3": "N.V.", "y4": 3.5});
        assert_eq!(lookup_i64_lenient(&doc, &["y1"]), Some(2019));
        assert_eq!(lookup_i64_lenient(&doc, &["y2"]), Some(2020));
        assert_eq!(lookup_i64_lenient(&doc, &["y3"]), None);
        assert_eq!(lookup_i64_lenient(&doc, &["y4"]), None);
    }

    #[test]
    fn test_typed_lookups_reject_wrong_types() {
        let doc = json!({"price": {"amount": "12.0"}, "name": 4});
        assert!(lookup_f64(&doc, &["price", "amount"]).is_none());
        assert!(lookup_str(&doc, &["name"]).is_none());
    }
}

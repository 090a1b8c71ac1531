use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::ConfigError;

/// A dot-separated sequence of object keys, e.g. `user.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// The empty path. Resolves to the document itself.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Split `path` on `.`. Zero-length segments are rejected, so `""`,
    /// `".a"`, `"a."` and `"a..b"` are all errors.
    pub fn parse(path: &str) -> Result<Self, ConfigError> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(ConfigError::EmptyPathSegment {
                path: path.to_string(),
            });
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromStr for FieldPath {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Resolve `path` against `document`.
///
/// Returns `None` when a key is missing or when an intermediate value is
/// not an object. Arrays are not indexed. A present `null` is `Some`.
pub fn extract<'a>(document: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    path.segments
        .iter()
        .try_fold(document, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            _ => None,
        })
}

/// Canonical text form used when comparing a field against an expected
/// value. Strings are unquoted; objects and arrays are compact JSON.
pub fn render(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Bool(true) => Cow::Borrowed("true"),
        Value::Bool(false) => Cow::Borrowed("false"),
        Value::Null => Cow::Borrowed("null"),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Array(_) | Value::Object(_) => Cow::Owned(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn path(s: &str) -> FieldPath {
        FieldPath::parse(s).unwrap()
    }

    #[test]
    fn resolves_top_level_key() {
        let doc = json!({"version": "1.0.0"});
        assert_eq!(extract(&doc, &path("version")), Some(&json!("1.0.0")));
    }

    #[test]
    fn resolves_nested_key() {
        let doc = json!({"user": {"name": "John"}});
        assert_eq!(extract(&doc, &path("user.name")), Some(&json!("John")));
    }

    #[test]
    fn missing_key_is_absent() {
        let doc = json!({"user": {"name": "John"}});
        assert_eq!(extract(&doc, &path("user.missing")), None);
        assert_eq!(extract(&doc, &path("missing")), None);
    }

    #[test]
    fn walking_through_scalar_is_absent() {
        let doc = json!({"user": "John"});
        assert_eq!(extract(&doc, &path("user.name")), None);
    }

    #[test]
    fn arrays_are_not_indexable() {
        let doc = json!({"items": [1, 2, 3]});
        assert_eq!(extract(&doc, &path("items.0")), None);
    }

    #[test]
    fn null_is_present() {
        let doc = json!({"ready": null});
        assert_eq!(extract(&doc, &path("ready")), Some(&Value::Null));
    }

    #[test]
    fn root_path_returns_document() {
        let doc = json!([1, 2]);
        assert_eq!(extract(&doc, &FieldPath::root()), Some(&doc));
    }

    #[test]
    fn keeps_json_type() {
        let doc = json!({"count": 20, "ok": true, "tags": ["a"]});
        assert_eq!(extract(&doc, &path("count")), Some(&json!(20)));
        assert_eq!(extract(&doc, &path("ok")), Some(&json!(true)));
        assert_eq!(extract(&doc, &path("tags")), Some(&json!(["a"])));
    }

    #[test]
    fn parse_rejects_empty_segments() {
        for bad in ["", ".", "a.", ".a", "a..b"] {
            assert!(
                matches!(
                    FieldPath::parse(bad),
                    Err(ConfigError::EmptyPathSegment { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn display_round_trips_dotted_form() {
        assert_eq!(path("a.b.c").to_string(), "a.b.c");
        assert_eq!(path("a.b.c").segments().len(), 3);
    }

    #[test]
    fn render_scalars_naturally() {
        assert_eq!(render(&json!("1.0.0")), "1.0.0");
        assert_eq!(render(&json!(20)), "20");
        assert_eq!(render(&json!(1.5)), "1.5");
        assert_eq!(render(&json!(-3)), "-3");
        assert_eq!(render(&json!(true)), "true");
        assert_eq!(render(&json!(false)), "false");
        assert_eq!(render(&Value::Null), "null");
    }

    #[test]
    fn render_containers_as_compact_json() {
        assert_eq!(render(&json!([1, "a"])), r#"[1,"a"]"#);
        assert_eq!(render(&json!({"k": 1})), r#"{"k":1}"#);
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-z]{0,6}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-c]{1,2}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn extract_never_panics(doc in arb_json(), raw in "[a-c]{1,2}(\\.[a-c]{1,2}){0,3}") {
            let p = FieldPath::parse(&raw).unwrap();
            let _ = extract(&doc, &p);
        }

        #[test]
        fn extract_through_non_object_is_absent(
            doc in arb_json().prop_filter("non-object", |v| !v.is_object()),
            raw in "[a-c]{1,2}(\\.[a-c]{1,2}){0,3}",
        ) {
            let p = FieldPath::parse(&raw).unwrap();
            prop_assert!(extract(&doc, &p).is_none());
        }
    }
}

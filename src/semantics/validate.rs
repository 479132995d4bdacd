//! Validation of candidate parameter objects against a parsed [`Schema`].

use log::warn;
use serde_json::Value;

use super::{Field, FieldKind, Schema};

/// A single failed validation rule, carrying the full dotted path of the
/// offending value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub rule: String,
}

impl Violation {
    fn new(path: &str, rule: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            rule: rule.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.rule)
    }
}

impl Schema {
    /// Validate a candidate parameter object. An empty result means the
    /// value satisfies every rule of the schema.
    pub fn validate(&self, value: &Value) -> Vec<Violation> {
        let mut violations = Vec::new();
        validate_fields(&self.fields, value, "", &mut violations);
        violations
    }
}

fn validate_fields(fields: &[Field], value: &Value, path: &str, out: &mut Vec<Violation>) {
    let object = match value {
        Value::Object(object) => object,
        _ => {
            out.push(Violation::new(
                path,
                format!("expected an object, found {}", type_name(value)),
            ));
            return;
        }
    };

    for field in fields {
        let field_path = join(path, &field.name);
        match object.get(&field.name) {
            Some(Value::Null) | None => {
                if field.required {
                    out.push(Violation::new(&field_path, "required field is missing"));
                }
            }
            Some(child) => validate_field(field, child, &field_path, out),
        }
    }

    // Unknown children are retained for forward compatibility.
    for key in object.keys() {
        if !fields.iter().any(|field| field.name == *key) {
            warn!("unknown field retained at {}", join(path, key));
        }
    }
}

fn validate_field(field: &Field, value: &Value, path: &str, out: &mut Vec<Violation>) {
    match field.kind {
        FieldKind::Text => {
            if !value.is_string() {
                out.push(kind_mismatch(path, "a string", value));
            }
        }
        FieldKind::Number => match value.as_f64() {
            Some(number) => {
                if let Some(min) = field.min {
                    if number < min {
                        out.push(Violation::new(path, format!("value {number} below minimum {min}")));
                    }
                }
                if let Some(max) = field.max {
                    if number > max {
                        out.push(Violation::new(path, format!("value {number} above maximum {max}")));
                    }
                }
            }
            None => out.push(kind_mismatch(path, "a number", value)),
        },
        FieldKind::Boolean => {
            if !value.is_boolean() {
                out.push(kind_mismatch(path, "a boolean", value));
            }
        }
        FieldKind::Select => match value.as_str() {
            Some(choice) => {
                if !field.options.iter().any(|option| option == choice) {
                    out.push(Violation::new(path, format!("'{choice}' is not an allowed option")));
                }
            }
            None => out.push(kind_mismatch(path, "a string", value)),
        },
        FieldKind::Library => validate_library_reference(field, value, path, out),
        FieldKind::Group => validate_fields(&field.fields, value, path, out),
        FieldKind::List => match value.as_array() {
            Some(elements) => {
                if let Some(element_field) = &field.element {
                    for (index, element) in elements.iter().enumerate() {
                        let element_path = format!("{path}[{index}]");
                        validate_field(element_field, element, &element_path, out);
                    }
                }
            }
            None => out.push(kind_mismatch(path, "an array", value)),
        },
        // Media params are objects carrying at least a path; a bare string
        // path is also accepted.
        FieldKind::Image | FieldKind::Audio | FieldKind::Video | FieldKind::File => {
            match value {
                Value::Object(media) => {
                    if !media.contains_key("path") && !media.contains_key("files") {
                        out.push(Violation::new(path, "media object missing 'path'"));
                    }
                }
                Value::String(_) => {}
                Value::Array(sources) => {
                    // Audio/video params are lists of source objects.
                    for (index, element) in sources.iter().enumerate() {
                        if !element.is_object() {
                            out.push(kind_mismatch(
                                &format!("{path}[{index}]"),
                                "a media source object",
                                element,
                            ));
                        }
                    }
                }
                _ => out.push(kind_mismatch(path, "a media object", value)),
            }
        }
    }
}

/// An embedded library instance: `{"library": "H5P.X 1.2", "params": {...}}`.
fn validate_library_reference(field: &Field, value: &Value, path: &str, out: &mut Vec<Violation>) {
    let object = match value.as_object() {
        Some(object) => object,
        None => {
            out.push(kind_mismatch(path, "a library instance object", value));
            return;
        }
    };
    let reference = match object.get("library").and_then(Value::as_str) {
        Some(reference) => reference,
        None => {
            out.push(Violation::new(path, "library instance missing 'library'"));
            return;
        }
    };
    if !is_versioned_name(reference) {
        out.push(Violation::new(
            path,
            format!("'{reference}' is not of the form '<machine-name> <major>.<minor>'"),
        ));
        return;
    }
    if !field.options.is_empty() && !field.options.iter().any(|option| option == reference) {
        out.push(Violation::new(path, format!("library '{reference}' is not an allowed option")));
    }
}

/// Check the `<machine-name> <major>.<minor>` pattern.
fn is_versioned_name(reference: &str) -> bool {
    let Some((name, version)) = reference.rsplit_once(' ') else {
        return false;
    };
    if name.is_empty() {
        return false;
    }
    let Some((major, minor)) = version.split_once('.') else {
        return false;
    };
    !major.is_empty()
        && !minor.is_empty()
        && major.bytes().all(|b| b.is_ascii_digit())
        && minor.bytes().all(|b| b.is_ascii_digit())
}

fn kind_mismatch(path: &str, expected: &str, found: &Value) -> Violation {
    Violation::new(path, format!("expected {expected}, found {}", type_name(found)))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(doc: serde_json::Value) -> Schema {
        Schema::parse(&doc).unwrap()
    }

    #[test]
    fn test_required_field_missing() {
        let schema = schema(json!([{"name": "text", "type": "text"}]));
        let violations = schema.validate(&json!({}));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "text");
        assert!(violations[0].rule.contains("missing"));
    }

    #[test]
    fn test_optional_field_missing_is_fine() {
        let schema = schema(json!([{"name": "tip", "type": "text", "optional": true}]));
        assert!(schema.validate(&json!({})).is_empty());
    }

    #[test]
    fn test_kind_mismatch() {
        let schema = schema(json!([{"name": "count", "type": "number"}]));
        let violations = schema.validate(&json!({"count": "three"}));
        assert_eq!(violations[0].path, "count");
        assert!(violations[0].rule.contains("expected a number"));
    }

    #[test]
    fn test_numeric_bounds_inclusive() {
        let schema = schema(json!([
            {"name": "n", "type": "number", "min": 1, "max": 5}
        ]));
        assert!(schema.validate(&json!({"n": 1})).is_empty());
        assert!(schema.validate(&json!({"n": 5})).is_empty());
        assert_eq!(schema.validate(&json!({"n": 0})).len(), 1);
        assert_eq!(schema.validate(&json!({"n": 6})).len(), 1);
    }

    #[test]
    fn test_select_enforces_full_string() {
        let schema = schema(json!([
            {"name": "mode", "type": "select", "options": ["auto", "manual"]}
        ]));
        assert!(schema.validate(&json!({"mode": "auto"})).is_empty());
        assert_eq!(schema.validate(&json!({"mode": "aut"})).len(), 1);
    }

    #[test]
    fn test_list_elements_validated() {
        let schema = schema(json!([
            {"name": "answers", "type": "list", "field": {"name": "answer", "type": "text"}}
        ]));
        let violations = schema.validate(&json!({"answers": ["ok", 7]}));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "answers[1]");
    }

    #[test]
    fn test_group_path_is_dotted() {
        let schema = schema(json!([
            {"name": "behaviour", "type": "group", "fields": [
                {"name": "enableRetry", "type": "boolean"}
            ]}
        ]));
        let violations = schema.validate(&json!({"behaviour": {"enableRetry": "yes"}}));
        assert_eq!(violations[0].path, "behaviour.enableRetry");
    }

    #[test]
    fn test_unknown_children_retained() {
        let schema = schema(json!([{"name": "text", "type": "text"}]));
        // Unknown fields warn but do not fail validation.
        assert!(schema.validate(&json!({"text": "x", "extra": 1})).is_empty());
    }

    #[test]
    fn test_library_reference_pattern() {
        let schema = schema(json!([
            {"name": "content", "type": "library",
             "options": ["H5P.Image 1.1", "H5P.AdvancedText 1.1"]}
        ]));
        let good = json!({"content": {"library": "H5P.Image 1.1", "params": {}}});
        assert!(schema.validate(&good).is_empty());

        let malformed = json!({"content": {"library": "H5P.Image", "params": {}}});
        assert_eq!(schema.validate(&malformed).len(), 1);

        let disallowed = json!({"content": {"library": "H5P.Video 1.5", "params": {}}});
        let violations = schema.validate(&disallowed);
        assert!(violations[0].rule.contains("not an allowed option"));
    }
}

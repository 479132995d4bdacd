//! Per-library field schemas.
//!
//! Every runnable library ships a schema document (`semantics.json`)
//! describing the parameter tree its fragments must satisfy. This module
//! parses that document into a typed [`Schema`] and validates candidate
//! parameter objects against it.
//!
//! The document is a JSON array of field definitions. The subset consumed
//! here: `name`, `type`, `optional`, `min`/`max`, `options` (select values
//! or library version strings), `fields` (group children), and `field`
//! (list element).

mod validate;

pub use validate::Violation;

use serde_json::Value;

use crate::error::{Error, Result};

/// The kind of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    /// Reference to an embedded library instance, validated as
    /// `<machine-name> <major>.<minor>` against the declared options.
    Library,
    /// Compound object with named children under `fields`.
    Group,
    /// Homogeneous array with the element definition under `field`.
    List,
    Select,
    Image,
    Audio,
    Video,
    File,
}

impl FieldKind {
    fn parse(kind: &str) -> Option<Self> {
        Some(match kind {
            "text" => FieldKind::Text,
            "number" => FieldKind::Number,
            "boolean" => FieldKind::Boolean,
            "library" => FieldKind::Library,
            "group" => FieldKind::Group,
            "list" => FieldKind::List,
            "select" => FieldKind::Select,
            "image" => FieldKind::Image,
            "audio" => FieldKind::Audio,
            "video" => FieldKind::Video,
            "file" => FieldKind::File,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Library => "library",
            FieldKind::Group => "group",
            FieldKind::List => "list",
            FieldKind::Select => "select",
            FieldKind::Image => "image",
            FieldKind::Audio => "audio",
            FieldKind::Video => "video",
            FieldKind::File => "file",
        }
    }
}

/// One field definition in a schema tree.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub label: Option<String>,
    pub kind: FieldKind,
    pub required: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Allowed values for `select` fields, or allowed
    /// `<machine-name> <major>.<minor>` strings for `library` fields.
    pub options: Vec<String>,
    /// Child fields of a `group`.
    pub fields: Vec<Field>,
    /// Element definition of a `list`.
    pub element: Option<Box<Field>>,
}

/// A parsed schema: the rooted tree of field definitions for one library.
#[derive(Debug, Clone)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    /// Parse a schema document (the JSON value of `semantics.json`).
    pub fn parse(document: &Value) -> Result<Schema> {
        let root = document.as_array().ok_or_else(|| {
            schema_error("", "schema document must be an array of field definitions")
        })?;
        let fields = root
            .iter()
            .map(|entry| Field::parse(entry, ""))
            .collect::<Result<Vec<Field>>>()?;
        Ok(Schema { fields })
    }
}

impl Field {
    fn parse(definition: &Value, parent_path: &str) -> Result<Field> {
        let object = definition
            .as_object()
            .ok_or_else(|| schema_error(parent_path, "field definition must be an object"))?;

        let name = object
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| schema_error(parent_path, "field definition missing 'name'"))?
            .to_string();
        let path = join_path(parent_path, &name);

        let kind_name = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| schema_error(&path, "field definition missing 'type'"))?;
        let kind = FieldKind::parse(kind_name)
            .ok_or_else(|| schema_error(&path, &format!("unknown field type '{kind_name}'")))?;

        let mut field = Field {
            name,
            label: object.get("label").and_then(Value::as_str).map(String::from),
            kind,
            // H5P semantics mark fields optional; required is the default.
            required: !object.get("optional").and_then(Value::as_bool).unwrap_or(false),
            min: number_bound(object.get("min")),
            max: number_bound(object.get("max")),
            options: Vec::new(),
            fields: Vec::new(),
            element: None,
        };

        if let Some(options) = object.get("options").and_then(Value::as_array) {
            field.options = options.iter().filter_map(option_value).collect();
        }

        match kind {
            FieldKind::Group => {
                let children = object
                    .get("fields")
                    .and_then(Value::as_array)
                    .ok_or_else(|| schema_error(&path, "group field missing 'fields'"))?;
                field.fields = children
                    .iter()
                    .map(|child| Field::parse(child, &path))
                    .collect::<Result<Vec<Field>>>()?;
            }
            FieldKind::List => {
                let element = object
                    .get("field")
                    .ok_or_else(|| schema_error(&path, "list field missing 'field'"))?;
                field.element = Some(Box::new(Field::parse(element, &path)?));
            }
            _ => {}
        }

        Ok(field)
    }
}

/// Select options are either bare strings or objects carrying a `value`;
/// library options are plain version strings.
fn option_value(option: &Value) -> Option<String> {
    match option {
        Value::String(s) => Some(s.clone()),
        Value::Object(o) => o.get("value").and_then(Value::as_str).map(String::from),
        _ => None,
    }
}

/// Bounds occasionally appear as strings in the wild; accept both.
fn number_bound(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn schema_error(path: &str, rule: &str) -> Error {
    Error::SchemaInvalid {
        path: path.to_string(),
        rule: rule.to_string(),
    }
}

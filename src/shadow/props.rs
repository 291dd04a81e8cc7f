//! Props: the raw JSON bag from the script side and its parsed form.
//!
//! Updates arrive as partial bags. [`RawProps::merged_onto`] applies one to
//! the previous bag key by key (`null` resets a key), and the merged bag is
//! parsed again, so a key that is absent from an update keeps its value.

use serde_json::{Map, Value};
use tracing::warn;

use crate::components::{ParagraphProps, RootProps, ViewProps};
use crate::error::{Error, Result};
use crate::types::SurfaceId;

// =============================================================================
// Raw Props
// =============================================================================

/// String-keyed JSON object supplied on create and clone.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawProps(Map<String, Value>);

impl RawProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON object. Anything else is logged and treated as empty.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            Value::Null => Self::default(),
            other => {
                warn!(kind = json_kind(&other), "raw props are not an object, ignoring");
                Self::default()
            }
        }
    }

    /// Like [`RawProps::from_value`] but rejects non-objects.
    pub fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::InvalidProps(format!(
                "expected an object, got {}",
                json_kind(&other)
            ))),
        }
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Applies this update on top of `base`. A `null` value removes the key.
    pub fn merged_onto(&self, base: &RawProps) -> RawProps {
        let mut merged = base.0.clone();
        for (key, value) in &self.0 {
            if value.is_null() {
                merged.remove(key);
            } else {
                merged.insert(key.clone(), value.clone());
            }
        }
        RawProps(merged)
    }

    pub fn get_f32(&self, key: &str) -> Option<f32> {
        self.get(key).and_then(Value::as_f64).map(|v| v as f32)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }
}

impl From<Value> for RawProps {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Parsed Props
// =============================================================================

/// Context handed to `ComponentDescriptor::clone_props`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropsParserContext {
    pub surface_id: SurfaceId,
    /// Name the node was requested under, set on creation only.
    pub component_name: Option<String>,
}

/// Component-specific part of [`Props`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PropsKind {
    Root(RootProps),
    #[default]
    View,
    Paragraph(ParagraphProps),
    /// Props of a node whose component has no registered descriptor.
    Unimplemented { component_name: String },
}

/// Immutable parsed props. Shared by `Arc` between clones that do not
/// change props.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Props {
    pub raw: RawProps,
    pub view: ViewProps,
    pub kind: PropsKind,
}

impl Props {
    /// Merges `raw` onto the bag of `source` (or onto nothing).
    pub fn merge_raw(source: Option<&Props>, raw: &RawProps) -> RawProps {
        match source {
            Some(source) => raw.merged_onto(&source.raw),
            None => raw.clone(),
        }
    }

    pub fn root_props(&self) -> Option<&RootProps> {
        match &self.kind {
            PropsKind::Root(root) => Some(root),
            _ => None,
        }
    }

    pub fn paragraph_props(&self) -> Option<&ParagraphProps> {
        match &self.kind {
            PropsKind::Paragraph(paragraph) => Some(paragraph),
            _ => None,
        }
    }

    /// Original component name for fallback nodes.
    pub fn unimplemented_component_name(&self) -> Option<&str> {
        match &self.kind {
            PropsKind::Unimplemented { component_name } => Some(component_name),
            _ => None,
        }
    }
}

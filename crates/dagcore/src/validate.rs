use crate::{Args, NodeDef, ValidationError, Value};
use serde::{Deserialize, Serialize};

/// Declared type of a parameter or return value.
///
/// `Any` accepts every value; the other tags match exactly one [`Value`]
/// variant, with `Float` also accepting integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeTag {
    Any,
    Null,
    Bool,
    Int,
    Float,
    String,
    Bytes,
    Json,
    Array,
    Object,
}

impl TypeTag {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            TypeTag::Any => true,
            TypeTag::Null => matches!(value, Value::Null),
            TypeTag::Bool => matches!(value, Value::Bool(_)),
            TypeTag::Int => matches!(value, Value::Int(_)),
            TypeTag::Float => matches!(value, Value::Float(_) | Value::Int(_)),
            TypeTag::String => matches!(value, Value::String(_)),
            TypeTag::Bytes => matches!(value, Value::Bytes(_)),
            TypeTag::Json => matches!(value, Value::Json(_)),
            TypeTag::Array => matches!(value, Value::Array(_)),
            TypeTag::Object => matches!(value, Value::Object(_)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Any => "Any",
            TypeTag::Null => "Null",
            TypeTag::Bool => "Bool",
            TypeTag::Int => "Int",
            TypeTag::Float => "Float",
            TypeTag::String => "String",
            TypeTag::Bytes => "Bytes",
            TypeTag::Json => "Json",
            TypeTag::Array => "Array",
            TypeTag::Object => "Object",
        }
    }
}

/// Check every present argument against the node's declared parameter
/// types. Absent optional parameters are not an error here; required
/// presence is enforced by the runner before this gate.
pub fn validate_inputs(node: &NodeDef, args: &Args) -> Result<(), ValidationError> {
    for param in node.params() {
        if let Some(value) = args.get(&param.name) {
            if !param.ty.matches(value) {
                return Err(ValidationError::Input {
                    node: node.name().to_string(),
                    param: param.name.clone(),
                    expected: param.ty.name(),
                    actual: value.type_name(),
                });
            }
        }
    }
    Ok(())
}

/// Check a node's return value against its declared return type.
pub fn validate_output(node: &NodeDef, value: &Value) -> Result<(), ValidationError> {
    let declared = node.returns();
    if !declared.matches(value) {
        return Err(ValidationError::Output {
            node: node.name().to_string(),
            expected: declared.name(),
            actual: value.type_name(),
        });
    }
    Ok(())
}

//! Typed operation arguments built from textual request parameters.
//!
//! Type names are matched case-insensitively. A name starting with a
//! lowercase letter (`int`) declares a primitive, which falls back to its zero
//! value when no value or default is given; a capitalised name (`Integer`)
//! declares a boxed type, which falls back to null.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::inventory::OperationParam;

/// The closed set of supported parameter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Text.
    String,
    /// 32-bit integer.
    Int,
    /// Boolean.
    Bool,
    /// 64-bit integer.
    Long,
    /// 64-bit float.
    Double,
    /// 32-bit float.
    Float,
    /// 16-bit integer.
    Short,
    /// Single character.
    Char,
    /// 8-bit integer.
    Byte,
}

impl ParamType {
    /// Maps a declared type name to a type.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        let kind = match lower.as_str() {
            "string" => Self::String,
            "int" | "integer" => Self::Int,
            "bool" | "boolean" => Self::Bool,
            "long" => Self::Long,
            "double" => Self::Double,
            "float" => Self::Float,
            "short" => Self::Short,
            "char" | "character" => Self::Char,
            "byte" => Self::Byte,
            _ => return None,
        };
        Some(kind)
    }
}

/// A parameter type together with its primitive-or-boxed flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclaredType {
    kind: ParamType,
    primitive: bool,
}

impl DeclaredType {
    /// Interprets a declared type name; `None` means string.
    pub fn parse(name: Option<&str>) -> Result<Self, ParamError> {
        let Some(declared) = name.filter(|text| !text.is_empty()) else {
            return Ok(Self::string());
        };
        let kind = ParamType::from_name(declared).ok_or_else(|| ParamError::UnsupportedType {
            declared: declared.to_owned(),
        })?;
        if kind == ParamType::String {
            return Ok(Self::string());
        }
        let primitive = declared.chars().next().is_some_and(char::is_lowercase);
        Ok(Self { kind, primitive })
    }

    const fn string() -> Self {
        Self {
            kind: ParamType::String,
            primitive: false,
        }
    }

    /// The underlying type.
    #[must_use]
    pub const fn kind(self) -> ParamType {
        self.kind
    }

    /// Whether the type is a primitive with a zero value.
    #[must_use]
    pub const fn is_primitive(self) -> bool {
        self.primitive
    }

    /// Java type name used in MBean invocation signatures.
    #[must_use]
    pub const fn signature(self) -> &'static str {
        match (self.kind, self.primitive) {
            (ParamType::String, _) => "java.lang.String",
            (ParamType::Int, true) => "int",
            (ParamType::Int, false) => "java.lang.Integer",
            (ParamType::Bool, true) => "boolean",
            (ParamType::Bool, false) => "java.lang.Boolean",
            (ParamType::Long, true) => "long",
            (ParamType::Long, false) => "java.lang.Long",
            (ParamType::Double, true) => "double",
            (ParamType::Double, false) => "java.lang.Double",
            (ParamType::Float, true) => "float",
            (ParamType::Float, false) => "java.lang.Float",
            (ParamType::Short, true) => "short",
            (ParamType::Short, false) => "java.lang.Short",
            (ParamType::Char, true) => "char",
            (ParamType::Char, false) => "java.lang.Character",
            (ParamType::Byte, true) => "byte",
            (ParamType::Byte, false) => "java.lang.Byte",
        }
    }

    /// Converts `text` to a value of this type.
    ///
    /// Missing text yields the zero value for primitives and null otherwise.
    /// Booleans follow the lenient rule that anything but `true` is false.
    pub fn coerce(self, name: &str, text: Option<&str>) -> Result<ParamValue, ParamError> {
        let Some(raw) = text else {
            return Ok(self.missing());
        };
        let invalid = || ParamError::InvalidValue {
            name: name.to_owned(),
            value: raw.to_owned(),
            declared: self.signature(),
        };
        let value = match self.kind {
            ParamType::String => ParamValue::String(raw.to_owned()),
            ParamType::Int => ParamValue::Int(raw.trim().parse().map_err(|_| invalid())?),
            ParamType::Bool => ParamValue::Bool(raw.trim().eq_ignore_ascii_case("true")),
            ParamType::Long => ParamValue::Long(raw.trim().parse().map_err(|_| invalid())?),
            ParamType::Double => ParamValue::Double(raw.trim().parse().map_err(|_| invalid())?),
            ParamType::Float => ParamValue::Float(raw.trim().parse().map_err(|_| invalid())?),
            ParamType::Short => ParamValue::Short(raw.trim().parse().map_err(|_| invalid())?),
            ParamType::Byte => ParamValue::Byte(raw.trim().parse().map_err(|_| invalid())?),
            ParamType::Char => match raw.chars().next() {
                Some(ch) => ParamValue::Char(ch),
                None => self.missing(),
            },
        };
        Ok(value)
    }

    const fn missing(self) -> ParamValue {
        if !self.primitive {
            return ParamValue::Null;
        }
        match self.kind {
            ParamType::String => ParamValue::Null,
            ParamType::Int => ParamValue::Int(0),
            ParamType::Bool => ParamValue::Bool(false),
            ParamType::Long => ParamValue::Long(0),
            ParamType::Double => ParamValue::Double(0.0),
            ParamType::Float => ParamValue::Float(0.0),
            ParamType::Short => ParamValue::Short(0),
            ParamType::Char => ParamValue::Char('\0'),
            ParamType::Byte => ParamValue::Byte(0),
        }
    }
}

/// A typed argument or result.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Absent boxed value.
    Null,
    /// Text.
    String(String),
    /// 32-bit integer.
    Int(i32),
    /// Boolean.
    Bool(bool),
    /// 64-bit integer.
    Long(i64),
    /// 64-bit float.
    Double(f64),
    /// 32-bit float.
    Float(f32),
    /// 16-bit integer.
    Short(i16),
    /// Single character.
    Char(char),
    /// 8-bit integer.
    Byte(i8),
}

impl ParamValue {
    /// JSON form used for DMR operation parameters.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::String(text) => Value::String(text.clone()),
            Self::Int(value) => Value::from(*value),
            Self::Bool(value) => Value::Bool(*value),
            Self::Long(value) => Value::from(*value),
            Self::Double(value) => Value::from(*value),
            Self::Float(value) => Value::from(f64::from(*value)),
            Self::Short(value) => Value::from(*value),
            Self::Char(ch) => Value::String(ch.to_string()),
            Self::Byte(value) => Value::from(*value),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::String(text) => f.write_str(text),
            Self::Int(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Long(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Short(value) => write!(f, "{value}"),
            Self::Char(ch) => write!(f, "{ch}"),
            Self::Byte(value) => write!(f, "{value}"),
        }
    }
}

/// Failure to build an argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    /// The declared type is outside [`ParamType`].
    #[error("Cannot support operation with param type of [{declared}]")]
    UnsupportedType {
        /// Declared type name.
        declared: String,
    },
    /// The supplied text does not parse as the declared type.
    #[error("Invalid value [{value}] for parameter [{name}] of type [{declared}]")]
    InvalidValue {
        /// Parameter name.
        name: String,
        /// Supplied text.
        value: String,
        /// Declared type.
        declared: &'static str,
    },
}

/// Arguments and signature for one invocation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments {
    /// Values in declaration order.
    pub values: Vec<ParamValue>,
    /// Java type names in declaration order.
    pub signature: Vec<&'static str>,
}

/// Builds arguments for `params` from the textual `supplied` values.
///
/// A parameter absent from `supplied` uses its declared default.
pub fn build_arguments<'a, F>(params: &[OperationParam], supplied: F) -> Result<Arguments, ParamError>
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut arguments = Arguments::default();
    for param in params {
        let declared = DeclaredType::parse(param.param_type.as_deref())?;
        let text = supplied(&param.name).or(param.default_value.as_deref());
        arguments.values.push(declared.coerce(&param.name, text)?);
        arguments.signature.push(declared.signature());
    }
    Ok(arguments)
}

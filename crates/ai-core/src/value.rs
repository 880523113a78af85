//! Blackboard value model.
//!
//! A blackboard parameter is one of seven kinds. [`Value`] is the tagged union
//! of those kinds and [`ParamType`] is its bare discriminant, used wherever a
//! type has to be named without a value (persisted type lists, typed lookups,
//! script attributes).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ParamType {
    Bool,
    Int,
    Float,
    String,
    Vector2,
    Vector3,
    Object,
}

impl ParamType {
    pub const ALL: [ParamType; 7] = [
        ParamType::Bool,
        ParamType::Int,
        ParamType::Float,
        ParamType::String,
        ParamType::Vector2,
        ParamType::Vector3,
        ParamType::Object,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::Bool => "bool",
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::String => "string",
            ParamType::Vector2 => "vector2",
            ParamType::Vector3 => "vector3",
            ParamType::Object => "object",
        }
    }

    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamType {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ParamType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == lower)
            .ok_or_else(|| ParseValueError::UnknownType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseValueError {
    #[error("unknown parameter type `{0}`")]
    UnknownType(String),

    #[error("`{text}` is not a valid {ty} value")]
    Invalid { ty: ParamType, text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Opaque handle to a host-engine object. `0` is the null reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectRef(pub u64);

impl ObjectRef {
    pub const NULL: ObjectRef = ObjectRef(0);

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Float(f32),
    String(String),
    Vector2(Vector2),
    Vector3(Vector3),
    Object(ObjectRef),
}

impl Value {
    pub fn param_type(&self) -> ParamType {
        match self {
            Value::Bool(_) => ParamType::Bool,
            Value::Int(_) => ParamType::Int,
            Value::Float(_) => ParamType::Float,
            Value::String(_) => ParamType::String,
            Value::Vector2(_) => ParamType::Vector2,
            Value::Vector3(_) => ParamType::Vector3,
            Value::Object(_) => ParamType::Object,
        }
    }

    /// Zero value of a kind.
    pub fn default_for(ty: ParamType) -> Self {
        match ty {
            ParamType::Bool => Value::Bool(false),
            ParamType::Int => Value::Int(0),
            ParamType::Float => Value::Float(0.0),
            ParamType::String => Value::String(String::new()),
            ParamType::Vector2 => Value::Vector2(Vector2::ZERO),
            ParamType::Vector3 => Value::Vector3(Vector3::ZERO),
            ParamType::Object => Value::Object(ObjectRef::NULL),
        }
    }

    /// Parses attribute text as a value of the given kind.
    ///
    /// Vectors are comma separated components (`"1, 2.5"`), objects are the
    /// numeric handle.
    pub fn parse(ty: ParamType, text: &str) -> Result<Self, ParseValueError> {
        let invalid = || ParseValueError::Invalid {
            ty,
            text: text.to_string(),
        };
        let trimmed = text.trim();

        let value = match ty {
            ParamType::Bool => Value::Bool(trimmed.parse().map_err(|_| invalid())?),
            ParamType::Int => Value::Int(trimmed.parse().map_err(|_| invalid())?),
            ParamType::Float => Value::Float(trimmed.parse().map_err(|_| invalid())?),
            ParamType::String => Value::String(text.to_string()),
            ParamType::Vector2 => match components(trimmed).ok_or_else(invalid)?[..] {
                [x, y] => Value::Vector2(Vector2::new(x, y)),
                _ => return Err(invalid()),
            },
            ParamType::Vector3 => match components(trimmed).ok_or_else(invalid)?[..] {
                [x, y, z] => Value::Vector3(Vector3::new(x, y, z)),
                _ => return Err(invalid()),
            },
            ParamType::Object => Value::Object(ObjectRef(trimmed.parse().map_err(|_| invalid())?)),
        };
        Ok(value)
    }
}

fn components(text: &str) -> Option<Vec<f32>> {
    text.split(',').map(|part| part.trim().parse().ok()).collect()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::Vector2(v) => write!(f, "({}, {})", v.x, v.y),
            Value::Vector3(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
            Value::Object(v) => write!(f, "object#{}", v.0),
        }
    }
}

/// Rust types that can live in a blackboard.
pub trait Parameter: Sized + Into<Value> + 'static {
    const TYPE: ParamType;

    fn from_value(value: &Value) -> Option<&Self>;
}

macro_rules! parameter {
    ($ty:ty, $variant:ident) => {
        impl Parameter for $ty {
            const TYPE: ParamType = ParamType::$variant;

            fn from_value(value: &Value) -> Option<&Self> {
                match value {
                    Value::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::$variant(value)
            }
        }
    };
}

parameter!(bool, Bool);
parameter!(i32, Int);
parameter!(f32, Float);
parameter!(String, String);
parameter!(Vector2, Vector2);
parameter!(Vector3, Vector3);
parameter!(ObjectRef, Object);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

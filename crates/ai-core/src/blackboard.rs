//! Typed, named parameter store shared by every behavior of one tree.
//!
//! At runtime parameters live in a single ordered map from name to [`Value`];
//! insertion order is the canonical parameter order. The persisted form
//! ([`BlackboardAsset`]) splits values into one array per [`ParamType`] and is
//! only synchronized on explicit [`Blackboard::serialize`] /
//! [`Blackboard::deserialize`] calls.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asset::{self, AssetError};
use crate::value::{ObjectRef, ParamType, Parameter, Value, Vector2, Vector3};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlackboardError {
    #[error("blackboard has no parameter named `{name}`")]
    KeyNotFound { name: String },

    #[error("blackboard parameter `{name}` is {actual}, not {expected}")]
    TypeMismatch {
        name: String,
        expected: ParamType,
        actual: ParamType,
    },

    #[error("persisted blackboard has {names} names but {types} types")]
    LengthMismatch { names: usize, types: usize },

    #[error("persisted blackboard lists `{name}` more than once")]
    DuplicateName { name: String },

    #[error("persisted blackboard has no {ty} value left for `{name}`")]
    MissingValue { name: String, ty: ParamType },
}

/// Persisted layout: ordered names, a parallel type list, and one value array
/// per type holding that type's values in name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlackboardAsset {
    pub parameter_names: Vec<String>,
    pub parameter_types: Vec<ParamType>,
    #[serde(default)]
    pub bools: Vec<bool>,
    #[serde(default)]
    pub ints: Vec<i32>,
    #[serde(default)]
    pub floats: Vec<f32>,
    #[serde(default)]
    pub strings: Vec<String>,
    #[serde(default)]
    pub vector2s: Vec<Vector2>,
    #[serde(default)]
    pub vector3s: Vec<Vector3>,
    #[serde(default)]
    pub objects: Vec<ObjectRef>,
}

impl BlackboardAsset {
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        asset::load_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), AssetError> {
        asset::save_json(path, self)
    }

    fn clear_values(&mut self) {
        self.bools.clear();
        self.ints.clear();
        self.floats.clear();
        self.strings.clear();
        self.vector2s.clear();
        self.vector3s.clear();
        self.objects.clear();
    }

    fn push_value(&mut self, value: &Value) {
        match value {
            Value::Bool(v) => self.bools.push(*v),
            Value::Int(v) => self.ints.push(*v),
            Value::Float(v) => self.floats.push(*v),
            Value::String(v) => self.strings.push(v.clone()),
            Value::Vector2(v) => self.vector2s.push(*v),
            Value::Vector3(v) => self.vector3s.push(*v),
            Value::Object(v) => self.objects.push(*v),
        }
    }

    fn value_count(&self, ty: ParamType) -> usize {
        match ty {
            ParamType::Bool => self.bools.len(),
            ParamType::Int => self.ints.len(),
            ParamType::Float => self.floats.len(),
            ParamType::String => self.strings.len(),
            ParamType::Vector2 => self.vector2s.len(),
            ParamType::Vector3 => self.vector3s.len(),
            ParamType::Object => self.objects.len(),
        }
    }

    fn value_at(&self, ty: ParamType, index: usize) -> Option<Value> {
        let value = match ty {
            ParamType::Bool => Value::Bool(*self.bools.get(index)?),
            ParamType::Int => Value::Int(*self.ints.get(index)?),
            ParamType::Float => Value::Float(*self.floats.get(index)?),
            ParamType::String => Value::String(self.strings.get(index)?.clone()),
            ParamType::Vector2 => Value::Vector2(*self.vector2s.get(index)?),
            ParamType::Vector3 => Value::Vector3(*self.vector3s.get(index)?),
            ParamType::Object => Value::Object(*self.objects.get(index)?),
        };
        Some(value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Blackboard {
    params: IndexMap<String, Value>,
    persisted: BlackboardAsset,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a blackboard from its persisted form.
    pub fn from_asset(asset: BlackboardAsset) -> Result<Self, BlackboardError> {
        let mut blackboard = Self {
            params: IndexMap::new(),
            persisted: asset,
        };
        blackboard.deserialize()?;
        Ok(blackboard)
    }

    /// Persisted buffers as of the last [`serialize`](Self::serialize) or load.
    pub fn asset(&self) -> &BlackboardAsset {
        &self.persisted
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn clear(&mut self) {
        self.params.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn param_type(&self, name: &str) -> Option<ParamType> {
        self.params.get(name).map(Value::param_type)
    }

    /// Inserts or overwrites `name`.
    ///
    /// A new name is appended to the parameter order. Assigning a value of a
    /// different type to an existing name replaces type and value together and
    /// keeps the name's position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.params.get_mut(&name) {
            Some(slot) => {
                if slot.param_type() != value.param_type() {
                    tracing::debug!(
                        name = %name,
                        from = %slot.param_type(),
                        to = %value.param_type(),
                        "blackboard parameter retyped"
                    );
                }
                *slot = value;
            }
            None => {
                self.params.insert(name, value);
            }
        }
    }

    pub fn get<T: Parameter>(&self, name: &str) -> Result<&T, BlackboardError> {
        let value = self.lookup(name)?;
        T::from_value(value).ok_or_else(|| BlackboardError::TypeMismatch {
            name: name.to_string(),
            expected: T::TYPE,
            actual: value.param_type(),
        })
    }

    /// Looks `name` up and checks that it currently holds a `ty` value.
    pub fn get_value(&self, name: &str, ty: ParamType) -> Result<&Value, BlackboardError> {
        let value = self.lookup(name)?;
        if value.param_type() != ty {
            return Err(BlackboardError::TypeMismatch {
                name: name.to_string(),
                expected: ty,
                actual: value.param_type(),
            });
        }
        Ok(value)
    }

    /// Removes `name`; `false` when it was not present.
    pub fn remove(&mut self, name: &str) -> bool {
        self.params.shift_remove(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn types(&self) -> impl Iterator<Item = ParamType> + '_ {
        self.params.values().map(Value::param_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.params.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// All parameters of type `T`, in parameter order.
    pub fn values<T: Parameter>(&self) -> impl Iterator<Item = (&str, &T)> {
        self.params
            .iter()
            .filter_map(|(name, value)| T::from_value(value).map(|v| (name.as_str(), v)))
    }

    /// Rebuilds the persisted buffers from the runtime map.
    pub fn serialize(&mut self) -> &BlackboardAsset {
        let persisted = &mut self.persisted;
        persisted.parameter_names.clear();
        persisted.parameter_types.clear();
        persisted.clear_values();

        for (name, value) in &self.params {
            persisted.parameter_names.push(name.clone());
            persisted.parameter_types.push(value.param_type());
            persisted.push_value(value);
        }
        &self.persisted
    }

    /// Rebuilds the runtime map from the persisted buffers.
    ///
    /// Each name consumes the next unread value of its declared type. The
    /// per-type arrays are trusted to be in name order; they are not checked.
    pub fn deserialize(&mut self) -> Result<(), BlackboardError> {
        let persisted = &self.persisted;
        if persisted.parameter_names.len() != persisted.parameter_types.len() {
            return Err(BlackboardError::LengthMismatch {
                names: persisted.parameter_names.len(),
                types: persisted.parameter_types.len(),
            });
        }

        let mut params = IndexMap::with_capacity(persisted.parameter_names.len());
        let mut cursors = [0usize; ParamType::ALL.len()];
        for (name, &ty) in persisted
            .parameter_names
            .iter()
            .zip(&persisted.parameter_types)
        {
            let cursor = &mut cursors[ty.slot()];
            let value = persisted
                .value_at(ty, *cursor)
                .ok_or_else(|| BlackboardError::MissingValue {
                    name: name.clone(),
                    ty,
                })?;
            *cursor += 1;

            if params.insert(name.clone(), value).is_some() {
                return Err(BlackboardError::DuplicateName { name: name.clone() });
            }
        }

        for ty in ParamType::ALL {
            let surplus = persisted.value_count(ty) - cursors[ty.slot()];
            if surplus > 0 {
                tracing::warn!(ty = %ty, surplus, "persisted blackboard has unreferenced values");
            }
        }

        self.params = params;
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<&Value, BlackboardError> {
        self.params
            .get(name)
            .ok_or_else(|| BlackboardError::KeyNotFound {
                name: name.to_string(),
            })
    }
}

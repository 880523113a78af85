//! Tag → behavior factory registry used by the script compiler.

use std::collections::BTreeMap;
use std::str::FromStr;

use ai_core::{ParamType, Value};
use thiserror::Error;

use crate::config::BehaviorConfig;
use crate::nodes::{Comparison, LogLevel};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("missing required attribute `{name}`")]
    Missing { name: String },

    #[error("attribute `{name}` has invalid value `{value}`: {reason}")]
    Invalid {
        name: String,
        value: String,
        reason: String,
    },
}

/// Attributes declared on one script element.
///
/// Factories read what they need; anything left unread can be reported by the
/// caller through [`Attributes::unused`].
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    entries: Vec<(String, String)>,
    used: Vec<bool>,
}

impl Attributes {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let used = vec![false; entries.len()];
        Self { entries, used }
    }

    /// Raw text of `name`, marking it as read.
    pub fn raw(&mut self, name: &str) -> Option<&str> {
        let index = self.entries.iter().position(|(k, _)| k == name)?;
        self.used[index] = true;
        Some(self.entries[index].1.as_str())
    }

    pub fn required_raw(&mut self, name: &str) -> Result<String, AttributeError> {
        self.raw(name)
            .map(str::to_string)
            .ok_or_else(|| AttributeError::Missing {
                name: name.to_string(),
            })
    }

    pub fn optional<T>(&mut self, name: &str) -> Result<Option<T>, AttributeError>
    where
        T: FromStr,
        T::Err: ToString,
    {
        let Some(text) = self.raw(name) else {
            return Ok(None);
        };
        text.trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| AttributeError::Invalid {
                name: name.to_string(),
                value: text.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn required<T>(&mut self, name: &str) -> Result<T, AttributeError>
    where
        T: FromStr,
        T::Err: ToString,
    {
        self.optional(name)?.ok_or_else(|| AttributeError::Missing {
            name: name.to_string(),
        })
    }

    /// Reads a `type` attribute and parses the `value_attr` text as that type.
    pub fn typed_value(&mut self, value_attr: &str) -> Result<Value, AttributeError> {
        let ty: ParamType = self.required("type")?;
        let text = self.required_raw(value_attr)?;
        Value::parse(ty, &text).map_err(|e| AttributeError::Invalid {
            name: value_attr.to_string(),
            value: text,
            reason: e.to_string(),
        })
    }

    /// Names of attributes no factory has read.
    pub fn unused(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .zip(&self.used)
            .filter(|(_, used)| !**used)
            .map(|((name, _), _)| name.as_str())
    }
}

pub type Factory = fn(&mut Attributes) -> Result<BehaviorConfig, AttributeError>;

/// Maps script tags to the behavior variant they construct.
#[derive(Debug, Clone)]
pub struct BehaviorRegistry {
    factories: BTreeMap<String, Factory>,
}

impl Default for BehaviorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl BehaviorRegistry {
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with every built-in behavior under its canonical tag.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("Selector", |_| Ok(BehaviorConfig::Selector));
        registry.register("Sequence", |_| Ok(BehaviorConfig::Sequence));
        registry.register("Inverter", |_| Ok(BehaviorConfig::Inverter));
        registry.register("AlwaysSucceed", |_| Ok(BehaviorConfig::AlwaysSucceed));
        registry.register("Succeed", |_| Ok(BehaviorConfig::Succeed));
        registry.register("Fail", |_| Ok(BehaviorConfig::Fail));
        registry.register("Wait", |attrs| {
            Ok(BehaviorConfig::Wait {
                ticks: attrs.required("ticks")?,
            })
        });
        registry.register("WaitFor", |attrs| {
            Ok(BehaviorConfig::WaitFor {
                key: attrs.required_raw("key")?,
            })
        });
        registry.register("Log", |attrs| {
            Ok(BehaviorConfig::Log {
                message: attrs.required_raw("msg")?,
                level: attrs.optional::<LogLevel>("level")?.unwrap_or_default(),
            })
        });
        registry.register("Set", |attrs| {
            Ok(BehaviorConfig::Set {
                key: attrs.required_raw("key")?,
                value: attrs.typed_value("value")?,
            })
        });
        registry.register("Check", check);
        registry.register("Remove", |attrs| {
            Ok(BehaviorConfig::Remove {
                key: attrs.required_raw("key")?,
            })
        });
        registry.register("Increment", |attrs| {
            Ok(BehaviorConfig::Increment {
                key: attrs.required_raw("key")?,
                by: attrs.optional("by")?.unwrap_or(1),
            })
        });
        registry
    }

    /// Adds `tag`, replacing any factory already registered under it.
    pub fn register(&mut self, tag: impl Into<String>, factory: Factory) -> &mut Self {
        self.factories.insert(tag.into(), factory);
        self
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// `None` when no factory is registered for `tag`.
    pub fn construct(
        &self,
        tag: &str,
        attrs: &mut Attributes,
    ) -> Option<Result<BehaviorConfig, AttributeError>> {
        self.factories.get(tag).map(|factory| factory(attrs))
    }
}

fn check(attrs: &mut Attributes) -> Result<BehaviorConfig, AttributeError> {
    let key = attrs.required_raw("key")?;
    let value = attrs.typed_value("value")?;
    let op: Comparison = attrs.optional("op")?.unwrap_or_default();

    if op.is_ordering() && !matches!(value, Value::Int(_) | Value::Float(_)) {
        return Err(AttributeError::Invalid {
            name: "op".to_string(),
            value: format!("{op:?}").to_lowercase(),
            reason: format!("ordering is not defined for {}", value.param_type()),
        });
    }
    Ok(BehaviorConfig::Check { key, op, value })
}

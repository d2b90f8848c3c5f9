//! Shared parameter environment for check functions.
//!
//! The environment is a read-only mapping from parameter names to values:
//! plain JSON data, or opaque handles such as a database pool or HTTP client.
//! Once a run starts it is shared by reference with every check function; no
//! API hands out mutable access, so check functions cannot alter it.

use std::any::Any;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{Result, RuleCheckError};

/// Required name prefix for environment functions.
pub const ENV_PREFIX: &str = "env_";

/// One environment entry.
#[derive(Clone)]
pub enum EnvValue {
    Json(Value),
    /// A live object shared with check functions, read back by type.
    Handle(Arc<dyn Any + Send + Sync>),
}

impl EnvValue {
    #[must_use]
    pub fn handle<T: Any + Send + Sync>(value: T) -> Self {
        Self::Handle(Arc::new(value))
    }

    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Handle(_) => None,
        }
    }

    /// Borrows the handle as `T`; `None` for JSON values or another type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Json(_) => None,
            Self::Handle(handle) => handle.downcast_ref(),
        }
    }

    /// Only JSON `null` counts; handles are never null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Json(Value::Null))
    }
}

impl std::fmt::Debug for EnvValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Self::Handle(_) => f.write_str("Handle(..)"),
        }
    }
}

impl From<Value> for EnvValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Read-only, cheaply clonable parameter mapping.
#[derive(Debug, Clone, Default)]
pub struct Env {
    values: Arc<IndexMap<String, Arc<EnvValue>>>,
}

impl Env {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with `key` set to `value`.
    #[must_use]
    pub fn with(&self, key: impl Into<String>, value: impl Into<EnvValue>) -> Self {
        let value: EnvValue = value.into();
        self.layered(IndexMap::from([(key.into(), value)]), "env")
    }

    /// The JSON value under `key`; `None` for handles.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entry(key).and_then(EnvValue::as_json)
    }

    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&EnvValue> {
        self.values.get(key).map(AsRef::as_ref)
    }

    /// The handle under `key` if it holds a `T`.
    #[must_use]
    pub fn handle<T: Any>(&self, key: &str) -> Option<&T> {
        self.entry(key).and_then(EnvValue::downcast_ref::<T>)
    }

    pub(crate) fn get_shared(&self, key: &str) -> Option<Arc<EnvValue>> {
        self.values.get(key).cloned()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnvValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Keys whose value is JSON `null`, in insertion order. Handles are never null.
    #[must_use]
    pub fn nulls(&self) -> Vec<String> {
        self.values
            .iter()
            .filter(|(_, v)| v.is_null())
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Returns a new environment with `extra` layered on top. Later keys win.
    ///
    /// Collisions are not errors but are logged against `source`.
    #[must_use]
    pub fn layered<V: Into<EnvValue>>(&self, extra: IndexMap<String, V>, source: &str) -> Self {
        let mut values = (*self.values).clone();
        for (key, value) in extra {
            if values.contains_key(&key) {
                tracing::warn!(key = %key, source, "environment key overwritten");
            }
            values.insert(key, Arc::new(value.into()));
        }
        Self {
            values: Arc::new(values),
        }
    }
}

impl FromIterator<(String, Value)> for Env {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: Arc::new(
                iter.into_iter()
                    .map(|(k, v)| (k, Arc::new(EnvValue::Json(v))))
                    .collect(),
            ),
        }
    }
}

impl From<IndexMap<String, Value>> for Env {
    fn from(map: IndexMap<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl From<serde_json::Map<String, Value>> for Env {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

type EnvBody = dyn Fn(&Env) -> anyhow::Result<IndexMap<String, EnvValue>> + Send + Sync;

/// A function computing additional environment keys from the environment so far.
#[derive(Clone)]
pub struct EnvFunction {
    name: String,
    body: Arc<EnvBody>,
}

impl std::fmt::Debug for EnvFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvFunction").field("name", &self.name).finish()
    }
}

impl EnvFunction {
    /// Wraps `body` as an environment function named `name`.
    ///
    /// # Errors
    /// Returns an error if `name` does not start with [`ENV_PREFIX`].
    pub fn new<F>(name: impl Into<String>, body: F) -> Result<Self>
    where
        F: Fn(&Env) -> anyhow::Result<IndexMap<String, Value>> + Send + Sync + 'static,
    {
        Self::with_handles(name, move |env| {
            Ok(body(env)?.into_iter().map(|(k, v)| (k, EnvValue::Json(v))).collect())
        })
    }

    /// Like [`EnvFunction::new`], for bodies that also supply handles.
    ///
    /// # Errors
    /// Returns an error if `name` does not start with [`ENV_PREFIX`].
    pub fn with_handles<F>(name: impl Into<String>, body: F) -> Result<Self>
    where
        F: Fn(&Env) -> anyhow::Result<IndexMap<String, EnvValue>> + Send + Sync + 'static,
    {
        let name = name.into();
        if !name.starts_with(ENV_PREFIX) {
            return Err(RuleCheckError::InvalidAttribute {
                name: "env_function",
                value: name,
                reason: format!("environment functions must start with '{ENV_PREFIX}'"),
            });
        }
        Ok(Self {
            name,
            body: Arc::new(body),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls the function against `env`.
    ///
    /// # Errors
    /// Returns `EnvFunction` if the body fails.
    pub fn call(&self, env: &Env) -> Result<IndexMap<String, EnvValue>> {
        (self.body)(env).map_err(|e| RuleCheckError::EnvFunction {
            name: self.name.clone(),
            message: format!("{e:#}"),
        })
    }
}

/// Layers the output of every environment function, in order, on top of `base`.
///
/// # Errors
/// Returns the first environment function failure.
pub fn load_environment<'a>(
    base: &Env,
    functions: impl IntoIterator<Item = &'a EnvFunction>,
) -> Result<Env> {
    let mut env = base.clone();
    for function in functions {
        let extra = function.call(&env)?;
        tracing::debug!(function = function.name(), keys = extra.len(), "environment function loaded");
        env = env.layered(extra, function.name());
    }
    for key in env.nulls() {
        tracing::warn!(key = %key, "environment value is null");
    }
    Ok(env)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

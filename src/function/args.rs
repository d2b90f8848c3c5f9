use std::any::Any;
use std::sync::Arc;

use anyhow::Context;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::env::EnvValue;

/// Parameters bound from the environment for one check invocation.
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: IndexMap<String, Arc<EnvValue>>,
}

impl Args {
    pub(crate) const fn new(values: IndexMap<String, Arc<EnvValue>>) -> Self {
        Self { values }
    }

    /// The JSON value of `name`; `None` if unbound or a handle.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name).and_then(|v| v.as_json())
    }

    /// Borrows the handle bound to `name` as `T`.
    ///
    /// # Errors
    /// Returns an error if the parameter is unbound, plain JSON, or another type.
    pub fn handle<T: Any>(&self, name: &str) -> anyhow::Result<&T> {
        let entry = self
            .values
            .get(name)
            .with_context(|| format!("parameter '{name}' is not bound"))?;
        entry.downcast_ref::<T>().with_context(|| {
            format!(
                "parameter '{name}' is not a handle of type {}",
                std::any::type_name::<T>()
            )
        })
    }

    /// Deserializes the parameter `name` into `T`.
    ///
    /// # Errors
    /// Returns an error if the parameter was not declared or does not fit `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<T> {
        let value = self
            .value(name)
            .with_context(|| format!("parameter '{name}' is not bound or holds a handle"))?;
        T::deserialize(value).with_context(|| format!("parameter '{name}' has the wrong type"))
    }

    /// Borrows the parameter `name` as a string.
    ///
    /// # Errors
    /// Returns an error if the parameter is missing or not a string.
    pub fn str(&self, name: &str) -> anyhow::Result<&str> {
        self.value(name)
            .and_then(Value::as_str)
            .with_context(|| format!("parameter '{name}' is not a string"))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

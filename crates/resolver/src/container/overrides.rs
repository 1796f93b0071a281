use crate::container::identifier::{instance, Identifier, Instance};
use crate::container::metadata::Parameter;
use crate::errors::ResolverError;
use std::collections::HashMap;
use std::fmt;

/// Key of a caller-supplied constructor argument
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OverrideKey {
    /// Parameter name
    Name(String),
    /// Zero-based position in the constructor parameter list
    Position(usize),
}

/// Values that short-circuit automatic resolution of constructor parameters
#[derive(Clone, Default)]
pub struct Overrides {
    values: HashMap<OverrideKey, Instance>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the parameter called `name` with a plain value
    pub fn with<T: Send + Sync + 'static>(self, name: impl Into<String>, value: T) -> Self {
        self.with_instance(name, instance(value))
    }

    /// Override the parameter called `name` with a shared instance
    pub fn with_instance(mut self, name: impl Into<String>, value: Instance) -> Self {
        self.values.insert(OverrideKey::Name(name.into()), value);
        self
    }

    /// Override the parameter at `position` with a plain value
    pub fn at<T: Send + Sync + 'static>(self, position: usize, value: T) -> Self {
        self.at_instance(position, instance(value))
    }

    /// Override the parameter at `position` with a shared instance
    pub fn at_instance(mut self, position: usize, value: Instance) -> Self {
        self.values.insert(OverrideKey::Position(position), value);
        self
    }

    pub fn insert(&mut self, key: OverrideKey, value: Instance) -> Option<Instance> {
        self.values.insert(key, value)
    }

    /// Named override, ignoring positional entries
    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.values.get(&OverrideKey::Name(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Re-key positional entries by the name of the parameter at that position.
    ///
    /// Positional entries win over a named entry for the same parameter.
    pub(crate) fn keyed_by_parameter(
        &self,
        parameters: &[Parameter],
        concrete: &Identifier,
    ) -> Result<HashMap<String, Instance>, ResolverError> {
        let mut keyed = HashMap::with_capacity(self.values.len());
        let mut positional = Vec::new();

        for (key, value) in &self.values {
            match key {
                OverrideKey::Name(name) => {
                    keyed.insert(name.clone(), value.clone());
                }
                OverrideKey::Position(position) => positional.push((*position, value)),
            }
        }

        for (position, value) in positional {
            let parameter = parameters.get(position).ok_or_else(|| {
                ResolverError::invalid_override(format!(
                    "position {} is out of range for [{}] with {} constructor parameter(s)",
                    position,
                    concrete,
                    parameters.len()
                ))
            })?;
            keyed.insert(parameter.name.clone(), value.clone());
        }

        Ok(keyed)
    }
}

impl fmt::Debug for Overrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

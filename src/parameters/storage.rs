//! In-memory Parameter Store
//!
//! Named, typed tuning values with fixed capacity. Parameter sets register
//! their defaults once at startup, the application may override individual
//! values, and each set then loads itself with `from_store`.
//!
//! # Example
//!
//! ```
//! use romi_tasks::parameters::{ParamValue, ParameterStore};
//!
//! let mut store = ParameterStore::new();
//! store.register("LINE_KP", ParamValue::Float(2.0)).unwrap();
//! store.set("LINE_KP", ParamValue::Float(3.5)).unwrap();
//! assert_eq!(store.get_f32("LINE_KP"), Some(3.5));
//! ```

use heapless::index_map::FnvIndexMap;

use crate::core::error::{ConfigError, ConfigResult};

/// Maximum number of parameters (power of two, required by the index map)
pub const MAX_PARAMS: usize = 64;

/// Parameter value types
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamValue {
    /// Boolean parameter
    Bool(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 32-bit floating point
    Float(f32),
}

impl ParamValue {
    fn same_type(&self, other: &ParamValue) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }
}

/// Fixed-capacity map of named parameters
pub struct ParameterStore {
    params: FnvIndexMap<&'static str, ParamValue, MAX_PARAMS>,
}

impl ParameterStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            params: FnvIndexMap::new(),
        }
    }

    /// Register a parameter with its default value.
    ///
    /// Registering a name twice keeps the existing value, so a set of
    /// defaults can be registered after overrides were loaded.
    pub fn register(&mut self, name: &'static str, default: ParamValue) -> ConfigResult<()> {
        if name.is_empty() {
            return Err(ConfigError::InvalidParameter(name));
        }
        if self.params.contains_key(name) {
            return Ok(());
        }
        self.params
            .insert(name, default)
            .map(|_| ())
            .map_err(|_| ConfigError::RegistryFull {
                capacity: MAX_PARAMS,
            })
    }

    /// Override a registered parameter. The type must match the default.
    pub fn set(&mut self, name: &'static str, value: ParamValue) -> ConfigResult<()> {
        match self.params.get_mut(name) {
            Some(current) if current.same_type(&value) => {
                *current = value;
                Ok(())
            }
            _ => Err(ConfigError::InvalidParameter(name)),
        }
    }

    /// Raw value
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Value as `f32` (integers are converted)
    pub fn get_f32(&self, name: &str) -> Option<f32> {
        match self.get(name) {
            Some(ParamValue::Float(v)) => Some(*v),
            Some(ParamValue::Int(v)) => Some(*v as f32),
            _ => None,
        }
    }

    /// Value as `i32` (floats are truncated)
    pub fn get_i32(&self, name: &str) -> Option<i32> {
        match self.get(name) {
            Some(ParamValue::Int(v)) => Some(*v),
            Some(ParamValue::Float(v)) => Some(*v as i32),
            _ => None,
        }
    }

    /// Value as `bool`
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(ParamValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// Number of registered parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Return true if no parameter is registered
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterate `(name, value)` in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ParamValue)> {
        self.params.iter().map(|(name, value)| (*name, value))
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_get() {
        let mut store = ParameterStore::new();
        store.register("TURN_MAX_EFF", ParamValue::Float(50.0)).unwrap();
        store.register("IMU_CAL_MIN", ParamValue::Int(1)).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get_f32("TURN_MAX_EFF"), Some(50.0));
        assert_eq!(store.get_i32("IMU_CAL_MIN"), Some(1));
        assert_eq!(store.get_f32("IMU_CAL_MIN"), Some(1.0));
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn register_keeps_existing_value() {
        let mut store = ParameterStore::new();
        store.register("LINE_KP", ParamValue::Float(2.0)).unwrap();
        store.set("LINE_KP", ParamValue::Float(4.0)).unwrap();
        store.register("LINE_KP", ParamValue::Float(2.0)).unwrap();
        assert_eq!(store.get_f32("LINE_KP"), Some(4.0));
    }

    #[test]
    fn set_rejects_unknown_or_mistyped() {
        let mut store = ParameterStore::new();
        store.register("LINE_PID_INTVL", ParamValue::Int(5)).unwrap();

        assert_eq!(
            store.set("LINE_PID_INTVL", ParamValue::Float(2.5)),
            Err(ConfigError::InvalidParameter("LINE_PID_INTVL"))
        );
        assert_eq!(
            store.set("NOPE", ParamValue::Int(1)),
            Err(ConfigError::InvalidParameter("NOPE"))
        );
        assert_eq!(store.get_i32("LINE_PID_INTVL"), Some(5));
    }

    #[test]
    fn bool_values() {
        let mut store = ParameterStore::new();
        store.register("START_ACTIVE", ParamValue::Bool(true)).unwrap();
        assert_eq!(store.get_bool("START_ACTIVE"), Some(true));
        assert_eq!(store.get_f32("START_ACTIVE"), None);
    }

    #[test]
    fn iter_in_registration_order() {
        let mut store = ParameterStore::new();
        store.register("A", ParamValue::Int(1)).unwrap();
        store.register("B", ParamValue::Int(2)).unwrap();
        let names: std::vec::Vec<&str> = store.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["A", "B"]);
    }
}

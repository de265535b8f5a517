//! The base capability shared by all pluggable units.
//!
//! Every plugin kind (config source, logger, source, step) is a [`Component`]:
//! it carries a mutable instance name (set from the `name` key of its config
//! fragment, defaulting to its type name) and an immutable type name, which is
//! the key it was registered under.

use serde_json::{Map, Value};

use crate::error::{Result, RigupError};

/// An untyped configuration fragment: one JSON object out of the config
/// document, handed to a plugin factory for decoding.
pub type Fragment = Map<String, Value>;

/// A named, typed, pluggable unit.
pub trait Component {
    /// The instance name of this component.
    fn name(&self) -> &str;

    /// Rename this component. Called by the resolver with the fragment's
    /// `name` key after construction.
    fn set_name(&mut self, name: &str);

    /// The registration key this component was resolved under.
    fn type_name(&self) -> &'static str;
}

/// Extract the required `name` string key from a config fragment.
pub fn fragment_name(fragment: &Fragment) -> Result<&str> {
    fragment
        .get("name")
        .and_then(Value::as_str)
        .ok_or(RigupError::MissingNameKey)
}

/// Extract the required `type` string key from a config fragment.
pub fn fragment_type(fragment: &Fragment) -> Result<&str> {
    fragment
        .get("type")
        .and_then(Value::as_str)
        .ok_or(RigupError::MissingTypeKey)
}

/// Extract both `name` and `type`, in that order of validation.
pub fn fragment_name_type(fragment: &Fragment) -> Result<(&str, &str)> {
    Ok((fragment_name(fragment)?, fragment_type(fragment)?))
}

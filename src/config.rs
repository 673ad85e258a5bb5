//! Controller configuration.

use crate::enums::ValidationTrigger;
use serde::{Deserialize, Serialize};

/// Behaviour knobs for a [`FormController`](crate::controller::FormController).
///
/// Deserializes from the top level of a form definition, so
/// `validate_on: change` in YAML maps to [`ValidationTrigger::Change`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub validate_on: ValidationTrigger,
}

impl FormConfig {
    pub fn validate_on(trigger: ValidationTrigger) -> Self {
        FormConfig {
            validate_on: trigger,
        }
    }

    /// Writes trigger a field-scoped pass.
    pub fn validates_on_change(&self) -> bool {
        self.validate_on == ValidationTrigger::Change
    }

    /// Blur events trigger a field-scoped pass. Change mode implies blur.
    pub fn validates_on_blur(&self) -> bool {
        matches!(
            self.validate_on,
            ValidationTrigger::Change | ValidationTrigger::Blur
        )
    }
}

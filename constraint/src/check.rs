//! Registration-time constraint checks.

use crate::{ConstraintError, ConstraintEvaluator, ConstraintResult};
use arbor_core::{NamespaceContext, RequiredType};
use arbor_registry::{DefinitionCheck, PropertyDefinition, TypeTable};
use std::sync::Arc;

/// Rejects property definitions whose constraints cannot be interpreted or
/// whose default values do not satisfy them.
///
/// Plug into a validator with
/// `RegistrationValidator::new(config).with_check(ConstraintCheck::new(ns))`.
pub struct ConstraintCheck {
    namespaces: Arc<dyn NamespaceContext + Send + Sync>,
    evaluator: ConstraintEvaluator,
}

impl ConstraintCheck {
    pub fn new(namespaces: Arc<dyn NamespaceContext + Send + Sync>) -> Self {
        Self {
            namespaces,
            evaluator: ConstraintEvaluator::new(Arc::new(TypeTable::default())),
        }
    }

    pub fn check(&self, definition: &PropertyDefinition) -> ConstraintResult<()> {
        let context = self.namespaces.as_ref();
        self.evaluator.check_syntax(definition, context)?;

        // Reference targets are not known at registration time.
        if definition.constraints.is_empty() || definition.required_type == RequiredType::Reference {
            return Ok(());
        }
        for value in &definition.default_values {
            if !self.evaluator.satisfies(definition, Some(value), context) {
                return Err(ConstraintError::DefaultNotSatisfied {
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl DefinitionCheck for ConstraintCheck {
    fn check_property(&self, definition: &PropertyDefinition) -> Result<(), String> {
        self.check(definition).map_err(|e| e.to_string())
    }
}

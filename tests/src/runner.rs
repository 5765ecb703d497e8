//! Scenario runner.

use crate::error::ScenarioResult;
use crate::scenario::Scenario;
use crate::world::World;

/// Runs a scenario against a fresh world.
pub struct Runner<'s> {
    scenario: &'s Scenario,
}

impl<'s> Runner<'s> {
    pub fn new(scenario: &'s Scenario) -> Self {
        Self { scenario }
    }

    /// Run every step in order, stopping at the first failed assertion.
    pub fn run(&self) -> ScenarioResult<()> {
        // 1. Build the world with the built-in types
        let mut world = World::new(self.scenario.registry_config().clone())?;

        // 2. Register namespaces
        for (prefix, uri) in self.scenario.namespaces() {
            world.namespaces().register(prefix.as_str(), uri.as_str())?;
        }

        // 3. Execute each step and verify its assertion
        for step in self.scenario.steps() {
            let outcome = (step.action)(&mut world);
            tracing::debug!(scenario = self.scenario.name(), step = %step.name, ?outcome, "step finished");
            step.assertion.verify(&step.name, &outcome)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Outcome;
    use arbor_core::Name;
    use arbor_registry::{ErrorKind, NodeTypeDefinition};

    #[test]
    fn test_runner_executes_steps_in_order() {
        let scenario = Scenario::new("order")
            .step(
                "child_first",
                |w: &mut World| {
                    w.register(vec![NodeTypeDefinition::new(Name::unqualified("Child"))
                        .extends(Name::unqualified("Parent"))])
                },
                |a| a.rejected(ErrorKind::SchemaNotFound),
            )
            .step(
                "parent",
                |w: &mut World| w.register(vec![NodeTypeDefinition::new(Name::unqualified("Parent"))]),
                |a| a.registered(1),
            );
        scenario.run().unwrap();
    }

    #[test]
    fn test_failed_assertion_names_the_step() {
        let scenario = Scenario::new("fails").step(
            "nothing",
            |_: &mut World| Outcome::Checked(false),
            |a| a.satisfied(),
        );
        let err = scenario.run().unwrap_err();
        assert!(err.to_string().contains("nothing"));
    }
}

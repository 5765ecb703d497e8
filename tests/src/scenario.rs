//! Scenario definitions.

use arbor_registry::RegistryConfig;

use crate::assertion::{Assertion, AssertionBuilder};
use crate::error::ScenarioResult;
use crate::runner::Runner;
use crate::world::{Outcome, World};

/// The action a step performs against the world.
pub type Action = Box<dyn Fn(&mut World) -> Outcome>;

/// A named step with its action and assertion.
pub struct Step {
    pub name: String,
    pub action: Action,
    pub assertion: Assertion,
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("assertion", &self.assertion)
            .finish()
    }
}

/// A sequence of steps run against one world.
#[derive(Debug)]
pub struct Scenario {
    name: String,
    config: RegistryConfig,
    namespaces: Vec<(String, String)>,
    steps: Vec<Step>,
}

impl Scenario {
    /// Create a scenario using the JCR registration defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: RegistryConfig::jcr(),
            namespaces: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a namespace before the first step.
    pub fn namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.push((prefix.into(), uri.into()));
        self
    }

    /// Add a step.
    pub fn step<A, F>(mut self, name: &str, action: A, assertion: F) -> Self
    where
        A: Fn(&mut World) -> Outcome + 'static,
        F: FnOnce(AssertionBuilder) -> AssertionBuilder,
    {
        self.steps.push(Step {
            name: name.to_string(),
            action: Box::new(action),
            assertion: assertion(AssertionBuilder::new()).build(),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry_config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn namespaces(&self) -> &[(String, String)] {
        &self.namespaces
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Run the scenario.
    pub fn run(&self) -> ScenarioResult<()> {
        Runner::new(self).run()
    }
}

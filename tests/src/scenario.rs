//! Scenario definition and builder.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use weft_compiler::Extension;
use weft_session::{Session, SessionConfig};

use crate::assertion::{Assertion, AssertionBuilder, Snapshot};
use crate::error::{ScenarioError, ScenarioResult};

/// One thing a scenario does, in order.
#[derive(Debug)]
enum Step {
    /// Queue new content for a unit.
    Add { source_id: String, text: String },
    /// Queue the removal of a unit.
    Delete { source_id: String },
    /// Compile the pending changes and check the outcome.
    Compile { name: String, assertion: Assertion },
}

/// A sequence of edits and compiles against one session.
pub struct Scenario {
    /// Scenario name (for reporting).
    name: String,
    config: SessionConfig,
    /// Extensions enabled on top of the configuration.
    extensions: Vec<Arc<dyn Extension>>,
    steps: Vec<Step>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: SessionConfig::default(),
            extensions: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Supply an extension and enable it.
    pub fn extension(mut self, extension: Arc<dyn Extension>) -> Self {
        self.extensions.push(extension);
        self
    }

    pub fn add(mut self, source_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.steps.push(Step::Add {
            source_id: source_id.into(),
            text: text.into(),
        });
        self
    }

    pub fn delete(mut self, source_id: impl Into<String>) -> Self {
        self.steps.push(Step::Delete {
            source_id: source_id.into(),
        });
        self
    }

    /// Compile, then check the outcome.
    pub fn step<F>(mut self, name: impl Into<String>, assertion_fn: F) -> Self
    where
        F: FnOnce(AssertionBuilder) -> AssertionBuilder,
    {
        let assertion = assertion_fn(AssertionBuilder::new()).build();
        self.steps.push(Step::Compile {
            name: name.into(),
            assertion,
        });
        self
    }

    /// Run every step against a fresh session and return the session.
    pub fn run(self) -> ScenarioResult<Session> {
        let mut config = self.config;
        for extension in &self.extensions {
            let name = extension.name().to_string();
            if !config.extensions.contains(&name) {
                config.extensions.push(name);
            }
        }
        let mut session = Session::with_extensions(config, self.extensions)?;
        let mut snapshots: HashMap<String, Snapshot> = HashMap::new();

        for step in &self.steps {
            match step {
                Step::Add { source_id, text } => {
                    session.add_or_replace(source_id.as_str(), text.as_str());
                }
                Step::Delete { source_id } => {
                    session.delete(source_id).map_err(|e| {
                        ScenarioError::step_execution(format!("delete {}", source_id), e.to_string())
                    })?;
                }
                Step::Compile { name, assertion } => {
                    debug!(scenario = %self.name, step = %name, "compile step");
                    let result = session.compile();
                    assertion.verify(name, &session, &result, &mut snapshots)?;
                }
            }
        }
        Ok(session)
    }
}

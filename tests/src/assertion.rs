//! Assertion types and builders for verifying compile steps.

use std::collections::HashMap;
use weft_compiler::CompileError;
use weft_core::m3;
use weft_session::{CompileReport, Session, SessionError, SessionResult};

use crate::error::{ScenarioError, ScenarioResult};

/// Graph state recorded by a step, compared by later steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub size: usize,
    pub text: String,
}

impl Snapshot {
    pub fn of(session: &Session) -> Self {
        Self {
            size: session.graph_size(),
            text: session.serialize(),
        }
    }
}

/// A complete assertion for one compile step.
#[derive(Default)]
pub struct Assertion {
    // Outcome
    pub succeeds: bool,
    pub noop: Option<bool>,
    pub reprocessed: Option<usize>,
    pub built_elements: Option<usize>,

    // Graph contents
    pub defines: Vec<String>,
    pub lacks: Vec<String>,
    pub properties: Vec<(String, String)>,
    pub missing_properties: Vec<(String, String)>,

    // Snapshots
    pub record: Option<String>,
    pub same_as: Option<String>,

    // Error assertions
    pub error: Option<String>,
    pub error_pattern: Option<String>,
    pub error_at: Option<(String, usize)>,
    pub error_column: Option<usize>,

    // Custom assertion functions
    #[allow(clippy::type_complexity)]
    pub custom: Vec<Box<dyn Fn(&Session) -> bool>>,
}

impl std::fmt::Debug for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assertion")
            .field("succeeds", &self.succeeds)
            .field("noop", &self.noop)
            .field("reprocessed", &self.reprocessed)
            .field("defines", &self.defines)
            .field("lacks", &self.lacks)
            .field("properties", &self.properties)
            .field("record", &self.record)
            .field("same_as", &self.same_as)
            .field("error", &self.error)
            .field("error_at", &self.error_at)
            .field("custom", &self.custom.len())
            .finish()
    }
}

impl Assertion {
    fn expects_error(&self) -> bool {
        self.error.is_some() || self.error_pattern.is_some() || self.error_at.is_some()
    }

    /// Verify the assertion against the result of a compile.
    pub fn verify(
        &self,
        step: &str,
        session: &Session,
        result: &SessionResult<CompileReport>,
        snapshots: &mut HashMap<String, Snapshot>,
    ) -> ScenarioResult<()> {
        if self.expects_error() && !self.succeeds {
            self.verify_error(step, result)?;
        } else {
            let report = match result {
                Ok(report) => report,
                Err(e) => {
                    return Err(ScenarioError::assertion_failed(
                        step,
                        format!("expected success, got: {}", e),
                    ))
                }
            };
            self.verify_report(step, report)?;
        }

        self.verify_graph(step, session)?;

        if let Some(ref name) = self.same_as {
            let expected = snapshots
                .get(name)
                .ok_or_else(|| ScenarioError::unknown_snapshot(name))?;
            let actual = Snapshot::of(session);
            if actual != *expected {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!(
                        "graph differs from snapshot '{}': size {} vs {}\n--- expected\n{}\n--- actual\n{}",
                        name, expected.size, actual.size, expected.text, actual.text
                    ),
                ));
            }
        }
        if let Some(ref name) = self.record {
            snapshots.insert(name.clone(), Snapshot::of(session));
        }

        for (index, custom) in self.custom.iter().enumerate() {
            if !custom(session) {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("custom assertion #{} failed", index + 1),
                ));
            }
        }
        Ok(())
    }

    fn verify_error(&self, step: &str, result: &SessionResult<CompileReport>) -> ScenarioResult<()> {
        let err = match result {
            Err(e) => e,
            Ok(_) => {
                return Err(ScenarioError::assertion_failed(
                    step,
                    "expected an error, but compile succeeded",
                ))
            }
        };
        let message = error_message(err);

        if let Some(ref expected) = self.error {
            if !message.contains(expected.as_str()) {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected error containing '{}', got: {}", expected, message),
                ));
            }
        }

        if let Some(ref pattern) = self.error_pattern {
            let re = regex_lite::Regex::new(pattern).map_err(|e| {
                ScenarioError::assertion_failed(step, format!("invalid regex pattern: {}", e))
            })?;
            if !re.is_match(&message) {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected error matching '{}', got: {}", pattern, message),
                ));
            }
        }

        if let Some((ref source, line)) = self.error_at {
            let info = err
                .as_compile_error()
                .and_then(CompileError::source_info)
                .ok_or_else(|| {
                    ScenarioError::assertion_failed(step, format!("error has no location: {}", err))
                })?;
            if info.source != *source || info.line() != line {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!(
                        "expected error at {}:{}, got {}:{}",
                        source,
                        line,
                        info.source,
                        info.line()
                    ),
                ));
            }
            if let Some(column) = self.error_column {
                if info.column() != column {
                    return Err(ScenarioError::assertion_failed(
                        step,
                        format!("expected error at column {}, got {}", column, info.column()),
                    ));
                }
            }
        }
        Ok(())
    }

    fn verify_report(&self, step: &str, report: &CompileReport) -> ScenarioResult<()> {
        if let Some(noop) = self.noop {
            if report.is_noop() != noop {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected noop = {}, got report {:?}", noop, report),
                ));
            }
        }
        if let Some(expected) = self.reprocessed {
            if report.reprocessed != expected {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected {} reprocessed, got {}", expected, report.reprocessed),
                ));
            }
        }
        if let Some(expected) = self.built_elements {
            if report.built_elements != expected {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected {} built elements, got {}", expected, report.built_elements),
                ));
            }
        }
        Ok(())
    }

    fn verify_graph(&self, step: &str, session: &Session) -> ScenarioResult<()> {
        for path in &self.defines {
            if session.graph().top_level(path).is_none() {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected '{}' to be defined", path),
                ));
            }
        }
        for path in &self.lacks {
            if session.graph().top_level(path).is_some() {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected '{}' to be gone", path),
                ));
            }
        }
        for (class, property) in &self.properties {
            if !exposes_property(session, class, property) {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected '{}' to expose property '{}'", class, property),
                ));
            }
        }
        for (class, property) in &self.missing_properties {
            if exposes_property(session, class, property) {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected '{}' not to expose property '{}'", class, property),
                ));
            }
        }
        Ok(())
    }
}

fn error_message(err: &SessionError) -> String {
    match err.as_compile_error() {
        Some(compile) => compile.message(),
        None => err.to_string(),
    }
}

/// Whether `class` has a property named `name`, declared, contributed by
/// an association or generated.
fn exposes_property(session: &Session, class: &str, name: &str) -> bool {
    let graph = session.graph();
    let Some(class) = graph.top_level(class) else {
        return false;
    };
    [
        m3::prop::PROPERTIES,
        m3::prop::PROPERTIES_FROM_ASSOCIATIONS,
        m3::prop::GENERATED_PROPERTIES,
    ]
    .iter()
    .flat_map(|property| graph.values(class, property))
    .any(|p| graph.string_value(*p, m3::prop::NAME) == Some(name))
}

/// Fluent builder for assertions.
#[derive(Debug, Default)]
pub struct AssertionBuilder {
    assertion: Assertion,
}

impl AssertionBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // ==================== Outcome ====================

    /// Assert that the compile succeeds.
    pub fn succeeds(mut self) -> Self {
        self.assertion.succeeds = true;
        self
    }

    /// Assert that the compile had nothing to do.
    pub fn noop(mut self) -> Self {
        self.assertion.noop = Some(true);
        self
    }

    /// Assert how many surviving elements were reprocessed.
    pub fn reprocessed(mut self, n: usize) -> Self {
        self.assertion.reprocessed = Some(n);
        self
    }

    /// Assert how many top-level elements were built.
    pub fn built(mut self, n: usize) -> Self {
        self.assertion.built_elements = Some(n);
        self
    }

    // ==================== Graph contents ====================

    pub fn defines(mut self, path: impl Into<String>) -> Self {
        self.assertion.defines.push(path.into());
        self
    }

    pub fn lacks(mut self, path: impl Into<String>) -> Self {
        self.assertion.lacks.push(path.into());
        self
    }

    pub fn has_property(mut self, class: impl Into<String>, property: impl Into<String>) -> Self {
        self.assertion.properties.push((class.into(), property.into()));
        self
    }

    pub fn lacks_property(mut self, class: impl Into<String>, property: impl Into<String>) -> Self {
        self.assertion
            .missing_properties
            .push((class.into(), property.into()));
        self
    }

    // ==================== Snapshots ====================

    /// Record the graph after this step under `name`.
    pub fn snapshot(mut self, name: impl Into<String>) -> Self {
        self.assertion.record = Some(name.into());
        self
    }

    /// Assert the graph serializes exactly as snapshot `name`.
    pub fn matches_snapshot(mut self, name: impl Into<String>) -> Self {
        self.assertion.same_as = Some(name.into());
        self
    }

    // ==================== Errors ====================

    /// Assert that the compile fails with a message containing `message`.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.assertion.error = Some(message.into());
        self
    }

    /// Assert that the compile fails with a message matching a regex.
    pub fn error_matching(mut self, pattern: impl Into<String>) -> Self {
        self.assertion.error_pattern = Some(pattern.into());
        self
    }

    /// Assert that the error is located in `source` at `line`.
    pub fn error_at(mut self, source: impl Into<String>, line: usize) -> Self {
        self.assertion.error_at = Some((source.into(), line));
        self
    }

    pub fn error_column(mut self, column: usize) -> Self {
        self.assertion.error_column = Some(column);
        self
    }

    // ==================== Custom ====================

    pub fn custom<F>(mut self, f: F) -> Self
    where
        F: Fn(&Session) -> bool + 'static,
    {
        self.assertion.custom.push(Box::new(f));
        self
    }

    pub fn build(self) -> Assertion {
        self.assertion
    }
}

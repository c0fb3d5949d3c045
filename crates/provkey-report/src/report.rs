//! The report tree: steps, statuses, and markdown rendering.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Maximum markdown heading level emitted for deeply nested steps.
const MAX_HEADING_LEVEL: usize = 6;

/// Outcome of a single verification step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Failure,
    NotRun,
    Skipped,
}

impl Status {
    /// The fixed human-readable marker used when rendering this status.
    fn marker(&self) -> &'static str {
        match self {
            Status::Success => "✅ **Success**",
            Status::Failure => "❌ **Failure**",
            Status::NotRun => "⚠️ **Not Run**",
            Status::Skipped => "⚠️ **Skipped**",
        }
    }
}

/// One node in a verification report.
///
/// A step owns its children exclusively; handles returned by
/// [`Step::add_step`] are plain mutable borrows into the parent's child
/// list. Steps are appended while a verification run is in progress and
/// treated as immutable once the run completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remarks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_steps: Vec<Step>,
}

impl Step {
    fn new(name: impl Into<String>, status: Status) -> Self {
        Self {
            name: name.into(),
            status,
            errors: Vec::new(),
            remarks: Vec::new(),
            sub_steps: Vec::new(),
        }
    }

    /// Appends a child step and returns a mutable handle to it so the
    /// caller can attach grandchildren, errors, or remarks.
    pub fn add_step(&mut self, name: impl Into<String>, status: Status) -> &mut Step {
        self.sub_steps.push(Step::new(name, status));
        self.sub_steps.last_mut().unwrap()
    }

    /// Records an error message on this step. Returns the step for chaining.
    pub fn error(&mut self, message: impl Into<String>) -> &mut Step {
        self.errors.push(message.into());
        self
    }

    /// Records an informational remark on this step.
    ///
    /// Remarks are rendered distinctly from errors and never affect the
    /// step's status or failure aggregation.
    pub fn remark(&mut self, message: impl Into<String>) -> &mut Step {
        self.remarks.push(message.into());
        self
    }

    /// True if this step failed or any descendant step failed.
    pub fn did_fail(&self) -> bool {
        self.status == Status::Failure || self.sub_steps.iter().any(Step::did_fail)
    }

    fn render(&self, depth: usize, output: &mut String) {
        let level = MAX_HEADING_LEVEL.min(depth + 2);
        let _ = writeln!(output, "{} {}", "#".repeat(level), self.name);
        output.push_str(self.status.marker());
        output.push('\n');
        for error in &self.errors {
            let _ = writeln!(output, "- {error}");
        }
        for remark in &self.remarks {
            output.push_str("> [!NOTE]\n");
            let _ = writeln!(output, "> {remark}");
        }
        for sub_step in &self.sub_steps {
            sub_step.render(depth + 1, output);
        }
    }
}

/// An ordered sequence of top-level verification steps.
///
/// A fresh report is created per verification run; besides the list of
/// verified versions it is the run's sole output artifact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    pub steps: Vec<Step>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a top-level step and returns a mutable handle to it.
    pub fn add_step(&mut self, name: impl Into<String>, status: Status) -> &mut Step {
        self.steps.push(Step::new(name, status));
        self.steps.last_mut().unwrap()
    }

    /// True if any step in the report, at any depth, has failure status.
    pub fn did_fail(&self) -> bool {
        self.steps.iter().any(Step::did_fail)
    }

    /// Renders the report as a markdown document.
    ///
    /// Rendering is pure and idempotent: calling it twice on an unmodified
    /// report yields byte-identical output, and appending a step only adds
    /// text after the existing steps' blocks. Each step emits a heading
    /// (level grows with nesting depth, starting at `##`), a status marker
    /// line, one bullet per error, one note block per remark, then its
    /// children in insertion order. Top-level step groups are separated by
    /// a blank line.
    pub fn render_markdown(&self) -> String {
        let mut output = String::new();
        for step in &self.steps {
            step.render(0, &mut output);
            output.push('\n');
        }
        output
    }
}

//! Hierarchical verification reports for the provkey registry tools.
//!
//! A verification run produces a [`Report`]: an ordered tree of named
//! [`Step`]s, each carrying a [`Status`], error messages, and informational
//! remarks. The tree supports recursive failure aggregation via
//! [`Report::did_fail`] and deterministic markdown rendering via
//! [`Report::render_markdown`], so the same report serves automation
//! (a single aggregate boolean) and maintainers reading review feedback.
//!
//! # Example
//!
//! ```
//! use provkey_report::{Report, Status};
//!
//! let mut report = Report::new();
//! let step = report.add_step("Verify signing key", Status::Success);
//! step.add_step("v1.2.0", Status::Success);
//! step.add_step("v1.1.0", Status::Failure)
//!     .error("failed to download checksum manifest");
//!
//! assert!(report.did_fail());
//! println!("{}", report.render_markdown());
//! ```

pub mod report;

pub use report::{Report, Status, Step};

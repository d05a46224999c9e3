//! harness::report
//!
//! Named, individually reportable check results.
//!
//! # Model
//!
//! Every component registers one [`CheckResult`] per named behavior. A
//! failed check never aborts its siblings. A [`FixtureReport`] collects the
//! checks of one fixture; a [`SuiteReport`] collects fixtures.
//!
//! Tolerated failures and reconciled fixtures pass, but carry warnings so
//! callers can inspect them without capturing stderr.

use std::fmt::Write as _;

use serde::Serialize;

use crate::core::types::{Fingerprint, FixtureName};
use crate::ui::output;

/// Outcome of one named check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum CheckOutcome {
    Passed,
    Failed(String),
}

/// One named check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub description: String,
    pub outcome: CheckOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl CheckResult {
    pub fn pass(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            outcome: CheckOutcome::Passed,
            warnings: Vec::new(),
        }
    }

    pub fn fail(description: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self {
            description: description.into(),
            outcome: CheckOutcome::Failed(reason.to_string()),
            warnings: Vec::new(),
        }
    }

    /// Pass or fail from a result.
    pub fn from_result<E: std::fmt::Display>(
        description: impl Into<String>,
        result: Result<(), E>,
    ) -> Self {
        match result {
            Ok(()) => Self::pass(description),
            Err(e) => Self::fail(description, e),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn passed(&self) -> bool {
        self.outcome == CheckOutcome::Passed
    }

    /// Failure message, if failed.
    pub fn failure(&self) -> Option<&str> {
        match &self.outcome {
            CheckOutcome::Passed => None,
            CheckOutcome::Failed(msg) => Some(msg),
        }
    }
}

/// All checks of one fixture run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureReport {
    pub name: FixtureName,
    pub version: u32,
    pub fingerprint: Fingerprint,
    pub checks: Vec<CheckResult>,
}

impl FixtureReport {
    pub fn new(name: FixtureName, version: u32, fingerprint: Fingerprint) -> Self {
        Self {
            name,
            version,
            fingerprint,
            checks: Vec::new(),
        }
    }

    pub fn push(&mut self, check: CheckResult) {
        self.checks.push(check);
    }

    pub fn extend(&mut self, checks: impl IntoIterator<Item = CheckResult>) {
        self.checks.extend(checks);
    }

    pub fn passed(&self) -> bool {
        self.checks.iter().all(CheckResult::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.checks
            .iter()
            .flat_map(|c| c.warnings.iter().map(String::as_str))
    }

    /// Look up a check by description.
    pub fn check(&self, description: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.description == description)
    }

    /// Panic listing every failed check. For use from test runners.
    #[track_caller]
    pub fn assert_passed(&self) {
        if !self.passed() {
            let failures: Vec<String> = self
                .failures()
                .map(|c| format!("{}: {}", c.description, c.failure().unwrap_or_default()))
                .collect();
            panic!(
                "fixture v{} {} failed {} check(s):\n{}",
                self.version,
                self.name,
                failures.len(),
                output::format_list(&failures, "  - ")
            );
        }
    }

    fn format_into(&self, out: &mut String) {
        let _ = writeln!(
            out,
            "v{} {} ({})",
            self.version,
            self.name,
            self.fingerprint.short()
        );
        for check in &self.checks {
            let _ = writeln!(
                out,
                "  {:<6}  {}",
                output::status_marker(check.passed()),
                check.description
            );
            if let Some(msg) = check.failure() {
                let _ = writeln!(out, "          {msg}");
            }
            for warning in &check.warnings {
                let _ = writeln!(out, "          warning: {warning}");
            }
        }
    }
}

/// A fixture that could not be run at all (bad payload, unreadable file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFixture {
    pub name: String,
    pub version: u32,
    pub reason: String,
}

/// Aggregate of a suite run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    pub fixtures: Vec<FixtureReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedFixture>,
}

impl SuiteReport {
    pub fn passed(&self) -> bool {
        self.skipped.is_empty() && self.fixtures.iter().all(FixtureReport::passed)
    }

    pub fn check_count(&self) -> usize {
        self.fixtures.iter().map(|f| f.checks.len()).sum()
    }

    pub fn failure_count(&self) -> usize {
        self.fixtures.iter().map(|f| f.failures().count()).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.fixtures.iter().map(|f| f.warnings().count()).sum()
    }

    /// Human-readable report.
    pub fn format(&self) -> String {
        let mut out = String::new();
        for fixture in &self.fixtures {
            fixture.format_into(&mut out);
        }
        for skipped in &self.skipped {
            let _ = writeln!(
                out,
                "v{} {} skipped: {}",
                skipped.version, skipped.name, skipped.reason
            );
        }
        let _ = write!(
            out,
            "summary: {} fixture(s), {} check(s), {} failed, {} warning(s)",
            self.fixtures.len(),
            self.check_count(),
            self.failure_count(),
            self.warning_count()
        );
        if !self.skipped.is_empty() {
            let _ = write!(out, ", {} skipped", self.skipped.len());
        }
        out
    }

    /// JSON report.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> FixtureReport {
        let mut report = FixtureReport::new(
            FixtureName::new("chain").unwrap(),
            9,
            Fingerprint::of(b""),
        );
        report.push(CheckResult::pass("re-encodes identically"));
        report.push(
            CheckResult::pass("default decodes: system.account: AccountInfo")
                .with_warning("tolerated: decode failed"),
        );
        report.push(CheckResult::fail("converts to latest", "boom"));
        report
    }

    #[test]
    fn counts() {
        let suite = SuiteReport {
            fixtures: vec![report()],
            skipped: vec![],
        };
        assert!(!suite.passed());
        assert_eq!(suite.check_count(), 3);
        assert_eq!(suite.failure_count(), 1);
        assert_eq!(suite.warning_count(), 1);
    }

    #[test]
    fn lookup_by_description() {
        let r = report();
        assert!(r.check("re-encodes identically").unwrap().passed());
        assert_eq!(r.check("converts to latest").unwrap().failure(), Some("boom"));
        assert!(r.check("missing").is_none());
    }

    #[test]
    #[should_panic(expected = "converts to latest: boom")]
    fn assert_passed_lists_failures() {
        report().assert_passed();
    }

    #[test]
    fn format_snapshot() {
        let suite = SuiteReport {
            fixtures: vec![report()],
            skipped: vec![SkippedFixture {
                name: "broken".into(),
                version: 14,
                reason: "invalid hex payload".into(),
            }],
        };
        insta::assert_snapshot!(suite.format(), @r"
        v9 chain (e3b0c44298fc)
          ok      re-encodes identically
          ok      default decodes: system.account: AccountInfo
                  warning: tolerated: decode failed
          FAILED  converts to latest
                  boom
        v14 broken skipped: invalid hex payload
        summary: 1 fixture(s), 3 check(s), 1 failed, 1 warning(s), 1 skipped
        ");
    }

    #[test]
    fn json_shape() {
        let suite = SuiteReport {
            fixtures: vec![report()],
            skipped: vec![],
        };
        let value: serde_json::Value = serde_json::from_str(&suite.to_json().unwrap()).unwrap();
        let checks = &value["fixtures"][0]["checks"];
        assert_eq!(checks[0]["outcome"]["status"], "passed");
        assert_eq!(checks[2]["outcome"]["status"], "failed");
        assert_eq!(checks[2]["outcome"]["message"], "boom");
        assert!(checks[0].get("warnings").is_none());
        assert!(value.get("skipped").is_none());
    }
}

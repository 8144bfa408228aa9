//! Suite runner: bootstraps the session, runs every step in order, checks the
//! console after each one and captures a report when one fails

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::browser::Browser;
use crate::config::{Backend, SuiteConfig};
use crate::diagnostics::{check_console_errors, FailureReporter};
use crate::error::E2eResult;
use crate::session::{ExtensionTarget, Session};
use crate::walkthrough::{Step, StepGroup, Walkthrough};

/// Result of running a single step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub console_errors: Vec<String>,
    pub report_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupResult {
    pub name: String,
    pub success: bool,
    pub steps: Vec<StepResult>,
    pub skipped: Vec<String>,
}

/// Result of the whole suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub backend: Backend,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub groups: Vec<GroupResult>,
}

impl SuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }
}

pub struct SuiteRunner {
    config: SuiteConfig,
}

impl SuiteRunner {
    pub fn new(config: SuiteConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Start a browser session, run the suite and close the session.
    /// Setup failures are returned as errors; step failures are recorded in
    /// the result.
    pub async fn run(&self) -> E2eResult<SuiteResult> {
        self.config.validate()?;

        let session = Session::bootstrap(&self.config).await?;
        self.run_session(session).await
    }

    /// Run the suite on a prepared session and close it, whatever the outcome
    pub async fn run_session(&self, session: Session) -> E2eResult<SuiteResult> {
        let result = self
            .run_with(session.browser(), session.target().clone())
            .await;

        if let Err(e) = session.close().await {
            warn!("Failed to close browser session: {}", e);
        }
        result
    }

    /// Run every group against an already prepared browser
    pub async fn run_with(
        &self,
        browser: Arc<dyn Browser>,
        target: ExtensionTarget,
    ) -> E2eResult<SuiteResult> {
        let start = Instant::now();
        let backend = target.backend;
        let reporter = FailureReporter::new(self.config.artifacts_dir(), backend);
        let mut walkthrough = Walkthrough::new(browser.clone(), target, &self.config)?;

        let mut groups = Vec::new();
        let mut halted = false;

        for group in StepGroup::ALL {
            info!("{}", group.title());

            let mut steps = Vec::new();
            let mut skipped = Vec::new();
            let mut group_failed = false;

            for step in group.steps() {
                if halted || group_failed {
                    skipped.push(step.title().to_string());
                    continue;
                }

                let result = self
                    .run_step(&mut walkthrough, *step, browser.as_ref(), backend, &reporter)
                    .await;

                if result.success {
                    info!("  ✓ {} ({} ms)", result.name, result.duration_ms);
                } else {
                    error!(
                        "  ✗ {} - {}",
                        result.name,
                        result.error.as_deref().unwrap_or("unknown error")
                    );
                    group_failed = true;
                    if self.config.bail() {
                        halted = true;
                    }
                }
                steps.push(result);
            }

            groups.push(GroupResult {
                name: group.title().to_string(),
                success: !group_failed && skipped.is_empty(),
                steps,
                skipped,
            });
        }

        let passed = count_steps(&groups, |s| s.success);
        let failed = count_steps(&groups, |s| !s.success);
        let skipped: usize = groups.iter().map(|g| g.skipped.len()).sum();
        let duration_ms = start.elapsed().as_millis() as u64;

        info!("");
        info!(
            "Walkthrough results: {} passed, {} failed, {} skipped ({} ms)",
            passed, failed, skipped, duration_ms
        );

        Ok(SuiteResult {
            backend,
            total: passed + failed + skipped,
            passed,
            failed,
            skipped,
            duration_ms,
            groups,
        })
    }

    async fn run_step(
        &self,
        walkthrough: &mut Walkthrough,
        step: Step,
        browser: &dyn Browser,
        backend: Backend,
        reporter: &FailureReporter,
    ) -> StepResult {
        let start = Instant::now();
        let outcome = walkthrough.execute(step).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        // Console errors are reported, never fatal
        let console_errors = match check_console_errors(browser, backend, &self.config.console).await {
            Ok(entries) => entries.into_iter().map(|e| e.message).collect::<Vec<_>>(),
            Err(e) => {
                warn!("Could not read browser console after '{}': {}", step.title(), e);
                Vec::new()
            }
        };
        if !console_errors.is_empty() {
            error!(
                "Errors found in browser console:\n{}",
                console_errors.join("\n")
            );
        }

        match outcome {
            Ok(()) => StepResult {
                name: step.title().to_string(),
                success: true,
                duration_ms,
                error: None,
                console_errors,
                report_dir: None,
            },
            Err(e) => {
                let message = e.to_string();
                let report_dir = match reporter.capture(browser, step.title(), &message).await {
                    Ok((dir, _)) => Some(dir),
                    Err(report_err) => {
                        warn!("Could not write failure report for '{}': {}", step.title(), report_err);
                        None
                    }
                };
                StepResult {
                    name: step.title().to_string(),
                    success: false,
                    duration_ms,
                    error: Some(message),
                    console_errors,
                    report_dir,
                }
            }
        }
    }

    /// Write suite results to `<output_dir>/test-results.json`
    pub fn write_results(&self, results: &SuiteResult) -> E2eResult<PathBuf> {
        let output_dir = self.config.output_dir();
        std::fs::create_dir_all(&output_dir)?;

        let path = output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

fn count_steps(groups: &[GroupResult], predicate: impl Fn(&StepResult) -> bool) -> usize {
    groups
        .iter()
        .flat_map(|g| g.steps.iter())
        .filter(|&s| predicate(s))
        .count()
}

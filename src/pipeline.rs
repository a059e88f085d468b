//! The item pipeline: drives every data item of one browser handle through
//! the fixed Copy → Parse → Release → Output sequence.
//!
//! Fail-open by contract: a stage failure is recorded and logged, and the
//! pipeline still runs every remaining stage of the item and every remaining
//! item. The target data (live, possibly locked, version-varying browser
//! stores) makes partial success the common case, so the run always attempts
//! maximal recovery instead of aborting on the first obstacle.

use tracing::{debug, error};

use crate::browser::BrowserAgent;
use crate::error::{ExtractResult, Stage};
use crate::items::ItemKind;
use crate::output::OutputSink;

/// Result of one stage attempt. A pure diagnostics side channel: outcomes
/// never gate the next transition.
#[derive(Debug)]
pub struct StageOutcome {
    pub stage: Stage,
    pub error: Option<String>,
}

impl StageOutcome {
    pub fn ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Diagnostics for one item's pass through the pipeline.
#[derive(Debug)]
pub struct ItemReport {
    pub kind: ItemKind,
    pub stages: Vec<StageOutcome>,
}

impl ItemReport {
    fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            stages: Vec::with_capacity(Stage::ALL.len()),
        }
    }

    pub fn fully_succeeded(&self) -> bool {
        self.stages.iter().all(StageOutcome::ok)
    }

    fn record(&mut self, browser: &str, stage: Stage, result: ExtractResult<()>) {
        let error = match result {
            Ok(()) => None,
            Err(e) => {
                error!("{}: {} {} stage failed: {}", browser, self.kind, stage, e);
                Some(e.to_string())
            }
        };
        self.stages.push(StageOutcome { stage, error });
    }
}

/// Run the full pipeline for one browser handle. Always returns; failures
/// surface only through logs and the returned reports.
pub fn run_browser(browser: &mut dyn BrowserAgent, sink: &mut OutputSink<'_>) -> Vec<ItemReport> {
    let name = browser.name().to_string();

    // A failed unlock does not stop item processing; parsing continues with
    // whatever key state resulted.
    if let Err(e) = browser.unlock_key() {
        error!("{}: {}", name, e);
    }

    let items = match browser.list_items() {
        Ok(items) => items,
        Err(e) => {
            error!("{}: item enumeration failed: {}", name, e);
            return Vec::new();
        }
    };
    debug!("{}: processing {} items", name, items.len());

    let mut reports = Vec::with_capacity(items.len());
    for mut item in items {
        let mut report = ItemReport::new(item.kind());

        // Every stage fires regardless of what the previous ones did.
        report.record(&name, Stage::Copy, item.copy());
        report.record(&name, Stage::Parse, item.parse(browser.secret_key()));
        report.record(&name, Stage::Release, item.release());
        report.record(&name, Stage::Output, item.output(&name, sink));

        reports.push(report);
    }
    reports
}

//! Top-level run coordination.
//!
//! Resolves browsers, drives the item pipeline per handle in order, then
//! finalizes: archive the export directory, or emit the combined report.
//! No handle, item or stage failure ever aborts the run.

use tracing::{debug, error, info};

use crate::archive;
use crate::browser::BrowserAgent;
use crate::catalog;
use crate::config::RunConfig;
use crate::output::OutputSink;
use crate::pipeline;
use crate::report::ResultAggregate;
use crate::snapshot;

pub fn execute(cfg: &RunConfig) {
    if let Err(e) = snapshot::ensure_dir(&cfg.export_dir) {
        error!("cannot create export dir {:?}: {}", cfg.export_dir, e);
    }

    // A supplied profile override bypasses default discovery entirely.
    let resolved = match &cfg.profile_override {
        Some(profile) => {
            catalog::resolve_custom(&cfg.browser, profile, cfg.key_override.as_deref())
        }
        None => catalog::resolve(&cfg.browser),
    };

    let mut browsers: Vec<Box<dyn BrowserAgent>> = match resolved {
        Ok(browsers) => browsers,
        Err(e) => {
            // Selection failures are non-fatal: the run proceeds with zero
            // handles and still produces its configured output.
            error!("{}", e);
            error!("available browsers: all|{}", catalog::list().join("|"));
            Vec::new()
        }
    };
    info!("resolved {} browser(s) for filter {:?}", browsers.len(), cfg.browser);

    let mut aggregate = cfg.all_in_one.then(ResultAggregate::new);

    for browser in browsers.iter_mut() {
        let mut sink = match aggregate.as_mut() {
            Some(aggregate) => OutputSink::Aggregate(aggregate),
            None => OutputSink::Files {
                format: cfg.format,
                dir: &cfg.export_dir,
            },
        };

        let reports = pipeline::run_browser(browser.as_mut(), &mut sink);
        for report in reports.iter().filter(|r| !r.fully_succeeded()) {
            let failed: Vec<String> = report
                .stages
                .iter()
                .filter(|s| !s.ok())
                .map(|s| s.stage.to_string())
                .collect();
            debug!(
                "{}: {} item had stage failures: {}",
                browser.name(),
                report.kind,
                failed.join(", ")
            );
        }
        let clean = reports.iter().filter(|r| r.fully_succeeded()).count();
        info!(
            "{}: {} item(s) processed, {} without any stage failure",
            browser.name(),
            reports.len(),
            clean
        );
    }

    // Combined-report runs have no per-file outputs to archive.
    if cfg.compress && !cfg.all_in_one {
        if let Err(e) = archive::compress_dir(&cfg.export_dir) {
            error!("{}", e);
        }
    }

    if let Some(aggregate) = aggregate {
        println!("{}", aggregate.finish());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use std::path::PathBuf;

    fn base_config(dir: PathBuf) -> RunConfig {
        RunConfig::new(
            "no-such-browser".to_string(),
            dir,
            OutputFormat::Csv,
            false,
            false,
            None,
            None,
        )
    }

    #[test]
    fn unknown_browser_completes_without_panicking() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = base_config(tmp.path().join("results"));
        execute(&cfg);
        // export dir is still created for a zero-handle run
        assert!(tmp.path().join("results").is_dir());
    }

    #[test]
    fn compress_skipped_in_combined_mode() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = base_config(tmp.path().join("results"));
        cfg.all_in_one = true;
        cfg.compress = true;
        cfg.format = OutputFormat::Aggregate;
        execute(&cfg);
        assert!(!tmp.path().join("results.tar.gz").exists());
    }

    #[test]
    fn compress_produces_archive_in_file_mode() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = base_config(tmp.path().join("results"));
        cfg.compress = true;
        execute(&cfg);
        assert!(tmp.path().join("results.tar.gz").exists());
    }
}

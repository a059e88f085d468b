//! Output stage serializers.
//!
//! A sink is either the export directory (one file per browser/item pair)
//! or, in combined-report mode, the run's aggregate. The pipeline never
//! knows which; it just hands records to the sink.

use std::path::Path;

use crate::config::OutputFormat;
use crate::error::{ExtractError, ExtractResult};
use crate::items::{ItemKind, Records};
use crate::report::ResultAggregate;

pub enum OutputSink<'a> {
    Files {
        format: OutputFormat,
        dir: &'a Path,
    },
    Aggregate(&'a mut ResultAggregate),
}

impl OutputSink<'_> {
    pub fn write(
        &mut self,
        browser: &str,
        kind: ItemKind,
        records: &Records,
    ) -> ExtractResult<()> {
        match self {
            OutputSink::Files { format, dir } => write_file(*format, dir, browser, kind, records),
            OutputSink::Aggregate(aggregate) => {
                let value = serde_json::to_value(records).map_err(|e| ExtractError::Output {
                    kind,
                    reason: e.to_string(),
                })?;
                aggregate.insert(entry_key(browser, kind), value);
                Ok(())
            }
        }
    }
}

/// Aggregate key / export file stem: `<browser>_<kind>`.
fn entry_key(browser: &str, kind: ItemKind) -> String {
    format!("{}_{}", slug(browser), kind.label())
}

fn slug(name: &str) -> String {
    name.to_lowercase().replace([' ', '/'], "-")
}

fn write_file(
    format: OutputFormat,
    dir: &Path,
    browser: &str,
    kind: ItemKind,
    records: &Records,
) -> ExtractResult<()> {
    if format == OutputFormat::Console {
        // Console output goes straight to stdout instead of a file.
        println!("=== {} {} ({} records) ===", browser, kind, records.len());
        if !records.is_empty() {
            let body = serde_json::to_string_pretty(records).map_err(|e| ExtractError::Output {
                kind,
                reason: e.to_string(),
            })?;
            println!("{}", body);
        }
        return Ok(());
    }

    let body = match format {
        OutputFormat::Csv => records.to_csv(),
        _ => serde_json::to_string_pretty(records).map_err(|e| ExtractError::Output {
            kind,
            reason: e.to_string(),
        })?,
    };

    let path = dir.join(format!("{}.{}", entry_key(browser, kind), format.extension()));
    std::fs::write(&path, body).map_err(|e| ExtractError::Output {
        kind,
        reason: format!("cannot write {:?}: {}", path, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::Password;

    fn sample_records() -> Records {
        Records::Passwords(vec![Password {
            url: "https://example.com".into(),
            username: "alice".into(),
            password: "p4ss".into(),
            created_at: 1_700_000_000,
        }])
    }

    #[test]
    fn csv_sink_writes_one_file_per_item() {
        let tmp = tempfile::tempdir().unwrap();
        let mut sink = OutputSink::Files {
            format: OutputFormat::Csv,
            dir: tmp.path(),
        };
        sink.write("chrome", ItemKind::Passwords, &sample_records())
            .unwrap();

        let path = tmp.path().join("chrome_password.csv");
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("url,username,password,created_at\n"));
        assert!(content.contains("\"alice\""));
    }

    #[test]
    fn json_sink_writes_record_array() {
        let tmp = tempfile::tempdir().unwrap();
        let mut sink = OutputSink::Files {
            format: OutputFormat::Json,
            dir: tmp.path(),
        };
        sink.write("chrome", ItemKind::Passwords, &sample_records())
            .unwrap();

        let content =
            std::fs::read_to_string(tmp.path().join("chrome_password.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed[0]["username"], "alice");
    }

    #[test]
    fn aggregate_sink_appends_entries() {
        let mut aggregate = ResultAggregate::new();
        let mut sink = OutputSink::Aggregate(&mut aggregate);
        sink.write("chrome", ItemKind::Passwords, &sample_records())
            .unwrap();
        sink.write("firefox", ItemKind::History, &Records::empty(ItemKind::History))
            .unwrap();
        assert_eq!(aggregate.len(), 2);
    }

    #[test]
    fn missing_export_dir_is_an_output_error() {
        let mut sink = OutputSink::Files {
            format: OutputFormat::Csv,
            dir: Path::new("/nonexistent/results"),
        };
        let err = sink
            .write("chrome", ItemKind::Passwords, &sample_records())
            .unwrap_err();
        assert!(matches!(err, ExtractError::Output { .. }));
    }
}

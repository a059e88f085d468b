//! Run configuration assembled from the command line.

use std::path::PathBuf;

/// How extracted records leave the process.
///
/// `Aggregate` is never selected by name on the command line; it is forced
/// whenever the combined single-line report is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
    Console,
    Aggregate,
}

impl OutputFormat {
    pub fn parse(name: &str) -> Option<OutputFormat> {
        match name {
            "csv" => Some(OutputFormat::Csv),
            "json" => Some(OutputFormat::Json),
            "console" => Some(OutputFormat::Console),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            _ => "json",
        }
    }
}

#[derive(Debug)]
pub struct RunConfig {
    /// Browser filter: "all" or one catalog name.
    pub browser: String,
    pub export_dir: PathBuf,
    pub format: OutputFormat,
    pub all_in_one: bool,
    pub compress: bool,
    /// Custom profile directory; set means no default discovery.
    pub profile_override: Option<PathBuf>,
    /// Custom key material file, used instead of the platform key store.
    pub key_override: Option<PathBuf>,
}

impl RunConfig {
    pub fn new(
        browser: String,
        export_dir: PathBuf,
        format: OutputFormat,
        all_in_one: bool,
        compress: bool,
        profile_override: Option<PathBuf>,
        key_override: Option<PathBuf>,
    ) -> Self {
        // The combined report replaces per-file output entirely.
        let format = if all_in_one {
            OutputFormat::Aggregate
        } else {
            format
        };
        RunConfig {
            browser,
            export_dir,
            format,
            all_in_one,
            compress,
            profile_override,
            key_override,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_formats_parse() {
        assert_eq!(OutputFormat::parse("csv"), Some(OutputFormat::Csv));
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("console"), Some(OutputFormat::Console));
        assert_eq!(OutputFormat::parse("xml"), None);
    }

    #[test]
    fn combined_mode_overrides_the_format() {
        let cfg = RunConfig::new(
            "all".to_string(),
            PathBuf::from("results"),
            OutputFormat::Csv,
            true,
            false,
            None,
            None,
        );
        assert_eq!(cfg.format, OutputFormat::Aggregate);
    }

    #[test]
    fn file_mode_keeps_the_requested_format() {
        let cfg = RunConfig::new(
            "chrome".to_string(),
            PathBuf::from("results"),
            OutputFormat::Json,
            false,
            true,
            None,
            None,
        );
        assert_eq!(cfg.format, OutputFormat::Json);
        assert!(cfg.compress);
    }
}

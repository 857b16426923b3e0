use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{ExecExamConfig, ExtractSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "execexam",
    about = "Diagnose failing tests of an executable examination"
)]
struct ExecExamCli {
    /// pytest-json-report document of the finished run.
    report: PathBuf,

    /// Captured console output, including `EXECEXAM_EVENT` lines.
    #[arg(long = "events")]
    events: Option<PathBuf>,

    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[arg(
        long = "verbose",
        default_value_t = false,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = clap::value_parser!(bool)
    )]
    verbose: bool,

    #[arg(
        long = "debug",
        default_value_t = false,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = clap::value_parser!(bool)
    )]
    debug: bool,

    #[arg(long = "path-levels", alias = "pathLevels")]
    path_levels: Option<usize>,

    #[arg(long = "label", value_delimiter = ',')]
    labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    pub report: PathBuf,
    pub events: Option<PathBuf>,
    pub format: OutputFormat,
    pub verbose: bool,
    pub debug: bool,
    pub path_levels: Option<usize>,
    pub labels: Vec<String>,
}

pub fn parse_args<I, T>(argv: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = ExecExamCli::try_parse_from(argv)?;
    Ok(ParsedArgs {
        report: cli.report,
        events: cli.events,
        format: cli.format,
        verbose: cli.verbose,
        debug: cli.debug,
        path_levels: cli.path_levels,
        labels: cli.labels,
    })
}

impl ParsedArgs {
    /// Config values overridden by whatever was given on the command line.
    pub fn settings(&self, config: &ExecExamConfig) -> ExtractSettings {
        let mut settings = ExtractSettings::from_config(config);
        settings.verbose |= self.verbose;
        if let Some(levels) = self.path_levels {
            settings.path_levels = levels;
        }
        if !self.labels.is_empty() {
            settings.console_labels = self.labels.clone();
        }
        settings
    }
}

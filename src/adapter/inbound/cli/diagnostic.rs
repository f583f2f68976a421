//! Miette diagnostics for CLI error presentation.
//!
//! [`report`] turns a crate [`Error`] into a rendered diagnostic with an
//! error code and, where the operator can do something about it, a hint.
//! Config parse failures also show the offending span of the file.

use std::fmt;
use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::error::{ConfigError, Error, SettlementError, ValidationError};

/// Configuration file that failed to parse.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(fglpool::config))]
pub struct ConfigDiagnostic {
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: SourceSpan,

    #[help]
    pub help: Option<String>,
}

impl ConfigDiagnostic {
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        name: impl AsRef<str>,
        src: impl Into<String>,
        span: std::ops::Range<usize>,
    ) -> Self {
        Self {
            message: message.into(),
            src: NamedSource::new(name, src.into()),
            span: span.into(),
            help: None,
        }
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Any other command failure, tagged with a category code.
#[derive(Debug)]
pub struct CommandDiagnostic {
    message: String,
    code: &'static str,
    help: Option<String>,
}

impl CommandDiagnostic {
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            help: None,
        }
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl fmt::Display for CommandDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CommandDiagnostic {}

impl Diagnostic for CommandDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }
}

/// Build the diagnostic shown for `err`. `config_path` is re-read to show
/// the source of a config parse failure.
#[must_use]
pub fn report(err: Error, config_path: &Path) -> miette::Report {
    if let Error::Config(ConfigError::Parse(parse)) = &err {
        if let (Some(span), Ok(src)) = (parse.span(), std::fs::read_to_string(config_path)) {
            let diagnostic = ConfigDiagnostic::new(
                parse.message().to_string(),
                config_path.display().to_string(),
                src,
                span,
            )
            .with_help("see config.example.toml for the expected layout");
            return miette::Report::new(diagnostic);
        }
    }
    miette::Report::new(classify(&err))
}

/// Map an error to its code and operator hint.
#[must_use]
pub fn classify(err: &Error) -> CommandDiagnostic {
    let message = err.to_string();
    match err {
        Error::Config(_) => CommandDiagnostic::new("fglpool::config", message)
            .with_help("fix the file given by --config or remove it to use defaults"),
        Error::NoSeason => CommandDiagnostic::new("fglpool::season", message)
            .with_help("run `fglpool init` first"),
        Error::Validation(inner) => validation(inner, message),
        Error::Settlement(inner) => settlement(inner, message),
        Error::Consistency(_) => CommandDiagnostic::new("fglpool::consistency", message)
            .with_help("nothing was written; check the pool's recorded adjustments"),
        Error::Domain(_) => CommandDiagnostic::new("fglpool::invalid", message),
        Error::Json(_) | Error::Parse(_) => CommandDiagnostic::new("fglpool::parse", message),
        Error::Io(_) => CommandDiagnostic::new("fglpool::io", message),
        Error::Connection(_) | Error::Database(_) => {
            CommandDiagnostic::new("fglpool::store", message)
                .with_help("check the --db path or FGLPOOL_DATABASE")
        }
    }
}

fn validation(err: &ValidationError, message: String) -> CommandDiagnostic {
    let diagnostic = CommandDiagnostic::new("fglpool::admission", message);
    match err {
        ValidationError::StakeExceedsAllowance { .. } => {
            diagnostic.with_help("see what is left with `fglpool allowance`")
        }
        ValidationError::DeadlinePassed { .. } => {
            diagnostic.with_help("wagers can only be placed or edited before the deadline")
        }
        ValidationError::GameweekSettled(_) => {
            diagnostic.with_help("results are in for that gameweek; bet on the next one")
        }
        ValidationError::UnknownGameweek(_) | ValidationError::GameNotInGameweek { .. } => {
            diagnostic.with_help("list gameweeks with `fglpool gameweek list`")
        }
        _ => diagnostic,
    }
}

fn settlement(err: &SettlementError, message: String) -> CommandDiagnostic {
    let diagnostic = CommandDiagnostic::new("fglpool::settlement", message);
    match err {
        SettlementError::ResultsIncomplete { pending, .. } => {
            let games: Vec<&str> = pending.iter().map(|g| g.as_str()).collect();
            diagnostic.with_help(format!("still waiting on: {}", games.join(", ")))
        }
        SettlementError::PreviousIncomplete(gw) => {
            diagnostic.with_help(format!("post the remaining results for gameweek {gw}"))
        }
        _ => diagnostic,
    }
}

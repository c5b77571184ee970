use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("Failed to parse KDL")]
    #[diagnostic(code(kbmapper::config::parse_error))]
    ParseError {
        #[source_code]
        src: String,
        #[label("here")]
        span: miette::SourceSpan,
        #[source]
        source: kdl::KdlError,
    },

    #[error("Invalid stimulus '{stimulus}': {reason}")]
    #[diagnostic(
        code(kbmapper::config::invalid_stimulus),
        help("Stimuli are either LidOpen, LidClose, HeadphonesIn, HeadphonesOut or key names joined with '+'")
    )]
    InvalidStimulus {
        stimulus: String,
        reason: String,
        #[source_code]
        src: String,
        #[label("this section")]
        span: miette::SourceSpan,
    },

    #[error("Field '{field}' of section '{stimulus}' must have a single string value")]
    #[diagnostic(code(kbmapper::config::invalid_field))]
    InvalidField {
        stimulus: String,
        field: String,
        #[source_code]
        src: String,
        #[label("here")]
        span: miette::SourceSpan,
    },

    #[error("Field '{field}' is set more than once in section '{stimulus}'")]
    #[diagnostic(code(kbmapper::config::duplicate_field))]
    DuplicateField {
        stimulus: String,
        field: String,
        #[source_code]
        src: String,
        #[label("second definition")]
        span: miette::SourceSpan,
    },

    #[error("No configuration found (looked at {primary} and {fragments})")]
    #[diagnostic(
        code(kbmapper::config::not_found),
        help("Create the primary file or add at least one fragment file")
    )]
    NoConfiguration { primary: String, fragments: String },

    #[error("Failed to read {path}")]
    #[diagnostic(code(kbmapper::config::io))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

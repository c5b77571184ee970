//! KDL configuration parser
//!
//! Every top-level node is a section. The node name is the stimulus and its
//! children are the section fields:
//!
//! ```kdl
//! "Control+Alt+t" {
//!     Exec "alacritty"
//!     WorkingDirectory "~"
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::model::{Section, SectionCollection, CHORD_SEPARATOR};

/// Span of a node's name, converted from kdl's miette version to ours
fn node_span(node: &kdl::KdlNode) -> miette::SourceSpan {
    let span = node.name().span();
    miette::SourceSpan::from((span.offset(), span.len()))
}

/// Parse a configuration file into a section collection
pub fn parse_file(path: &Path) -> Result<SectionCollection, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&content, path)
}

/// Parse configuration text. `source` is recorded on the collection.
///
/// Only a KDL syntax error fails the whole text. Sections with a bad
/// stimulus or bad fields are left out and their errors kept in
/// [`SectionCollection::errors`].
pub fn parse_str(content: &str, source: &Path) -> Result<SectionCollection, ConfigError> {
    let doc: kdl::KdlDocument = content.parse().map_err(|e: kdl::KdlError| {
        let span = miette::SourceSpan::from((e.span.offset(), e.span.len()));
        ConfigError::ParseError {
            src: content.to_string(),
            span,
            source: e,
        }
    })?;

    let mut collection = SectionCollection::new(source);

    for node in doc.nodes() {
        // An invalid section is dropped on its own, the rest of the file still loads
        let section = match parse_section(node, content) {
            Ok(section) => section,
            Err(error) => {
                tracing::warn!("{}: skipping section: {}", source.display(), error);
                collection.errors.push(error);
                continue;
            }
        };

        if collection.sections.contains_key(&section.stimulus) {
            tracing::warn!(
                "{}: section '{}' is defined more than once, keeping the first",
                source.display(),
                section.stimulus
            );
            continue;
        }

        if section.command().is_none() {
            tracing::warn!(
                "{}: section '{}' has no Exec and will never run",
                source.display(),
                section.stimulus
            );
        }

        collection
            .sections
            .insert(section.stimulus.clone(), section);
    }

    Ok(collection)
}

fn parse_section(node: &kdl::KdlNode, source: &str) -> Result<Section, ConfigError> {
    let stimulus = node.name().value().to_string();

    if let Err(reason) = validate_stimulus(&stimulus) {
        return Err(ConfigError::InvalidStimulus {
            stimulus,
            reason,
            src: source.to_string(),
            span: node_span(node),
        });
    }

    let mut fields: HashMap<&str, String> = HashMap::new();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            let field = child.name().value();
            if !matches!(field, "Exec" | "User" | "WorkingDirectory") {
                tracing::warn!("Unknown field '{}' in section '{}'", field, stimulus);
                continue;
            }

            let value = match child.entries() {
                [entry] if entry.name().is_none() => entry.value().as_string(),
                _ => None,
            };
            let Some(value) = value else {
                return Err(ConfigError::InvalidField {
                    stimulus,
                    field: field.to_string(),
                    src: source.to_string(),
                    span: node_span(child),
                });
            };

            if fields.insert(field, value.to_string()).is_some() {
                return Err(ConfigError::DuplicateField {
                    stimulus,
                    field: field.to_string(),
                    src: source.to_string(),
                    span: node_span(child),
                });
            }
        }
    }

    Ok(Section {
        stimulus,
        exec: fields.remove("Exec"),
        user: fields.remove("User"),
        working_directory: fields
            .remove("WorkingDirectory")
            .map(|dir| PathBuf::from(shellexpand::tilde(&dir).into_owned())),
    })
}

/// Check the shape of a stimulus identifier.
///
/// Switch names and chords share one namespace, so the only structural rule
/// is that a chord has no empty key names.
fn validate_stimulus(stimulus: &str) -> Result<(), String> {
    if stimulus.trim().is_empty() {
        return Err("empty identifier".to_string());
    }

    if stimulus.split(CHORD_SEPARATOR).any(|part| part.trim().is_empty()) {
        return Err(format!(
            "empty key name in chord (keys are separated by a single '{}')",
            CHORD_SEPARATOR
        ));
    }

    Ok(())
}

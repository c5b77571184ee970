//! Configuration data model

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Default location of the primary configuration file
pub const DEFAULT_PRIMARY_PATH: &str = "/etc/kbmapper/kbmapper.kdl";

/// Default directory holding configuration fragments
pub const DEFAULT_FRAGMENTS_DIR: &str = "/etc/kbmapper/kbmapper.d";

/// Separator between key names in a chord stimulus
pub const CHORD_SEPARATOR: char = '+';

/// One section: the command bound to a stimulus
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    /// Stimulus identifier (e.g. "LidClose" or "Control+Alt+t")
    pub stimulus: String,
    /// Shell command to run
    pub exec: Option<String>,
    /// User to run the command as. Carried but not enforced.
    pub user: Option<String>,
    /// Directory to run the command in, tilde-expanded
    pub working_directory: Option<PathBuf>,
}

impl Section {
    /// The command to run, if this section has a non-empty `Exec`.
    pub fn command(&self) -> Option<&str> {
        self.exec.as_deref().filter(|cmd| !cmd.trim().is_empty())
    }
}

/// All sections loaded from a single file
#[derive(Debug, Default)]
pub struct SectionCollection {
    /// File the sections were read from
    pub source: PathBuf,
    /// Sections keyed by stimulus identifier
    pub sections: HashMap<String, Section>,
    /// Sections left out because they were invalid
    pub errors: Vec<ConfigError>,
}

impl SectionCollection {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            sections: HashMap::new(),
            errors: Vec::new(),
        }
    }

    pub fn get(&self, stimulus: &str) -> Option<&Section> {
        self.sections.get(stimulus)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// A section that won a lookup, with the file it came from
#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    pub source: &'a Path,
    pub section: &'a Section,
}

/// Ordered section collections.
///
/// Collections are consulted in the order they were loaded: fragment files
/// first, the primary file last. A stimulus defined in several collections
/// resolves to the earliest one that carries a command.
#[derive(Debug, Default)]
pub struct ConfigStore {
    collections: Vec<SectionCollection>,
}

impl ConfigStore {
    pub fn new(collections: Vec<SectionCollection>) -> Self {
        Self { collections }
    }

    pub fn collections(&self) -> &[SectionCollection] {
        &self.collections
    }

    pub fn into_collections(self) -> Vec<SectionCollection> {
        self.collections
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Total number of sections across all collections
    pub fn section_count(&self) -> usize {
        self.collections.iter().map(SectionCollection::len).sum()
    }

    /// Number of invalid sections left out across all collections
    pub fn error_count(&self) -> usize {
        self.collections.iter().map(|c| c.errors.len()).sum()
    }

    /// Find the section a stimulus resolves to.
    ///
    /// Scans collections in precedence order and returns the first section
    /// with this identifier and a non-empty `Exec`. A section without a
    /// command does not stop the scan.
    pub fn lookup(&self, stimulus: &str) -> Option<Match<'_>> {
        self.collections.iter().find_map(|collection| {
            collection
                .get(stimulus)
                .filter(|section| section.command().is_some())
                .map(|section| Match {
                    source: &collection.source,
                    section,
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(source: &str, sections: &[(&str, Option<&str>)]) -> SectionCollection {
        let mut collection = SectionCollection::new(source);
        for (stimulus, exec) in sections {
            collection.sections.insert(
                stimulus.to_string(),
                Section {
                    stimulus: stimulus.to_string(),
                    exec: exec.map(str::to_string),
                    ..Default::default()
                },
            );
        }
        collection
    }

    #[test]
    fn test_lookup_first_collection_wins() {
        let store = ConfigStore::new(vec![
            collection("first.kdl", &[("A+B", Some("cmd1"))]),
            collection("second.kdl", &[("A+B", Some("cmd2"))]),
        ]);

        let found = store.lookup("A+B").unwrap();
        assert_eq!(found.section.command(), Some("cmd1"));
        assert_eq!(found.source, Path::new("first.kdl"));
    }

    #[test]
    fn test_lookup_skips_section_without_command() {
        let store = ConfigStore::new(vec![
            collection("first.kdl", &[("LidClose", None)]),
            collection("second.kdl", &[("LidClose", Some("systemctl suspend"))]),
        ]);

        let found = store.lookup("LidClose").unwrap();
        assert_eq!(found.source, Path::new("second.kdl"));
    }

    #[test]
    fn test_lookup_is_exact() {
        let store = ConfigStore::new(vec![collection("a.kdl", &[("A+B", Some("cmd"))])]);

        assert!(store.lookup("B+A").is_none());
        assert!(store.lookup("a+b").is_none());
        assert!(store.lookup("A").is_none());
    }

    #[test]
    fn test_section_count() {
        let store = ConfigStore::new(vec![
            collection("a.kdl", &[("A", Some("x")), ("B", Some("y"))]),
            collection("b.kdl", &[("A", Some("z"))]),
        ]);

        assert_eq!(store.section_count(), 3);
        assert!(!store.is_empty());
        assert!(ConfigStore::default().is_empty());
    }

    #[test]
    fn test_error_count_sums_collections() {
        let mut first = collection("a.kdl", &[("A", Some("x"))]);
        first.errors.push(ConfigError::NoConfiguration {
            primary: "a".to_string(),
            fragments: "b".to_string(),
        });
        let second = collection("b.kdl", &[]);

        let store = ConfigStore::new(vec![first, second]);
        assert_eq!(store.error_count(), 1);
        assert_eq!(store.into_collections().len(), 2);
    }
}

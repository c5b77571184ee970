//! Loading the configuration store from disk
//!
//! The store is built from a directory of fragment files followed by a
//! single primary file. Fragments are visited depth-first with the entries
//! of each directory in file-name order, which fixes their precedence.
//! Symbolic links to files are loaded, links to directories are not followed.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::model::ConfigStore;
use crate::parser::parse_file;

/// A file that could not be loaded and was left out of the store
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: ConfigError,
}

/// Result of loading: the store plus every file that was skipped
#[derive(Debug)]
pub struct LoadReport {
    pub store: ConfigStore,
    pub skipped: Vec<SkippedFile>,
}

/// Load the store from a primary file and a fragment directory.
///
/// Files that fail to read or parse are skipped and reported, they never
/// abort loading. Invalid sections inside a file that parses are only
/// recorded on that file's collection. A missing primary file or fragment directory is fine on
/// its own; loading fails only when no file at all could be loaded.
pub fn load_store(primary: &Path, fragments_dir: &Path) -> Result<LoadReport, ConfigError> {
    let mut paths = fragment_files(fragments_dir);
    if primary.is_file() {
        paths.push(primary.to_path_buf());
    } else {
        tracing::debug!("Primary config {} not present", primary.display());
    }

    let mut collections = Vec::with_capacity(paths.len());
    let mut skipped = Vec::new();

    for path in paths {
        match parse_file(&path) {
            Ok(collection) => {
                tracing::debug!(
                    "Loaded {} section(s) from {}",
                    collection.len(),
                    path.display()
                );
                collections.push(collection);
            }
            Err(error) => {
                tracing::warn!("Skipping config file {}: {}", path.display(), error);
                skipped.push(SkippedFile { path, error });
            }
        }
    }

    if collections.is_empty() {
        return Err(ConfigError::NoConfiguration {
            primary: primary.display().to_string(),
            fragments: fragments_dir.display().to_string(),
        });
    }

    Ok(LoadReport {
        store: ConfigStore::new(collections),
        skipped,
    })
}

/// All regular files below `dir`, in walk order
pub fn fragment_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    walk(dir, &mut files);
    files
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Cannot read fragment directory {}: {}", dir.display(), e);
            return;
        }
    };

    let mut entries: Vec<_> = entries.filter_map(|entry| entry.ok()).collect();
    entries.sort_by_key(|entry| entry.file_name());

    let mut subdirs = Vec::new();

    // Files of a directory come before those of its subdirectories
    for entry in entries {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            subdirs.push(path);
        } else if file_type.is_file() {
            files.push(path);
        } else if file_type.is_symlink() {
            // Links to files are fragments, links to directories are not followed
            if path.is_file() {
                files.push(path);
            } else {
                tracing::debug!("Not following link {}", path.display());
            }
        }
    }

    for sub in subdirs {
        walk(&sub, files);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_fragments_precede_primary() {
        let tmp = tempfile::tempdir().unwrap();
        let primary = tmp.path().join("kbmapper.kdl");
        let fragments = tmp.path().join("kbmapper.d");

        write(&primary, "\"A+B\" { Exec \"cmd2\"; }");
        write(&fragments.join("10-chords.kdl"), "\"A+B\" { Exec \"cmd1\"; }");

        let report = load_store(&primary, &fragments).unwrap();
        assert!(report.skipped.is_empty());
        assert_eq!(report.store.collections().len(), 2);
        assert_eq!(report.store.collections()[1].source, primary);

        let found = report.store.lookup("A+B").unwrap();
        assert_eq!(found.section.command(), Some("cmd1"));
        assert_eq!(found.source, fragments.join("10-chords.kdl"));
    }

    #[test]
    fn test_fragment_order_is_by_name_then_subdirectories() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();

        write(&dir.join("b.kdl"), "");
        write(&dir.join("a.kdl"), "");
        write(&dir.join("nested/c.kdl"), "");
        write(&dir.join("z.kdl"), "");

        let files = fragment_files(dir);
        assert_eq!(
            files,
            vec![
                dir.join("a.kdl"),
                dir.join("b.kdl"),
                dir.join("z.kdl"),
                dir.join("nested/c.kdl"),
            ]
        );
    }

    #[test]
    fn test_malformed_fragment_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let primary = tmp.path().join("kbmapper.kdl");
        let fragments = tmp.path().join("kbmapper.d");

        write(&primary, "LidClose { Exec \"systemctl suspend\"; }");
        write(&fragments.join("broken.kdl"), "LidOpen { Exec \"oops");
        write(&fragments.join("good.kdl"), "LidOpen { Exec \"light -S 50\"; }");

        let report = load_store(&primary, &fragments).unwrap();
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, fragments.join("broken.kdl"));
        assert!(matches!(
            report.skipped[0].error,
            ConfigError::ParseError { .. }
        ));

        assert_eq!(report.store.collections().len(), 2);
        assert!(report.store.lookup("LidOpen").is_some());
        assert!(report.store.lookup("LidClose").is_some());
    }

    #[test]
    fn test_missing_fragment_dir_is_fine() {
        let tmp = tempfile::tempdir().unwrap();
        let primary = tmp.path().join("kbmapper.kdl");
        write(&primary, "LidClose { Exec \"true\"; }");

        let report = load_store(&primary, &tmp.path().join("missing.d")).unwrap();
        assert_eq!(report.store.collections().len(), 1);
    }

    #[test]
    fn test_missing_primary_with_fragments_is_fine() {
        let tmp = tempfile::tempdir().unwrap();
        let fragments = tmp.path().join("kbmapper.d");
        write(&fragments.join("only.kdl"), "LidClose { Exec \"true\"; }");

        let report = load_store(&tmp.path().join("missing.kdl"), &fragments).unwrap();
        assert_eq!(report.store.collections().len(), 1);
    }

    #[test]
    fn test_nothing_loaded_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let fragments = tmp.path().join("kbmapper.d");
        write(&fragments.join("broken.kdl"), "{{{");

        let result = load_store(&tmp.path().join("missing.kdl"), &fragments);
        assert!(matches!(result, Err(ConfigError::NoConfiguration { .. })));
    }

    #[test]
    fn test_linked_directories_are_not_followed() {
        let tmp = tempfile::tempdir().unwrap();
        let fragments = tmp.path().join("kbmapper.d");
        write(&fragments.join("a.kdl"), "LidClose { Exec \"true\"; }");
        std::os::unix::fs::symlink(".", fragments.join("loop")).unwrap();
        std::os::unix::fs::symlink(".", fragments.join("loop2")).unwrap();

        assert_eq!(fragment_files(&fragments), vec![fragments.join("a.kdl")]);

        let report = load_store(&tmp.path().join("missing.kdl"), &fragments).unwrap();
        assert_eq!(report.store.collections().len(), 1);
    }

    #[test]
    fn test_linked_file_is_a_fragment() {
        let tmp = tempfile::tempdir().unwrap();
        let fragments = tmp.path().join("kbmapper.d");
        let shared = tmp.path().join("shared.kdl");
        write(&shared, "LidOpen { Exec \"true\"; }");
        fs::create_dir_all(&fragments).unwrap();
        std::os::unix::fs::symlink(&shared, fragments.join("50-shared.kdl")).unwrap();

        assert_eq!(
            fragment_files(&fragments),
            vec![fragments.join("50-shared.kdl")]
        );
    }

    #[test]
    fn test_invalid_section_does_not_skip_its_file() {
        let tmp = tempfile::tempdir().unwrap();
        let primary = tmp.path().join("kbmapper.kdl");
        let fragments = tmp.path().join("kbmapper.d");

        write(
            &fragments.join("10-lid.kdl"),
            "LidClose { Exec \"suspend\"; }\n\"Control++t\" { Exec \"typo\"; }",
        );

        let report = load_store(&primary, &fragments).unwrap();
        assert!(report.skipped.is_empty());
        assert_eq!(report.store.error_count(), 1);

        let found = report.store.lookup("LidClose").unwrap();
        assert_eq!(found.section.command(), Some("suspend"));
    }
}

//! # PATH Source
//!
//! The default [`Source`] bundled with the binary: every executable found in
//! the directories of `$PATH`, launched detached from the picker.
//!
//! The scan happens once at construction. Shadowing follows shell resolution
//! order: when two directories provide the same command name, the earlier
//! directory wins. The name filter is a case-insensitive substring match,
//! applied at `list` time so the snapshot itself stays immutable.

use std::collections::HashSet;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use super::{Item, Source, SourceError};

pub struct PathSource {
    entries: Vec<Item>,
    filter: Mutex<Option<String>>,
}

impl PathSource {
    /// Build a source from the `$PATH` of the current process.
    pub fn from_env() -> Result<Self, SourceError> {
        let path = std::env::var_os("PATH")
            .ok_or_else(|| SourceError::Backend("PATH is not set".to_string()))?;
        Ok(Self::from_dirs(std::env::split_paths(&path)))
    }

    /// Build a source from an explicit list of directories.
    ///
    /// Missing or unreadable directories are skipped, like a shell would.
    pub fn from_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut entries = Vec::new();

        for dir in dirs {
            let Ok(read_dir) = std::fs::read_dir(dir.as_ref()) else {
                continue;
            };
            for entry in read_dir.flatten() {
                let path = entry.path();
                if !is_executable_file(&path) {
                    continue;
                }
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                // First directory in PATH order wins, as in shell resolution.
                if seen.insert(name.to_string()) {
                    entries.push(Item::new(path.to_string_lossy(), name));
                }
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            entries,
            filter: Mutex::new(None),
        }
    }

    fn current_filter(&self) -> Option<String> {
        match self.filter.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_filter(&self, value: Option<String>) {
        match self.filter.lock() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }
}

impl Source for PathSource {
    fn list(&self) -> Result<Vec<Item>, SourceError> {
        let items = match self.current_filter() {
            Some(needle) => self
                .entries
                .iter()
                .filter(|item| item.name.to_lowercase().contains(&needle))
                .cloned()
                .collect(),
            None => self.entries.clone(),
        };
        Ok(items)
    }

    fn set_filter_name(&self, name: &str) -> Result<(), SourceError> {
        self.set_filter(Some(name.to_lowercase()));
        Ok(())
    }

    fn reset_filters(&self) -> Result<(), SourceError> {
        self.set_filter(None);
        Ok(())
    }

    fn run(&self, id: &str) -> Result<(), SourceError> {
        let child = Command::new(id)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SourceError::Backend(format!("{}: {}", id, e)))?;

        // Reap the child off-thread so launched applications never turn
        // into zombies while the picker keeps running.
        std::thread::spawn(move || {
            let mut child = child;
            let _ = child.wait();
        });

        Ok(())
    }
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}

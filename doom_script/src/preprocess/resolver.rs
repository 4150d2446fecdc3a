//! Include resolution: turning an `#include` path into a named text stream

use super::error::IncludeError;
use crate::file_processor::FileProcessor;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Text of an included stream and the name diagnostics should use for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub name: String,
    pub text: String,
}

pub trait IncludeResolver: Send {
    /// Resolve `path` as written in a directive found in `including_stream`
    fn resolve(&self, including_stream: &str, path: &str) -> Result<ResolvedSource, IncludeError>;
}

/// Resolves against the including file's directory, then each search root,
/// then the working directory
#[derive(Debug, Clone, Default)]
pub struct FileSystemResolver {
    search_roots: Vec<PathBuf>,
    processor: FileProcessor,
}

impl FileSystemResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.search_roots.push(root.into());
        self
    }

    pub fn search_roots(&self) -> &[PathBuf] {
        &self.search_roots
    }

    fn candidates(&self, including_stream: &str, path: &str) -> Vec<PathBuf> {
        let requested = Path::new(path);
        if requested.is_absolute() {
            return vec![requested.to_path_buf()];
        }

        let mut candidates = Vec::with_capacity(self.search_roots.len() + 2);
        if let Some(parent) = Path::new(including_stream).parent() {
            if !parent.as_os_str().is_empty() {
                candidates.push(parent.join(requested));
            }
        }
        candidates.extend(self.search_roots.iter().map(|root| root.join(requested)));
        candidates.push(requested.to_path_buf());
        candidates
    }
}

impl IncludeResolver for FileSystemResolver {
    fn resolve(&self, including_stream: &str, path: &str) -> Result<ResolvedSource, IncludeError> {
        let found = self
            .candidates(including_stream, path)
            .into_iter()
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| IncludeError::NotFound {
                path: path.to_string(),
            })?;

        let source = self.processor.read_source(&found)?;
        Ok(ResolvedSource {
            name: source.stream_name(),
            text: source.text,
        })
    }
}

/// In-memory streams keyed by name; relative names also resolve against the
/// including stream's `/`-separated parent
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    files: HashMap<String, String>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.files.insert(name.into(), text.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.files.insert(name.into(), text.into());
    }
}

impl IncludeResolver for MemoryResolver {
    fn resolve(&self, including_stream: &str, path: &str) -> Result<ResolvedSource, IncludeError> {
        let sibling = including_stream
            .rfind('/')
            .map(|slash| format!("{}{}", &including_stream[..=slash], path));

        sibling
            .into_iter()
            .chain(std::iter::once(path.to_string()))
            .find_map(|name| {
                self.files.get(&name).map(|text| ResolvedSource {
                    name,
                    text: text.clone(),
                })
            })
            .ok_or_else(|| IncludeError::NotFound {
                path: path.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_memory_resolver_prefers_sibling() {
        let resolver = MemoryResolver::new()
            .with_file("lib/defs.dh", "sibling")
            .with_file("defs.dh", "top");

        let sibling = resolver.resolve("lib/main.dh", "defs.dh").unwrap();
        assert_eq!(sibling.name, "lib/defs.dh");
        assert_eq!(sibling.text, "sibling");

        let top = resolver.resolve("main.dh", "defs.dh").unwrap();
        assert_eq!(top.text, "top");

        assert_matches!(
            resolver.resolve("main.dh", "nope.dh"),
            Err(IncludeError::NotFound { .. })
        );
    }

    #[test]
    fn test_file_system_resolver_relative_to_includer() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("inc.dh"), "#define A 1").unwrap();
        let main = dir.path().join("main.dh");

        let resolved = FileSystemResolver::new()
            .resolve(&main.display().to_string(), "inc.dh")
            .unwrap();
        assert_eq!(resolved.text, "#define A 1");
        assert!(resolved.name.ends_with("inc.dh"));
    }

    #[test]
    fn test_file_system_resolver_search_roots() {
        let dir = tempdir().unwrap();
        let lib = dir.path().join("lib");
        fs::create_dir(&lib).unwrap();
        fs::write(lib.join("shared.dh"), "shared").unwrap();

        let resolver = FileSystemResolver::new().with_search_root(&lib);
        assert_eq!(resolver.search_roots().len(), 1);
        let resolved = resolver.resolve("elsewhere/main.dh", "shared.dh").unwrap();
        assert_eq!(resolved.text, "shared");

        assert_matches!(
            resolver.resolve("elsewhere/main.dh", "absent.dh"),
            Err(IncludeError::NotFound { .. })
        );
    }
}

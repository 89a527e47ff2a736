//! Include resolution.
//!
//! A descriptor may declare `"includes": "common-erc20.json"`, a path relative
//! to its own file. The referenced descriptor is resolved first (it may include
//! further files), then the including descriptor is merged on top of it using
//! [`MergeRules`]. The `includes` key never survives into the result.

use serde_json::Value;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::error::IncludeError;
use crate::merge::MergeRules;

/// Default nesting limit for chained includes.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Where included descriptors are loaded from.
pub trait DescriptorSource {
    fn load(&self, path: &Path) -> Result<Value, IncludeError>;
}

/// Loads descriptors from the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl DescriptorSource for FsSource {
    fn load(&self, path: &Path) -> Result<Value, IncludeError> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                IncludeError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                IncludeError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        serde_json::from_str(&text).map_err(|source| IncludeError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// In-memory documents keyed by path.
impl DescriptorSource for HashMap<PathBuf, Value> {
    fn load(&self, path: &Path) -> Result<Value, IncludeError> {
        self.get(path).cloned().ok_or_else(|| IncludeError::NotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Recursively inlines `includes` references.
pub struct IncludeResolver<S = FsSource> {
    source: S,
    rules: MergeRules,
    max_depth: usize,
}

impl IncludeResolver<FsSource> {
    pub fn new() -> Self {
        Self::with_source(FsSource)
    }
}

impl Default for IncludeResolver<FsSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DescriptorSource> IncludeResolver<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            rules: MergeRules::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_rules(mut self, rules: MergeRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Load `path` and resolve its includes.
    pub fn resolve_file(&self, path: &Path) -> Result<Value, IncludeError> {
        let path = clean(path);
        let document = self.source.load(&path)?;
        self.resolve(document, &path)
    }

    /// Resolve the includes of `document`, which lives at `location`.
    pub fn resolve(&self, document: Value, location: &Path) -> Result<Value, IncludeError> {
        let mut stack = vec![clean(location)];
        self.resolve_inner(document, &mut stack)
    }

    fn resolve_inner(&self, mut document: Value, stack: &mut Vec<PathBuf>) -> Result<Value, IncludeError> {
        let location = stack.last().cloned().unwrap_or_default();
        let Some(includes) = document.as_object_mut().and_then(|obj| obj.shift_remove("includes")) else {
            return Ok(document);
        };
        let Some(reference) = includes.as_str() else {
            return Err(IncludeError::InvalidReference { path: location });
        };

        let target = clean(&location.parent().unwrap_or(Path::new("")).join(reference));
        if stack.contains(&target) {
            let mut chain = stack.clone();
            chain.push(target);
            return Err(IncludeError::Cycle { chain });
        }
        if stack.len() > self.max_depth {
            return Err(IncludeError::TooDeep { max: self.max_depth });
        }

        tracing::debug!(including = %location.display(), included = %target.display(), "resolving include");
        let included = self.source.load(&target)?;
        stack.push(target);
        let included = self.resolve_inner(included, stack)?;
        stack.pop();

        Ok(self.rules.merge(&included, &document))
    }
}

/// Lexically normalize `.` and `..` components without touching the file system.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

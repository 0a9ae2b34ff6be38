use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use super::{compare_recency, ArtifactId, ArtifactKind, ArtifactSelector, IdPrecision};

/// One discovered artifact file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub id: ArtifactId,
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
}

impl ArtifactRef {
    /// Creation timestamp first; modification time only for identifiers that
    /// carry minute resolution; then the identifier itself; then the path.
    fn recency_cmp(&self, other: &Self) -> Ordering {
        self.id
            .created_at()
            .cmp(&other.id.created_at())
            .then_with(|| self.mtime_proxy().cmp(&other.mtime_proxy()))
            .then_with(|| compare_recency(&self.id, &other.id))
            .then_with(|| self.path.cmp(&other.path))
    }

    fn mtime_proxy(&self) -> Option<SystemTime> {
        match self.id.precision() {
            IdPrecision::Minute => self.modified,
            IdPrecision::Second => None,
        }
    }
}

/// Read-only index over an artifact pool, built once per run.
///
/// The pool is searched recursively; physical nesting is irrelevant to
/// selection.
#[derive(Debug, Clone, Default)]
pub struct ArtifactIndex {
    root: PathBuf,
    entries: Vec<ArtifactRef>,
    ignored_files: usize,
}

impl ArtifactIndex {
    /// Scan `root` recursively for `*.yaml` / `*.yml` files whose stems are
    /// recognized identifiers. A missing root yields an empty index.
    pub fn scan(root: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let root = root.as_ref().to_path_buf();
        let mut index = Self {
            root: root.clone(),
            entries: Vec::new(),
            ignored_files: 0,
        };

        if !root.exists() {
            debug!(root = %root.display(), "artifact root does not exist, index is empty");
            return Ok(index);
        }

        let mut files = Vec::new();
        collect_yaml_files(root.as_path(), &mut files)?;

        for path in files {
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                index.ignored_files += 1;
                continue;
            };
            match ArtifactId::parse(stem) {
                Ok(id) => {
                    let modified = fs::metadata(&path).and_then(|meta| meta.modified()).ok();
                    index.entries.push(ArtifactRef { id, path, modified });
                }
                Err(_) => {
                    debug!(path = %path.display(), "ignoring file with unrecognized name");
                    index.ignored_files += 1;
                }
            }
        }

        index.sort_entries();
        debug!(
            root = %index.root.display(),
            artifacts = index.entries.len(),
            ignored = index.ignored_files,
            "artifact index built"
        );
        Ok(index)
    }

    /// Build an index from already-known entries.
    pub fn from_entries(root: impl Into<PathBuf>, entries: Vec<ArtifactRef>) -> Self {
        let mut index = Self {
            root: root.into(),
            entries,
            ignored_files: 0,
        };
        index.sort_entries();
        index
    }

    fn sort_entries(&mut self) {
        self.entries.sort_by(|left, right| left.recency_cmp(right));
    }

    /// Most recent artifact matching `selector`, or `None` when nothing
    /// matches.
    pub fn latest(&self, selector: &ArtifactSelector) -> Option<&ArtifactRef> {
        self.entries
            .iter()
            .filter(|entry| selector.matches(&entry.id))
            .max_by(|left, right| left.recency_cmp(right))
    }

    /// All artifacts of `kind`, oldest first.
    pub fn of_kind(&self, kind: ArtifactKind) -> impl Iterator<Item = &ArtifactRef> {
        self.entries.iter().filter(move |entry| entry.id.kind() == kind)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ignored_files(&self) -> usize {
        self.ignored_files
    }
}

fn collect_yaml_files(root: &Path, files: &mut Vec<PathBuf>) -> Result<(), std::io::Error> {
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        // symlinked directories are not followed
        if entry.file_type()?.is_dir() {
            collect_yaml_files(path.as_path(), files)?;
            continue;
        }
        if path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| {
                extension.eq_ignore_ascii_case("yaml") || extension.eq_ignore_ascii_case("yml")
            })
        {
            files.push(path);
        }
    }

    Ok(())
}

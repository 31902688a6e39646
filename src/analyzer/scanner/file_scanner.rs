use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{ExcludeMatcher, GitIgnoreFilter, SymlinkPolicy};
use crate::constants::scan::DEFAULT_MAX_FILE_SIZE;
use crate::types::{ExtractionFailure, Result, SkeletonError, paths::to_posix};

/// Canonical, deduplicated source roots in first-encounter order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRoots {
    roots: Vec<PathBuf>,
}

impl SourceRoots {
    /// Resolve user-supplied roots.
    ///
    /// A missing root or a non-directory is a configuration error. A root
    /// that is itself a symlink is rejected under [`SymlinkPolicy::Forbid`]
    /// and followed otherwise. Roots with the same canonical path collapse
    /// onto the first occurrence.
    pub fn resolve<P: AsRef<Path>>(paths: &[P], policy: SymlinkPolicy) -> Result<Self> {
        if paths.is_empty() {
            return Err(SkeletonError::Config(
                "At least one source root is required".to_string(),
            ));
        }

        let mut roots: Vec<PathBuf> = Vec::new();

        for path in paths {
            let path = path.as_ref();

            let meta = std::fs::symlink_metadata(path).map_err(|_| SkeletonError::SourceNotFound {
                path: path.to_path_buf(),
            })?;

            if meta.file_type().is_symlink() && policy == SymlinkPolicy::Forbid {
                return Err(SkeletonError::SymlinkForbidden {
                    path: path.to_path_buf(),
                });
            }

            // Broken symlinks fail here
            let canonical = path
                .canonicalize()
                .map_err(|_| SkeletonError::SourceNotFound {
                    path: path.to_path_buf(),
                })?;

            if !canonical.is_dir() {
                return Err(SkeletonError::Config(format!(
                    "Source root is not a directory: {}",
                    path.display()
                )));
            }

            if roots.contains(&canonical) {
                debug!("Dropping duplicate source root {}", path.display());
                continue;
            }
            roots.push(canonical);
        }

        Ok(Self { roots })
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.roots.iter()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn into_vec(self) -> Vec<PathBuf> {
        self.roots
    }
}

/// A candidate file for extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Absolute path
    pub path: PathBuf,
    /// Index of the owning source root
    pub source: usize,
    /// POSIX path relative to the owning source root
    pub relative: String,
}

/// Result of a scan: extraction candidates plus files dropped on the way
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub files: Vec<ScannedFile>,
    /// Oversized, unreadable or unresolvable entries, sorted by source then path
    pub skipped: Vec<ExtractionFailure>,
}

pub struct FileScanner {
    roots: SourceRoots,
    exclude: ExcludeMatcher,
    symlinks: SymlinkPolicy,
    extensions: BTreeSet<String>,
    gitignore: bool,
    max_file_size: u64,
}

impl FileScanner {
    pub fn new(roots: SourceRoots) -> Self {
        Self {
            roots,
            exclude: ExcludeMatcher::default(),
            symlinks: SymlinkPolicy::default(),
            extensions: BTreeSet::new(),
            gitignore: false,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    pub fn with_exclude(mut self, exclude: ExcludeMatcher) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_symlinks(mut self, policy: SymlinkPolicy) -> Self {
        self.symlinks = policy;
        self
    }

    /// Restrict candidates to these extensions; an empty set accepts every file
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Honour `.gitignore` files: the root's own and any nested ones
    pub fn with_gitignore(mut self, enabled: bool) -> Self {
        self.gitignore = enabled;
        self
    }

    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    pub fn roots(&self) -> &SourceRoots {
        &self.roots
    }

    /// Walk every root and return candidates ordered by root, then relative path.
    ///
    /// A file reachable from more than one root is reported under the first.
    /// Excluded and ignored entries are pruned before the symlink policy is
    /// applied, so an excluded symlink never aborts a scan.
    pub fn scan(&self) -> Result<ScanOutcome> {
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut outcome = ScanOutcome::default();

        for (index, root) in self.roots.iter().enumerate() {
            let mut found = self.scan_root(index, root, &mut outcome.skipped)?;
            found.sort_by(|a, b| a.relative.cmp(&b.relative));

            for file in found {
                if seen.insert(file.path.clone()) {
                    outcome.files.push(file);
                } else {
                    debug!("{} already scanned under an earlier root", file.path.display());
                }
            }
        }
        outcome.skipped.sort();

        debug!(
            "Scanned {} candidate files ({} skipped) across {} roots",
            outcome.files.len(),
            outcome.skipped.len(),
            self.roots.len()
        );
        Ok(outcome)
    }

    fn scan_root(
        &self,
        index: usize,
        root: &Path,
        skipped: &mut Vec<ExtractionFailure>,
    ) -> Result<Vec<ScannedFile>> {
        let mut gitignore = self.gitignore.then(|| GitIgnoreFilter::new(root));
        let follow = self.symlinks == SymlinkPolicy::Follow;
        let relative_of = |path: &Path| to_posix(path.strip_prefix(root).unwrap_or(path));
        let mut skip = |relative: String, reason: String| {
            warn!("Skipping {}: {}", relative, reason);
            skipped.push(ExtractionFailure {
                source: index,
                path: relative,
                reason,
            });
        };

        // Real paths already visited; only consulted when following links
        let mut visited: HashSet<PathBuf> = HashSet::new();
        if follow {
            visited.insert(root.to_path_buf());
        }

        let mut files = Vec::new();
        let mut walker = WalkDir::new(root)
            .follow_links(follow)
            .sort_by_file_name()
            .into_iter();

        while let Some(next) = walker.next() {
            let entry = match next {
                Ok(entry) => entry,
                Err(err) => {
                    if let Some(ancestor) = err.loop_ancestor() {
                        debug!("Skipping symlink cycle back to {}", ancestor.display());
                        continue;
                    }
                    let relative = err.path().map(relative_of).unwrap_or_default();
                    let filtered = err.path().is_some_and(|path| {
                        self.is_filtered(&relative, path, false, gitignore.as_ref())
                    });
                    if !filtered {
                        skip(relative, format!("walk error: {}", err));
                    }
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path();
            let is_dir = entry.file_type().is_dir();
            let relative = relative_of(path);

            if self.is_filtered(&relative, path, is_dir, gitignore.as_ref()) {
                if is_dir {
                    walker.skip_current_dir();
                }
                continue;
            }

            if entry.path_is_symlink() {
                match self.symlinks {
                    SymlinkPolicy::Forbid => {
                        return Err(SkeletonError::SymlinkForbidden {
                            path: path.to_path_buf(),
                        });
                    }
                    SymlinkPolicy::Skip => {
                        debug!("Skipping symlink {}", path.display());
                        continue;
                    }
                    SymlinkPolicy::Follow => {}
                }
            }

            if follow {
                let real = match path.canonicalize() {
                    Ok(real) => real,
                    Err(err) => {
                        if is_dir {
                            walker.skip_current_dir();
                        }
                        skip(relative, format!("cannot resolve: {}", err));
                        continue;
                    }
                };
                if !visited.insert(real) {
                    debug!("Already visited real path of {}", path.display());
                    if is_dir {
                        walker.skip_current_dir();
                    }
                    continue;
                }
            }

            if is_dir && let Some(filter) = gitignore.as_mut() {
                filter.enter_dir(path);
            }

            if !entry.file_type().is_file() || !self.check_extension(path) {
                continue;
            }

            match entry.metadata() {
                Ok(meta) if meta.len() > self.max_file_size => {
                    skip(
                        relative,
                        format!(
                            "file size {} bytes exceeds limit of {}",
                            meta.len(),
                            self.max_file_size
                        ),
                    );
                    continue;
                }
                Ok(_) => {}
                Err(err) => {
                    skip(relative, format!("cannot stat: {}", err));
                    continue;
                }
            }

            files.push(ScannedFile {
                path: path.to_path_buf(),
                source: index,
                relative,
            });
        }

        Ok(files)
    }

    /// Whether an entry is excluded by pattern or `.gitignore`
    fn is_filtered(
        &self,
        relative: &str,
        path: &Path,
        is_dir: bool,
        gitignore: Option<&GitIgnoreFilter>,
    ) -> bool {
        if self.exclude.is_excluded(relative) {
            debug!("Excluded {}", relative);
            return true;
        }
        if gitignore.is_some_and(|filter| filter.is_ignored(path, is_dir)) {
            debug!("Ignored by .gitignore: {}", relative);
            return true;
        }
        false
    }

    fn check_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn scanner(roots: &[&Path], policy: SymlinkPolicy) -> FileScanner {
        FileScanner::new(SourceRoots::resolve(roots, policy).unwrap())
            .with_symlinks(policy)
            .with_extensions(["py", "rs"])
    }

    fn relatives(outcome: &ScanOutcome) -> Vec<&str> {
        outcome.files.iter().map(|f| f.relative.as_str()).collect()
    }

    #[test]
    fn test_resolve_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = SourceRoots::resolve(&[dir.path().join("nope")], SymlinkPolicy::Forbid)
            .unwrap_err();
        assert!(matches!(err, SkeletonError::SourceNotFound { .. }));
    }

    #[test]
    fn test_resolve_file_root_rejected() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.py", "");
        let err = SourceRoots::resolve(&[dir.path().join("a.py")], SymlinkPolicy::Forbid)
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_resolve_dedupes_roots() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().to_path_buf();
        let also_a = dir.path().join(".");
        let roots = SourceRoots::resolve(&[a, also_a], SymlinkPolicy::Forbid).unwrap();
        assert_eq!(roots.len(), 1);
    }

    #[test]
    fn test_scan_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pkg/mod.py", "x = 1\n");
        write(dir.path(), "pkg/a-b/z.py", "");
        write(dir.path(), "pkg/a/z.py", "");
        write(dir.path(), "README.md", "# hi\n");
        write(dir.path(), "main.rs", "fn main() {}\n");

        let files = scanner(&[dir.path()], SymlinkPolicy::Forbid).scan().unwrap();
        assert_eq!(
            relatives(&files),
            vec!["main.rs", "pkg/a-b/z.py", "pkg/a/z.py", "pkg/mod.py"]
        );
        assert!(files.files.iter().all(|f| f.source == 0 && f.path.is_absolute()));
        assert!(files.skipped.is_empty());
    }

    #[test]
    fn test_exclude_prunes_subtree() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pkg/mod.py", "");
        write(dir.path(), "pkg/excluded/hidden.py", "");
        write(dir.path(), "excluded.py", "");

        let files = scanner(&[dir.path()], SymlinkPolicy::Forbid)
            .with_exclude(ExcludeMatcher::new(["excluded"]).unwrap())
            .scan()
            .unwrap();
        assert_eq!(relatives(&files), vec!["excluded.py", "pkg/mod.py"]);
    }

    #[test]
    fn test_max_file_size() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "small.py", "x = 1\n");
        write(dir.path(), "big.py", &"x = 1\n".repeat(100));

        let files = scanner(&[dir.path()], SymlinkPolicy::Forbid)
            .with_max_file_size(64)
            .scan()
            .unwrap();
        assert_eq!(relatives(&files), vec!["small.py"]);
        assert_eq!(files.skipped.len(), 1);
        assert_eq!(files.skipped[0].path, "big.py");
        assert_eq!(files.skipped[0].source, 0);
        assert!(files.skipped[0].reason.contains("exceeds limit of 64"));
    }

    #[test]
    fn test_gitignore_optional() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "gen/\n").unwrap();
        write(dir.path(), "gen/out.py", "");
        write(dir.path(), "app.py", "");

        let without = scanner(&[dir.path()], SymlinkPolicy::Forbid).scan().unwrap();
        assert_eq!(relatives(&without), vec!["app.py", "gen/out.py"]);

        let with = scanner(&[dir.path()], SymlinkPolicy::Forbid)
            .with_gitignore(true)
            .scan()
            .unwrap();
        assert_eq!(relatives(&with), vec!["app.py"]);
    }

    #[test]
    fn test_nested_gitignore() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pkg/.gitignore", "scratch.py\n");
        write(dir.path(), "pkg/scratch.py", "");
        write(dir.path(), "pkg/mod.py", "");
        write(dir.path(), "scratch.py", "");

        let files = scanner(&[dir.path()], SymlinkPolicy::Forbid)
            .with_gitignore(true)
            .scan()
            .unwrap();
        assert_eq!(relatives(&files), vec!["pkg/mod.py", "scratch.py"]);
    }

    #[test]
    fn test_multiple_roots_ordered_and_deduped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "lib/z.py", "");
        write(dir.path(), "app/a.py", "");
        write(dir.path(), "app/sub/b.py", "");

        let app = dir.path().join("app");
        let lib = dir.path().join("lib");
        let sub = dir.path().join("app/sub");
        let files = scanner(&[lib.as_path(), app.as_path(), sub.as_path()], SymlinkPolicy::Forbid)
            .scan()
            .unwrap();

        assert_eq!(relatives(&files), vec!["z.py", "a.py", "sub/b.py"]);
        assert_eq!(
            files.files.iter().map(|f| f.source).collect::<Vec<_>>(),
            vec![0, 1, 1]
        );
    }

    #[cfg(unix)]
    mod symlinks {
        use super::*;
        use std::os::unix::fs::symlink;

        fn tree_with_link() -> TempDir {
            let dir = TempDir::new().unwrap();
            write(dir.path(), "real/mod.py", "");
            write(dir.path(), "top.py", "");
            symlink(dir.path().join("real"), dir.path().join("linked")).unwrap();
            dir
        }

        #[test]
        fn test_forbid_errors() {
            let dir = tree_with_link();
            let err = scanner(&[dir.path()], SymlinkPolicy::Forbid)
                .scan()
                .unwrap_err();
            assert!(matches!(err, SkeletonError::SymlinkForbidden { .. }));
        }

        #[test]
        fn test_excluded_symlink_does_not_abort_forbid() {
            let dir = TempDir::new().unwrap();
            let outside = TempDir::new().unwrap();
            write(outside.path(), "lib/site.py", "");
            write(dir.path(), "app.py", "");
            symlink(outside.path(), dir.path().join(".venv")).unwrap();

            let files = scanner(&[dir.path()], SymlinkPolicy::Forbid)
                .with_exclude(ExcludeMatcher::new([".venv"]).unwrap())
                .scan()
                .unwrap();
            assert_eq!(relatives(&files), vec!["app.py"]);
        }

        #[test]
        fn test_follow_records_broken_link() {
            let dir = TempDir::new().unwrap();
            write(dir.path(), "app.py", "");
            symlink(dir.path().join("missing.py"), dir.path().join("dangling.py")).unwrap();

            let files = scanner(&[dir.path()], SymlinkPolicy::Follow).scan().unwrap();
            assert_eq!(relatives(&files), vec!["app.py"]);
            assert_eq!(files.skipped.len(), 1);
            assert_eq!(files.skipped[0].path, "dangling.py");
        }

        #[test]
        fn test_skip_omits_links() {
            let dir = tree_with_link();
            let files = scanner(&[dir.path()], SymlinkPolicy::Skip).scan().unwrap();
            assert_eq!(relatives(&files), vec!["real/mod.py", "top.py"]);
        }

        #[test]
        fn test_follow_visits_real_path_once() {
            let dir = tree_with_link();
            let files = scanner(&[dir.path()], SymlinkPolicy::Follow).scan().unwrap();
            // `linked` sorts before `real`, so the link claims the directory
            assert_eq!(relatives(&files), vec!["linked/mod.py", "top.py"]);
        }

        #[test]
        fn test_follow_terminates_on_cycle() {
            let dir = TempDir::new().unwrap();
            write(dir.path(), "pkg/mod.py", "");
            symlink(dir.path(), dir.path().join("pkg/loop")).unwrap();

            let files = scanner(&[dir.path()], SymlinkPolicy::Follow).scan().unwrap();
            assert_eq!(relatives(&files), vec!["pkg/mod.py"]);
        }

        #[test]
        fn test_symlinked_root() {
            let dir = TempDir::new().unwrap();
            write(dir.path(), "real/mod.py", "");
            let link = dir.path().join("link");
            symlink(dir.path().join("real"), &link).unwrap();

            let err = SourceRoots::resolve(&[&link], SymlinkPolicy::Forbid).unwrap_err();
            assert!(matches!(err, SkeletonError::SymlinkForbidden { .. }));

            let roots = SourceRoots::resolve(&[&link], SymlinkPolicy::Skip).unwrap();
            assert_eq!(roots.as_slice()[0], dir.path().join("real").canonicalize().unwrap());
        }
    }
}

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::Match;
use std::path::{Path, PathBuf};

/// `.gitignore` rules of a source root and of the directories below it.
///
/// Nested files are loaded as the walk enters their directory; the deepest
/// file with an opinion on a path decides, as git does.
pub struct GitIgnoreFilter {
    matchers: Vec<(PathBuf, Gitignore)>,
}

impl GitIgnoreFilter {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let mut filter = Self {
            matchers: Vec::new(),
        };
        filter.enter_dir(root);
        filter
    }

    /// Load `dir/.gitignore`, if any
    pub fn enter_dir<P: AsRef<Path>>(&mut self, dir: P) {
        let dir = dir.as_ref();
        let gitignore_path = dir.join(".gitignore");
        if !gitignore_path.is_file() {
            return;
        }

        let mut builder = GitignoreBuilder::new(dir);
        if let Some(err) = builder.add(&gitignore_path) {
            tracing::warn!("Partially invalid {}: {}", gitignore_path.display(), err);
        }
        match builder.build() {
            Ok(gitignore) => self.matchers.push((dir.to_path_buf(), gitignore)),
            Err(err) => tracing::warn!("Ignoring {}: {}", gitignore_path.display(), err),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.matchers.is_empty()
    }

    pub fn is_ignored<P: AsRef<Path>>(&self, path: P, is_dir: bool) -> bool {
        let path = path.as_ref();
        let mut applicable: Vec<&(PathBuf, Gitignore)> = self
            .matchers
            .iter()
            .filter(|(dir, _)| path.starts_with(dir) && path != dir)
            .collect();
        applicable.sort_by_key(|(dir, _)| std::cmp::Reverse(dir.components().count()));

        for (_, gitignore) in applicable {
            match gitignore.matched(path, is_dir) {
                Match::Ignore(_) => return true,
                Match::Whitelist(_) => return false,
                Match::None => {}
            }
        }
        false
    }
}

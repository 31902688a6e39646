use crate::types::{Result, SkeletonError};

/// Pattern characters that switch a pattern from literal to glob matching
const GLOB_CHARS: &[char] = &['*', '?', '['];

#[derive(Debug, Clone)]
enum ExcludePattern {
    Literal(String),
    Glob(glob::Pattern),
}

/// Exclude patterns matched against POSIX paths relative to a source root.
///
/// A pattern excludes a path when it
/// - equals one of the path's segments (`build`),
/// - is a path prefix ending on a segment boundary (`pkg/excluded`),
/// - or, for glob patterns, matches a segment or the whole relative path.
#[derive(Debug, Clone, Default)]
pub struct ExcludeMatcher {
    patterns: Vec<ExcludePattern>,
}

impl ExcludeMatcher {
    /// Compile patterns; invalid glob syntax is a configuration error
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled = Vec::new();

        for raw in patterns {
            let normalized = normalize_pattern(raw.as_ref());
            if normalized.is_empty() {
                continue;
            }

            if normalized.contains(GLOB_CHARS) {
                let pattern = glob::Pattern::new(&normalized).map_err(|e| {
                    SkeletonError::Config(format!(
                        "Invalid exclude pattern '{}': {}",
                        raw.as_ref(),
                        e
                    ))
                })?;
                compiled.push(ExcludePattern::Glob(pattern));
            } else {
                compiled.push(ExcludePattern::Literal(normalized));
            }
        }

        Ok(Self { patterns: compiled })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Check a POSIX path relative to its source root
    pub fn is_excluded(&self, relative: &str) -> bool {
        if relative.is_empty() {
            return false;
        }

        self.patterns.iter().any(|pattern| match pattern {
            ExcludePattern::Literal(literal) => {
                relative == literal
                    || relative
                        .strip_prefix(literal.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
                    || relative.split('/').any(|segment| segment == literal)
            }
            ExcludePattern::Glob(glob) => {
                glob.matches(relative) || relative.split('/').any(|segment| glob.matches(segment))
            }
        })
    }
}

fn normalize_pattern(raw: &str) -> String {
    let posix = raw.trim().replace('\\', "/");
    let without_dot = posix.strip_prefix("./").unwrap_or(&posix);
    without_dot.trim_end_matches('/').to_string()
}

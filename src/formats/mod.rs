//! Format Writer
//!
//! Serializes a [`Skeleton`] into cross-referenced documents:
//!
//! ```text
//! <out>/
//!   manifest.json
//!   hierarchy.<ext>
//!   schemas/hierarchy.schema.json
//!   schemas/module.schema.json      (split layout only)
//!   modules/<package>.<ext>         (split layout only)
//! ```
//!
//! Every `$schema` and package `document` reference is relative to the
//! document that carries it; `metadata.sources` is relative to the output
//! directory. Output is byte-for-byte deterministic for a fixed timestamp.

pub mod document;
pub mod manifest;
pub mod schema;

pub use document::{HierarchyDocument, HierarchyEntry, PackageDocument, PackageLink};
pub use manifest::{DocumentKind, FailedFormat, Manifest, ManifestEntry};
pub use schema::DocumentSchemas;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::constants::output::{
    HIERARCHY_SCHEMA, HIERARCHY_STEM, MANIFEST_FILE, MODULE_SCHEMA, MODULES_DIR, SCHEMAS_DIR,
};
use crate::generator::aggregate::module_count;
use crate::types::paths::{document_reference, relative_posix};
use crate::types::{Node, Result, ResultExt, Skeleton, SkeletonError};

// =============================================================================
// Output Format
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [Self::Json, Self::Yaml];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// Serialize a document; JSON is pretty-printed with a trailing newline
    pub fn render<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        match self {
            Self::Json => {
                let mut out = serde_json::to_string_pretty(value)?;
                out.push('\n');
                Ok(out)
            }
            Self::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = SkeletonError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(SkeletonError::Config(format!(
                "Unknown output format '{}'. Valid values: json, yaml",
                s
            ))),
        }
    }
}

// =============================================================================
// Layout
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// One document per top-level package, linked from the hierarchy
    #[default]
    Split,
    /// Everything inline in the hierarchy document
    Embedded,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Split => "split",
            Self::Embedded => "embedded",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = SkeletonError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "split" => Ok(Self::Split),
            "embedded" => Ok(Self::Embedded),
            _ => Err(SkeletonError::Config(format!(
                "Unknown layout '{}'. Valid values: split, embedded",
                s
            ))),
        }
    }
}

// =============================================================================
// Writer
// =============================================================================

/// A rendered document waiting to be written
struct PendingFile {
    path: String,
    kind: DocumentKind,
    content: String,
}

/// Writes a skeleton's documents into one output directory
#[derive(Debug, Clone)]
pub struct SkeletonWriter {
    out_dir: PathBuf,
    layout: Layout,
}

impl SkeletonWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            layout: Layout::default(),
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Write schemas, one document set per format, and the manifest.
    ///
    /// A failure inside one format is recorded in
    /// [`Manifest::failed_formats`] and the remaining formats still run.
    /// Failures that prevent any usable output are returned as errors.
    #[instrument(skip(self, skeleton), fields(out = %self.out_dir.display(), layout = %self.layout))]
    pub fn write(&self, skeleton: &Skeleton, formats: &[OutputFormat]) -> Result<Manifest> {
        let mut unique: Vec<OutputFormat> = Vec::new();
        for format in formats {
            if !unique.contains(format) {
                unique.push(*format);
            }
        }
        if unique.is_empty() {
            return Err(SkeletonError::Config(
                "At least one output format is required".to_string(),
            ));
        }

        skeleton.validate()?;

        fs::create_dir_all(&self.out_dir).with_path(&self.out_dir)?;
        let out = self.out_dir.canonicalize().with_path(&self.out_dir)?;

        let split = self.splits(skeleton);
        let mut files = self.write_schemas(&out, split)?;

        let sources: Vec<String> = skeleton
            .metadata()
            .sources
            .iter()
            .map(|source| relative_posix(source, &out))
            .collect();

        let mut reserved: HashSet<String> = files.iter().map(|f| f.path.to_lowercase()).collect();
        reserved.insert(MANIFEST_FILE.to_lowercase());

        let mut failed_formats = Vec::new();
        for format in unique {
            let written = self
                .render_format(skeleton, &sources, split, format)
                .and_then(|pending| write_pending(&out, pending, &reserved));

            match written {
                Ok(entries) => {
                    debug!("Wrote {} {} documents", entries.len(), format);
                    files.extend(entries.into_iter().map(|(path, kind)| ManifestEntry {
                        path,
                        kind,
                        format,
                    }));
                }
                Err(err) => {
                    warn!("Failed to write {} output: {}", format, err);
                    failed_formats.push(FailedFormat {
                        format,
                        error: err.to_string(),
                    });
                }
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));

        let metadata = skeleton.metadata();
        let manifest = Manifest {
            version: metadata.version.clone(),
            generated_at: metadata.generated_at,
            level: metadata.level,
            layout: self.layout,
            files,
            skipped: skeleton.skipped().to_vec(),
            failed_formats,
        };

        let manifest_path = out.join(MANIFEST_FILE);
        let content = OutputFormat::Json.render(&manifest)?;
        fs::write(&manifest_path, content).with_path(&manifest_path)?;

        info!(
            "Wrote {} files to {} ({} formats failed)",
            manifest.files.len() + 1,
            out.display(),
            manifest.failed_formats.len()
        );
        Ok(manifest)
    }

    /// Package documents are emitted only when they would hold modules
    fn splits(&self, skeleton: &Skeleton) -> bool {
        self.layout == Layout::Split
            && skeleton.level().retains_modules()
            && skeleton
                .hierarchy()
                .values()
                .any(|node| matches!(node, Node::Package(_)))
    }

    fn write_schemas(&self, out: &Path, split: bool) -> Result<Vec<ManifestEntry>> {
        let dir = out.join(SCHEMAS_DIR);
        fs::create_dir_all(&dir).with_path(&dir)?;

        let mut schemas = vec![(HIERARCHY_SCHEMA, DocumentSchemas::hierarchy_schema())];
        if split {
            schemas.push((MODULE_SCHEMA, DocumentSchemas::module_schema()));
        }

        let mut entries = Vec::new();
        for (name, schema) in schemas {
            let path = dir.join(name);
            let content = OutputFormat::Json.render(&schema)?;
            fs::write(&path, content).with_path(&path)?;
            entries.push(ManifestEntry {
                path: format!("{}/{}", SCHEMAS_DIR, name),
                kind: DocumentKind::Schema,
                format: OutputFormat::Json,
            });
        }
        Ok(entries)
    }

    fn render_format(
        &self,
        skeleton: &Skeleton,
        sources: &[String],
        split: bool,
        format: OutputFormat,
    ) -> Result<Vec<PendingFile>> {
        let ext = format.extension();
        let hierarchy_path = format!("{}.{}", HIERARCHY_STEM, ext);
        let mut pending = Vec::new();
        let mut entries = BTreeMap::new();

        for (name, node) in skeleton.hierarchy() {
            let entry = match node {
                Node::Package(package) if split => {
                    let package_path = format!("{}/{}.{}", MODULES_DIR, name, ext);
                    let doc = PackageDocument {
                        schema: document_reference(
                            &package_path,
                            &format!("{}/{}", SCHEMAS_DIR, MODULE_SCHEMA),
                        ),
                        package: name,
                        modules: document::flatten_modules(package),
                    };
                    pending.push(PendingFile {
                        content: format.render(&doc)?,
                        path: package_path.clone(),
                        kind: DocumentKind::Package,
                    });

                    HierarchyEntry::Link(PackageLink::new(
                        package.path.clone(),
                        document_reference(&hierarchy_path, &package_path),
                        module_count(node),
                    ))
                }
                _ => HierarchyEntry::Inline(node),
            };
            entries.insert(name.as_str(), entry);
        }

        let metadata = skeleton.metadata();
        let doc = HierarchyDocument {
            schema: document_reference(
                &hierarchy_path,
                &format!("{}/{}", SCHEMAS_DIR, HIERARCHY_SCHEMA),
            ),
            metadata: document::MetadataView {
                sources: sources.to_vec(),
                level: metadata.level,
                generated_at: &metadata.generated_at,
                version: &metadata.version,
            },
            hierarchy: entries,
        };
        pending.push(PendingFile {
            content: format.render(&doc)?,
            path: hierarchy_path,
            kind: DocumentKind::Hierarchy,
        });

        Ok(pending)
    }
}

/// Write one format's documents; on failure, remove what was already written
fn write_pending(
    out: &Path,
    pending: Vec<PendingFile>,
    reserved: &HashSet<String>,
) -> Result<Vec<(String, DocumentKind)>> {
    let mut seen = reserved.clone();
    for file in &pending {
        // Case-insensitive filesystems would merge these
        if !seen.insert(file.path.to_lowercase()) {
            return Err(SkeletonError::PathCollision {
                path: out.join(&file.path),
            });
        }
    }

    let mut written: Vec<(String, DocumentKind)> = Vec::new();
    for file in pending {
        let target = out.join(&file.path);
        let result = match target.parent() {
            Some(parent) => fs::create_dir_all(parent).with_path(parent),
            None => Ok(()),
        }
        .and_then(|_| fs::write(&target, &file.content).with_path(&target));

        if let Err(err) = result {
            for (path, _) in &written {
                let _ = fs::remove_file(out.join(path));
            }
            return Err(err);
        }
        written.push((file.path, file.kind));
    }

    Ok(written)
}

/// Write `skeleton` to `out_dir` in split layout
pub fn write_skeleton(
    skeleton: &Skeleton,
    out_dir: impl AsRef<Path>,
    formats: &[OutputFormat],
) -> Result<Manifest> {
    SkeletonWriter::new(out_dir.as_ref()).write(skeleton, formats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::SkeletonGenerator;
    use crate::types::ResolutionLevel;
    use chrono::DateTime;
    use serde_json::Value;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("project_src/src");
        write(&src, "pkg/__init__.py", "");
        write(&src, "pkg/mod.py", "def f():\n    pass\n");
        write(&src, "pkg/sub/inner.py", "class C:\n    def m(self):\n        pass\n");
        write(&src, "pkg/excluded/secret.py", "def g():\n    pass\n");
        write(&src, "setup.py", "NAME = 'demo'\n");
        dir
    }

    fn generate(dir: &TempDir, level: ResolutionLevel) -> Skeleton {
        SkeletonGenerator::new([dir.path().join("project_src/src")])
            .with_exclude(["excluded"])
            .with_timestamp(DateTime::from_timestamp(1_700_000_000, 0).unwrap())
            .generate(level)
            .unwrap()
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn files_on_disk(root: &Path) -> Vec<String> {
        let mut files: Vec<String> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_write_json_includes_schemas_and_relative_paths() {
        let dir = fixture();
        let out = dir.path().join("out");
        let skeleton = generate(&dir, ResolutionLevel::Modules);

        let manifest = write_skeleton(&skeleton, &out, &[OutputFormat::Json]).unwrap();

        assert!(out.join("schemas/hierarchy.schema.json").exists());
        assert!(out.join("schemas/module.schema.json").exists());
        assert!(out.join("manifest.json").exists());

        let hierarchy = read_json(&out.join("hierarchy.json"));
        assert_eq!(hierarchy["$schema"], "./schemas/hierarchy.schema.json");
        assert_eq!(hierarchy["metadata"]["sources"][0], "../project_src/src");
        assert_eq!(hierarchy["metadata"]["level"], "modules");

        let link = &hierarchy["hierarchy"]["pkg"];
        assert_eq!(link["kind"], "package");
        assert_eq!(link["document"], "./modules/pkg.json");
        assert_eq!(link["modules"], 3);
        assert_eq!(hierarchy["hierarchy"]["setup"]["kind"], "module");

        let pkg = read_json(&out.join("modules/pkg.json"));
        assert_eq!(pkg["$schema"], "../schemas/module.schema.json");
        assert_eq!(pkg["package"], "pkg");
        assert_eq!(pkg["modules"]["mod"]["path"], "pkg/mod.py");
        assert_eq!(pkg["modules"]["mod"]["source"], 0);
        assert_eq!(pkg["modules"]["sub.inner"]["symbols"]["C"]["member_count"], 1);
        assert!(pkg["modules"].get("excluded.secret").is_none());

        // The manifest lists exactly the other files on disk
        let mut listed: Vec<String> = manifest.paths().map(str::to_string).collect();
        listed.push(MANIFEST_FILE.to_string());
        listed.sort();
        assert_eq!(listed, files_on_disk(&out));
        assert!(manifest.is_complete());

        let on_disk: Manifest =
            serde_json::from_str(&fs::read_to_string(out.join("manifest.json")).unwrap()).unwrap();
        assert_eq!(on_disk, manifest);
    }

    #[test]
    fn test_write_is_deterministic() {
        let dir = fixture();
        let first = dir.path().join("first");
        let second = dir.path().join("first_again");

        let formats = [OutputFormat::Json, OutputFormat::Yaml];
        write_skeleton(&generate(&dir, ResolutionLevel::Functions), &first, &formats).unwrap();
        write_skeleton(&generate(&dir, ResolutionLevel::Functions), &second, &formats).unwrap();

        let names = files_on_disk(&first);
        assert_eq!(names, files_on_disk(&second));
        for name in names {
            assert_eq!(
                fs::read(first.join(&name)).unwrap(),
                fs::read(second.join(&name)).unwrap(),
                "{} differs",
                name
            );
        }
    }

    #[test]
    fn test_yaml_output() {
        let dir = fixture();
        let out = dir.path().join("out");
        let manifest =
            write_skeleton(&generate(&dir, ResolutionLevel::Modules), &out, &[OutputFormat::Yaml])
                .unwrap();

        assert!(manifest.contains("hierarchy.yaml"));
        assert!(manifest.contains("modules/pkg.yaml"));

        let doc: serde_yaml::Value =
            serde_yaml::from_str(&fs::read_to_string(out.join("modules/pkg.yaml")).unwrap())
                .unwrap();
        assert_eq!(doc["$schema"].as_str(), Some("../schemas/module.schema.json"));
        assert_eq!(doc["modules"]["mod"]["path"].as_str(), Some("pkg/mod.py"));
    }

    #[test]
    fn test_embedded_layout() {
        let dir = fixture();
        let out = dir.path().join("out");
        let manifest = SkeletonWriter::new(&out)
            .with_layout(Layout::Embedded)
            .write(&generate(&dir, ResolutionLevel::Classes), &[OutputFormat::Json])
            .unwrap();

        assert!(!out.join("modules").exists());
        assert!(!out.join("schemas/module.schema.json").exists());
        assert_eq!(manifest.files_of(DocumentKind::Package).count(), 0);

        let hierarchy = read_json(&out.join("hierarchy.json"));
        let module = &hierarchy["hierarchy"]["pkg"]["children"]["mod"];
        assert_eq!(module["path"], "pkg/mod.py");
        assert_eq!(module["symbols"]["f"]["kind"], "function");
    }

    #[test]
    fn test_packages_level_has_no_package_documents() {
        let dir = fixture();
        let out = dir.path().join("out");
        let manifest =
            write_skeleton(&generate(&dir, ResolutionLevel::Packages), &out, &[OutputFormat::Json])
                .unwrap();

        assert!(!out.join("schemas/module.schema.json").exists());
        assert!(!manifest.contains("modules/pkg.json"));

        let hierarchy = read_json(&out.join("hierarchy.json"));
        let pkg = &hierarchy["hierarchy"]["pkg"];
        assert_eq!(pkg["summary"]["modules"], 3);
        assert!(hierarchy["hierarchy"].get("setup").is_none());
    }

    #[test]
    fn test_skipped_files_in_manifest() {
        let dir = fixture();
        write(&dir.path().join("project_src/src"), "pkg/broken.py", "def (:\n");
        let out = dir.path().join("out");

        let manifest =
            write_skeleton(&generate(&dir, ResolutionLevel::Modules), &out, &[OutputFormat::Json])
                .unwrap();
        assert_eq!(manifest.skipped.len(), 1);
        assert_eq!(manifest.skipped[0].path, "pkg/broken.py");

        let on_disk = read_json(&out.join("manifest.json"));
        assert_eq!(on_disk["skipped"][0]["source"], 0);
    }

    #[test]
    fn test_failed_format_does_not_stop_others() {
        let dir = fixture();
        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();
        // A directory squatting on the JSON hierarchy path breaks that format only
        fs::create_dir_all(out.join("hierarchy.json")).unwrap();

        let manifest = write_skeleton(
            &generate(&dir, ResolutionLevel::Modules),
            &out,
            &[OutputFormat::Json, OutputFormat::Yaml],
        )
        .unwrap();

        assert_eq!(manifest.failed_formats.len(), 1);
        assert_eq!(manifest.failed_formats[0].format, OutputFormat::Json);
        assert!(manifest.contains("hierarchy.yaml"));
        assert!(!manifest.contains("hierarchy.json"));
        assert!(!manifest.contains("modules/pkg.json"));
        assert!(!out.join("modules/pkg.json").exists());
    }

    #[test]
    fn test_requires_a_format() {
        let dir = fixture();
        let err = write_skeleton(&generate(&dir, ResolutionLevel::Modules), dir.path().join("out"), &[])
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_format_and_layout_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!("embedded".parse::<Layout>().unwrap(), Layout::Embedded);
        assert!("nested".parse::<Layout>().is_err());
    }
}

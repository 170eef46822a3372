//! Target classification.
//!
//! Decides what a path handed to the hook actually is, and whether it is
//! worth checking at all.

use std::path::{Path, PathBuf};

/// File extensions the hook checks.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "svelte"];

/// Extensions the narrow type checker handles directly.
const PRIMARY_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

/// Skip reason for files outside the supported set.
pub const SKIP_UNSUPPORTED: &str = "not a TypeScript/Svelte file";

/// Skip reason for supported paths that do not exist.
pub const SKIP_MISSING: &str = "file does not exist";

/// A path with the facts the pipeline needs about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// The path exactly as given.
    pub raw: String,
    /// The path resolved against the working directory.
    pub path: PathBuf,
    /// Whether anything exists at `path`.
    pub exists: bool,
    /// Whether `path` is a regular file.
    pub is_file: bool,
    /// Whether the extension is in [`SUPPORTED_EXTENSIONS`].
    pub is_supported_extension: bool,
}

/// Shape of a target that will be checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// A TypeScript/JavaScript file the type checker accepts directly.
    SourceFile(PathBuf),
    /// A component file that has to be checked through its directory.
    ComponentFile(PathBuf),
    /// A directory or anything else that is not a single file.
    Project(PathBuf),
}

/// What to do with a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Run the checks.
    Check(Shape),
    /// Nothing to check; the reason is reported back verbatim.
    Skip(&'static str),
}

impl Target {
    /// Inspects `raw`, resolving relative paths against `base`.
    #[must_use]
    pub fn resolve(raw: &str, base: &Path) -> Self {
        let given = Path::new(raw);
        let path = if given.is_absolute() {
            given.to_path_buf()
        } else {
            base.join(given)
        };

        let metadata = std::fs::metadata(&path).ok();
        let is_supported_extension = extension(&path)
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()));

        Self {
            raw: raw.to_string(),
            exists: metadata.is_some(),
            is_file: metadata.as_ref().is_some_and(std::fs::Metadata::is_file),
            is_supported_extension,
            path,
        }
    }

    /// Classifies the target.
    #[must_use]
    pub fn classify(&self) -> Classification {
        if self.exists && !self.is_file {
            return Classification::Check(Shape::Project(self.path.clone()));
        }

        if !self.is_supported_extension {
            return Classification::Skip(SKIP_UNSUPPORTED);
        }

        if !self.exists {
            return Classification::Skip(SKIP_MISSING);
        }

        let is_primary = extension(&self.path)
            .is_some_and(|ext| PRIMARY_EXTENSIONS.contains(&ext.as_str()));

        if is_primary {
            Classification::Check(Shape::SourceFile(self.path.clone()))
        } else {
            Classification::Check(Shape::ComponentFile(self.path.clone()))
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "").expect("write file");
    }

    #[rstest]
    #[case("edited.ts")]
    #[case("view.tsx")]
    #[case("script.js")]
    #[case("widget.jsx")]
    #[case("Upper.TS")]
    fn test_primary_files_are_source_files(#[case] name: &str) {
        let temp = TempDir::new().expect("create temp dir");
        touch(temp.path(), name);

        let target = Target::resolve(name, temp.path());
        assert!(target.exists);
        assert!(target.is_file);
        assert!(target.is_supported_extension);
        assert_eq!(
            target.classify(),
            Classification::Check(Shape::SourceFile(temp.path().join(name)))
        );
    }

    #[test]
    fn test_svelte_file_is_component() {
        let temp = TempDir::new().expect("create temp dir");
        touch(temp.path(), "App.svelte");

        let target = Target::resolve("App.svelte", temp.path());
        assert_eq!(
            target.classify(),
            Classification::Check(Shape::ComponentFile(temp.path().join("App.svelte")))
        );
    }

    #[rstest]
    #[case("x.png")]
    #[case("README.md")]
    #[case("Makefile")]
    #[case("styles.css")]
    fn test_unsupported_files_are_skipped(#[case] name: &str) {
        let temp = TempDir::new().expect("create temp dir");
        touch(temp.path(), name);

        let target = Target::resolve(name, temp.path());
        assert_eq!(target.classify(), Classification::Skip(SKIP_UNSUPPORTED));
    }

    #[test]
    fn test_missing_unsupported_file_reports_unsupported() {
        let temp = TempDir::new().expect("create temp dir");
        let target = Target::resolve("x.png", temp.path());
        assert!(!target.exists);
        assert_eq!(target.classify(), Classification::Skip(SKIP_UNSUPPORTED));
    }

    #[test]
    fn test_missing_supported_file_is_skipped() {
        let temp = TempDir::new().expect("create temp dir");
        let target = Target::resolve("gone.ts", temp.path());
        assert_eq!(target.classify(), Classification::Skip(SKIP_MISSING));
    }

    #[test]
    fn test_directory_is_project() {
        let temp = TempDir::new().expect("create temp dir");
        let target = Target::resolve(".", temp.path());
        assert!(target.exists);
        assert!(!target.is_file);
        assert_eq!(
            target.classify(),
            Classification::Check(Shape::Project(temp.path().join(".")))
        );
    }

    #[test]
    fn test_directory_with_source_like_name_is_project() {
        let temp = TempDir::new().expect("create temp dir");
        std::fs::create_dir(temp.path().join("types.ts")).expect("create dir");

        let target = Target::resolve("types.ts", temp.path());
        assert!(matches!(
            target.classify(),
            Classification::Check(Shape::Project(_))
        ));
    }

    #[test]
    fn test_absolute_path_ignores_base() {
        let temp = TempDir::new().expect("create temp dir");
        touch(temp.path(), "abs.ts");
        let absolute = temp.path().join("abs.ts");

        let target = Target::resolve(
            absolute.to_str().expect("utf-8 path"),
            Path::new("/nonexistent"),
        );
        assert_eq!(target.path, absolute);
        assert!(target.is_file);
    }

    #[test]
    fn test_raw_path_is_preserved() {
        let temp = TempDir::new().expect("create temp dir");
        let target = Target::resolve("src/edited.ts", temp.path());
        assert_eq!(target.raw, "src/edited.ts");
    }
}

use crate::config::CityConfig;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Version-control metadata, never descended into
const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn", ".bzr"];

/// A file selected for analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute (or root-joined) path used for reading
    pub path: PathBuf,

    /// Path relative to the scan root, `/`-separated
    pub relative: String,

    /// Base file name
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Lowercase extensions without the leading dot
    pub extensions: Vec<String>,
    pub max_files: usize,
    pub exclude_dirs: Vec<String>,
    pub respect_gitignore: bool,
    pub include_hidden: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::from_config(&CityConfig::default())
    }
}

impl ScanOptions {
    pub fn from_config(config: &CityConfig) -> Self {
        Self {
            extensions: config.extensions.iter().map(|e| e.to_lowercase()).collect(),
            max_files: config.max_files,
            exclude_dirs: config.exclude_dirs.clone(),
            respect_gitignore: config.respect_gitignore,
            include_hidden: config.include_hidden,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub files: Vec<SourceFile>,
    /// The file cap was hit and the walk stopped early
    pub truncated: bool,
}

/// Scanner for finding source files in a project
pub struct FileScanner {
    root: PathBuf,
    options: ScanOptions,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>, options: ScanOptions) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            options,
        }
    }

    /// Walk the tree in file-name order, stopping at `max_files`
    pub fn scan(&self) -> ScanResult {
        let mut result = ScanResult::default();

        let root = self.root.clone();
        let exclude = self.options.exclude_dirs.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(!self.options.include_hidden)
            .git_ignore(self.options.respect_gitignore)
            .git_global(self.options.respect_gitignore)
            .git_exclude(self.options.respect_gitignore)
            .ignore(self.options.respect_gitignore)
            .parents(self.options.respect_gitignore)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b));
        builder.filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir && Self::is_ignored_scope(entry.path(), &root, &exclude))
        });

        for entry in builder.build() {
            match entry {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if !self.is_source_file(path) {
                        continue;
                    }

                    if result.files.len() >= self.options.max_files {
                        log::warn!(
                            "Reached file limit of {}; remaining files are excluded",
                            self.options.max_files
                        );
                        result.truncated = true;
                        break;
                    }
                    result.files.push(self.source_file(path));
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        log::info!("Found {} source files", result.files.len());
        result
    }

    fn source_file(&self, path: &Path) -> SourceFile {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let mut relative = relative.to_string_lossy().to_string();
        if relative.contains('\\') {
            relative = relative.replace('\\', "/");
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| relative.clone());
        SourceFile {
            path: path.to_path_buf(),
            relative,
            name,
        }
    }

    fn is_source_file(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        let ext = ext.to_lowercase();
        self.options.extensions.iter().any(|candidate| candidate == &ext)
    }

    fn is_ignored_scope(path: &Path, root: &Path, exclude: &[String]) -> bool {
        let Ok(relative) = path.strip_prefix(root) else {
            return false;
        };
        relative.components().any(|component| {
            let std::path::Component::Normal(name) = component else {
                return false;
            };
            let name = name.to_string_lossy();
            let name: &str = &name;
            VCS_DIRS.contains(&name) || exclude.iter().any(|excluded| excluded == name)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn relative_paths(result: &ScanResult) -> Vec<&str> {
        result.files.iter().map(|f| f.relative.as_str()).collect()
    }

    #[test]
    fn filters_by_extension_and_skips_vcs() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join(".git/hooks")).unwrap();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join(".git/hooks/pre-commit.sh"), b"exit 0").unwrap();
        fs::write(root.join("src/main.rs"), b"fn main() {}").unwrap();
        fs::write(root.join("src/App.PY"), b"print(1)").unwrap();
        fs::write(root.join("README.md"), b"# hi").unwrap();

        let options = ScanOptions {
            include_hidden: true,
            ..ScanOptions::default()
        };
        let result = FileScanner::new(root, options).scan();

        assert_eq!(relative_paths(&result), vec!["src/App.PY", "src/main.rs"]);
        assert!(!result.truncated);
        assert_eq!(result.files[1].name, "main.rs");
    }

    #[test]
    fn skips_excluded_directories() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), b"x").unwrap();
        fs::write(root.join("app.js"), b"x").unwrap();

        let result = FileScanner::new(root, ScanOptions::default()).scan();
        assert_eq!(relative_paths(&result), vec!["app.js"]);
    }

    #[test]
    fn stops_at_file_limit() {
        let temp = tempdir().unwrap();
        for i in 0..5 {
            fs::write(temp.path().join(format!("f{i}.go")), b"package a").unwrap();
        }

        let options = ScanOptions {
            max_files: 3,
            ..ScanOptions::default()
        };
        let result = FileScanner::new(temp.path(), options).scan();

        assert!(result.truncated);
        assert_eq!(relative_paths(&result), vec!["f0.go", "f1.go", "f2.go"]);
    }

    #[test]
    fn exact_limit_is_not_truncation() {
        let temp = tempdir().unwrap();
        for i in 0..3 {
            fs::write(temp.path().join(format!("f{i}.go")), b"package a").unwrap();
        }
        let options = ScanOptions {
            max_files: 3,
            ..ScanOptions::default()
        };
        let result = FileScanner::new(temp.path(), options).scan();
        assert!(!result.truncated);
        assert_eq!(result.files.len(), 3);
    }

    #[test]
    fn traversal_order_is_stable() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        for dir in ["b", "a", "c"] {
            fs::create_dir_all(root.join(dir)).unwrap();
            fs::write(root.join(dir).join("x.rs"), b"fn x() {}").unwrap();
        }
        let first = FileScanner::new(root, ScanOptions::default()).scan();
        let second = FileScanner::new(root, ScanOptions::default()).scan();
        assert_eq!(relative_paths(&first), vec!["a/x.rs", "b/x.rs", "c/x.rs"]);
        assert_eq!(relative_paths(&first), relative_paths(&second));
    }

    #[test]
    fn gitignore_is_respected_without_a_repository() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("generated")).unwrap();
        fs::write(root.join("generated/out.rs"), b"fn g() {}").unwrap();
        fs::write(root.join("lib.rs"), b"fn l() {}").unwrap();
        fs::write(root.join(".gitignore"), b"/generated\n").unwrap();

        let result = FileScanner::new(root, ScanOptions::default()).scan();
        assert_eq!(relative_paths(&result), vec!["lib.rs"]);
    }
}

use crate::config::Config;
use crate::index::Language;
use ignore::WalkBuilder;
use miette::{IntoDiagnostic, Result, WrapErr};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Type of source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Kotlin,
    Java,
}

impl FileType {
    /// Determine file type from path
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "kt" | "kts" => Some(FileType::Kotlin),
            "java" => Some(FileType::Java),
            _ => None,
        }
    }

    pub fn language(&self) -> Language {
        match self {
            FileType::Kotlin => Language::Kotlin,
            FileType::Java => Language::Java,
        }
    }
}

/// Represents a discovered source file
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub file_type: FileType,
}

impl SourceFile {
    pub fn new(path: PathBuf, file_type: FileType) -> Self {
        Self { path, file_type }
    }

    /// Load and return owned contents
    pub fn read_contents(&self) -> Result<String> {
        std::fs::read_to_string(&self.path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read {}", self.path.display()))
    }
}

/// File finder for discovering source files in a project
pub struct FileFinder<'a> {
    config: &'a Config,
}

impl<'a> FileFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Find all Kotlin and Java source files under `root`, sorted by path
    pub fn find_files(&self, root: &Path) -> Result<Vec<SourceFile>> {
        debug!("Scanning for files in: {}", root.display());

        if root.is_file() {
            return Ok(FileType::from_path(root)
                .map(|file_type| SourceFile::new(root.to_path_buf(), file_type))
                .into_iter()
                .collect());
        }

        let targets = if self.config.targets.is_empty() {
            vec![root.to_path_buf()]
        } else {
            self.config.targets.iter().map(|t| root.join(t)).collect()
        };

        let mut files: Vec<SourceFile> = targets
            .par_iter()
            .flat_map(|target| self.scan_directory(target))
            .collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files.dedup_by(|a, b| a.path == b.path);

        debug!("Found {} files", files.len());
        Ok(files)
    }

    /// Scan a single directory for source files
    fn scan_directory(&self, dir: &Path) -> Vec<SourceFile> {
        if !dir.exists() {
            trace!("Directory does not exist: {}", dir.display());
            return Vec::new();
        }

        let walker = WalkBuilder::new(dir)
            .hidden(true) // Skip hidden files
            .git_ignore(true) // Respect .gitignore
            .git_global(true) // Respect global gitignore
            .git_exclude(true) // Respect .git/info/exclude
            .ignore(true) // Respect .ignore files
            .parents(true) // Check parent directories for ignore files
            .follow_links(false)
            .build();

        walker
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| {
                let path = entry.path();

                if self.config.should_exclude(path) {
                    trace!("Excluding: {}", path.display());
                    return None;
                }

                let file_type = FileType::from_path(path)?;
                trace!("Found {:?}: {}", file_type, path.display());
                Some(SourceFile::new(path.to_path_buf(), file_type))
            })
            .collect()
    }
}

/// Statistics about discovered files
#[derive(Debug, Default)]
pub struct FileStats {
    pub kotlin_files: usize,
    pub java_files: usize,
}

impl FileStats {
    pub fn from_files(files: &[SourceFile]) -> Self {
        let mut stats = Self::default();
        for file in files {
            match file.file_type {
                FileType::Kotlin => stats.kotlin_files += 1,
                FileType::Java => stats.java_files += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.kotlin_files + self.java_files
    }
}

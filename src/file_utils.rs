use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Extension of drawing interchange files
pub const DRAWING_EXTENSION: &str = "json";

/// Suffix appended to the output stem for the audit report
pub const REPORT_SUFFIX: &str = "_report";

/// Stems produced by a previous run: `<target>_<stem>_<HHhMM_dd-mm-yy>`
static PRODUCED_STEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z]{2}_.+_\d{2}h\d{2}_\d{2}-\d{2}-\d{2}$").expect("output stem regex is valid")
});

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Output file name for a translated drawing
    // @params: input_file, target_language, timestamp
    pub fn output_filename<P: AsRef<Path>>(
        input_file: P,
        target_language: &str,
        timestamp: DateTime<Local>,
    ) -> String {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();
        format!(
            "{}_{}_{}.{}",
            target_language,
            stem.to_string_lossy(),
            timestamp.format("%Hh%M_%d-%m-%y"),
            DRAWING_EXTENSION
        )
    }

    // @generates: Output path for a translated drawing, stamped now
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        target_language: &str,
    ) -> PathBuf {
        output_dir
            .as_ref()
            .join(Self::output_filename(input_file, target_language, Local::now()))
    }

    // @generates: Report path next to an output drawing
    pub fn report_path<P: AsRef<Path>>(output_file: P) -> PathBuf {
        let output_file = output_file.as_ref();
        let stem = output_file.file_stem().unwrap_or_default().to_string_lossy();
        output_file.with_file_name(format!("{}{}.csv", stem, REPORT_SUFFIX))
    }

    /// Whether a file looks like the output of an earlier run
    pub fn is_produced_output<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .file_stem()
            .is_some_and(|stem| PRODUCED_STEM.is_match(&stem.to_string_lossy()))
    }

    /// Find files with a specific extension in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let extension = extension.trim_start_matches('.');
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
            {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Drawings of a folder, without outputs of earlier runs
    pub fn find_drawings<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        Ok(Self::find_files(dir, DRAWING_EXTENSION)?
            .into_iter()
            .filter(|path| !Self::is_produced_output(path))
            .collect())
    }
}

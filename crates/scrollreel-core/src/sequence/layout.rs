use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;

use super::SequenceDescriptor;
use crate::{Error, Result};

/// Directory (relative to the assets root) that holds one folder per sequence
pub const SEQUENCE_DIR: &str = "sequence";

/// File naming scheme shared by all frames of one sequence
///
/// Frames are numbered from 1 on disk, zero-padded to `pad` digits:
/// index 0 with the default layout is `frame_0001.webp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameLayout {
    pub prefix: String,
    pub pad: usize,
    pub ext: String,
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self {
            prefix: "frame_".to_string(),
            pad: 4,
            ext: "webp".to_string(),
        }
    }
}

impl FrameLayout {
    /// File name for a zero-based frame index
    pub fn file_name(&self, index: u32) -> String {
        format!(
            "{}{:0width$}.{}",
            self.prefix,
            index as u64 + 1,
            self.ext,
            width = self.pad
        )
    }

    /// Path of a frame relative to the assets root
    pub fn relative_path(&self, name: &str, index: u32) -> PathBuf {
        Path::new(SEQUENCE_DIR).join(name).join(self.file_name(index))
    }

    /// URL path segment of a frame, always `/`-separated
    pub fn url_path(&self, name: &str, index: u32) -> String {
        format!("{}/{}/{}", SEQUENCE_DIR, name, self.file_name(index))
    }

    /// Pattern matching frame file names, capturing the 1-based number
    pub fn file_pattern(&self) -> Result<Regex> {
        let pattern = format!(
            r"^{}(\d+)\.{}$",
            regex::escape(&self.prefix),
            regex::escape(&self.ext)
        );
        Regex::new(&pattern).map_err(|e| Error::Layout(e.to_string()))
    }
}

/// Result of comparing a sequence directory against its descriptor
#[derive(Debug, Clone, Serialize)]
pub struct LayoutReport {
    pub name: String,
    pub directory: PathBuf,
    pub declared: u32,
    /// Frames present with the expected name
    pub found: u32,
    /// 1-based frame numbers within `1..=declared` with no file
    pub missing: Vec<u32>,
    /// 1-based frame numbers beyond `declared`
    pub extra: Vec<u32>,
    /// Files that match the prefix/extension but not the padding
    pub malformed: Vec<String>,
}

impl LayoutReport {
    pub fn is_consistent(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty() && self.malformed.is_empty()
    }
}

/// Scan `<root>/sequence/<name>/` and report how it matches the descriptor
pub fn scan_layout(root: &Path, descriptor: &SequenceDescriptor) -> Result<LayoutReport> {
    let layout = descriptor.layout();
    let directory = root.join(SEQUENCE_DIR).join(descriptor.name());
    let pattern = layout.file_pattern()?;
    let declared = descriptor.frame_count();

    let mut present = vec![false; declared as usize];
    let mut extra = Vec::new();
    let mut malformed = Vec::new();

    if directory.is_dir() {
        for entry in std::fs::read_dir(&directory)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let Some(caps) = pattern.captures(file_name) else {
                continue;
            };
            let Ok(number) = caps[1].parse::<u32>() else {
                malformed.push(file_name.to_string());
                continue;
            };
            if number == 0 || layout.file_name(number - 1) != file_name {
                malformed.push(file_name.to_string());
                continue;
            }
            if number <= declared {
                present[(number - 1) as usize] = true;
            } else {
                extra.push(number);
            }
        }
    } else {
        tracing::debug!(directory = %directory.display(), "Sequence directory does not exist");
    }

    extra.sort_unstable();
    malformed.sort();

    let missing: Vec<u32> = present
        .iter()
        .enumerate()
        .filter(|(_, ok)| !**ok)
        .map(|(i, _)| i as u32 + 1)
        .collect();
    let found = declared - missing.len() as u32;

    Ok(LayoutReport {
        name: descriptor.name().to_string(),
        directory,
        declared,
        found,
        missing,
        extra,
        malformed,
    })
}

/// Apply the frame-count contract
///
/// Strict mode turns any inconsistency into an error; otherwise it is logged and
/// the affected frames stay permanently absent.
pub fn enforce_layout(report: &LayoutReport, strict: bool) -> Result<()> {
    if report.is_consistent() {
        return Ok(());
    }

    if strict {
        return Err(Error::FrameCountMismatch {
            name: report.name.clone(),
            declared: report.declared,
            found: report.found + report.extra.len() as u32,
        });
    }

    tracing::warn!(
        sequence = %report.name,
        declared = report.declared,
        found = report.found,
        missing = report.missing.len(),
        extra = report.extra.len(),
        malformed = report.malformed.len(),
        "Frame files do not match the declared frame count"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("scrollreel-layout-{}-{}", tag, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn touch_frames(root: &Path, name: &str, files: &[&str]) {
        let dir = root.join(SEQUENCE_DIR).join(name);
        std::fs::create_dir_all(&dir).unwrap();
        for file in files {
            std::fs::write(dir.join(file), b"x").unwrap();
        }
    }

    #[test]
    fn test_file_name_padding() {
        let layout = FrameLayout::default();
        assert_eq!(layout.file_name(0), "frame_0001.webp");
        assert_eq!(layout.file_name(119), "frame_0120.webp");

        let bare = FrameLayout {
            prefix: String::new(),
            pad: 3,
            ext: "jpg".to_string(),
        };
        assert_eq!(bare.file_name(4), "005.jpg");
        assert_eq!(bare.url_path("hero-bg", 4), "sequence/hero-bg/005.jpg");
    }

    #[test]
    fn test_scan_consistent() {
        let root = temp_root("ok");
        touch_frames(&root, "seq", &["frame_0001.webp", "frame_0002.webp", "frame_0003.webp", "notes.txt"]);
        let descriptor = SequenceDescriptor::new("seq", 3, 1.0, false, FrameLayout::default()).unwrap();

        let report = scan_layout(&root, &descriptor).unwrap();
        assert!(report.is_consistent());
        assert_eq!(report.found, 3);
        assert!(enforce_layout(&report, true).is_ok());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_scan_reports_gaps_and_extras() {
        let root = temp_root("gaps");
        touch_frames(
            &root,
            "seq",
            &["frame_0001.webp", "frame_0003.webp", "frame_0005.webp", "frame_12.webp"],
        );
        let descriptor = SequenceDescriptor::new("seq", 4, 1.0, false, FrameLayout::default()).unwrap();

        let report = scan_layout(&root, &descriptor).unwrap();
        assert_eq!(report.found, 2);
        assert_eq!(report.missing, vec![2, 4]);
        assert_eq!(report.extra, vec![5]);
        assert_eq!(report.malformed, vec!["frame_12.webp".to_string()]);

        assert!(matches!(
            enforce_layout(&report, true),
            Err(Error::FrameCountMismatch { declared: 4, found: 3, .. })
        ));
        assert!(enforce_layout(&report, false).is_ok());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_scan_missing_directory() {
        let root = temp_root("missing");
        let descriptor = SequenceDescriptor::new("nowhere", 2, 1.0, false, FrameLayout::default()).unwrap();
        let report = scan_layout(&root, &descriptor).unwrap();
        assert_eq!(report.found, 0);
        assert_eq!(report.missing, vec![1, 2]);
        let _ = std::fs::remove_dir_all(&root);
    }
}

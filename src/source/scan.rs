//! Local video discovery
//!
//! Recursive walk filtered down to playable, non-empty video files.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Extensions treated as playable video.
pub const VIDEO_EXTENSIONS: [&str; 11] = [
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "3gp",
];

/// Recursively collect playable videos under `root`, skipping hidden
/// files, `._` metadata droppings, and zero-byte files. Result is sorted
/// for stable catalogs.
pub fn scan_video_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        if !is_video_file(entry.path()) {
            continue;
        }
        match entry.metadata() {
            Ok(meta) if meta.len() > 0 => files.push(entry.path().to_path_buf()),
            Ok(_) => log::debug!("Skipping empty file: {}", entry.path().display()),
            Err(e) => log::debug!("Skipping unreadable file {}: {}", entry.path().display(), e),
        }
    }
    files.sort();
    log::info!("Found {} video file(s) under {}", files.len(), root.display());
    files
}

/// Name and extension filter, without touching the filesystem.
pub fn is_video_file(path: &Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return false,
    };
    if name.starts_with('.') || name.starts_with("._") {
        return false;
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => VIDEO_EXTENSIONS.iter().any(|v| v.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

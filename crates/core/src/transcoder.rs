//! ffmpeg wrapper that strips embedded artwork while copying the audio
//! stream and preserving the rest of the metadata.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ffmpeg exited with {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },
}

/// Rewrite `path` in place without its embedded images.
///
/// ffmpeg writes to a temporary sibling which replaces the original on
/// success; a non-zero exit discards the partial output and leaves the
/// input untouched. The input path must exist at call time.
pub fn strip_artwork(path: &Path) -> Result<(), TranscodeError> {
    let temp = temp_sibling(path);

    let output = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(path)
        .args(["-map_metadata", "0", "-id3v2_version", "3", "-c:a", "copy", "-vn"])
        .arg(&temp)
        .output()?;

    if !output.status.success() {
        let _ = fs::remove_file(&temp);
        return Err(TranscodeError::Failed {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    fs::rename(&temp, path)?;
    Ok(())
}

/// Strip artwork from every `.mp3` directly inside `dir`, logging per-file
/// results and a removed/total summary. Returns the removed count.
pub fn strip_artwork_in_dir(dir: &Path) -> anyhow::Result<usize> {
    let mut total = 0usize;
    let mut removed = 0usize;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_mp3 = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("mp3"))
            .unwrap_or(false);
        if !path.is_file() || !is_mp3 {
            continue;
        }
        total += 1;
        match strip_artwork(&path) {
            Ok(()) => {
                info!(file = %path.display(), "cover removed");
                removed += 1;
            }
            Err(e) => error!(file = %path.display(), error = %e, "artwork strip failed"),
        }
    }

    info!(total, removed, "artwork sweep complete");
    Ok(removed)
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file.mp3".to_string());
    path.with_file_name(format!("_tmp_{name}"))
}

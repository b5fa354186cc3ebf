//! Applies one proposed correction: staging copy, retag, optional artwork
//! strip, final rename.

use crate::extractor::{field_to_item_key, parse_options};
use crate::models::TagValue;
use crate::transcoder;
use anyhow::Context;
use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::Tag;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub struct ApplyOptions<'a> {
    pub output_dir: &'a Path,
    pub remove_artwork: bool,
}

/// Copy `source` into the output directory, write `metadata` to the staged
/// copy, optionally strip artwork, and rename it to `new_name`.
///
/// The source file is never mutated. Any failure is logged with the file
/// identity and reported as `false`; partial output stays in place for
/// inspection and the run continues with the next file.
pub fn apply(
    source: &Path,
    new_name: &str,
    metadata: &[(String, TagValue)],
    opts: &ApplyOptions<'_>,
) -> bool {
    match apply_inner(source, new_name, metadata, opts) {
        Ok(dest) => {
            info!(from = %source.display(), to = %dest.display(), "applied");
            true
        }
        Err(e) => {
            error!(path = %source.display(), error = %e, "failed to apply changes");
            false
        }
    }
}

fn apply_inner(
    source: &Path,
    new_name: &str,
    metadata: &[(String, TagValue)],
    opts: &ApplyOptions<'_>,
) -> anyhow::Result<PathBuf> {
    let file_name = source.file_name().context("source path has no file name")?;
    let staged = opts.output_dir.join(file_name);

    fs::copy(source, &staged)
        .with_context(|| format!("staging copy to {}", staged.display()))?;

    write_tags(&staged, metadata)?;

    // The staged copy exists and already carries its final tags, so the
    // transcoder always receives a real file.
    if opts.remove_artwork {
        transcoder::strip_artwork(&staged).context("strip artwork")?;
    }

    let final_path = opts.output_dir.join(new_name);
    if staged != final_path {
        fs::rename(&staged, &final_path)
            .with_context(|| format!("rename to {}", final_path.display()))?;
    }

    Ok(final_path)
}

/// Write every (tag, value) pair; missing values render as the sentinel.
/// Reads cover art so existing pictures survive the tag rewrite.
fn write_tags(path: &Path, metadata: &[(String, TagValue)]) -> anyhow::Result<()> {
    let mut tagged_file = Probe::open(path)
        .and_then(|probe| probe.options(parse_options().read_cover_art(true)).read())
        .with_context(|| format!("open tag container {}", path.display()))?;

    let tag_type = tagged_file.file_type().primary_tag_type();
    let tag = match tagged_file.tag_mut(tag_type) {
        Some(t) => t,
        None => {
            tagged_file.insert_tag(Tag::new(tag_type));
            tagged_file
                .tag_mut(tag_type)
                .context("file does not support its primary tag type")?
        }
    };

    for (field, value) in metadata {
        let Some(key) = field_to_item_key(field) else {
            continue;
        };
        tag.insert_text(key, value.render().to_string());
    }

    tag.save_to_path(path, WriteOptions::default())
        .with_context(|| format!("save tags to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_source_fails_without_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let opts = ApplyOptions {
            output_dir: dir.path(),
            remove_artwork: false,
        };
        let metadata = vec![("artist".to_string(), TagValue::present("A"))];
        assert!(!apply(
            Path::new("/nonexistent/input.mp3"),
            "out.mp3",
            &metadata,
            &opts
        ));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn unreadable_staged_copy_leaves_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let src_dir = tempfile::tempdir().unwrap();
        let source = src_dir.path().join("junk.mp3");
        fs::write(&source, b"not an mpeg stream").unwrap();

        let opts = ApplyOptions {
            output_dir: dir.path(),
            remove_artwork: false,
        };
        let metadata = vec![("artist".to_string(), TagValue::missing())];
        assert!(!apply(&source, "renamed.mp3", &metadata, &opts));

        // Tag write failed after staging; the staged copy is kept under
        // its original name for manual inspection.
        assert!(dir.path().join("junk.mp3").exists());
        assert!(!dir.path().join("renamed.mp3").exists());
        assert!(source.exists());
    }
}

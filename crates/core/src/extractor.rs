//! Reads the configured tag set from one file into a [`TagRecord`].

use crate::cleaner::StopwordCleaner;
use crate::models::{TagRecord, TagValue};
use lofty::config::{ParseOptions, ParsingMode};
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag};
use std::path::Path;
use tracing::warn;

pub(crate) fn parse_options() -> ParseOptions {
    ParseOptions::new().parsing_mode(ParsingMode::BestAttempt)
}

/// Map a configured tag name to the `ItemKey` used for reads and writes.
/// Unknown names are skipped rather than failing the file.
pub(crate) fn field_to_item_key(field: &str) -> Option<ItemKey> {
    match field {
        "artist" => Some(ItemKey::TrackArtist),
        "title" => Some(ItemKey::TrackTitle),
        "album" => Some(ItemKey::AlbumTitle),
        "albumartist" | "album_artist" => Some(ItemKey::AlbumArtist),
        "genre" => Some(ItemKey::Genre),
        "date" | "year" => Some(ItemKey::RecordingDate),
        "tracknumber" | "track" => Some(ItemKey::TrackNumber),
        "discnumber" | "disc" => Some(ItemKey::DiscNumber),
        "composer" => Some(ItemKey::Composer),
        "comment" => Some(ItemKey::Comment),
        "organization" | "publisher" => Some(ItemKey::Label),
        _ => None,
    }
}

/// Snapshot one file's metadata.
///
/// Absent, empty, or whitespace-only values become missing; every present
/// value and the bare filename run through the stopword cleaner. A file
/// whose tag container cannot be opened or parsed is logged and skipped
/// (`None`) so the caller omits it from the run.
pub fn extract(path: &Path, tag_names: &[String], cleaner: &StopwordCleaner) -> Option<TagRecord> {
    let tagged_file = match Probe::open(path)
        .and_then(|probe| probe.options(parse_options()).read())
    {
        Ok(f) => f,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping unreadable file");
            return None;
        }
    };

    let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());

    let mut metadata = Vec::with_capacity(tag_names.len());
    for name in tag_names {
        let raw = tag.and_then(|t| read_field(t, name));
        let value = match TagValue::from_raw(raw).as_option() {
            Some(v) => TagValue::present(cleaner.clean(v)),
            None => TagValue::missing(),
        };
        metadata.push((name.clone(), value));
    }

    let filename = path.file_name()?.to_string_lossy().into_owned();
    let cleaned_filename = cleaner.clean(&filename);

    Some(TagRecord {
        filename,
        cleaned_filename,
        metadata,
    })
}

fn read_field(tag: &Tag, field: &str) -> Option<String> {
    let key = field_to_item_key(field)?;
    if let Some(value) = tag.get_string(&key) {
        return Some(value.to_string());
    }
    // Secondary key for date-like fields written by older taggers.
    match field {
        "date" | "year" => tag.get_string(&ItemKey::Year).map(|s| s.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lofty::config::WriteOptions;
    use lofty::prelude::*;
    use lofty::tag::TagType;
    use std::fs;

    fn cleaner() -> StopwordCleaner {
        StopwordCleaner::new(&[]).unwrap()
    }

    fn write_minimal_mp3(path: &Path) {
        let frame_len = 417;
        let mut data = Vec::with_capacity(frame_len * 4);
        for _ in 0..4 {
            let mut frame = vec![0u8; frame_len];
            frame[0] = 0xFF;
            frame[1] = 0xFB;
            frame[2] = 0x90;
            frame[3] = 0xC0;
            data.extend_from_slice(&frame);
        }
        fs::write(path, data).unwrap();
    }

    #[test]
    fn corrupt_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.mp3");
        fs::write(&path, b"definitely not an mpeg stream").unwrap();

        let names = vec!["artist".to_string(), "title".to_string()];
        assert!(extract(&path, &names, &cleaner()).is_none());
    }

    #[test]
    fn reads_written_tags_with_year_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagged.mp3");
        write_minimal_mp3(&path);

        let mut tag = Tag::new(TagType::Id3v2);
        tag.insert_text(ItemKey::TrackArtist, "Burial".to_string());
        tag.insert_text(ItemKey::Year, "2007".to_string());
        tag.save_to_path(&path, WriteOptions::default()).unwrap();

        let names = vec!["artist".to_string(), "date".to_string(), "album".to_string()];
        let record = extract(&path, &names, &cleaner()).unwrap();
        let get = |n: &str| {
            record
                .metadata
                .iter()
                .find(|(k, _)| k == n)
                .map(|(_, v)| v.render().to_string())
                .unwrap()
        };
        assert_eq!(get("artist"), "Burial");
        // Written under the year key; readable through either date key.
        assert_eq!(get("date"), "2007");
        assert_eq!(get("album"), "N");
    }

    #[test]
    fn unknown_tag_names_map_to_no_key() {
        assert!(field_to_item_key("bogus").is_none());
        assert!(field_to_item_key("artist").is_some());
        assert!(field_to_item_key("album_artist").is_some());
    }
}

use std::path::{Path, PathBuf};

use lofty::prelude::{ItemKey, TaggedFileExt};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::{ResourceRef, TrackDescriptor};

pub(super) const UNKNOWN_ARTIST: &str = "Unknown Artist";

const COVER_STEMS: [&str; 2] = ["cover", "folder"];
const COVER_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Look for `cover.*` / `folder.*` art next to an audio file.
pub(super) fn find_cover(dir: &Path) -> Option<PathBuf> {
    COVER_STEMS
        .iter()
        .flat_map(|stem| COVER_EXTENSIONS.iter().map(move |ext| dir.join(format!("{stem}.{ext}"))))
        .find(|p| p.is_file())
}

fn read_tags(path: &Path) -> (Option<String>, Option<String>) {
    let Ok(tagged) = lofty::read_from_path(path) else {
        return (None, None);
    };
    let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
        return (None, None);
    };

    let non_empty = |key: &ItemKey| {
        tag.get_string(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    (non_empty(&ItemKey::TrackTitle), non_empty(&ItemKey::TrackArtist))
}

/// Walk `dir` and build one descriptor per audio file, sorted by "artist - title".
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<TrackDescriptor> {
    let mut tracks: Vec<TrackDescriptor> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file() || !is_audio_file(path, settings) {
            continue;
        }

        let default_title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        let (title, artist) = read_tags(path);

        tracks.push(TrackDescriptor {
            title: title.unwrap_or(default_title),
            artist: artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            audio: ResourceRef::Local(path.to_path_buf()),
            cover: path.parent().and_then(find_cover).map(ResourceRef::Local),
        });
    }

    tracks.sort_by_cached_key(|t| format!("{} - {}", t.artist, t.title).to_lowercase());
    tracks
}

use std::path::{Path, PathBuf};

use crate::catalog::{self, TrackCatalog};
use crate::config::Settings;
use crate::error::{PlayerError, Result};

pub fn load_settings() -> Settings {
    Settings::load_validated().unwrap_or_else(|e| {
        // Config is optional; failures should not prevent the app from starting.
        eprintln!("allegro: bad config, using defaults: {e}");
        Settings::default()
    })
}

/// Where the catalog came from, shown in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Directory(PathBuf),
    Playlist,
}

impl CatalogSource {
    pub fn label(&self) -> String {
        match self {
            Self::Directory(dir) => dir.display().to_string(),
            Self::Playlist => "playlist".to_string(),
        }
    }
}

/// Build the catalog from a directory argument, else the configured playlist,
/// else the working directory.
pub fn build_catalog(
    arg: Option<&Path>,
    cwd: &Path,
    settings: &Settings,
) -> Result<(TrackCatalog, CatalogSource)> {
    if let Some(dir) = arg {
        if !dir.is_dir() {
            return Err(PlayerError::unavailable(dir.display(), "not a directory"));
        }
        return scan_dir(dir, settings);
    }

    if !settings.playlist.tracks.is_empty() {
        let catalog = TrackCatalog::from_entries(
            &settings.playlist.tracks,
            settings.playlist.base_dir.as_deref(),
        )?;
        return Ok((catalog, CatalogSource::Playlist));
    }

    scan_dir(cwd, settings)
}

fn scan_dir(dir: &Path, settings: &Settings) -> Result<(TrackCatalog, CatalogSource)> {
    let tracks = catalog::scan(dir, &settings.library);
    tracing::info!(dir = %dir.display(), tracks = tracks.len(), "scanned library");
    let catalog = TrackCatalog::new(tracks)?;
    Ok((catalog, CatalogSource::Directory(dir.to_path_buf())))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::config::TrackEntry;

    fn entry(title: &str) -> TrackEntry {
        TrackEntry {
            title: title.into(),
            artist: "Someone".into(),
            audio: format!("{title}.mp3"),
            cover: None,
        }
    }

    #[test]
    fn directory_argument_is_scanned() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.mp3"), b"x").unwrap();
        fs::write(dir.path().join("a.flac"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let mut settings = Settings::default();
        settings.playlist.tracks = vec![entry("ignored")];

        let (catalog, source) =
            build_catalog(Some(dir.path()), Path::new("/nowhere"), &settings).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(source, CatalogSource::Directory(dir.path().to_path_buf()));
    }

    #[test]
    fn playlist_is_used_without_argument() {
        let mut settings = Settings::default();
        settings.playlist.base_dir = Some(PathBuf::from("/music"));
        settings.playlist.tracks = vec![entry("One"), entry("Two")];

        let (catalog, source) = build_catalog(None, Path::new("/nowhere"), &settings).unwrap();
        assert_eq!(source, CatalogSource::Playlist);
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog[1].audio.local_path(),
            Some(Path::new("/music/Two.mp3"))
        );
    }

    #[test]
    fn empty_playlist_falls_back_to_working_dir() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("x.ogg"), b"x").unwrap();

        let (catalog, source) = build_catalog(None, dir.path(), &Settings::default()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(source.label(), dir.path().display().to_string());
    }

    #[test]
    fn nothing_to_play_is_an_error() {
        let dir = tempdir().unwrap();
        let err = build_catalog(Some(dir.path()), dir.path(), &Settings::default()).unwrap_err();
        assert!(matches!(err, PlayerError::EmptyCatalog));

        let file = dir.path().join("song.mp3");
        fs::write(&file, b"x").unwrap();
        let err = build_catalog(Some(&file), dir.path(), &Settings::default()).unwrap_err();
        assert!(matches!(err, PlayerError::ResourceUnavailable { .. }));
    }

    #[test]
    fn invalid_playlist_entry_is_reported() {
        let mut settings = Settings::default();
        settings.playlist.tracks = vec![entry("Fine"), entry("")];
        let err = build_catalog(None, Path::new("/nowhere"), &settings).unwrap_err();
        assert!(matches!(err, PlayerError::InvalidTrack { position: 1, .. }));
    }
}

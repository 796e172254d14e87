use std::fmt;
use std::ops::Index;
use std::path::{Path, PathBuf};

use crate::config::TrackEntry;
use crate::error::{PlayerError, Result};

/// Where an audio file or cover image lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRef {
    Local(PathBuf),
    /// Anything with a URL scheme. Never fetched.
    Remote(String),
}

impl ResourceRef {
    /// Parse a locator from configuration. Relative paths are joined onto `base_dir`.
    pub fn parse(raw: &str, base_dir: Option<&Path>) -> Self {
        let raw = raw.trim();
        if raw.contains("://") {
            return Self::Remote(raw.to_string());
        }

        let path = PathBuf::from(raw);
        match base_dir {
            Some(base) if path.is_relative() => Self::Local(base.join(path)),
            _ => Self::Local(path),
        }
    }

    pub fn local_path(&self) -> Option<&Path> {
        match self {
            Self::Local(p) => Some(p.as_path()),
            Self::Remote(_) => None,
        }
    }

    /// Whether the resource can be opened without touching the network.
    pub fn is_reachable(&self) -> bool {
        self.local_path().is_some_and(Path::is_file)
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(p) => write!(f, "{}", p.display()),
            Self::Remote(url) => f.write_str(url),
        }
    }
}

/// Static metadata and resource references for one playable item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDescriptor {
    pub title: String,
    pub artist: String,
    pub audio: ResourceRef,
    pub cover: Option<ResourceRef>,
}

impl TrackDescriptor {
    /// Build a descriptor from a playlist entry, rejecting empty required fields.
    pub fn from_entry(position: usize, entry: &TrackEntry, base_dir: Option<&Path>) -> Result<Self> {
        let required = [
            ("title", &entry.title),
            ("artist", &entry.artist),
            ("audio", &entry.audio),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(PlayerError::InvalidTrack {
                    position,
                    reason: format!("`{field}` must not be empty"),
                });
            }
        }

        let cover = entry
            .cover
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| ResourceRef::parse(c, base_dir));

        Ok(Self {
            title: entry.title.trim().to_string(),
            artist: entry.artist.trim().to_string(),
            audio: ResourceRef::parse(&entry.audio, base_dir),
            cover,
        })
    }

    /// "Title - Artist", as shown in the playlist.
    pub fn display(&self) -> String {
        format!("{} - {}", self.title, self.artist)
    }
}

/// Immutable, non-empty, ordered list of tracks.
#[derive(Debug, Clone)]
pub struct TrackCatalog {
    tracks: Vec<TrackDescriptor>,
}

impl TrackCatalog {
    pub fn new(tracks: Vec<TrackDescriptor>) -> Result<Self> {
        if tracks.is_empty() {
            return Err(PlayerError::EmptyCatalog);
        }
        Ok(Self { tracks })
    }

    /// Build the catalog from `[[playlist.tracks]]` entries.
    pub fn from_entries(entries: &[TrackEntry], base_dir: Option<&Path>) -> Result<Self> {
        let tracks = entries
            .iter()
            .enumerate()
            .map(|(i, e)| TrackDescriptor::from_entry(i, e, base_dir))
            .collect::<Result<Vec<_>>>()?;
        Self::new(tracks)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn get(&self, index: usize) -> Option<&TrackDescriptor> {
        self.tracks.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackDescriptor> {
        self.tracks.iter()
    }

    /// Index after `index`, wrapping to 0 past the end.
    pub fn wrap_next(&self, index: usize) -> usize {
        (index + 1) % self.tracks.len()
    }

    /// Index before `index`, wrapping to the last track before 0.
    pub fn wrap_prev(&self, index: usize) -> usize {
        if index == 0 {
            self.tracks.len() - 1
        } else {
            index - 1
        }
    }
}

impl Index<usize> for TrackCatalog {
    type Output = TrackDescriptor;

    fn index(&self, index: usize) -> &TrackDescriptor {
        &self.tracks[index]
    }
}

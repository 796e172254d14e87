//! Application model: the `App` presentation state.
//!
//! `App` holds what only the terminal UI cares about: the playlist cursor,
//! whether the cursor follows the playing track, and the status line. Playback
//! state itself lives in the transport controller.

/// The presentation model.
pub struct App {
    /// Playlist cursor. Independent from the playing index.
    pub selected: usize,
    len: usize,

    pub follow_playback: bool,
    pub pending_follow_index: Option<usize>,

    /// Last message for the status line (errors from user commands, notices).
    pub status: Option<String>,
    /// Where the tracks came from, shown in the header.
    pub source: String,
}

impl App {
    /// Create an `App` for a playlist of `len` tracks.
    pub fn new(len: usize, follow_playback: bool) -> Self {
        Self {
            selected: 0,
            len,
            follow_playback,
            pending_follow_index: None,
            status: None,
            source: String::new(),
        }
    }

    /// Enable following playback (cursor follows currently playing track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }
    /// Disable follow-playback and clear any pending follow index.
    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
        self.pending_follow_index = None;
    }
    pub fn toggle_follow_playback(&mut self) {
        if self.follow_playback {
            self.follow_playback_off();
        } else {
            self.follow_playback_on();
        }
    }
    /// Set an index to follow once playback reaches it.
    pub fn set_pending_follow_index(&mut self, idx: usize) {
        self.pending_follow_index = Some(idx);
    }

    /// Move the cursor to the playing track when following. While a follow
    /// index is pending, wait until playback reaches it.
    pub fn sync_follow(&mut self, playing: usize) {
        if !self.follow_playback {
            return;
        }
        if let Some(pending) = self.pending_follow_index {
            if pending != playing {
                return;
            }
            self.pending_follow_index = None;
        }
        self.set_selected(playing);
    }

    /// Set the cursor, clamped to the playlist.
    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx.min(self.len.saturating_sub(1));
    }

    /// Move the cursor down, wrapping to the top.
    pub fn next(&mut self) {
        if self.len > 0 {
            self.selected = (self.selected + 1) % self.len;
        }
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn prev(&mut self) {
        if self.len > 0 {
            self.selected = (self.selected + self.len - 1) % self.len;
        }
    }

    pub fn top(&mut self) {
        self.selected = 0;
    }

    pub fn bottom(&mut self) {
        self.selected = self.len.saturating_sub(1);
    }

    /// Move the cursor by `delta` rows without wrapping (mouse wheel).
    pub fn scroll(&mut self, delta: isize) {
        let target = self.selected.saturating_add_signed(delta);
        self.set_selected(target);
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }
}

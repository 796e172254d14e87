use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

fn write_config(body: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(&cfg_path, body).unwrap();
    (dir, cfg_path)
}

#[test]
fn resolve_config_path_prefers_allegro_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("ALLEGRO_CONFIG_PATH", "/tmp/allegro-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/allegro-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("allegro")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("allegro")
            .join("config.toml")
    );
}

#[test]
fn settings_load_reads_every_section_and_the_playlist() {
    let _lock = env_lock();

    let (_dir, cfg_path) = write_config(
        r#"
[audio]
volume = 0.4
time_update_ms = 100
quit_fade_out_ms = 0

[visualizer]
enabled = false
frame_rate = 30
smoothing = 0.5
min_decibels = -90.0
max_decibels = -20.0

[controls]
scrub_seconds = 9
volume_step = 0.1

[ui]
follow_playback = false
header_text = "hello"

[library]
extensions = ["mp3"]
recursive = false
include_hidden = true
follow_links = false

[logging]
file = "/tmp/allegro.log"
filter = "debug"

[playlist]
base_dir = "/srv/music"

[[playlist.tracks]]
title = "Devara Thandavam"
artist = "Anirudh Ravichander"
audio = "Devara Thandavam.mp3"
cover = "https://example.com/devara.jpg"

[[playlist.tracks]]
title = "Ayudha Pooja"
artist = "Kala Bhairava"
audio = "Ayudha Pooja.mp3"
"#,
    );

    let _g1 = EnvGuard::set("ALLEGRO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("ALLEGRO__AUDIO__VOLUME");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.volume, 0.4);
    assert_eq!(s.audio.time_update_ms, 100);
    assert_eq!(s.audio.quit_fade_out_ms, 0);
    assert!(!s.visualizer.enabled);
    assert_eq!(s.visualizer.frame_rate, 30);
    assert_eq!(s.visualizer.smoothing, 0.5);
    assert_eq!(s.visualizer.min_decibels, -90.0);
    assert_eq!(s.visualizer.max_decibels, -20.0);
    assert_eq!(s.controls.scrub_seconds, 9);
    assert_eq!(s.controls.volume_step, 0.1);
    assert!(!s.ui.follow_playback);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert!(s.library.include_hidden);
    assert!(!s.library.follow_links);
    assert_eq!(
        s.logging.file.as_deref(),
        Some(std::path::Path::new("/tmp/allegro.log"))
    );
    assert_eq!(s.logging.filter, "debug");

    assert_eq!(
        s.playlist.base_dir.as_deref(),
        Some(std::path::Path::new("/srv/music"))
    );
    assert_eq!(s.playlist.tracks.len(), 2);
    assert_eq!(s.playlist.tracks[0].title, "Devara Thandavam");
    assert_eq!(
        s.playlist.tracks[0].cover.as_deref(),
        Some("https://example.com/devara.jpg")
    );
    assert_eq!(s.playlist.tracks[1].artist, "Kala Bhairava");
    assert!(s.playlist.tracks[1].cover.is_none());
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let (_dir, cfg_path) = write_config(
        r#"
[audio]
time_update_ms = 250
"#,
    );

    let _g1 = EnvGuard::set("ALLEGRO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("ALLEGRO__AUDIO__TIME_UPDATE_MS", "50");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.time_update_ms, 50);
}

#[test]
fn missing_config_file_yields_defaults() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let _g1 = EnvGuard::set("ALLEGRO_CONFIG_PATH", missing.to_str().unwrap());

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.volume, 1.0);
    assert_eq!(s.visualizer.frame_rate, 60);
    assert!(s.playlist.tracks.is_empty());
    assert!(s.validate().is_ok());
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut s = Settings::default();
    s.audio.volume = 1.5;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.visualizer.frame_rate = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.visualizer.smoothing = 1.0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.visualizer.min_decibels = -20.0;
    s.visualizer.max_decibels = -30.0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.controls.volume_step = 0.0;
    assert!(s.validate().is_err());
}

#[test]
fn load_validated_reports_invalid_values_as_config_errors() {
    let _lock = env_lock();

    let (_dir, cfg_path) = write_config(
        r#"
[visualizer]
frame_rate = 0
"#,
    );

    let _g1 = EnvGuard::set("ALLEGRO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("ALLEGRO__VISUALIZER__FRAME_RATE");

    let err = Settings::load_validated().unwrap_err();
    assert!(matches!(err, crate::error::PlayerError::Config(_)));
    assert!(err.to_string().contains("visualizer.frame_rate"));

    let _g3 = EnvGuard::set("ALLEGRO__VISUALIZER__FRAME_RATE", "24");
    let s = Settings::load_validated().unwrap();
    assert_eq!(s.visualizer.frame_rate, 24);
}

#[test]
fn sample_config_parses_and_validates() {
    let settings: Settings = ::config::Config::builder()
        .add_source(::config::File::from_str(
            include_str!("../../demos/config.toml"),
            ::config::FileFormat::Toml,
        ))
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap();

    settings.validate().unwrap();
    assert_eq!(settings.playlist.tracks.len(), 4);
    assert_eq!(settings.playlist.tracks[3].title, "Devara: Ayudha Pooja");
    assert!(settings.logging.file.is_none());
}

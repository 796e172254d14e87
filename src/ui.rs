//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`, plus the
//! layout and hit-testing helpers the runtime uses to route mouse clicks.

use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Widget, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::App;
use crate::audio::Engine;
use crate::catalog::{ResourceRef, TrackDescriptor};
use crate::config::{ControlsSettings, UiSettings};
use crate::transport::{TransportController, TransportState};
use crate::visualizer::{Fill, FrameBuffer, Rgb};

/// Vertical units per terminal row in the spectrum surface.
pub const SUBROWS: u16 = 8;

const ACCENT: Color = Color::Rgb(0x1d, 0xb9, 0x54);
const EIGHTHS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("enter", "play selected song");
    map.insert("space/p", "play/pause");
    map.insert("h/l", "prev/next song");
    // H/L and +/- are filled dynamically from config.
    map.insert("f", "follow playback");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating scrub seconds and volume step.
fn controls_text(controls: &ControlsSettings) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "h/l", "H/L", "enter", "space/p", "gg/G", "+/-", "f", "q",
    ];
    order
        .iter()
        .filter_map(|k| match *k {
            "H/L" => Some(format!("[H/L] scrub -/+{}s", controls.scrub_seconds)),
            "+/-" => Some(format!(
                "[+/-] volume {:.0}%",
                controls.volume_step * 100.0
            )),
            _ => CONTROLS_MAP.get(*k).map(|v| format!("[{k}] {v}")),
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Screen regions, shared by drawing and mouse hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Areas {
    pub header: Rect,
    pub now_playing: Rect,
    pub progress: Rect,
    pub volume: Rect,
    pub playlist: Rect,
    pub spectrum: Rect,
    pub footer: Rect,
}

pub fn areas(area: Rect) -> Areas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(4),
        ])
        .split(area);
    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[4]);

    Areas {
        header: rows[0],
        now_playing: rows[1],
        progress: rows[2],
        volume: rows[3],
        playlist: main[0],
        spectrum: main[1],
        footer: rows[5],
    }
}

/// Area inside a one-cell border.
pub fn inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

pub fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.right() && row >= area.y && row < area.bottom()
}

/// Rows `[start, end)` of the playlist shown in a list `height` rows tall,
/// centering `selected` when possible.
pub fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize) {
    if total <= height || height == 0 {
        return (0, total);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

/// Playlist index under a click at `(column, row)`, if any.
pub fn playlist_index_at(
    playlist: Rect,
    total: usize,
    selected: usize,
    column: u16,
    row: u16,
) -> Option<usize> {
    let list = inner(playlist);
    if !contains(list, column, row) {
        return None;
    }
    let (start, end) = visible_window(total, list.height as usize, selected);
    let idx = start + (row - list.y) as usize;
    (idx < end).then_some(idx)
}

/// Size the spectrum surface should have for the current layout.
pub fn spectrum_surface_size(areas: &Areas) -> (f64, f64) {
    let area = inner(areas.spectrum);
    (
        f64::from(area.width),
        f64::from(area.height) * f64::from(SUBROWS),
    )
}

fn cover_text(cover: Option<&ResourceRef>) -> String {
    match cover {
        None => "cover: none".to_string(),
        Some(r @ ResourceRef::Local(_)) if !r.is_reachable() => format!("cover: {r} (unavailable)"),
        Some(r) => format!("cover: {r}"),
    }
}

fn transport_text(state: TransportState) -> &'static str {
    match state {
        TransportState::Playing => "▶ Playing",
        TransportState::Paused => "⏸ Paused",
        TransportState::Stopped => "■ Stopped",
    }
}

fn now_playing_text(track: &TrackDescriptor, state: TransportState, follow: bool) -> String {
    let cursor = if follow { "Follow" } else { "Free-roam" };
    format!(
        "{} - {}\n{}\n{} • CURSOR: {}",
        track.title,
        track.artist,
        cover_text(track.cover.as_ref()),
        transport_text(state),
        cursor
    )
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Rasterizes a [`FrameBuffer`] into cells: one column per surface unit,
/// [`SUBROWS`] vertical units per row drawn with eighth blocks.
pub struct SpectrumWidget<'a> {
    surface: &'a FrameBuffer,
    block: Option<Block<'a>>,
}

impl<'a> SpectrumWidget<'a> {
    pub fn new(surface: &'a FrameBuffer) -> Self {
        Self {
            surface,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for SpectrumWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let bg = self.surface.background().map(to_color).unwrap_or(Color::Reset);
        let rects = self.surface.rects();
        let sub = f64::from(SUBROWS);

        for cx in 0..inner.width {
            // Sample each column at its center.
            let x = f64::from(cx) + 0.5;
            let hit = rects.iter().find(|(r, _)| x >= r.x && x < r.right());

            for cy in 0..inner.height {
                let cell = &mut buf[(inner.x + cx, inner.y + cy)];
                cell.set_char(' ').set_bg(bg);

                let Some((rect, fill)) = hit else {
                    continue;
                };
                let cell_top = f64::from(cy) * sub;
                let cell_bottom = cell_top + sub;
                let covered = rect.bottom().min(cell_bottom) - rect.y.max(cell_top);
                let eighths = (covered.max(0.0).round() as usize).min(EIGHTHS.len() - 1);
                if eighths == 0 {
                    continue;
                }

                let Fill::Vertical(gradient) = fill;
                let mid = (cell_bottom - covered / 2.0).min(rect.bottom());
                let t = if rect.height > 0.0 {
                    (rect.bottom() - mid) / rect.height
                } else {
                    0.0
                };
                let color = gradient.at(t);
                cell.set_char(EIGHTHS[eighths]).set_fg(to_color(color));
            }
        }
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw<E: Engine>(
    frame: &mut Frame,
    areas: &Areas,
    app: &App,
    transport: &TransportController<E>,
    spectrum: Option<&FrameBuffer>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let state = transport.state();

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" allegro • {} ", app.source))
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, areas.header);

    // Now playing
    let now_playing = Paragraph::new(now_playing_text(
        transport.current_track(),
        state.transport,
        app.follow_playback,
    ))
    .block(
        Block::bordered()
            .padding(Padding {
                left: 1,
                right: 0,
                top: 0,
                bottom: 0,
            })
            .title(" now playing "),
    )
    .wrap(Wrap { trim: true });
    frame.render_widget(now_playing, areas.now_playing);

    // Progress
    let progress = transport.progress();
    let gauge = Gauge::default()
        .block(Block::bordered().title(" progress "))
        .gauge_style(Style::default().fg(ACCENT).bg(Color::DarkGray))
        .ratio((progress.percent / 100.0).clamp(0.0, 1.0))
        .label(format!("{} / {}", progress.elapsed, progress.total));
    frame.render_widget(gauge, areas.progress);

    // Volume
    let volume = Gauge::default()
        .block(Block::bordered().title(" volume "))
        .gauge_style(Style::default().fg(ACCENT).bg(Color::DarkGray))
        .ratio(f64::from(state.volume).clamp(0.0, 1.0))
        .label(format!("{:.0}%", state.volume * 100.0));
    frame.render_widget(volume, areas.volume);

    // Playlist
    {
        // Only build ListItems for the visible window.
        let catalog = transport.catalog();
        let total = catalog.len();
        let list_height = inner(areas.playlist).height as usize;
        let (start, end) = visible_window(total, list_height, app.selected);

        let visible_items: Vec<ListItem> = catalog
            .iter()
            .enumerate()
            .skip(start)
            .take(end - start)
            .map(|(i, track)| {
                let item = ListItem::new(track.display());
                if i == state.current_index {
                    item.style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
                } else {
                    item
                }
            })
            .collect();

        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(" playlist "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut list_state = ListState::default();
        if total > 0 && app.selected >= start && app.selected < end {
            list_state.select(Some(app.selected - start));
        }
        frame.render_stateful_widget(list, areas.playlist, &mut list_state);
    }

    // Spectrum
    let spectrum_block = Block::default().borders(Borders::ALL).title(" spectrum ");
    match spectrum {
        Some(surface) => {
            frame.render_widget(SpectrumWidget::new(surface).block(spectrum_block), areas.spectrum)
        }
        None => frame.render_widget(
            Paragraph::new("visualizer off")
                .alignment(Alignment::Center)
                .block(spectrum_block),
            areas.spectrum,
        ),
    }

    // Footer
    let mut footer_text = controls_text(controls_settings);
    if let Some(status) = &app.status {
        footer_text = format!("{status}\n{footer_text}");
    }
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, areas.footer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualizer::{BACKGROUND, BAR_GRADIENT, DrawSurface, Rect as SurfaceRect};

    #[test]
    fn visible_window_centers_selection() {
        assert_eq!(visible_window(5, 10, 3), (0, 5));
        assert_eq!(visible_window(20, 5, 0), (0, 5));
        assert_eq!(visible_window(20, 5, 10), (8, 13));
        assert_eq!(visible_window(20, 5, 19), (15, 20));
        assert_eq!(visible_window(20, 0, 4), (0, 20));
    }

    #[test]
    fn playlist_click_maps_to_row() {
        let playlist = Rect::new(0, 10, 30, 7); // 5 rows inside the border
        assert_eq!(playlist_index_at(playlist, 20, 0, 5, 11), Some(0));
        assert_eq!(playlist_index_at(playlist, 20, 0, 5, 13), Some(2));
        assert_eq!(playlist_index_at(playlist, 20, 10, 5, 11), Some(8));
        // On the border.
        assert_eq!(playlist_index_at(playlist, 20, 0, 5, 10), None);
        // Below the last track of a short list.
        assert_eq!(playlist_index_at(playlist, 2, 0, 5, 14), None);
    }

    #[test]
    fn areas_cover_the_screen() {
        let a = areas(Rect::new(0, 0, 100, 40));
        assert_eq!(a.header.y, 0);
        assert_eq!(a.footer.bottom(), 40);
        assert_eq!(a.playlist.y, a.spectrum.y);
        assert_eq!(a.playlist.width + a.spectrum.width, 100);
        let (w, h) = spectrum_surface_size(&a);
        assert_eq!(w, f64::from(a.spectrum.width - 2));
        assert_eq!(h, f64::from(a.spectrum.height - 2) * 8.0);
    }

    #[test]
    fn cover_text_marks_missing_local_files() {
        assert_eq!(cover_text(None), "cover: none");
        let missing = ResourceRef::Local("/no/such/cover.jpg".into());
        assert!(cover_text(Some(&missing)).ends_with("(unavailable)"));
        let remote = ResourceRef::Remote("https://example.com/c.jpg".into());
        assert_eq!(cover_text(Some(&remote)), "cover: https://example.com/c.jpg");
    }

    #[test]
    fn spectrum_widget_draws_eighth_blocks() {
        // 3 columns, 2 rows.
        let mut surface = FrameBuffer::new(3.0, 16.0);
        surface.clear(BACKGROUND);
        surface.fill_rect(
            SurfaceRect {
                x: 0.0,
                y: 4.0,
                width: 1.0,
                height: 12.0,
            },
            Fill::Vertical(BAR_GRADIENT),
        );
        surface.fill_rect(
            SurfaceRect {
                x: 2.0,
                y: 16.0,
                width: 1.0,
                height: 0.0,
            },
            Fill::Vertical(BAR_GRADIENT),
        );

        let area = Rect::new(0, 0, 3, 2);
        let mut buf = Buffer::empty(area);
        SpectrumWidget::new(&surface).render(area, &mut buf);

        assert_eq!(buf[(0, 1)].symbol(), "█");
        assert_eq!(buf[(0, 0)].symbol(), "▄");
        assert_eq!(buf[(1, 0)].symbol(), " ");
        assert_eq!(buf[(2, 1)].symbol(), " ");
        assert_eq!(buf[(1, 1)].bg, to_color(BACKGROUND));
        assert_eq!(buf[(0, 1)].fg, to_color(BAR_GRADIENT.at(4.0 / 12.0)));
    }

    #[test]
    fn controls_text_uses_configured_steps() {
        let text = controls_text(&ControlsSettings::default());
        assert!(text.contains("[H/L] scrub -/+5s"));
        assert!(text.contains("[+/-] volume 5%"));
        assert!(text.contains("[q] quit"));
    }
}

use std::io::{self, Stdout};
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};

use crate::app::App;
use crate::audio::{Engine, EngineEvent};
use crate::config;
use crate::progress::fraction_from_offset;
use crate::transport::TransportController;
use crate::ui::{self, Areas};
use crate::visualizer::VisualizationPipeline;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// Left button went down on the volume bar and has not been released.
    dragging_volume: bool,
    /// Layout of the last drawn frame, for mouse hit-testing.
    areas: Areas,
}

impl EventLoopState {
    pub fn new(area: Rect) -> Self {
        Self {
            pending_gg: false,
            dragging_volume: false,
            areas: ui::areas(area),
        }
    }
}

/// Everything input handlers may touch.
pub struct Context<'a, E: Engine> {
    pub settings: &'a config::Settings,
    pub app: &'a mut App,
    pub transport: &'a mut TransportController<E>,
    pub pipeline: &'a VisualizationPipeline,
    pub state: &'a mut EventLoopState,
}

/// Main terminal event loop: drains engine events, draws, and handles input.
/// Returns `Ok(())` when shutdown is requested.
pub fn run<E: Engine>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    events: &Receiver<EngineEvent>,
    ctx: &mut Context<'_, E>,
) -> io::Result<()> {
    let redraw_every = (Duration::from_secs(1) / ctx.settings.visualizer.frame_rate.max(1))
        .clamp(Duration::from_millis(8), Duration::from_millis(50));

    loop {
        drain_engine_events(events, ctx);

        terminal.draw(|f| {
            let areas = ui::areas(f.area());
            let (w, h) = ui::spectrum_surface_size(&areas);
            ctx.pipeline.resize(w, h);

            let surface = if ctx.pipeline.is_active() {
                ctx.pipeline.surface()
            } else {
                None
            };
            ui::draw(
                f,
                &areas,
                ctx.app,
                ctx.transport,
                surface.as_deref(),
                &ctx.settings.ui,
                &ctx.settings.controls,
            );
            ctx.state.areas = areas;
        })?;

        if event::poll(redraw_every)? {
            let quit = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key_event(key, ctx),
                Event::Mouse(mouse) => {
                    handle_mouse_event(mouse, ctx);
                    false
                }
                // The next draw picks up the new size.
                _ => false,
            };
            if quit {
                return Ok(());
            }
        }
    }
}

/// Apply pending engine events, then move the follow cursor. Engine events are
/// applied one at a time, here and nowhere else.
fn drain_engine_events<E: Engine>(events: &Receiver<EngineEvent>, ctx: &mut Context<'_, E>) {
    while let Ok(ev) = events.try_recv() {
        if ctx.transport.handle_event(ev) && ctx.transport.all_unavailable() {
            ctx.app.set_status("no track could be loaded, press play to retry");
        }
    }
    ctx.app.sync_follow(ctx.transport.state().current_index);
}

/// Build the analysis graph on the first play action. Failures only turn the
/// visualizer off.
fn start_visualizer<E: Engine>(ctx: &mut Context<'_, E>) {
    if let Err(e) = ctx.pipeline.initialize(ctx.transport.engine_mut()) {
        tracing::warn!(error = %e, "visualizer disabled");
    }
}

/// Play track `index` from the start, following it with the cursor.
fn play_index<E: Engine>(ctx: &mut Context<'_, E>, index: usize) {
    let state = ctx.transport.state();
    let already_playing = state.is_playing() && state.current_index == index;
    if !already_playing {
        if let Err(e) = ctx.transport.select_track(index) {
            ctx.app.set_status(e.to_string());
            return;
        }
        ctx.transport.play();
    }
    ctx.app.follow_playback_on();
    ctx.app.set_pending_follow_index(index);
    start_visualizer(ctx);
}

/// Returns `true` when the user asked to quit.
pub fn handle_key_event<E: Engine>(key: KeyEvent, ctx: &mut Context<'_, E>) -> bool {
    let pending_gg = std::mem::take(&mut ctx.state.pending_gg);
    ctx.app.clear_status();

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            ctx.app.follow_playback_on();
            ctx.transport.toggle_play();
            start_visualizer(ctx);
        }
        KeyCode::Char('l') | KeyCode::Char('n') => {
            ctx.app.follow_playback_on();
            ctx.transport.next();
        }
        KeyCode::Char('h') | KeyCode::Char('b') => {
            ctx.app.follow_playback_on();
            ctx.transport.previous();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            ctx.app.follow_playback_off();
            ctx.app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            ctx.app.follow_playback_off();
            ctx.app.prev();
        }
        KeyCode::Char('g') => {
            if pending_gg {
                ctx.app.follow_playback_off();
                ctx.app.top();
            } else {
                ctx.state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            ctx.app.follow_playback_off();
            ctx.app.bottom();
        }
        KeyCode::Enter => {
            let selected = ctx.app.selected;
            play_index(ctx, selected);
        }
        KeyCode::Char('L') => {
            ctx.transport
                .seek_by(ctx.settings.controls.scrub_seconds as f64);
        }
        KeyCode::Char('H') => {
            ctx.transport
                .seek_by(-(ctx.settings.controls.scrub_seconds as f64));
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            ctx.transport.adjust_volume(ctx.settings.controls.volume_step);
        }
        KeyCode::Char('-') => {
            ctx.transport
                .adjust_volume(-ctx.settings.controls.volume_step);
        }
        KeyCode::Char('f') => ctx.app.toggle_follow_playback(),
        _ => {}
    }

    false
}

/// Fraction of `bar`'s inner width at `column`, clamped to `[0, 1]`.
fn bar_fraction(bar: Rect, column: u16) -> f64 {
    let inner = ui::inner(bar);
    fraction_from_offset(
        f64::from(column.saturating_sub(inner.x)),
        f64::from(inner.width.saturating_sub(1)),
    )
}

pub fn handle_mouse_event<E: Engine>(mouse: MouseEvent, ctx: &mut Context<'_, E>) {
    let areas = ctx.state.areas;
    let (column, row) = (mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if ui::contains(areas.progress, column, row) {
                ctx.transport
                    .seek_to_fraction(bar_fraction(areas.progress, column));
            } else if ui::contains(areas.volume, column, row) {
                ctx.state.dragging_volume = true;
                ctx.transport
                    .set_volume(bar_fraction(areas.volume, column) as f32);
            } else if let Some(index) = ui::playlist_index_at(
                areas.playlist,
                ctx.transport.catalog().len(),
                ctx.app.selected,
                column,
                row,
            ) {
                ctx.app.set_selected(index);
                play_index(ctx, index);
            }
        }
        MouseEventKind::Drag(MouseButton::Left) if ctx.state.dragging_volume => {
            ctx.transport
                .set_volume(bar_fraction(areas.volume, column) as f32);
        }
        MouseEventKind::Up(MouseButton::Left) => ctx.state.dragging_volume = false,
        MouseEventKind::ScrollDown if ui::contains(areas.playlist, column, row) => {
            ctx.app.follow_playback_off();
            ctx.app.scroll(1);
        }
        MouseEventKind::ScrollUp if ui::contains(areas.playlist, column, row) => {
            ctx.app.follow_playback_off();
            ctx.app.scroll(-1);
        }
        _ => {}
    }
}

use std::env;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};

use crate::app::App;
use crate::audio::{AudioEngine, EngineEvent};
use crate::error::Result;
use crate::logging;
use crate::transport::TransportController;
use crate::visualizer::VisualizationPipeline;

mod event_loop;
mod startup;

pub fn run() -> Result<()> {
    let settings = startup::load_settings();
    if let Err(e) = logging::init(&settings.logging) {
        eprintln!("allegro: cannot open log file, logging disabled: {e}");
    }

    let cwd = env::current_dir()?;
    let arg = env::args_os().nth(1).map(PathBuf::from);
    let (catalog, source) = startup::build_catalog(arg.as_deref(), &cwd, &settings)?;
    tracing::info!(tracks = catalog.len(), source = %source.label(), "catalog ready");

    let (events_tx, events_rx) = mpsc::channel::<EngineEvent>();
    let engine = AudioEngine::new(events_tx, settings.audio.clone());
    let output_available = engine.output_available();

    let mut transport = TransportController::new(catalog, engine, settings.audio.volume);
    let pipeline = VisualizationPipeline::new(settings.visualizer.clone(), 0.0, 0.0);

    let mut app = App::new(transport.catalog().len(), settings.ui.follow_playback);
    app.source = source.label();
    if !output_available {
        app.set_status("no audio output device: playback and visualizer are off");
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<()> = (|| {
        let size = terminal.size()?;
        let mut state = event_loop::EventLoopState::new(Rect::new(0, 0, size.width, size.height));
        let mut ctx = event_loop::Context {
            settings: &settings,
            app: &mut app,
            transport: &mut transport,
            pipeline: &pipeline,
            state: &mut state,
        };
        event_loop::run(&mut terminal, &events_rx, &mut ctx)?;
        Ok(())
    })();

    pipeline.teardown();
    transport
        .engine()
        .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    run_result
}

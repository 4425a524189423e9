mod audio;
mod audio_api;
mod config;
mod error;
mod loader;
mod middle;
mod peripheral;
mod pipeline;
mod shared;
mod tui;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::terminal;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use audio::{AudioGraph, OutputFormat};
use config::Config;
use loader::{AudioBufferCache, sample_loader};
use middle::Middle;
use peripheral::SimulatedBoard;
use pipeline::{CardCatalog, GraphController, MixerOrchestrator};
use shared::{DisplayState, InputEvent};

// used when the representative asset can't be read
const FALLBACK_SAMPLE_RATE: u32 = 44100;

#[derive(Parser, Debug)]
#[command(name = "tuneboard", about = "Card-driven loop mixer for the TuneBoard")]
struct Cli {
    /// JSON config file; missing means defaults
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory holding the bundled stems
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Where `i` looks for a personal recording
    #[arg(long)]
    import_dir: Option<PathBuf>,

    #[arg(long, default_value = "tuneboard.log")]
    log_file: PathBuf,

    /// Shuffle the simulated board's cards every N seconds (0 = off)
    #[arg(long)]
    shuffle_secs: Option<u64>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli.log_file) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    if let Err(e) = run(cli) {
        log::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

// the tui owns the terminal, so logs go to a file
fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load(&cli.config)?;
    if let Some(dir) = &cli.assets {
        config.assets_dir = dir.clone();
    }
    if let Some(dir) = &cli.import_dir {
        config.import_dir = Some(dir.clone());
    }
    if let Some(secs) = cli.shuffle_secs {
        config.shuffle_interval_secs = secs;
    }
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    log::info!("starting with {config:?}");

    // the graph format is fixed here for the life of the process
    let representative = sample_loader::asset_path(&config.assets_dir, &config.representative_asset);
    let requested = OutputFormat::probe_wav(&representative).unwrap_or_else(|e| {
        log::warn!("cannot probe {}: {e}, requesting {FALLBACK_SAMPLE_RATE} Hz", representative.display());
        OutputFormat::new(FALLBACK_SAMPLE_RATE)
    });
    let audio = audio::start_audio(requested)?;
    let cache = AudioBufferCache::new(&config.assets_dir, audio.output_format());

    let controller = GraphController::new(audio, cache, config.effects.clone());
    let mixer = MixerOrchestrator::new(CardCatalog::builtin(), controller);
    let mut middle = Middle::new(mixer, config.hardware_volume_ceiling, config.import_dir.clone());

    let (events_tx, events_rx) = crossbeam_channel::unbounded();
    let mut board = SimulatedBoard::spawn(events_tx, config.shuffle_interval())?;

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let tick_rate = Duration::from_millis(16); // ~60fps
    let mut tui_state = tui::mode::TuiState::default();

    loop {
        // board events first, in arrival order
        for event in events_rx.try_iter() {
            middle.handle_peripheral(event);
        }
        middle.mixer().controller().graph().collect_garbage();

        let ds = middle.display_state(Some(tui_state.slot_cursor));
        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds);
        })?;

        for event in tui::input::poll_input(tick_rate, &mut tui_state)? {
            if event == InputEvent::Quit {
                log::info!("quit");
                drop(term);
                return Ok(());
            }
            route_input(event, &ds, &mut board, &mut middle);
        }
    }
}

// board-facing events go to the board, the rest to the control domain
fn route_input<G: AudioGraph>(
    event: InputEvent,
    ds: &DisplayState,
    board: &mut SimulatedBoard,
    middle: &mut Middle<G>,
) {
    let result = match event {
        InputEvent::Link(cmd) => {
            peripheral::dispatch(board, cmd);
            Ok(())
        }
        InputEvent::PlaceCard { slot, card } => board.place_card(slot, card),
        InputEvent::ShuffleSlots => board.shuffle(),
        InputEvent::AdjustBoardVolume(delta) => {
            let percent = (ds.board_volume as i16 + delta).clamp(0, 100) as u8;
            board.set_volume(percent)
        }
        other => {
            middle.handle_input(other);
            Ok(())
        }
    };
    if let Err(e) = result {
        log::warn!("board command failed: {e:#}");
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

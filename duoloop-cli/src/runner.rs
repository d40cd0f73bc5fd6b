use std::{
    collections::VecDeque,
    io,
    sync::{Arc, Mutex},
    thread::sleep,
    time::Duration,
};

use clap::ArgMatches;
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use duoloop_lib::playback::looper::InstanceFactory;
use duoloop_lib::playback::simulated::SimulatedInstance;
use duoloop_lib::tools::clock::{Clock, SystemClock};
use duoloop_lib::tools::timer::ms_to_duration;
use duoloop_lib::{LoopError, Looper};
use log::{info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::{cli, controls, logging, ui};

pub fn run(args: &ArgMatches, log_buffer: Arc<Mutex<VecDeque<String>>>) -> Result<i32, LoopError> {
    info!("starting duoloop");
    if let Some(code) = cli::create::maybe_run_create(args)? {
        return Ok(code);
    }
    if let Some(code) = cli::simulate::maybe_run_simulate(args)? {
        return Ok(code);
    }

    let source = args
        .get_one::<String>("INPUT")
        .ok_or_else(|| LoopError::InvalidSettings("missing media source".to_string()))?
        .clone();
    let settings = cli::settings::loop_settings(args)?;
    let frame_interval = cli::settings::frame_interval(args)?;
    let clip = ms_to_duration(cli::settings::clip_duration_ms(args)?);
    let quiet = args.get_flag("quiet");

    let factory: InstanceFactory<SimulatedInstance> = Arc::new(move |source: &str| {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        SimulatedInstance::new(source, clip, clock)
    });
    let mut looper = Looper::with_frame_interval(&source, settings, factory, frame_interval);

    if quiet {
        let run_ms: f64 = cli::settings::parse_value(args, "run-ms")?;
        sleep(ms_to_duration(run_ms));
        let snapshot = looper.snapshot();
        looper.detach();
        println!("{}", serde_json::to_string(&snapshot)?);
        return Ok(0);
    }

    let _raw_mode = match RawModeGuard::enable() {
        Ok(guard) => Some(guard),
        Err(err) => {
            warn!("failed to enable raw mode: {}", err);
            None
        }
    };
    let mut terminal = {
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen, cursor::Hide) {
            warn!("failed to enter alternate screen: {}", err);
        }
        let backend = CrosstermBackend::new(stdout);
        match Terminal::new(backend) {
            Ok(terminal) => Some(terminal),
            Err(err) => {
                warn!("failed to create terminal, running without a dashboard: {}", err);
                None
            }
        }
    };

    // UI / input loop.
    loop {
        if let Some(term) = terminal.as_mut() {
            let log_lines = logging::snapshot(&log_buffer);
            let status = controls::status_text(controls::StatusArgs {
                source: looper.source(),
                object_fit: looper.settings().object_fit,
                snapshot: looper.snapshot(),
            });
            ui::draw_status(term, &status, &log_lines);
        }

        if !controls::handle_key_event(&mut looper) {
            break;
        }

        sleep(Duration::from_millis(50));
    }

    // Restore the terminal state before exiting.
    if let Some(mut term) = terminal {
        let _ = term.show_cursor();
        let stdout = term.backend_mut();
        let _ = execute!(stdout, LeaveAlternateScreen, cursor::Show);
    }

    Ok(0)
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

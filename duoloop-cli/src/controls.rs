use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use duoloop_lib::{LoopSnapshot, Looper, ObjectFit, PlaybackInstance};

const STEP_MS: f64 = 100.0;

/// Rendered overlay for the dashboard.
pub struct StatusSnapshot {
    pub text: String,
    pub cutover_line: String,
    /// Play head has passed the raw cutover point.
    pub past_cutover: bool,
    pub weights: [f32; 2],
    pub blend_progress: Option<f32>,
}

pub struct StatusArgs<'a> {
    pub source: &'a str,
    pub object_fit: ObjectFit,
    pub snapshot: LoopSnapshot,
}

pub fn status_text(args: StatusArgs) -> StatusSnapshot {
    let snapshot = args.snapshot;
    let state = if !snapshot.attached {
        "■ Detached"
    } else if snapshot.swap_in_flight {
        "⇄ Handing off"
    } else {
        "▶ Looping"
    };

    let text = format!(
        "{}   source: {}   fit: {}\nActive: {}   cycles: {}   generation: {}\nPosition: {} / {}   remaining: {:.0}ms",
        state,
        args.source,
        args.object_fit.as_str(),
        snapshot.active_instance_id,
        snapshot.cycles,
        snapshot.generation,
        format_time(snapshot.position_ms),
        format_time(snapshot.total_duration_ms),
        snapshot.remaining_ms.max(0.0),
    );
    let cutover_line = format!(
        "Cutover: {:.0}ms   crossfade: {:.0}ms   trigger at {:.0}ms",
        snapshot.cutover_offset_ms, snapshot.crossfade_duration_ms, snapshot.threshold_ms
    );

    StatusSnapshot {
        text,
        cutover_line,
        past_cutover: snapshot.past_cutover(),
        weights: snapshot.weights,
        blend_progress: snapshot.blend_progress,
    }
}

/// Poll one key press and apply it.
///
/// # Returns
///
/// `false` once the user asked to quit.
pub fn handle_key_event<I: PlaybackInstance + Send + 'static>(looper: &mut Looper<I>) -> bool {
    if event::poll(Duration::from_millis(100)).unwrap_or(false) {
        if let Ok(Event::Key(key)) = event::read() {
            if key.kind != KeyEventKind::Press {
                return true;
            }
            let settings = looper.settings();
            match key.code {
                KeyCode::Char('q') => {
                    looper.detach();
                    return false;
                }
                KeyCode::Char('c') => {
                    looper.set_cutover_offset_ms(settings.cutover_offset_ms - STEP_MS);
                }
                KeyCode::Char('C') => {
                    looper.set_cutover_offset_ms(settings.cutover_offset_ms + STEP_MS);
                }
                KeyCode::Char('x') => {
                    looper.set_crossfade_duration_ms(settings.crossfade_duration_ms - STEP_MS);
                }
                KeyCode::Char('X') => {
                    looper.set_crossfade_duration_ms(settings.crossfade_duration_ms + STEP_MS);
                }
                KeyCode::Char('f') | KeyCode::Char('F') => {
                    looper.set_object_fit(settings.object_fit.next());
                }
                _ => {}
            }
        }
    }

    true
}

fn format_time(ms: f64) -> String {
    let total_ms = ms.max(0.0).round() as u64;
    let millis = total_ms % 1000;
    let seconds = total_ms / 1000;
    let minutes = seconds / 60;
    let seconds = seconds % 60;

    format!("{:02}:{:02}.{:03}", minutes, seconds, millis)
}

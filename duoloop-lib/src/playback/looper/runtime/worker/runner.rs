//! Frame-pump loop implementation.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, Weak};
use std::thread;
use std::time::Instant;

use log::{debug, info};

use crate::playback::instance::PlaybackInstance;
use crate::playback::scheduler::{LoopScheduler, LoopSnapshot, RetireTicket, SchedulerEvent};
use crate::tools::timer::ms_to_duration;

use super::context::PumpContext;
use super::guard::PumpThreadGuard;

/// Run the frame pump for a single generation.
///
/// Exits when the abort flag is raised or a newer generation has been
/// attached.
///
/// # Arguments
///
/// * `ctx` - Captured shared state for this run.
/// * `generation` - Generation of the scheduler this pump drives.
pub(in crate::playback::looper::runtime) fn run_frame_pump<I>(
    ctx: PumpContext<I>,
    generation: u64,
) where
    I: PlaybackInstance + Send + 'static,
{
    let _thread_guard = PumpThreadGuard::new(ctx.pump_thread_exists.clone());
    let mut next_frame = Instant::now();

    loop {
        if ctx.abort.load(Ordering::SeqCst)
            || ctx.generation_atomic.load(Ordering::SeqCst) != generation
        {
            break;
        }

        let now = Instant::now();
        let events = {
            let mut scheduler = ctx.scheduler.lock().unwrap();
            let events = scheduler.frame(now);
            *ctx.snapshot.lock().unwrap() = scheduler.snapshot();
            events
        };

        for event in events {
            log_event(&event);
            if let SchedulerEvent::RetirementScheduled(ticket) = event {
                spawn_settle_timer(Arc::downgrade(&ctx.scheduler), ctx.snapshot.clone(), ticket);
            }
        }

        next_frame += ctx.frame_interval;
        let now = Instant::now();
        if next_frame > now {
            thread::sleep(next_frame - now);
        } else {
            // Late frame; resume the cadence from here instead of bursting.
            next_frame = now;
        }
    }

    #[cfg(feature = "debug")]
    log::info!("frame pump for generation {} finished", generation);
}

/// Retire `ticket` after its delay unless the scheduler is gone by then.
fn spawn_settle_timer<I>(
    scheduler: Weak<Mutex<LoopScheduler<I>>>,
    snapshot: Arc<Mutex<LoopSnapshot>>,
    ticket: RetireTicket,
) where
    I: PlaybackInstance + Send + 'static,
{
    thread::spawn(move || {
        thread::sleep(ms_to_duration(ticket.delay_ms));

        let Some(scheduler) = scheduler.upgrade() else {
            debug!(
                "settle timer for generation {} outlived its scheduler",
                ticket.generation
            );
            return;
        };

        let mut scheduler = scheduler.lock().unwrap();
        match scheduler.retire(ticket) {
            Some(event) => {
                log_event(&event);
                *snapshot.lock().unwrap() = scheduler.snapshot();
            }
            None => debug!("stale settle timer for {} ignored", ticket.instance),
        }
    });
}

fn log_event(event: &SchedulerEvent) {
    match event {
        SchedulerEvent::HandoffStarted {
            from,
            to,
            kind,
            remaining_ms,
            ..
        } => info!(
            "hand-off {} -> {} ({:?}) at {:.0}ms remaining",
            from, to, kind, remaining_ms
        ),
        SchedulerEvent::BlendCompleted { from, to } => {
            debug!("blend {} -> {} complete", from, to)
        }
        SchedulerEvent::RetirementScheduled(ticket) => debug!(
            "retiring {} in {}ms (cycle {})",
            ticket.instance, ticket.delay_ms, ticket.cycle
        ),
        SchedulerEvent::Retired { instance, cycle } => {
            debug!("{} retired after cycle {}", instance, cycle)
        }
    }
}

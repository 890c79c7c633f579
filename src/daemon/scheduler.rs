//! Scheduler - owns the ring state and the one running animation.
//!
//! Commands arrive through a mailbox and are applied strictly in order. Each
//! transition cancels and joins the previous task, hands out a fresh writer
//! token, and writes the new routine's first frame before the reply is sent.

use std::time::Duration;

use motorpass_led_protocol::{Command, LedState, Response, Rgb};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::revert::RevertTimer;
use super::state::{DaemonState, RingState};
use super::task::{AnimationTask, StopOutcome};
use crate::config::{AnimationConfig, DaemonConfig};
use crate::effect::{Animation, Breathe, Chase, Flash, Progress, Solid};
use crate::hal::{DriverError, SharedStrip};

/// Pending events before senders wait
const MAILBOX_CAPACITY: usize = 32;

/// Blue self-test blink at start-up
const STARTUP_FLASH: Duration = Duration::from_millis(200);

pub enum SchedulerEvent {
    Command {
        command: Command,
        reply: oneshot::Sender<Response>,
    },
    /// Report the current state and generation
    Query { reply: oneshot::Sender<DaemonState> },
    /// Stop the animation, blank the strip and exit the loop
    Shutdown { done: oneshot::Sender<()> },
}

pub struct Scheduler {
    strip: SharedStrip,
    animations: AnimationConfig,
    cancel_timeout: Duration,
    startup_flash: bool,
    state: DaemonState,
    active: Option<AnimationTask>,
    writer: CancellationToken,
    revert: RevertTimer,
}

impl Scheduler {
    pub fn new(strip: SharedStrip, config: &DaemonConfig) -> Self {
        Self {
            strip,
            animations: config.animations.clone(),
            cancel_timeout: config.cancel_timeout(),
            startup_flash: config.startup_flash,
            state: DaemonState::default(),
            active: None,
            writer: CancellationToken::new(),
            revert: RevertTimer::default(),
        }
    }

    pub fn state(&self) -> DaemonState {
        self.state
    }

    /// Apply one command and build its reply.
    pub async fn dispatch(&mut self, command: Command) -> Response {
        if let Err(e) = command.validate() {
            return Response::error(e.to_string());
        }
        let action = command.action();
        let result = match command {
            Command::Ping => return Response::ok(),
            Command::SetState { state, duration } => self.set_state(state, duration).await,
            Command::Progress { percentage, color } => {
                self.play(RingState::Custom, Box::new(Progress::new(percentage, color)))
                    .await
                    .map(drop)
            }
            Command::Flash {
                color,
                times,
                speed,
            } => {
                let flash = Flash::new(color, times, Duration::from_secs_f64(speed));
                self.play(RingState::Custom, Box::new(flash)).await.map(drop)
            }
            Command::Off => self.turn_off().await,
        };

        match result {
            Ok(()) => Response::ok(),
            Err(e) => {
                warn!("{action}: {e}");
                Response::error(e.to_string())
            }
        }
    }

    async fn set_state(&mut self, state: LedState, duration: Option<f64>) -> Result<(), DriverError> {
        let anim = &self.animations;
        let routine: Box<dyn Animation> = match state {
            LedState::Idle => Box::new(Breathe::new(
                anim.idle_color,
                anim.idle_cycle(),
                anim.breath_steps,
            )),
            LedState::Processing => Box::new(Chase::new(
                anim.processing_color,
                anim.chase_tail,
                anim.chase_speed(),
            )),
            LedState::Success => Box::new(Solid::new(anim.success_color)),
            LedState::Failed => Box::new(Solid::new(anim.failed_color)),
            LedState::Camera => Box::new(Breathe::new(
                anim.camera_color,
                anim.camera_cycle(),
                anim.breath_steps,
            )),
            LedState::Off => return self.turn_off().await,
        };

        let generation = self.play(state.into(), routine).await?;
        info!(%state, generation, "state changed");

        match duration {
            Some(secs) if secs > 0.0 && state.reverts() => {
                let deadline = Instant::now() + Duration::from_secs_f64(secs);
                self.revert.schedule(generation, deadline);
                debug!(generation, "revert to idle in {secs}s");
            }
            Some(secs) if secs > 0.0 => {
                debug!(%state, "ignoring duration {secs}s");
            }
            _ => {}
        }
        Ok(())
    }

    async fn turn_off(&mut self) -> Result<(), DriverError> {
        let generation = self.transition(RingState::Off).await;
        self.strip.clear_as(&self.writer)?;
        info!(generation, "ring off");
        Ok(())
    }

    /// Show `routine` as the new state; returns the new generation.
    async fn play(&mut self, next: RingState, mut routine: Box<dyn Animation>) -> Result<u64, DriverError> {
        let generation = self.transition(next).await;

        let mut pixels = vec![Rgb::BLACK; self.strip.len()];
        let hold = routine.next_frame(&mut pixels);
        self.strip.write_frame(&pixels, &self.writer)?;

        if let Some(hold) = hold {
            debug!(animation = routine.name(), generation, "animation started");
            self.active = Some(AnimationTask::spawn(
                routine,
                self.strip.clone(),
                pixels,
                hold,
                self.writer.clone(),
            ));
        }
        Ok(generation)
    }

    /// Retire the current writer and move to `next`.
    async fn transition(&mut self, next: RingState) -> u64 {
        self.stop_active().await;
        self.revert.cancel();
        self.writer = CancellationToken::new();
        self.state.advance(next)
    }

    /// Cancel the writer and join the running task, if any.
    async fn stop_active(&mut self) -> Option<StopOutcome> {
        self.writer.cancel();
        let task = self.active.take()?;
        let name = task.name();
        let outcome = task.stop(self.cancel_timeout).await;
        if outcome != StopOutcome::Finished {
            warn!(
                animation = name,
                state = %self.state.current,
                "previous animation did not stop cleanly ({outcome:?}); continuing"
            );
        }
        Some(outcome)
    }

    async fn on_revert(&mut self, generation: u64) {
        self.revert.take();
        if generation != self.state.generation {
            debug!(
                generation,
                current = self.state.generation,
                "stale revert ignored"
            );
            return;
        }
        if let Err(e) = self.set_state(LedState::Idle, None).await {
            warn!("revert to idle: {e}");
        }
    }

    async fn flash_startup(&mut self) {
        let mut flash = Flash::new(Rgb::BLUE, 1, STARTUP_FLASH);
        let mut pixels = vec![Rgb::BLACK; self.strip.len()];
        loop {
            let hold = flash.next_frame(&mut pixels);
            if let Err(e) = self.strip.write_frame(&pixels, &self.writer) {
                warn!("start-up flash: {e}");
                return;
            }
            match hold {
                Some(h) => sleep(h).await,
                None => return,
            }
        }
    }

    async fn shutdown(&mut self) {
        self.stop_active().await;
        self.revert.cancel();
        match self.strip.clear() {
            Ok(()) => info!("ring blanked"),
            Err(e) => warn!("failed to blank ring: {e}"),
        }
    }

    /// Process events until shutdown or until every handle is dropped.
    pub async fn run(mut self, mut mailbox: mpsc::Receiver<SchedulerEvent>) {
        if self.startup_flash {
            self.flash_startup().await;
        }

        loop {
            tokio::select! {
                event = mailbox.recv() => match event {
                    Some(SchedulerEvent::Command { command, reply }) => {
                        let response = self.dispatch(command).await;
                        let _ = reply.send(response);
                    }
                    Some(SchedulerEvent::Query { reply }) => {
                        let _ = reply.send(self.state());
                    }
                    Some(SchedulerEvent::Shutdown { done }) => {
                        self.shutdown().await;
                        let _ = done.send(());
                        return;
                    }
                    None => {
                        self.shutdown().await;
                        return;
                    }
                },
                generation = RevertTimer::wait(self.revert.pending()) => {
                    self.on_revert(generation).await;
                }
            }
        }
    }
}

/// Cloneable sender side of the scheduler mailbox.
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<SchedulerEvent>,
}

impl SchedulerHandle {
    /// Submit a command and wait for the scheduler to apply it.
    pub async fn dispatch(&self, command: Command) -> Response {
        let (reply, rx) = oneshot::channel();
        if self
            .tx
            .send(SchedulerEvent::Command { command, reply })
            .await
            .is_err()
        {
            return Response::error("scheduler is not running");
        }
        rx.await
            .unwrap_or_else(|_| Response::error("scheduler dropped the request"))
    }

    pub async fn state(&self) -> Option<DaemonState> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(SchedulerEvent::Query { reply }).await.ok()?;
        rx.await.ok()
    }

    /// Ask the scheduler to stop and wait until the strip is blank.
    pub async fn shutdown(&self) {
        let (done, rx) = oneshot::channel();
        if self.tx.send(SchedulerEvent::Shutdown { done }).await.is_ok() {
            let _ = rx.await;
        }
    }
}

/// Start `scheduler` on its own task.
pub fn spawn(scheduler: Scheduler) -> (SchedulerHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
    let task = tokio::spawn(scheduler.run(rx));
    (SchedulerHandle { tx }, task)
}

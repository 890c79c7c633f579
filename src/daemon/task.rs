//! The single running animation and how it is stopped.

use std::time::Duration;

use motorpass_led_protocol::Rgb;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::effect::Animation;
use crate::hal::SharedStrip;

/// How a stop request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The task saw the cancellation and exited (or had already finished)
    Finished,
    /// The task did not exit within the join timeout and was aborted
    Aborted,
    /// The task panicked
    Panicked,
}

pub struct AnimationTask {
    name: &'static str,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl AnimationTask {
    /// Continue `animation` after its first frame has been written.
    ///
    /// `pixels` is the frame currently on the strip and `hold` how long it
    /// stays up. Every later frame is written with `token` as the writer.
    pub fn spawn(
        animation: Box<dyn Animation>,
        strip: SharedStrip,
        pixels: Vec<Rgb>,
        hold: Duration,
        token: CancellationToken,
    ) -> Self {
        let name = animation.name();
        let handle = tokio::spawn(run_frames(animation, strip, pixels, hold, token.clone()));
        Self {
            name,
            token,
            handle,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel and wait up to `limit` for the task to exit.
    pub async fn stop(mut self, limit: Duration) -> StopOutcome {
        self.token.cancel();
        match tokio::time::timeout(limit, &mut self.handle).await {
            Ok(Ok(())) => {
                debug!(animation = self.name, "animation stopped");
                StopOutcome::Finished
            }
            Ok(Err(e)) => {
                warn!(animation = self.name, "animation task failed: {e}");
                StopOutcome::Panicked
            }
            Err(_) => {
                warn!(
                    animation = self.name,
                    "animation did not stop within {limit:?}, aborting"
                );
                self.handle.abort();
                StopOutcome::Aborted
            }
        }
    }
}

async fn run_frames(
    mut animation: Box<dyn Animation>,
    strip: SharedStrip,
    mut pixels: Vec<Rgb>,
    mut hold: Duration,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            _ = sleep(hold) => {}
        }

        let next = animation.next_frame(&mut pixels);
        match strip.write_frame(&pixels, &token) {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                warn!(animation = animation.name(), "frame write failed: {e}");
                return;
            }
        }

        match next {
            Some(h) => hold = h,
            None => return,
        }
    }
}

//! LED ring daemon - turns the kiosk's pixel ring into a status display.
//!
//! Architecture:
//! - Command server accepts one JSON request per Unix socket connection
//! - Connection tasks forward commands to the scheduler's mailbox
//! - The scheduler owns the ring state and at most one animation task
//! - Animations write frames through a token-guarded shared strip

pub mod revert;
pub mod scheduler;
pub mod server;
pub mod state;
pub mod task;

pub use scheduler::{Scheduler, SchedulerHandle};
pub use server::{CommandServer, ServerError};
pub use state::{DaemonState, RingState};

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::DaemonConfig;
use crate::hal::{LedDriver, SharedStrip};

/// Run the daemon until `shutdown` is cancelled.
///
/// The caller opens the driver, so a missing strip fails before anything is
/// bound. On shutdown the animation is stopped, the ring blanked, the
/// listener closed and the socket file removed, in that order.
pub async fn run(
    config: DaemonConfig,
    driver: Box<dyn LedDriver>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    config.validate().context("invalid daemon config")?;
    let mode = config.socket_mode_bits()?;

    let strip = SharedStrip::new(driver);
    info!("LED strip: {} ({} pixels)", strip.name(), strip.len());
    if let Err(e) = strip.clear() {
        warn!("initial clear failed: {e}");
    }

    let (scheduler, scheduler_task) = scheduler::spawn(Scheduler::new(strip, &config));
    let server = match CommandServer::bind(
        &config.socket_path,
        mode,
        scheduler.clone(),
        config.request_timeout(),
    )
    .await
    {
        Ok(server) => server,
        Err(e) => {
            scheduler.shutdown().await;
            return Err(e.into());
        }
    };

    info!("Ready on {}. Ctrl+C to stop.", server.path().display());
    server.serve(shutdown).await;

    info!("shutting down");
    scheduler.shutdown().await;
    if let Err(e) = scheduler_task.await {
        warn!("scheduler task ended abnormally: {e}");
    }
    server.close();
    info!("Done.");
    Ok(())
}

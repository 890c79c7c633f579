//! Client command handlers.

use std::thread::sleep;
use std::time::Duration;

use anyhow::{bail, ensure};
use motorpass_led_client::{LedClient, LedState, Rgb};

use super::CommandResult;

pub fn ping(client: &LedClient) -> CommandResult {
    ensure!(
        client.ping(),
        "LED daemon not reachable at {}",
        client.socket_path().display()
    );
    println!("LED daemon is running at {}", client.socket_path().display());
    Ok(())
}

pub fn state(client: &LedClient, state: LedState, duration: Option<f64>) -> CommandResult {
    ensure!(client.set_state(state, duration), "set_state {state} failed");
    match duration {
        Some(secs) if secs > 0.0 && state.reverts() => {
            println!("LED state: {state} (back to idle in {secs}s)")
        }
        _ => println!("LED state: {state}"),
    }
    Ok(())
}

pub fn progress(client: &LedClient, percentage: f64, color: Rgb) -> CommandResult {
    ensure!(
        client.show_progress(percentage, color),
        "progress {percentage} failed"
    );
    println!("Progress: {percentage}%");
    Ok(())
}

pub fn flash(client: &LedClient, color: Rgb, times: u32, speed: f64) -> CommandResult {
    ensure!(client.flash_with_speed(color, times, speed), "flash failed");
    println!(
        "Flash: #{:02X}{:02X}{:02X} x{times}",
        color.r, color.g, color.b
    );
    Ok(())
}

pub fn off(client: &LedClient) -> CommandResult {
    ensure!(client.turn_off(), "turn off failed");
    println!("LED ring off");
    Ok(())
}

pub fn status(client: &LedClient) -> CommandResult {
    let status = client.status();
    println!("Socket:    {}", status.socket_path.display());
    println!(
        "Available: {}",
        if status.available { "yes" } else { "no" }
    );
    Ok(())
}

/// Walk through every state and effect, then turn the ring off.
pub fn demo(client: LedClient) -> CommandResult {
    if !client.is_available() {
        bail!(
            "LED daemon not reachable at {}",
            client.socket_path().display()
        );
    }
    let ring = client.session();
    let step = |name: &str, secs: f64| {
        println!("  {name}");
        sleep(Duration::from_secs_f64(secs));
    };

    println!("LED demo:");
    ring.idle();
    step("idle", 2.0);
    ring.processing();
    step("processing", 3.0);

    println!("  progress");
    for pct in (0..=100).step_by(10) {
        ring.show_progress(pct as f64, Rgb::GREEN);
        sleep(Duration::from_millis(200));
    }

    ring.success(Some(2.0));
    step("success", 2.5);
    ring.failed(Some(2.0));
    step("failed", 2.5);
    ring.camera();
    step("camera", 2.0);

    ring.flash_success(2);
    step("flash success", 1.0);
    ring.flash_failed(2);
    step("flash failed", 1.0);
    ring.flash_warning(2);
    step("flash warning", 1.0);

    println!("Demo done.");
    Ok(())
}

// MotorPass LED ring daemon - shared library
// Ring animations, the scheduler and command server, and the driver layer

pub mod config;
pub mod daemon;
pub mod effect;
pub mod hal;

pub use config::{ConfigError, DaemonConfig, DriverKind};
pub use daemon::{CommandServer, DaemonState, RingState, Scheduler, SchedulerHandle};
pub use hal::{open_driver, DriverError, LedDriver, SharedStrip, VirtualStrip};

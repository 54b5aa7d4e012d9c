//! Long-running bridge tasks.

pub mod command;
pub mod heartbeat;
pub mod notifications;

pub use command::CommandLoop;
pub use heartbeat::run_heartbeat;
pub use notifications::run_notification_publisher;

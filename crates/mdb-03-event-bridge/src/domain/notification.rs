//! # Notification Mapping
//!
//! | Status   | Notification method   |
//! |----------|-----------------------|
//! | `create` | `docker_event_create` |
//! | `start`  | `docker_event_start`  |
//! | `die`    | `docker_event_die`    |

use shared_types::{EventNotificationResult, LifecycleEvent, LifecycleStatus, RpcResponse};

pub const EVENT_CREATE: &str = "docker_event_create";
pub const EVENT_START: &str = "docker_event_start";
pub const EVENT_DIE: &str = "docker_event_die";

/// Notification method for a lifecycle status.
pub fn notification_method(status: LifecycleStatus) -> &'static str {
    match status {
        LifecycleStatus::Create => EVENT_CREATE,
        LifecycleStatus::Start => EVENT_START,
        LifecycleStatus::Die => EVENT_DIE,
    }
}

/// Build the outbound notification for `event`.
pub fn build_notification(event: &LifecycleEvent) -> Result<RpcResponse, serde_json::Error> {
    let result = serde_json::to_value(EventNotificationResult::from(event))?;
    Ok(RpcResponse::notification(
        notification_method(event.status),
        result,
    ))
}

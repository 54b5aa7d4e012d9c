//! # Event Normalization
//!
//! Turns raw runtime events into [`LifecycleEvent`]s.

use super::entities::RawEvent;
use shared_types::{LifecycleEvent, LifecycleStatus};

/// Attribute carrying the container name.
pub const ATTR_NAME: &str = "name";
/// Attribute carrying the image reference.
pub const ATTR_IMAGE: &str = "image";
/// Attribute carrying the exit code on `die` events.
pub const ATTR_EXIT_CODE: &str = "exitCode";

/// Normalize a raw event.
///
/// Returns `None` for actions outside create/start/die and for events with
/// no actor id. `exit_code` is only read for `die` events and is dropped if
/// it is not an integer.
pub fn normalize_event(raw: &RawEvent) -> Option<LifecycleEvent> {
    let status = LifecycleStatus::from_action(&raw.action)?;
    let container_id = raw.actor_id.as_deref().filter(|id| !id.is_empty())?;

    let attribute = |key: &str| raw.attributes.get(key).cloned().unwrap_or_default();
    let exit_code = match status {
        LifecycleStatus::Die => raw
            .attributes
            .get(ATTR_EXIT_CODE)
            .and_then(|code| code.parse::<i64>().ok()),
        _ => None,
    };

    Some(LifecycleEvent {
        container_id: container_id.to_string(),
        container_name: attribute(ATTR_NAME),
        image_name: attribute(ATTR_IMAGE),
        status,
        exit_code,
    })
}

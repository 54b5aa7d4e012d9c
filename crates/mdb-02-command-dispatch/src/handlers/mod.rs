//! Command handlers, one per bus method.

pub mod inspect_container;
pub mod start_container;
pub mod stop_container;

pub use inspect_container::InspectContainerHandler;
pub use start_container::StartContainerHandler;
pub use stop_container::StopContainerHandler;

//! Bus method names and their metadata.

/// Create and start a container.
pub const START_CONTAINER: &str = "start_docker";
/// Report a container's state by name.
pub const INSPECT_CONTAINER: &str = "inspect_docker";
/// Stop a container by name.
pub const STOP_CONTAINER: &str = "stop_docker";

/// Method metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: &'static str,
    /// Changes container state. Mutating methods hold the lifecycle lock.
    pub mutates: bool,
    pub description: &'static str,
}

/// Methods registered by default.
pub const DEFAULT_METHODS: [MethodInfo; 3] = [
    MethodInfo {
        name: START_CONTAINER,
        mutates: true,
        description: "Create a container from a local image and start it",
    },
    MethodInfo {
        name: INSPECT_CONTAINER,
        mutates: false,
        description: "Report whether a named container is running, stopped or absent",
    },
    MethodInfo {
        name: STOP_CONTAINER,
        mutates: true,
        description: "Stop a named container",
    },
];

/// Look up default method metadata by name.
pub fn method_info(name: &str) -> Option<&'static MethodInfo> {
    DEFAULT_METHODS.iter().find(|info| info.name == name)
}

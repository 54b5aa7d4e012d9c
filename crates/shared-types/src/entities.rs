//! # Domain Entities
//!
//! Container-facing value types shared across the bridge.
//!
//! ## Pair Syntax
//!
//! Port and volume entries travel as `"source:target"` strings. Both parse
//! through the same rule: exactly one `:` and two non-empty sides. Anything
//! else is rejected while the command parameters are decoded.

use crate::errors::{PairParseError, RestartPolicyParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Split `"a:b"` into `("a", "b")`, requiring exactly one separator.
fn split_pair(raw: &str) -> Result<(&str, &str), PairParseError> {
    let mut parts = raw.split(':');
    let (Some(left), Some(right), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(PairParseError::Separator(raw.to_string()));
    };
    if left.is_empty() || right.is_empty() {
        return Err(PairParseError::EmptySide(raw.to_string()));
    }
    Ok((left, right))
}

/// Container port published 1:1 on a host port.
///
/// Wire form is `"containerPort:hostPort"`, e.g. `"80/tcp:8080"`. A container
/// port without a protocol suffix is treated as TCP.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PortMapping {
    /// Container side including protocol, e.g. `80/tcp`.
    pub container_port: String,
    /// Host port the container port is bound to.
    pub host_port: String,
}

impl FromStr for PortMapping {
    type Err = PairParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (container, host) = split_pair(raw)?;
        let container_port = if container.contains('/') {
            container.to_string()
        } else {
            format!("{}/tcp", container)
        };
        Ok(Self {
            container_port,
            host_port: host.to_string(),
        })
    }
}

impl TryFrom<String> for PortMapping {
    type Error = PairParseError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<PortMapping> for String {
    fn from(port: PortMapping) -> Self {
        port.to_string()
    }
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.container_port, self.host_port)
    }
}

/// Host path bind-mounted into the container.
///
/// Wire form is `"hostPath:containerPath"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VolumeMount {
    /// Path on the host.
    pub source: String,
    /// Mount point inside the container.
    pub target: String,
}

impl FromStr for VolumeMount {
    type Err = PairParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (source, target) = split_pair(raw)?;
        Ok(Self {
            source: source.to_string(),
            target: target.to_string(),
        })
    }
}

impl TryFrom<String> for VolumeMount {
    type Error = PairParseError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<VolumeMount> for String {
    fn from(volume: VolumeMount) -> Self {
        volume.to_string()
    }
}

impl fmt::Display for VolumeMount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.target)
    }
}

/// Restart policy applied by the runtime.
///
/// The empty string is accepted as `no`, which is the runtime default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RestartPolicy {
    #[default]
    No,
    Always,
    UnlessStopped,
    OnFailure,
}

impl RestartPolicy {
    /// Runtime name of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            RestartPolicy::No => "no",
            RestartPolicy::Always => "always",
            RestartPolicy::UnlessStopped => "unless-stopped",
            RestartPolicy::OnFailure => "on-failure",
        }
    }
}

impl FromStr for RestartPolicy {
    type Err = RestartPolicyParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "" | "no" => Ok(RestartPolicy::No),
            "always" => Ok(RestartPolicy::Always),
            "unless-stopped" => Ok(RestartPolicy::UnlessStopped),
            "on-failure" => Ok(RestartPolicy::OnFailure),
            other => Err(RestartPolicyParseError(other.to_string())),
        }
    }
}

impl TryFrom<String> for RestartPolicy {
    type Error = RestartPolicyParseError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<RestartPolicy> for String {
    fn from(policy: RestartPolicy) -> Self {
        policy.as_str().to_string()
    }
}

/// Observable state of a named container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerState {
    Running,
    Stopped,
    NotFound,
}

/// Closed set of lifecycle statuses forwarded by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    Create,
    Start,
    Die,
}

impl LifecycleStatus {
    /// Map a raw runtime action to a status. Other actions are not forwarded.
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            "create" => Some(LifecycleStatus::Create),
            "start" => Some(LifecycleStatus::Start),
            "die" => Some(LifecycleStatus::Die),
            _ => None,
        }
    }

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStatus::Create => "create",
            LifecycleStatus::Start => "start",
            LifecycleStatus::Die => "die",
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized container lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleEvent {
    pub container_id: String,
    pub container_name: String,
    pub image_name: String,
    pub status: LifecycleStatus,
    /// Present only on `die` events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i64>,
}

use chargefire_common::DeviceId;
use serde::{Deserialize, Serialize};

/// Token matched against device names when no other is configured.
pub const DEFAULT_STYLUS_TOKEN: &str = "logitech";

/// What the device registry reports about a connected device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub id: DeviceId,
    pub name: String,
}

impl DeviceDescriptor {
    pub fn new(id: DeviceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Notifications delivered by the external device registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceEvent {
    Connected(DeviceDescriptor),
    Disconnected(DeviceId),
}

/// Handle to the device currently bound as the stylus.
///
/// Only valid while the device stays connected; [`StylusBinding`] drops it
/// on disconnect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceHandle {
    pub id: DeviceId,
    pub name: String,
}

/// Outcome of feeding one device event to a [`StylusBinding`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingChange {
    /// The device became the stylus. Carries the handle it replaced, if any.
    Bound {
        handle: DeviceHandle,
        replaced: Option<DeviceHandle>,
    },
    /// The bound stylus disconnected.
    Unbound(DeviceHandle),
    /// The event did not affect the binding.
    Unchanged,
}

/// Tracks which connected device is the stylus.
///
/// A device is the stylus when its name contains the configured token,
/// compared case-insensitively. The most recent matching connect wins.
#[derive(Debug, Clone)]
pub struct StylusBinding {
    token: String,
    current: Option<DeviceHandle>,
}

impl Default for StylusBinding {
    fn default() -> Self {
        Self::new(DEFAULT_STYLUS_TOKEN)
    }
}

impl StylusBinding {
    pub fn new(token: impl AsRef<str>) -> Self {
        let token = token.as_ref().trim().to_lowercase();
        if token.is_empty() {
            tracing::warn!("empty stylus token; no device will bind as stylus");
        }
        Self {
            token,
            current: None,
        }
    }

    /// The lowercased token device names are matched against.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether a device with this name counts as a stylus. A blank token never matches.
    pub fn matches(&self, name: &str) -> bool {
        !self.token.is_empty() && name.to_lowercase().contains(&self.token)
    }

    /// The currently bound stylus, if any.
    pub fn current(&self) -> Option<&DeviceHandle> {
        self.current.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.current.is_some()
    }

    /// Apply a registry notification.
    pub fn handle_event(&mut self, event: &DeviceEvent) -> BindingChange {
        match event {
            DeviceEvent::Connected(desc) => {
                if !self.matches(&desc.name) {
                    tracing::trace!(name = %desc.name, "device is not a stylus");
                    return BindingChange::Unchanged;
                }
                let handle = DeviceHandle {
                    id: desc.id,
                    name: desc.name.clone(),
                };
                let replaced = self.current.replace(handle.clone());
                tracing::info!(name = %handle.name, id = handle.id.0, "stylus bound");
                BindingChange::Bound { handle, replaced }
            }
            DeviceEvent::Disconnected(id) => match self.current.take_if(|h| h.id == *id) {
                Some(handle) => {
                    tracing::info!(name = %handle.name, id = handle.id.0, "stylus disconnected");
                    BindingChange::Unbound(handle)
                }
                None => BindingChange::Unchanged,
            },
        }
    }
}

//! Input boundary: actions raised by the host and stylus device resolution.
//!
//! # Invariants
//! - The controller consumes actions, never raw button events.
//! - At most one device is bound as the stylus; a newer match replaces it.

pub mod action;
pub mod device;

pub use action::Action;
pub use device::{
    BindingChange, DEFAULT_STYLUS_TOKEN, DeviceDescriptor, DeviceEvent, DeviceHandle,
    StylusBinding,
};

pub fn crate_info() -> &'static str {
    "chargefire-input v0.1.0"
}

//! Core traits for the obstacle registry
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`GeolocationProvider`]: Acquire the device position
//! - [`ImageCaptureProvider`]: Pick or take a photo
//! - [`PermissionBroker`]: Query and request runtime permissions
//! - [`KeyValueStore`]: Generic persistent key-value substrate
//! - [`ObstacleStore`]: Whole-collection persistence

pub mod geolocation;
pub mod image_capture;
pub mod key_value;
pub mod obstacle_store;
pub mod permissions;

pub use geolocation::GeolocationProvider;
pub use image_capture::{ImageCaptureProvider, ImageSource, MediaPicker};
pub use key_value::KeyValueStore;
pub use obstacle_store::ObstacleStore;
pub use permissions::{Permission, PermissionBroker, PermissionStatus, StaticPermissions};

//! IXML abstraction layer
//!
//! Safe, typed wrappers over the raw binding table, plus the traits
//! that make them mockable.

pub mod device;
pub mod traits;
pub mod wrapper;

pub use device::IxmlDevice;
pub use traits::{GpuDevice, GpuManager};
pub use wrapper::Ixml;

//! Command handlers
//!
//! Each handler is generic over [`crate::ixml::GpuManager`] so it can
//! run against the real library or the test mock.

pub mod info;
pub mod list;
pub mod version;

pub use info::run_info;
pub use list::run_list;
pub use version::run_version;

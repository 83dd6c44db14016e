//! Trait definitions for GPU operations
//!
//! These traits abstract over the IXML wrapper to enable testing with
//! mocks.

use crate::domain::{ClockInfo, MemoryInfo, PciInfo, Utilization};
use crate::error::Result;

/// Telemetry operations on a single GPU device
pub trait GpuDevice {
    /// Get the marketing name of the GPU
    fn name(&self) -> Result<String>;

    /// Get the GPU UUID
    fn uuid(&self) -> Result<String>;

    /// Get the enumeration index of the GPU
    fn index(&self) -> Result<u32>;

    /// Get the current fan speed as a percentage
    fn fan_speed(&self) -> Result<u32>;

    /// Get framebuffer memory usage
    fn memory_info(&self) -> Result<MemoryInfo>;

    /// Get the current GPU core temperature in degrees Celsius
    fn temperature(&self) -> Result<u32>;

    /// Get PCI identity
    fn pci_info(&self) -> Result<PciInfo>;

    /// Get current power draw in milliwatts
    fn power_usage(&self) -> Result<u32>;

    /// Get current SM and memory clocks
    fn clock_info(&self) -> Result<ClockInfo>;

    /// Get GPU and memory utilization rates
    fn utilization(&self) -> Result<Utilization>;
}

impl<D: GpuDevice + ?Sized> GpuDevice for &D {
    fn name(&self) -> Result<String> {
        (**self).name()
    }

    fn uuid(&self) -> Result<String> {
        (**self).uuid()
    }

    fn index(&self) -> Result<u32> {
        (**self).index()
    }

    fn fan_speed(&self) -> Result<u32> {
        (**self).fan_speed()
    }

    fn memory_info(&self) -> Result<MemoryInfo> {
        (**self).memory_info()
    }

    fn temperature(&self) -> Result<u32> {
        (**self).temperature()
    }

    fn pci_info(&self) -> Result<PciInfo> {
        (**self).pci_info()
    }

    fn power_usage(&self) -> Result<u32> {
        (**self).power_usage()
    }

    fn clock_info(&self) -> Result<ClockInfo> {
        (**self).clock_info()
    }

    fn utilization(&self) -> Result<Utilization> {
        (**self).utilization()
    }
}

/// Discovery and system-level operations over all GPUs
pub trait GpuManager {
    /// The device type handed out by this manager; borrows the
    /// manager so devices cannot outlive the loaded library.
    type Device<'a>: GpuDevice
    where
        Self: 'a;

    /// Get the number of GPU devices
    fn device_count(&self) -> Result<u32>;

    /// Get a device by enumeration index
    fn device_by_index(&self, index: u32) -> Result<Self::Device<'_>>;

    /// Get a device by UUID
    fn device_by_uuid(&self, uuid: &str) -> Result<Self::Device<'_>>;

    /// Get the installed driver version
    fn driver_version(&self) -> Result<String>;

    /// Get the supported CUDA version as "major.minor"
    fn cuda_version(&self) -> Result<String>;
}

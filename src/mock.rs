//! Mock implementations for testing
//!
//! Mock GPU device and manager for unit testing without the vendor
//! driver installed.

use crate::domain::{ClockInfo, MemoryInfo, PciInfo, Utilization};
use crate::error::{IxmlError, Result};
use crate::ixml::{GpuDevice, GpuManager};

/// Mock GPU device with fixed telemetry
#[derive(Debug, Clone)]
pub struct MockDevice {
    pub index: u32,
    pub name: String,
    pub uuid: String,
    pub temperature: u32,
    pub fan_speed: u32,
    pub power_usage: u32,
    pub memory: MemoryInfo,
    pub clocks: ClockInfo,
    pub utilization: Utilization,
    pub pci: PciInfo,
}

impl MockDevice {
    /// Create a mock device with plausible defaults
    pub fn new(index: u32) -> Self {
        Self {
            index,
            name: format!("Mock GPU {}", index),
            uuid: format!("GPU-MOCK-{:04}", index),
            temperature: 45,
            fan_speed: 30,
            power_usage: 150_000,
            memory: MemoryInfo {
                total: 32768,
                used: 1024,
                free: 31744,
            },
            clocks: ClockInfo { sm: 1500, mem: 1200 },
            utilization: Utilization { gpu: 10, mem: 4 },
            pci: PciInfo {
                bus: index,
                bus_id: format!("00000000:{:02X}:00.0", index + 1),
                bus_id_legacy: format!("0000:{:02X}:00.0", index + 1),
                device: 0,
                domain: 0,
                pci_device_id: 0x1E07_10DE,
                pci_sub_system_id: 0,
            },
        }
    }

    /// Builder: set name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder: set UUID
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = uuid.into();
        self
    }
}

impl GpuDevice for MockDevice {
    fn name(&self) -> Result<String> {
        Ok(self.name.clone())
    }

    fn uuid(&self) -> Result<String> {
        Ok(self.uuid.clone())
    }

    fn index(&self) -> Result<u32> {
        Ok(self.index)
    }

    fn fan_speed(&self) -> Result<u32> {
        Ok(self.fan_speed)
    }

    fn memory_info(&self) -> Result<MemoryInfo> {
        Ok(self.memory)
    }

    fn temperature(&self) -> Result<u32> {
        Ok(self.temperature)
    }

    fn pci_info(&self) -> Result<PciInfo> {
        Ok(self.pci.clone())
    }

    fn power_usage(&self) -> Result<u32> {
        Ok(self.power_usage)
    }

    fn clock_info(&self) -> Result<ClockInfo> {
        Ok(self.clocks)
    }

    fn utilization(&self) -> Result<Utilization> {
        Ok(self.utilization)
    }
}

/// Mock manager over a fixed set of devices
#[derive(Debug, Clone)]
pub struct MockManager {
    pub devices: Vec<MockDevice>,
    pub driver_version: String,
    pub cuda_version: String,
}

impl MockManager {
    /// Create a manager with `count` default devices
    pub fn new(count: u32) -> Self {
        Self {
            devices: (0..count).map(MockDevice::new).collect(),
            driver_version: "3.2.0-mock".to_string(),
            cuda_version: "10.2".to_string(),
        }
    }
}

impl GpuManager for MockManager {
    type Device<'a>
        = &'a MockDevice
    where
        Self: 'a;

    fn device_count(&self) -> Result<u32> {
        Ok(self.devices.len() as u32)
    }

    fn device_by_index(&self, index: u32) -> Result<&MockDevice> {
        self.devices
            .get(index as usize)
            .ok_or(IxmlError::DeviceNotFound(index))
    }

    fn device_by_uuid(&self, uuid: &str) -> Result<&MockDevice> {
        self.devices
            .iter()
            .find(|d| d.uuid == uuid)
            .ok_or_else(|| IxmlError::DeviceNotFoundByUuid(uuid.to_string()))
    }

    fn driver_version(&self) -> Result<String> {
        Ok(self.driver_version.clone())
    }

    fn cuda_version(&self) -> Result<String> {
        Ok(self.cuda_version.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_manager_lookup() {
        let manager = MockManager::new(2);
        assert_eq!(manager.device_count().unwrap(), 2);

        let dev = manager.device_by_index(1).unwrap();
        assert_eq!(dev.index().unwrap(), 1);

        let dev = manager.device_by_uuid("GPU-MOCK-0000").unwrap();
        assert_eq!(dev.index().unwrap(), 0);
    }

    #[test]
    fn test_mock_manager_not_found() {
        let manager = MockManager::new(1);
        assert!(matches!(
            manager.device_by_index(5),
            Err(IxmlError::DeviceNotFound(5))
        ));
        assert!(matches!(
            manager.device_by_uuid("GPU-NOPE"),
            Err(IxmlError::DeviceNotFoundByUuid(_))
        ));
    }
}

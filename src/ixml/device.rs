//! IXML device implementation
//!
//! Real implementation of the [`GpuDevice`] trait over a resolved
//! binding table and an opaque device handle.

use std::os::raw::{c_char, c_uint};

use crate::domain::{ClockInfo, MemoryInfo, PciInfo, Utilization};
use crate::error::{check, Result};
use crate::ixml::traits::GpuDevice;
use crate::sys::dl::LibIxml;
use crate::sys::types::*;

/// A single GPU, borrowed from an initialized [`crate::ixml::Ixml`]
/// session.
///
/// The handle is produced by the external library and passed back
/// unchanged on every call; it is never inspected here.
pub struct IxmlDevice<'lib> {
    lib: &'lib LibIxml,
    handle: RawDevice,
}

impl<'lib> IxmlDevice<'lib> {
    pub(crate) fn new(lib: &'lib LibIxml, handle: RawDevice) -> Self {
        Self { lib, handle }
    }

    /// Position of the GPU on a multi-chip board. Boards without the
    /// extension report a pass-through error.
    pub fn board_position(&self) -> Result<u32> {
        let mut position: c_uint = 0;
        check(SYM_DEVICE_GET_BOARD_POSITION, unsafe {
            self.lib
                .symbols()
                .device_get_board_position(self.handle, &mut position)
        })?;
        Ok(position)
    }
}

impl GpuDevice for IxmlDevice<'_> {
    fn name(&self) -> Result<String> {
        let mut buf = [0 as c_char; DEVICE_NAME_BUFFER_SIZE];
        check(SYM_DEVICE_GET_NAME, unsafe {
            self.lib
                .symbols()
                .device_get_name(self.handle, buf.as_mut_ptr(), buf.len() as c_uint)
        })?;
        Ok(buf_to_string(&buf))
    }

    fn uuid(&self) -> Result<String> {
        let mut buf = [0 as c_char; DEVICE_UUID_BUFFER_SIZE];
        check(SYM_DEVICE_GET_UUID, unsafe {
            self.lib
                .symbols()
                .device_get_uuid(self.handle, buf.as_mut_ptr(), buf.len() as c_uint)
        })?;
        Ok(buf_to_string(&buf))
    }

    fn index(&self) -> Result<u32> {
        let mut index: c_uint = 0;
        check(SYM_DEVICE_GET_INDEX, unsafe {
            self.lib.symbols().device_get_index(self.handle, &mut index)
        })?;
        Ok(index)
    }

    fn fan_speed(&self) -> Result<u32> {
        let mut speed: c_uint = 0;
        check(SYM_DEVICE_GET_FAN_SPEED, unsafe {
            self.lib
                .symbols()
                .device_get_fan_speed(self.handle, &mut speed)
        })?;
        Ok(speed)
    }

    fn memory_info(&self) -> Result<MemoryInfo> {
        let mut memory = RawMemory::default();
        check(SYM_DEVICE_GET_MEMORY_INFO, unsafe {
            self.lib
                .symbols()
                .device_get_memory_info(self.handle, &mut memory)
        })?;

        // Bytes to MiB.
        Ok(MemoryInfo {
            total: memory.total / 1024 / 1024,
            used: memory.used / 1024 / 1024,
            free: memory.free / 1024 / 1024,
        })
    }

    fn temperature(&self) -> Result<u32> {
        let mut temp: c_uint = 0;
        check(SYM_DEVICE_GET_TEMPERATURE, unsafe {
            self.lib.symbols().device_get_temperature(
                self.handle,
                NVML_TEMPERATURE_GPU,
                &mut temp,
            )
        })?;
        Ok(temp)
    }

    fn pci_info(&self) -> Result<PciInfo> {
        let mut pci = RawPciInfo::default();
        check(SYM_DEVICE_GET_PCI_INFO, unsafe {
            self.lib.symbols().device_get_pci_info(self.handle, &mut pci)
        })?;

        Ok(PciInfo {
            bus: pci.bus,
            bus_id: buf_to_string(&pci.bus_id),
            bus_id_legacy: buf_to_string(&pci.bus_id_legacy),
            device: pci.device,
            domain: pci.domain,
            pci_device_id: pci.pci_device_id,
            pci_sub_system_id: pci.pci_sub_system_id,
        })
    }

    fn power_usage(&self) -> Result<u32> {
        let mut power: c_uint = 0;

        // Multi-chip boards report aggregate board power; everything
        // else reports per-GPU power.
        if self.board_position().is_ok() {
            check(SYM_DEVICE_GET_BOARD_POWER_USAGE, unsafe {
                self.lib
                    .symbols()
                    .device_get_board_power_usage(self.handle, &mut power)
            })?;
        } else {
            check(SYM_DEVICE_GET_POWER_USAGE, unsafe {
                self.lib
                    .symbols()
                    .device_get_power_usage(self.handle, &mut power)
            })?;
        }

        Ok(power)
    }

    fn clock_info(&self) -> Result<ClockInfo> {
        let mut sm: c_uint = 0;
        let mut mem: c_uint = 0;

        check(SYM_DEVICE_GET_CLOCK_INFO, unsafe {
            self.lib
                .symbols()
                .device_get_clock_info(self.handle, NVML_CLOCK_SM, &mut sm)
        })?;
        check(SYM_DEVICE_GET_CLOCK_INFO, unsafe {
            self.lib
                .symbols()
                .device_get_clock_info(self.handle, NVML_CLOCK_MEM, &mut mem)
        })?;

        Ok(ClockInfo { sm, mem })
    }

    fn utilization(&self) -> Result<Utilization> {
        let mut util = RawUtilization::default();
        check(SYM_DEVICE_GET_UTILIZATION_RATES, unsafe {
            self.lib
                .symbols()
                .device_get_utilization_rates(self.handle, &mut util)
        })?;

        Ok(Utilization {
            gpu: util.gpu,
            mem: util.memory,
        })
    }
}

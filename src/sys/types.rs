//! Raw IXML ABI definitions
//!
//! Status codes, struct layouts, buffer sizes, and the fixed symbol
//! name table of `libixml.so`. The library implements the NVML ABI
//! with two Iluvatar-specific extensions, so everything in this module
//! mirrors the NVML wire contract and must not be reordered or
//! renamed.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_uint, c_void};

/// Raw status code returned by every IXML entry point (`nvmlReturn_t`).
pub type IxmlReturn = u32;

pub const NVML_SUCCESS: IxmlReturn = 0;
pub const NVML_ERROR_UNINITIALIZED: IxmlReturn = 1;
pub const NVML_ERROR_INVALID_ARGUMENT: IxmlReturn = 2;
pub const NVML_ERROR_NOT_SUPPORTED: IxmlReturn = 3;
pub const NVML_ERROR_NO_PERMISSION: IxmlReturn = 4;
pub const NVML_ERROR_NOT_FOUND: IxmlReturn = 6;
pub const NVML_ERROR_INSUFFICIENT_SIZE: IxmlReturn = 7;
pub const NVML_ERROR_LIBRARY_NOT_FOUND: IxmlReturn = 12;
pub const NVML_ERROR_FUNCTION_NOT_FOUND: IxmlReturn = 13;
pub const NVML_ERROR_UNKNOWN: IxmlReturn = 999;

/// Human-readable name for a raw status code, for error messages.
pub fn code_name(code: IxmlReturn) -> &'static str {
    match code {
        NVML_SUCCESS => "Success",
        NVML_ERROR_UNINITIALIZED => "Uninitialized",
        NVML_ERROR_INVALID_ARGUMENT => "InvalidArgument",
        NVML_ERROR_NOT_SUPPORTED => "NotSupported",
        NVML_ERROR_NO_PERMISSION => "NoPermission",
        NVML_ERROR_NOT_FOUND => "NotFound",
        NVML_ERROR_INSUFFICIENT_SIZE => "InsufficientSize",
        NVML_ERROR_LIBRARY_NOT_FOUND => "LibraryNotFound",
        NVML_ERROR_FUNCTION_NOT_FOUND => "FunctionNotFound",
        NVML_ERROR_UNKNOWN => "Unknown",
        _ => "UnrecognizedStatus",
    }
}

/// Opaque device handle (`nvmlDevice_t`).
///
/// Produced and consumed by the external library; the shim never
/// dereferences or interprets it.
pub type RawDevice = *mut c_void;

/// `nvmlMemory_t`: framebuffer memory in bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RawMemory {
    pub total: u64,
    pub free: u64,
    pub used: u64,
}

pub const PCI_BUS_ID_LEGACY_BUFFER_SIZE: usize = 16;
pub const PCI_BUS_ID_BUFFER_SIZE: usize = 32;

/// `nvmlPciInfo_t` (v2 layout).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawPciInfo {
    pub bus_id_legacy: [c_char; PCI_BUS_ID_LEGACY_BUFFER_SIZE],
    pub domain: c_uint,
    pub bus: c_uint,
    pub device: c_uint,
    pub pci_device_id: c_uint,
    pub pci_sub_system_id: c_uint,
    pub bus_id: [c_char; PCI_BUS_ID_BUFFER_SIZE],
}

impl Default for RawPciInfo {
    fn default() -> Self {
        Self {
            bus_id_legacy: [0; PCI_BUS_ID_LEGACY_BUFFER_SIZE],
            domain: 0,
            bus: 0,
            device: 0,
            pci_device_id: 0,
            pci_sub_system_id: 0,
            bus_id: [0; PCI_BUS_ID_BUFFER_SIZE],
        }
    }
}

/// `nvmlUtilization_t`: GPU and memory busy percentages over the last
/// sample period.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RawUtilization {
    pub gpu: c_uint,
    pub memory: c_uint,
}

// Sensor and clock selectors (`nvmlTemperatureSensors_t`,
// `nvmlClockType_t`).
pub const NVML_TEMPERATURE_GPU: c_uint = 0;
pub const NVML_CLOCK_GRAPHICS: c_uint = 0;
pub const NVML_CLOCK_SM: c_uint = 1;
pub const NVML_CLOCK_MEM: c_uint = 2;
pub const NVML_CLOCK_VIDEO: c_uint = 3;

pub const SYSTEM_DRIVER_VERSION_BUFFER_SIZE: usize = 80;
pub const DEVICE_NAME_BUFFER_SIZE: usize = 64;
pub const DEVICE_UUID_BUFFER_SIZE: usize = 80;

/// Shared library opened by the loader. Resolved through the normal
/// dynamic-linker search path; no customization is offered here.
pub const IXML_LIBRARY: &str = "libixml.so";

// Vendor-defined export names. Case-sensitive, stable ABI identifiers;
// the two `ixml`-prefixed entries are Iluvatar extensions, the rest
// follow NVML.
pub const SYM_INIT: &str = "nvmlInit";
pub const SYM_SHUTDOWN: &str = "nvmlShutdown";
pub const SYM_DEVICE_GET_COUNT: &str = "nvmlDeviceGetCount";
pub const SYM_SYSTEM_GET_DRIVER_VERSION: &str = "nvmlSystemGetDriverVersion";
pub const SYM_SYSTEM_GET_CUDA_DRIVER_VERSION: &str = "nvmlSystemGetCudaDriverVersion";
pub const SYM_DEVICE_GET_HANDLE_BY_INDEX: &str = "nvmlDeviceGetHandleByIndex";
pub const SYM_DEVICE_GET_HANDLE_BY_UUID: &str = "nvmlDeviceGetHandleByUUID";
pub const SYM_DEVICE_GET_NAME: &str = "nvmlDeviceGetName";
pub const SYM_DEVICE_GET_UUID: &str = "nvmlDeviceGetUUID";
pub const SYM_DEVICE_GET_INDEX: &str = "nvmlDeviceGetIndex";
pub const SYM_DEVICE_GET_FAN_SPEED: &str = "nvmlDeviceGetFanSpeed";
pub const SYM_DEVICE_GET_MEMORY_INFO: &str = "nvmlDeviceGetMemoryInfo";
pub const SYM_DEVICE_GET_TEMPERATURE: &str = "nvmlDeviceGetTemperature";
pub const SYM_DEVICE_GET_PCI_INFO: &str = "nvmlDeviceGetPciInfo";
pub const SYM_DEVICE_GET_BOARD_POSITION: &str = "ixmlDeviceGetBoardPosition";
pub const SYM_DEVICE_GET_POWER_USAGE: &str = "nvmlDeviceGetPowerUsage";
pub const SYM_DEVICE_GET_BOARD_POWER_USAGE: &str = "ixmlDeviceGetBoardPowerUsage";
pub const SYM_DEVICE_GET_CLOCK_INFO: &str = "nvmlDeviceGetClockInfo";
pub const SYM_DEVICE_GET_UTILIZATION_RATES: &str = "nvmlDeviceGetUtilizationRates";

// One function-pointer type per export.
pub type FnInit = unsafe extern "C" fn() -> IxmlReturn;
pub type FnShutdown = unsafe extern "C" fn() -> IxmlReturn;
pub type FnDeviceGetCount = unsafe extern "C" fn(count: *mut c_uint) -> IxmlReturn;
pub type FnSystemGetDriverVersion =
    unsafe extern "C" fn(version: *mut c_char, length: c_uint) -> IxmlReturn;
pub type FnSystemGetCudaDriverVersion = unsafe extern "C" fn(version: *mut c_int) -> IxmlReturn;
pub type FnDeviceGetHandleByIndex =
    unsafe extern "C" fn(index: c_uint, device: *mut RawDevice) -> IxmlReturn;
pub type FnDeviceGetHandleByUuid =
    unsafe extern "C" fn(uuid: *const c_char, device: *mut RawDevice) -> IxmlReturn;
pub type FnDeviceGetName =
    unsafe extern "C" fn(device: RawDevice, name: *mut c_char, length: c_uint) -> IxmlReturn;
pub type FnDeviceGetUuid =
    unsafe extern "C" fn(device: RawDevice, uuid: *mut c_char, length: c_uint) -> IxmlReturn;
pub type FnDeviceGetIndex =
    unsafe extern "C" fn(device: RawDevice, index: *mut c_uint) -> IxmlReturn;
pub type FnDeviceGetFanSpeed =
    unsafe extern "C" fn(device: RawDevice, speed: *mut c_uint) -> IxmlReturn;
pub type FnDeviceGetMemoryInfo =
    unsafe extern "C" fn(device: RawDevice, memory: *mut RawMemory) -> IxmlReturn;
pub type FnDeviceGetTemperature = unsafe extern "C" fn(
    device: RawDevice,
    sensor_type: c_uint,
    temp: *mut c_uint,
) -> IxmlReturn;
pub type FnDeviceGetPciInfo =
    unsafe extern "C" fn(device: RawDevice, pci: *mut RawPciInfo) -> IxmlReturn;
pub type FnDeviceGetBoardPosition =
    unsafe extern "C" fn(device: RawDevice, position: *mut c_uint) -> IxmlReturn;
pub type FnDeviceGetPowerUsage =
    unsafe extern "C" fn(device: RawDevice, power: *mut c_uint) -> IxmlReturn;
pub type FnDeviceGetClockInfo = unsafe extern "C" fn(
    device: RawDevice,
    clock_type: c_uint,
    clock: *mut c_uint,
) -> IxmlReturn;
pub type FnDeviceGetUtilizationRates =
    unsafe extern "C" fn(device: RawDevice, utilization: *mut RawUtilization) -> IxmlReturn;

/// Convert a NUL-terminated C char buffer filled by the library into
/// an owned string. The buffer must contain a terminator; callers pass
/// zero-initialized buffers, so a library that writes nothing yields
/// an empty string.
pub fn buf_to_string(buf: &[c_char]) -> String {
    unsafe { CStr::from_ptr(buf.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_name_known_codes() {
        assert_eq!(code_name(NVML_SUCCESS), "Success");
        assert_eq!(code_name(NVML_ERROR_LIBRARY_NOT_FOUND), "LibraryNotFound");
        assert_eq!(code_name(NVML_ERROR_FUNCTION_NOT_FOUND), "FunctionNotFound");
        assert_eq!(code_name(NVML_ERROR_UNKNOWN), "Unknown");
    }

    #[test]
    fn test_code_name_unrecognized() {
        assert_eq!(code_name(500), "UnrecognizedStatus");
    }

    #[test]
    fn test_buf_to_string() {
        let mut buf = [0 as c_char; 16];
        for (i, b) in b"IX-GPU".iter().enumerate() {
            buf[i] = *b as c_char;
        }
        assert_eq!(buf_to_string(&buf), "IX-GPU");
    }

    #[test]
    fn test_buf_to_string_empty() {
        let buf = [0 as c_char; 8];
        assert_eq!(buf_to_string(&buf), "");
    }

    #[test]
    fn test_raw_struct_sizes() {
        // Layouts are part of the ABI contract with libixml.so.
        assert_eq!(std::mem::size_of::<RawMemory>(), 24);
        assert_eq!(std::mem::size_of::<RawUtilization>(), 8);
        assert_eq!(
            std::mem::size_of::<RawPciInfo>(),
            PCI_BUS_ID_LEGACY_BUFFER_SIZE + 5 * 4 + PCI_BUS_ID_BUFFER_SIZE
        );
    }
}

//! Dynamic loading of `libixml.so`
//!
//! [`LibIxml`] opens the vendor library and resolves the fixed symbol
//! table eagerly, so an incompatible library version is detected at
//! startup rather than mid-operation. [`SymbolTable`] holds one
//! `Option` per export and forwards calls to the bound pointer, or
//! returns `NVML_ERROR_UNKNOWN` when an entry was never resolved.
//! Forwarders are pure pass-throughs: arguments and statuses cross
//! unchanged, and output arguments are only written by the external
//! library itself.

use std::os::raw::{c_char, c_int, c_uint};

use libloading::Library;

use crate::error::{IxmlError, Result};
use crate::sys::types::*;

/// Resolved function pointers for every export of `libixml.so`.
///
/// Populated once by [`SymbolTable::resolve`] and never mutated
/// afterward. An unresolved entry is represented as `None` rather
/// than a null pointer, so invoking it is a defined error instead of
/// undefined behavior.
#[derive(Debug)]
pub struct SymbolTable {
    init: Option<FnInit>,
    shutdown: Option<FnShutdown>,
    device_get_count: Option<FnDeviceGetCount>,
    system_get_driver_version: Option<FnSystemGetDriverVersion>,
    system_get_cuda_driver_version: Option<FnSystemGetCudaDriverVersion>,
    device_get_handle_by_index: Option<FnDeviceGetHandleByIndex>,
    device_get_handle_by_uuid: Option<FnDeviceGetHandleByUuid>,
    device_get_name: Option<FnDeviceGetName>,
    device_get_uuid: Option<FnDeviceGetUuid>,
    device_get_index: Option<FnDeviceGetIndex>,
    device_get_fan_speed: Option<FnDeviceGetFanSpeed>,
    device_get_memory_info: Option<FnDeviceGetMemoryInfo>,
    device_get_temperature: Option<FnDeviceGetTemperature>,
    device_get_pci_info: Option<FnDeviceGetPciInfo>,
    device_get_board_position: Option<FnDeviceGetBoardPosition>,
    device_get_power_usage: Option<FnDeviceGetPowerUsage>,
    device_get_board_power_usage: Option<FnDeviceGetPowerUsage>,
    device_get_clock_info: Option<FnDeviceGetClockInfo>,
    device_get_utilization_rates: Option<FnDeviceGetUtilizationRates>,
}

/// Resolve one export, failing fast with the missing symbol's name.
///
/// # Safety
///
/// `T` must be the correct function-pointer type for the named export.
unsafe fn resolve_symbol<T: Copy>(lib: &Library, name: &'static str) -> Result<T> {
    match lib.get::<T>(name.as_bytes()) {
        Ok(sym) => Ok(*sym),
        Err(e) => {
            log::warn!("symbol {} not found: {}", name, e);
            Err(IxmlError::SymbolNotFound(name))
        }
    }
}

impl SymbolTable {
    /// Resolve every export in turn. The first miss aborts with
    /// [`IxmlError::SymbolNotFound`], leaving no partially usable
    /// table behind.
    ///
    /// # Safety
    ///
    /// The resolved pointers are only valid while `lib` stays open;
    /// [`LibIxml`] owns both and upholds this.
    pub unsafe fn resolve(lib: &Library) -> Result<Self> {
        Ok(Self {
            init: Some(resolve_symbol(lib, SYM_INIT)?),
            shutdown: Some(resolve_symbol(lib, SYM_SHUTDOWN)?),
            device_get_count: Some(resolve_symbol(lib, SYM_DEVICE_GET_COUNT)?),
            system_get_driver_version: Some(resolve_symbol(lib, SYM_SYSTEM_GET_DRIVER_VERSION)?),
            system_get_cuda_driver_version: Some(resolve_symbol(
                lib,
                SYM_SYSTEM_GET_CUDA_DRIVER_VERSION,
            )?),
            device_get_handle_by_index: Some(resolve_symbol(lib, SYM_DEVICE_GET_HANDLE_BY_INDEX)?),
            device_get_handle_by_uuid: Some(resolve_symbol(lib, SYM_DEVICE_GET_HANDLE_BY_UUID)?),
            device_get_name: Some(resolve_symbol(lib, SYM_DEVICE_GET_NAME)?),
            device_get_uuid: Some(resolve_symbol(lib, SYM_DEVICE_GET_UUID)?),
            device_get_index: Some(resolve_symbol(lib, SYM_DEVICE_GET_INDEX)?),
            device_get_fan_speed: Some(resolve_symbol(lib, SYM_DEVICE_GET_FAN_SPEED)?),
            device_get_memory_info: Some(resolve_symbol(lib, SYM_DEVICE_GET_MEMORY_INFO)?),
            device_get_temperature: Some(resolve_symbol(lib, SYM_DEVICE_GET_TEMPERATURE)?),
            device_get_pci_info: Some(resolve_symbol(lib, SYM_DEVICE_GET_PCI_INFO)?),
            device_get_board_position: Some(resolve_symbol(lib, SYM_DEVICE_GET_BOARD_POSITION)?),
            device_get_power_usage: Some(resolve_symbol(lib, SYM_DEVICE_GET_POWER_USAGE)?),
            device_get_board_power_usage: Some(resolve_symbol(
                lib,
                SYM_DEVICE_GET_BOARD_POWER_USAGE,
            )?),
            device_get_clock_info: Some(resolve_symbol(lib, SYM_DEVICE_GET_CLOCK_INFO)?),
            device_get_utilization_rates: Some(resolve_symbol(
                lib,
                SYM_DEVICE_GET_UTILIZATION_RATES,
            )?),
        })
    }

    /// Table with every entry cleared, for exercising the unresolved
    /// path without a library.
    #[cfg(test)]
    pub(crate) fn unresolved() -> Self {
        Self {
            init: None,
            shutdown: None,
            device_get_count: None,
            system_get_driver_version: None,
            system_get_cuda_driver_version: None,
            device_get_handle_by_index: None,
            device_get_handle_by_uuid: None,
            device_get_name: None,
            device_get_uuid: None,
            device_get_index: None,
            device_get_fan_speed: None,
            device_get_memory_info: None,
            device_get_temperature: None,
            device_get_pci_info: None,
            device_get_board_position: None,
            device_get_power_usage: None,
            device_get_board_power_usage: None,
            device_get_clock_info: None,
            device_get_utilization_rates: None,
        }
    }
}

// Forwarding layer. Each method either invokes the bound pointer with
// the caller's arguments and returns its status verbatim, or returns
// `NVML_ERROR_UNKNOWN` without touching any output argument.
//
// # Safety
//
// All methods pass raw caller pointers straight to foreign code; the
// caller must supply pointers valid for the external library to write
// through, and device handles previously produced by this library.
impl SymbolTable {
    pub unsafe fn init(&self) -> IxmlReturn {
        match self.init {
            Some(f) => f(),
            None => NVML_ERROR_UNKNOWN,
        }
    }

    pub unsafe fn shutdown(&self) -> IxmlReturn {
        match self.shutdown {
            Some(f) => f(),
            None => NVML_ERROR_UNKNOWN,
        }
    }

    pub unsafe fn device_get_count(&self, count: *mut c_uint) -> IxmlReturn {
        match self.device_get_count {
            Some(f) => f(count),
            None => NVML_ERROR_UNKNOWN,
        }
    }

    pub unsafe fn system_get_driver_version(
        &self,
        version: *mut c_char,
        length: c_uint,
    ) -> IxmlReturn {
        match self.system_get_driver_version {
            Some(f) => f(version, length),
            None => NVML_ERROR_UNKNOWN,
        }
    }

    pub unsafe fn system_get_cuda_driver_version(&self, version: *mut c_int) -> IxmlReturn {
        match self.system_get_cuda_driver_version {
            Some(f) => f(version),
            None => NVML_ERROR_UNKNOWN,
        }
    }

    pub unsafe fn device_get_handle_by_index(
        &self,
        index: c_uint,
        device: *mut RawDevice,
    ) -> IxmlReturn {
        match self.device_get_handle_by_index {
            Some(f) => f(index, device),
            None => NVML_ERROR_UNKNOWN,
        }
    }

    pub unsafe fn device_get_handle_by_uuid(
        &self,
        uuid: *const c_char,
        device: *mut RawDevice,
    ) -> IxmlReturn {
        match self.device_get_handle_by_uuid {
            Some(f) => f(uuid, device),
            None => NVML_ERROR_UNKNOWN,
        }
    }

    pub unsafe fn device_get_name(
        &self,
        device: RawDevice,
        name: *mut c_char,
        length: c_uint,
    ) -> IxmlReturn {
        match self.device_get_name {
            Some(f) => f(device, name, length),
            None => NVML_ERROR_UNKNOWN,
        }
    }

    pub unsafe fn device_get_uuid(
        &self,
        device: RawDevice,
        uuid: *mut c_char,
        length: c_uint,
    ) -> IxmlReturn {
        match self.device_get_uuid {
            Some(f) => f(device, uuid, length),
            None => NVML_ERROR_UNKNOWN,
        }
    }

    pub unsafe fn device_get_index(&self, device: RawDevice, index: *mut c_uint) -> IxmlReturn {
        match self.device_get_index {
            Some(f) => f(device, index),
            None => NVML_ERROR_UNKNOWN,
        }
    }

    pub unsafe fn device_get_fan_speed(&self, device: RawDevice, speed: *mut c_uint) -> IxmlReturn {
        match self.device_get_fan_speed {
            Some(f) => f(device, speed),
            None => NVML_ERROR_UNKNOWN,
        }
    }

    pub unsafe fn device_get_memory_info(
        &self,
        device: RawDevice,
        memory: *mut RawMemory,
    ) -> IxmlReturn {
        match self.device_get_memory_info {
            Some(f) => f(device, memory),
            None => NVML_ERROR_UNKNOWN,
        }
    }

    pub unsafe fn device_get_temperature(
        &self,
        device: RawDevice,
        sensor_type: c_uint,
        temp: *mut c_uint,
    ) -> IxmlReturn {
        match self.device_get_temperature {
            Some(f) => f(device, sensor_type, temp),
            None => NVML_ERROR_UNKNOWN,
        }
    }

    pub unsafe fn device_get_pci_info(
        &self,
        device: RawDevice,
        pci: *mut RawPciInfo,
    ) -> IxmlReturn {
        match self.device_get_pci_info {
            Some(f) => f(device, pci),
            None => NVML_ERROR_UNKNOWN,
        }
    }

    pub unsafe fn device_get_board_position(
        &self,
        device: RawDevice,
        position: *mut c_uint,
    ) -> IxmlReturn {
        match self.device_get_board_position {
            Some(f) => f(device, position),
            None => NVML_ERROR_UNKNOWN,
        }
    }

    pub unsafe fn device_get_power_usage(
        &self,
        device: RawDevice,
        power: *mut c_uint,
    ) -> IxmlReturn {
        match self.device_get_power_usage {
            Some(f) => f(device, power),
            None => NVML_ERROR_UNKNOWN,
        }
    }

    pub unsafe fn device_get_board_power_usage(
        &self,
        device: RawDevice,
        power: *mut c_uint,
    ) -> IxmlReturn {
        match self.device_get_board_power_usage {
            Some(f) => f(device, power),
            None => NVML_ERROR_UNKNOWN,
        }
    }

    pub unsafe fn device_get_clock_info(
        &self,
        device: RawDevice,
        clock_type: c_uint,
        clock: *mut c_uint,
    ) -> IxmlReturn {
        match self.device_get_clock_info {
            Some(f) => f(device, clock_type, clock),
            None => NVML_ERROR_UNKNOWN,
        }
    }

    pub unsafe fn device_get_utilization_rates(
        &self,
        device: RawDevice,
        utilization: *mut RawUtilization,
    ) -> IxmlReturn {
        match self.device_get_utilization_rates {
            Some(f) => f(device, utilization),
            None => NVML_ERROR_UNKNOWN,
        }
    }
}

/// Open with lazy binding and global visibility, matching how the
/// vendor library expects to be loaded.
#[cfg(unix)]
fn open_library(name: &str) -> std::result::Result<Library, libloading::Error> {
    use libloading::os::unix::{Library as PosixLibrary, RTLD_GLOBAL, RTLD_LAZY};
    unsafe { PosixLibrary::open(Some(name), RTLD_LAZY | RTLD_GLOBAL).map(Library::from) }
}

#[cfg(not(unix))]
fn open_library(name: &str) -> std::result::Result<Library, libloading::Error> {
    unsafe { Library::new(name) }
}

/// Owned handle to `libixml.so` together with its resolved symbols.
///
/// Constructed by [`LibIxml::load`] and released by [`LibIxml::unload`].
/// Taking `self` by value in `unload` makes double-close and
/// call-after-unload unrepresentable.
#[derive(Debug)]
pub struct LibIxml {
    lib: Library,
    symbols: SymbolTable,
}

impl LibIxml {
    /// Open [`IXML_LIBRARY`] and resolve the full symbol table.
    pub fn load() -> Result<Self> {
        Self::open(IXML_LIBRARY)
    }

    fn open(name: &'static str) -> Result<Self> {
        let lib = open_library(name).map_err(|e| {
            log::debug!("dlopen {} failed: {}", name, e);
            IxmlError::LibraryNotFound(name)
        })?;

        let symbols = unsafe { SymbolTable::resolve(&lib)? };
        log::debug!("loaded {} with all symbols resolved", name);

        Ok(Self { lib, symbols })
    }

    /// Access the resolved symbol table.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Close the library handle.
    pub fn unload(self) -> Result<()> {
        self.lib
            .close()
            .map_err(|e| IxmlError::UnloadFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;
    use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

    #[test]
    fn test_unresolved_entries_return_unknown() {
        let table = SymbolTable::unresolved();
        unsafe {
            assert_eq!(table.init(), NVML_ERROR_UNKNOWN);
            assert_eq!(table.shutdown(), NVML_ERROR_UNKNOWN);
            assert_eq!(
                table.device_get_handle_by_index(0, ptr::null_mut()),
                NVML_ERROR_UNKNOWN
            );
            assert_eq!(
                table.device_get_temperature(ptr::null_mut(), NVML_TEMPERATURE_GPU, ptr::null_mut()),
                NVML_ERROR_UNKNOWN
            );
        }
    }

    #[test]
    fn test_unresolved_entries_do_not_touch_outputs() {
        let table = SymbolTable::unresolved();

        let mut count: c_uint = 42;
        let mut memory = RawMemory {
            total: 7,
            free: 8,
            used: 9,
        };
        let mut util = RawUtilization { gpu: 11, memory: 12 };

        unsafe {
            assert_eq!(table.device_get_count(&mut count), NVML_ERROR_UNKNOWN);
            assert_eq!(
                table.device_get_memory_info(ptr::null_mut(), &mut memory),
                NVML_ERROR_UNKNOWN
            );
            assert_eq!(
                table.device_get_utilization_rates(ptr::null_mut(), &mut util),
                NVML_ERROR_UNKNOWN
            );
        }

        assert_eq!(count, 42);
        assert_eq!(memory.total, 7);
        assert_eq!(util.gpu, 11);
    }

    #[test]
    fn test_open_missing_library() {
        let err = LibIxml::open("libixml-test-does-not-exist.so").unwrap_err();
        assert!(matches!(err, IxmlError::LibraryNotFound(_)));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_resolve_missing_symbol() {
        // libm opens fine but exports none of the IXML symbols, so
        // resolution must fail fast on the very first entry.
        let err = LibIxml::open("libm.so.6").unwrap_err();
        assert!(matches!(err, IxmlError::SymbolNotFound(SYM_INIT)));
    }

    // Stub exports recording their arguments, standing in for a real
    // libixml.so.
    static COUNT_CALLS: AtomicU32 = AtomicU32::new(0);
    static SEEN_SENSOR: AtomicU32 = AtomicU32::new(u32::MAX);
    static SEEN_DEVICE: AtomicU64 = AtomicU64::new(0);

    unsafe extern "C" fn stub_device_get_count(count: *mut c_uint) -> IxmlReturn {
        COUNT_CALLS.fetch_add(1, Ordering::SeqCst);
        *count = 2;
        NVML_SUCCESS
    }

    unsafe extern "C" fn stub_device_get_temperature(
        device: RawDevice,
        sensor_type: c_uint,
        temp: *mut c_uint,
    ) -> IxmlReturn {
        SEEN_DEVICE.store(device as u64, Ordering::SeqCst);
        SEEN_SENSOR.store(sensor_type, Ordering::SeqCst);
        *temp = 61;
        NVML_SUCCESS
    }

    unsafe extern "C" fn stub_device_get_fan_speed(
        _device: RawDevice,
        _speed: *mut c_uint,
    ) -> IxmlReturn {
        NVML_ERROR_NOT_SUPPORTED
    }

    #[test]
    fn test_forwarding_invokes_bound_function_verbatim() {
        let mut table = SymbolTable::unresolved();
        table.device_get_count = Some(stub_device_get_count);
        table.device_get_temperature = Some(stub_device_get_temperature);
        table.device_get_fan_speed = Some(stub_device_get_fan_speed);

        let mut count: c_uint = 0;
        let mut temp: c_uint = 0;
        let mut speed: c_uint = 77;
        let device = 0xD5u64 as RawDevice;

        unsafe {
            assert_eq!(table.device_get_count(&mut count), NVML_SUCCESS);
            assert_eq!(
                table.device_get_temperature(device, NVML_TEMPERATURE_GPU, &mut temp),
                NVML_SUCCESS
            );
            // Statuses from the library cross unchanged.
            assert_eq!(
                table.device_get_fan_speed(device, &mut speed),
                NVML_ERROR_NOT_SUPPORTED
            );
        }

        assert_eq!(count, 2);
        assert_eq!(temp, 61);
        // The failing stub never wrote through its output pointer.
        assert_eq!(speed, 77);
        assert_eq!(COUNT_CALLS.load(Ordering::SeqCst), 1);
        assert_eq!(SEEN_SENSOR.load(Ordering::SeqCst), NVML_TEMPERATURE_GPU);
        assert_eq!(SEEN_DEVICE.load(Ordering::SeqCst), 0xD5);
    }

    #[test]
    #[ignore = "Requires Iluvatar GPU driver"]
    fn test_load_and_unload_real_library() {
        let lib = LibIxml::load().unwrap();
        lib.unload().unwrap();
    }
}

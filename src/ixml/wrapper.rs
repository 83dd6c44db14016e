//! IXML manager implementation
//!
//! Owns the loaded library for its whole lifetime and provides
//! initialization, shutdown, and device discovery on top of the raw
//! binding table.

use std::ffi::CString;
use std::os::raw::{c_char, c_int, c_uint};
use std::ptr;

use crate::error::{check, IxmlError, Result};
use crate::ixml::device::IxmlDevice;
use crate::ixml::traits::GpuManager;
use crate::sys::dl::LibIxml;
use crate::sys::types::*;

/// Handle to an initialized IXML session.
///
/// `init` loads `libixml.so` and calls `nvmlInit`; `shutdown` calls
/// `nvmlShutdown` and closes the library. Devices borrow the session,
/// so no telemetry call can outlive it.
pub struct Ixml {
    lib: LibIxml,
}

impl Ixml {
    /// Load the vendor library and initialize it.
    pub fn init() -> Result<Self> {
        let lib = LibIxml::load()?;
        check(SYM_INIT, unsafe { lib.symbols().init() })?;
        log::debug!("IXML initialized");
        Ok(Self { lib })
    }

    /// Shut the library down and release the handle.
    pub fn shutdown(self) -> Result<()> {
        check(SYM_SHUTDOWN, unsafe { self.lib.symbols().shutdown() })?;
        self.lib.unload()
    }

}

/// Format the packed CUDA driver version as "major.minor".
pub(crate) fn format_cuda_version(version: c_int) -> String {
    let major = version / 1000;
    let minor = version % 1000 / 10;
    format!("{}.{}", major, minor)
}

impl GpuManager for Ixml {
    type Device<'a>
        = IxmlDevice<'a>
    where
        Self: 'a;

    fn device_count(&self) -> Result<u32> {
        let mut count: c_uint = 0;
        check(SYM_DEVICE_GET_COUNT, unsafe {
            self.lib.symbols().device_get_count(&mut count)
        })?;
        Ok(count)
    }

    fn device_by_index(&self, index: u32) -> Result<IxmlDevice<'_>> {
        let mut raw: RawDevice = ptr::null_mut();
        let ret = unsafe {
            self.lib
                .symbols()
                .device_get_handle_by_index(index, &mut raw)
        };
        match ret {
            NVML_SUCCESS => Ok(IxmlDevice::new(&self.lib, raw)),
            NVML_ERROR_NOT_FOUND => Err(IxmlError::DeviceNotFound(index)),
            code => Err(IxmlError::Api {
                call: SYM_DEVICE_GET_HANDLE_BY_INDEX,
                code,
            }),
        }
    }

    fn device_by_uuid(&self, uuid: &str) -> Result<IxmlDevice<'_>> {
        let uuid_c = CString::new(uuid)
            .map_err(|_| IxmlError::InvalidArgument(format!("UUID contains NUL: {:?}", uuid)))?;

        let mut raw: RawDevice = ptr::null_mut();
        let ret = unsafe {
            self.lib
                .symbols()
                .device_get_handle_by_uuid(uuid_c.as_ptr(), &mut raw)
        };
        match ret {
            NVML_SUCCESS => Ok(IxmlDevice::new(&self.lib, raw)),
            NVML_ERROR_NOT_FOUND => Err(IxmlError::DeviceNotFoundByUuid(uuid.to_string())),
            code => Err(IxmlError::Api {
                call: SYM_DEVICE_GET_HANDLE_BY_UUID,
                code,
            }),
        }
    }

    fn driver_version(&self) -> Result<String> {
        let mut buf = [0 as c_char; SYSTEM_DRIVER_VERSION_BUFFER_SIZE];
        check(SYM_SYSTEM_GET_DRIVER_VERSION, unsafe {
            self.lib
                .symbols()
                .system_get_driver_version(buf.as_mut_ptr(), buf.len() as c_uint)
        })?;
        Ok(buf_to_string(&buf))
    }

    fn cuda_version(&self) -> Result<String> {
        let mut version: c_int = 0;
        check(SYM_SYSTEM_GET_CUDA_DRIVER_VERSION, unsafe {
            self.lib
                .symbols()
                .system_get_cuda_driver_version(&mut version)
        })?;
        Ok(format_cuda_version(version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cuda_version() {
        assert_eq!(format_cuda_version(11040), "11.4");
        assert_eq!(format_cuda_version(10020), "10.2");
        assert_eq!(format_cuda_version(12000), "12.0");
    }

    // Anything past construction needs the vendor driver.

    #[test]
    #[ignore = "Requires Iluvatar GPU driver"]
    fn test_init_and_shutdown() {
        let ixml = Ixml::init().unwrap();
        assert!(ixml.device_count().is_ok());
        ixml.shutdown().unwrap();
    }
}

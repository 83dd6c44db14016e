//! List command implementation
//!
//! Lists all detected Iluvatar GPUs.

use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, GpuList};
use crate::domain::DeviceInfo;
use crate::error::Result;
use crate::ixml::{GpuDevice, GpuManager};

/// Execute the list command
pub fn run_list<M: GpuManager>(manager: &M, format: OutputFormat) -> Result<()> {
    let driver_version = manager.driver_version()?;
    let count = manager.device_count()?;

    let mut gpus = Vec::with_capacity(count as usize);

    for i in 0..count {
        let device = manager.device_by_index(i)?;
        gpus.push(DeviceInfo {
            index: i,
            name: device.name()?,
            uuid: device.uuid()?,
        });
    }

    let gpu_list = GpuList {
        gpus,
        driver_version,
    };

    print_output(&gpu_list, format)?;

    Ok(())
}

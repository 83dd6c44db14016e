//! Info command implementation
//!
//! Shows a telemetry snapshot for one GPU or all of them.

use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, DeviceReport};
use crate::error::Result;
use crate::ixml::{GpuDevice, GpuManager};

/// Execute the info command
pub fn run_info<M: GpuManager>(
    manager: &M,
    format: OutputFormat,
    gpu_index: Option<u32>,
    gpu_uuid: Option<&str>,
) -> Result<()> {
    if let Some(uuid) = gpu_uuid {
        let device = manager.device_by_uuid(uuid)?;
        let report = report_for(&device)?;
        print_output(&report, format)?;
        return Ok(());
    }

    let indices: Vec<u32> = match gpu_index {
        Some(idx) => vec![idx],
        None => (0..manager.device_count()?).collect(),
    };

    for idx in indices {
        let device = manager.device_by_index(idx)?;
        let report = report_for(&device)?;
        print_output(&report, format)?;
    }

    Ok(())
}

/// Identity must resolve; individual sensors a board does not support
/// are reported as absent.
fn report_for<D: GpuDevice>(device: &D) -> Result<DeviceReport> {
    Ok(DeviceReport {
        index: device.index()?,
        name: device.name()?,
        uuid: device.uuid()?,
        pci_bus_id: device.pci_info().ok().map(|pci| pci.bus_id),
        temperature_c: device.temperature().ok(),
        fan_speed_pct: device.fan_speed().ok(),
        power_usage_mw: device.power_usage().ok(),
        memory: device.memory_info().ok(),
        clocks: device.clock_info().ok(),
        utilization: device.utilization().ok(),
    })
}

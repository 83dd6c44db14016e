//! Output formatting utilities
//!
//! Table, JSON, and compact output for CLI commands.

use crate::cli::args::OutputFormat;
use crate::domain::{ClockInfo, DeviceInfo, MemoryInfo, Utilization};
use serde::Serialize;
use std::io::{self, Write};

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().replace('\n', " | ")
    }
}

impl TableDisplay for DeviceInfo {
    fn to_table(&self) -> String {
        format!("[{}] {} (UUID: {})", self.index, self.name, self.uuid)
    }

    fn to_compact(&self) -> String {
        format!("{}:{}", self.index, self.name)
    }
}

/// GPU list for display
#[derive(Debug, Clone, Serialize)]
pub struct GpuList {
    pub gpus: Vec<DeviceInfo>,
    pub driver_version: String,
}

impl TableDisplay for GpuList {
    fn to_table(&self) -> String {
        let mut output = format!("Driver Version: {}\n", self.driver_version);
        output.push_str(&format!("GPUs Found: {}\n\n", self.gpus.len()));

        for gpu in &self.gpus {
            output.push_str(&gpu.to_table());
            output.push('\n');
        }

        output
    }

    fn to_compact(&self) -> String {
        self.gpus
            .iter()
            .map(|g| g.to_compact())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Telemetry snapshot of one GPU for display
///
/// Identity fields are required; sensors a board does not support are
/// omitted rather than failing the whole report.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceReport {
    pub index: u32,
    pub name: String,
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pci_bus_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_speed_pct: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_usage_mw: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clocks: Option<ClockInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utilization: Option<Utilization>,
}

impl TableDisplay for DeviceReport {
    fn to_table(&self) -> String {
        let mut output = format!("[{}] {}\n", self.index, self.name);
        output.push_str(&format!("  UUID:        {}\n", self.uuid));

        if let Some(bus_id) = &self.pci_bus_id {
            output.push_str(&format!("  PCI Bus:     {}\n", bus_id));
        }
        if let Some(temp) = self.temperature_c {
            output.push_str(&format!("  Temperature: {} C\n", temp));
        }
        if let Some(speed) = self.fan_speed_pct {
            output.push_str(&format!("  Fan Speed:   {}%\n", speed));
        }
        if let Some(mw) = self.power_usage_mw {
            output.push_str(&format!("  Power Usage: {:.1} W\n", mw as f64 / 1000.0));
        }
        if let Some(memory) = &self.memory {
            output.push_str(&format!("  Memory:      {}\n", memory));
        }
        if let Some(clocks) = &self.clocks {
            output.push_str(&format!("  Clocks:      {}\n", clocks));
        }
        if let Some(util) = &self.utilization {
            output.push_str(&format!("  Utilization: {}\n", util));
        }

        output
    }

    fn to_compact(&self) -> String {
        format!(
            "{}:{} temp={} fan={} power={}",
            self.index,
            self.name,
            self.temperature_c
                .map_or_else(|| "-".to_string(), |t| t.to_string()),
            self.fan_speed_pct
                .map_or_else(|| "-".to_string(), |s| format!("{}%", s)),
            self.power_usage_mw
                .map_or_else(|| "-".to_string(), |p| format!("{:.1}W", p as f64 / 1000.0)),
        )
    }
}

/// Driver and CUDA version info for display
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub driver_version: String,
    pub cuda_version: String,
}

impl TableDisplay for VersionInfo {
    fn to_table(&self) -> String {
        format!(
            "Driver Version: {}\nCUDA Version:   {}",
            self.driver_version, self.cuda_version
        )
    }

    fn to_compact(&self) -> String {
        format!("driver={} cuda={}", self.driver_version, self.cuda_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> DeviceReport {
        DeviceReport {
            index: 0,
            name: "Iluvatar BI-V100".to_string(),
            uuid: "GPU-0000".to_string(),
            pci_bus_id: Some("00000000:01:00.0".to_string()),
            temperature_c: Some(45),
            fan_speed_pct: Some(30),
            power_usage_mw: Some(150_500),
            memory: Some(MemoryInfo {
                total: 32768,
                used: 1024,
                free: 31744,
            }),
            clocks: Some(ClockInfo { sm: 1500, mem: 1200 }),
            utilization: Some(Utilization { gpu: 10, mem: 4 }),
        }
    }

    #[test]
    fn test_device_report_table() {
        let table = sample_report().to_table();
        assert!(table.contains("[0] Iluvatar BI-V100"));
        assert!(table.contains("Temperature: 45 C"));
        assert!(table.contains("Power Usage: 150.5 W"));
        assert!(table.contains("1024/32768 MiB"));
    }

    #[test]
    fn test_device_report_table_skips_missing_sensors() {
        let mut report = sample_report();
        report.fan_speed_pct = None;
        report.power_usage_mw = None;

        let table = report.to_table();
        assert!(!table.contains("Fan Speed"));
        assert!(!table.contains("Power Usage"));
        assert!(table.contains("Temperature"));
    }

    #[test]
    fn test_device_report_json_omits_none() {
        let mut report = sample_report();
        report.clocks = None;

        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("clocks"));
        assert!(json.contains("\"temperature_c\":45"));
    }

    #[test]
    fn test_gpu_list_table() {
        let list = GpuList {
            gpus: vec![
                DeviceInfo {
                    index: 0,
                    name: "GPU A".to_string(),
                    uuid: "GPU-A".to_string(),
                },
                DeviceInfo {
                    index: 1,
                    name: "GPU B".to_string(),
                    uuid: "GPU-B".to_string(),
                },
            ],
            driver_version: "3.2.0".to_string(),
        };

        let table = list.to_table();
        assert!(table.contains("Driver Version: 3.2.0"));
        assert!(table.contains("GPUs Found: 2"));
        assert!(table.contains("[1] GPU B (UUID: GPU-B)"));
        assert_eq!(list.to_compact(), "0:GPU A, 1:GPU B");
    }

    #[test]
    fn test_version_info_table() {
        let version = VersionInfo {
            driver_version: "3.2.0".to_string(),
            cuda_version: "10.2".to_string(),
        };
        assert!(version.to_table().contains("CUDA Version:   10.2"));
    }
}

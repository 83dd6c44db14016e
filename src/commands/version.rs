//! Version command implementation
//!
//! Shows driver and CUDA versions reported by the library.

use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, VersionInfo};
use crate::error::Result;
use crate::ixml::GpuManager;

/// Execute the version command
pub fn run_version<M: GpuManager>(manager: &M, format: OutputFormat) -> Result<()> {
    let version = VersionInfo {
        driver_version: manager.driver_version()?,
        cuda_version: manager.cuda_version()?,
    };

    print_output(&version, format)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockManager;

    #[test]
    fn test_run_version_with_mock() {
        let manager = MockManager::new(1);
        assert!(run_version(&manager, OutputFormat::Table).is_ok());
    }
}

/*!
 * Device and operating system information used to seed default tags.
 *
 * Never includes hostname or username.
 */

/// Source of the `OS version` and `Device model` default tags.
pub trait DeviceInfo: Send + Sync {
    fn os_version(&self) -> Option<String>;
    fn device_model(&self) -> Option<String>;
}

/// Reads what the running system exposes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInfo;

impl DeviceInfo for SystemInfo {
    /// `"<os> <kernel release>"`, or just the OS name when the release is unreadable.
    fn os_version(&self) -> Option<String> {
        let os = std::env::consts::OS;
        match read_trimmed("/proc/sys/kernel/osrelease") {
            Some(release) => Some(format!("{os} {release}")),
            None => Some(os.to_string()),
        }
    }

    /// DMI product name where available, otherwise the CPU architecture.
    fn device_model(&self) -> Option<String> {
        read_trimmed("/sys/devices/virtual/dmi/id/product_name")
            .or_else(|| Some(std::env::consts::ARCH.to_string()))
    }
}

fn read_trimmed(path: &str) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_info_is_never_empty() {
        let info = SystemInfo;
        let os = info.os_version().unwrap();
        assert!(os.starts_with(std::env::consts::OS));
        assert!(!info.device_model().unwrap().is_empty());
    }
}

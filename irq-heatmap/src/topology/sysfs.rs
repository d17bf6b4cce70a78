//! sysfs readers for CPU and NUMA topology
//!
//! Everything is resolved relative to a configurable root so discovery can
//! run against a synthetic tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use super::cpuset::{CpuSet, SIBLING_SOURCES};
use crate::domain::{CpuId, DiscoveryError};

/// Location of the sysfs mount
#[derive(Debug, Clone)]
pub struct SysFs {
    root: PathBuf,
}

impl Default for SysFs {
    fn default() -> Self {
        Self::new("/sys")
    }
}

impl SysFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn cpu_dir(&self) -> PathBuf {
        self.root.join("devices/system/cpu")
    }

    #[must_use]
    pub fn node_dir(&self) -> PathBuf {
        self.root.join("devices/system/node")
    }

    /// `cpuN/topology/<name>`
    #[must_use]
    pub fn topology_file(&self, cpu: CpuId, name: &str) -> PathBuf {
        self.cpu_dir().join(format!("cpu{}", cpu.0)).join("topology").join(name)
    }

    /// Highest `nodeN` directory, or `None` when the kernel exposes no NUMA nodes
    pub fn max_numa_node(&self) -> Result<Option<usize>, DiscoveryError> {
        let dir = self.node_dir();
        match max_numbered_entry(&dir, "node") {
            Ok(max) => Ok(max),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(DiscoveryError::Read { path: dir, source }),
        }
    }

    /// Number of configured CPUs, including present but offline ones
    pub fn configured_cpu_count(&self) -> Result<usize, DiscoveryError> {
        let dir = self.cpu_dir();
        match max_numbered_entry(&dir, "cpu") {
            Ok(Some(max)) => Ok(max + 1),
            Ok(None) => Err(DiscoveryError::NoCpus(dir)),
            Err(source) => Err(DiscoveryError::Read { path: dir, source }),
        }
    }

    /// Read a plain integer topology attribute such as `physical_package_id`
    pub fn read_integer(&self, cpu: CpuId, name: &str) -> Result<u32, DiscoveryError> {
        let path = self.topology_file(cpu, name);
        let content = fs::read_to_string(&path).map_err(|source| DiscoveryError::Read {
            path: path.clone(),
            source,
        })?;
        let value = content.trim();
        value.parse().map_err(|_| DiscoveryError::Parse {
            path,
            content: value.to_string(),
        })
    }

    /// Read the thread sibling set of `cpu` from the first sibling file present
    pub fn read_siblings(&self, cpu: CpuId) -> Result<CpuSet, DiscoveryError> {
        for sibling in SIBLING_SOURCES {
            let path = self.topology_file(cpu, sibling.file);
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(DiscoveryError::Read { path, source }),
            };

            let Some(set) = sibling.format.parse(&content) else {
                return Err(DiscoveryError::Parse {
                    path,
                    content: content.trim().to_string(),
                });
            };
            debug!(
                "{cpu} siblings from {} ({}): {} cpus",
                sibling.file,
                sibling.format.name(),
                set.len()
            );
            return Ok(set);
        }

        Err(DiscoveryError::NoSiblingSet(cpu))
    }
}

/// Largest N among entries of `dir` named `<prefix>N`
fn max_numbered_entry(dir: &Path, prefix: &str) -> io::Result<Option<usize>> {
    let mut max = None;
    for entry in fs::read_dir(dir)?.flatten() {
        let name = entry.file_name();
        let Some(number) = name.to_str().and_then(|n| n.strip_prefix(prefix)) else {
            continue;
        };
        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        if let Ok(n) = number.parse::<usize>() {
            max = Some(max.map_or(n, |m: usize| m.max(n)));
        }
    }
    Ok(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_max_numbered_entry_ignores_other_names() {
        let dir = TempDir::new().unwrap();
        let cpu = dir.path().join("devices/system/cpu");
        for name in ["cpu0", "cpu1", "cpu11", "cpufreq", "cpuidle", "online"] {
            fs::create_dir_all(cpu.join(name)).unwrap();
        }
        let sysfs = SysFs::new(dir.path());
        assert_eq!(sysfs.configured_cpu_count().unwrap(), 12);
    }

    #[test]
    fn test_missing_node_dir_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let sysfs = SysFs::new(dir.path());
        assert_eq!(sysfs.max_numa_node().unwrap(), None);
    }

    #[test]
    fn test_read_integer_trims_newline() {
        let dir = TempDir::new().unwrap();
        let file = "devices/system/cpu/cpu3/topology/core_id";
        write(dir.path(), file, "17\n");
        let sysfs = SysFs::new(dir.path());
        assert_eq!(sysfs.read_integer(CpuId(3), "core_id").unwrap(), 17);
    }

    #[test]
    fn test_read_integer_missing_file() {
        let dir = TempDir::new().unwrap();
        let sysfs = SysFs::new(dir.path());
        let err = sysfs.read_integer(CpuId(0), "core_id").unwrap_err();
        assert!(matches!(err, DiscoveryError::Read { .. }));
    }

    #[test]
    fn test_read_siblings_falls_back_to_mask() {
        let dir = TempDir::new().unwrap();
        let file = "devices/system/cpu/cpu1/topology/thread_siblings";
        write(dir.path(), file, "00000022\n");
        let sysfs = SysFs::new(dir.path());
        let set = sysfs.read_siblings(CpuId(1)).unwrap();
        assert!(set.contains(CpuId(1)));
        assert!(set.contains(CpuId(5)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_read_siblings_none_present() {
        let dir = TempDir::new().unwrap();
        let sysfs = SysFs::new(dir.path());
        let err = sysfs.read_siblings(CpuId(0)).unwrap_err();
        assert!(matches!(err, DiscoveryError::NoSiblingSet(CpuId(0))));
    }
}

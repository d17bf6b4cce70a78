//! Synthetic `/sys` and `/proc` trees

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use irq_heatmap::gather::ProcFs;
use irq_heatmap::topology::SysFs;

/// How a CPU's sibling set is exposed
#[derive(Clone, Copy)]
pub enum Siblings {
    List(&'static str),
    Mask(&'static str),
}

pub struct FakeCpu {
    pub package: u32,
    pub core_id: u32,
    pub siblings: Siblings,
}

impl FakeCpu {
    /// Siblings published as `thread_siblings_list`
    pub fn list(package: u32, core_id: u32, siblings: &'static str) -> Self {
        let siblings = Siblings::List(siblings);
        Self {
            package,
            core_id,
            siblings,
        }
    }

    /// Siblings published only as the `thread_siblings` mask
    pub fn mask(package: u32, core_id: u32, siblings: &'static str) -> Self {
        let siblings = Siblings::Mask(siblings);
        Self {
            package,
            core_id,
            siblings,
        }
    }
}

pub struct Machine {
    pub dir: TempDir,
}

impl Machine {
    pub fn new(nodes: usize, cpus: &[FakeCpu]) -> Self {
        let dir = TempDir::new().unwrap();
        let sys = dir.path().join("sys/devices/system");

        for node in 0..nodes {
            fs::create_dir_all(sys.join(format!("node/node{node}"))).unwrap();
        }
        fs::create_dir_all(sys.join("cpu/cpufreq")).unwrap();
        for (id, cpu) in cpus.iter().enumerate() {
            let topo = sys.join(format!("cpu/cpu{id}/topology"));
            write(&topo, "physical_package_id", &format!("{}\n", cpu.package));
            write(&topo, "core_id", &format!("{}\n", cpu.core_id));
            match cpu.siblings {
                Siblings::List(list) => write(&topo, "thread_siblings_list", list),
                Siblings::Mask(mask) => write(&topo, "thread_siblings", mask),
            }
        }

        Self { dir }
    }

    /// Socket 0: two hyperthreaded cores (0/2, 1/3) using sibling lists.
    /// Socket 1: two single-thread cores (4, 5) using sibling masks.
    pub fn asymmetric() -> Self {
        Self::new(
            2,
            &[
                FakeCpu::list(0, 0, "0,2"),
                FakeCpu::list(0, 1, "1,3"),
                FakeCpu::list(0, 0, "0,2"),
                FakeCpu::list(0, 1, "1,3"),
                FakeCpu::mask(1, 0, "00000010"),
                FakeCpu::mask(1, 1, "00000020"),
            ],
        )
    }

    pub fn sysfs(&self) -> SysFs {
        SysFs::new(self.dir.path().join("sys"))
    }

    pub fn procfs(&self) -> ProcFs {
        ProcFs::new(self.dir.path().join("proc"))
    }

    pub fn write_proc(&self, rel: &str, content: &str) {
        write(&self.dir.path().join("proc"), rel, content);
    }

    pub fn remove_proc(&self, rel: &str) {
        fs::remove_file(self.dir.path().join("proc").join(rel)).unwrap();
    }
}

pub fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// `/proc/interrupts` for six CPUs with the given NMI counts
pub fn interrupts(nmi: [u64; 6]) -> String {
    let mut table = String::from("    ");
    for cpu in 0..6 {
        table.push_str(&format!("{:>11}", format!("CPU{cpu}")));
    }
    table.push_str("\n  0:");
    for value in [36, 0, 0, 0, 0, 0] {
        table.push_str(&format!(" {value:>10}"));
    }
    table.push_str("   IO-APIC   2-edge      timer\nNMI:");
    for value in nmi {
        table.push_str(&format!(" {value:>10}"));
    }
    table.push_str("   Non-maskable interrupts\n");
    table
}

/// Drop every `ESC[...m` sequence
pub fn strip_ansi(text: &str) -> String {
    let mut out = String::new();
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

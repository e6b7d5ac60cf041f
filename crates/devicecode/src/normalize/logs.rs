//! Fact extraction from boot logs and console dumps.
//!
//! Every matcher scans the whole text independently and reports all of its
//! matches; the order in which matchers run does not matter.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Root filesystems recognized on kernel command lines.
const ROOT_FILESYSTEMS: &[&str] = &[
    "squashfs", "jffs2", "ext2", "ext3", "ext4", "ubifs", "cramfs", "yaffs2", "romfs", "ramfs",
    "tmpfs",
];

/// A typed fact found in free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "fact", rename_all = "snake_case")]
pub enum LogFact {
    Package { name: String, version: Option<String> },
    Bootloader { name: String, version: Option<String> },
    BuildDate(String),
    KernelCommandLine(String),
    SerialConsole { console: String, baud_rate: u32 },
    RootFs(String),
    RootDevice(String),
    Init(String),
    Board(String),
    Partition(String),
    Nand { manufacturer: String, model: String },
    ModuleLicense { module: String, license: String },
}

/// One known log producer signature.
pub trait LogMatcher: Send + Sync {
    /// Name for diagnostics.
    fn name(&self) -> &'static str;

    /// Append every fact found in `text`.
    fn scan(&self, text: &str, facts: &mut Vec<LogFact>);
}

// =============================================================================
// Version banners
// =============================================================================

/// Banner of the form `<producer> <version>` captured by one regex.
struct BannerMatcher {
    name: &'static str,
    package: &'static str,
    bootloader: bool,
    pattern: &'static Lazy<Regex>,
}

static BUSYBOX: Lazy<Regex> = Lazy::new(|| Regex::new(r"BusyBox v(\d+\.\d+(?:\.\d+)?)").unwrap());
static IPTABLES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"iptables v(\d+\.\d+(?:\.\d+)*)").unwrap());
static DROPBEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)dropbear(?: sshd?| ssh server)? v(\d{4}\.\d+)").unwrap());
static CFE: Lazy<Regex> = Lazy::new(|| Regex::new(r"CFE version ([\w.\-]+)").unwrap());
static UBOOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"U-Boot (\d{1,4}\.[\w.\-]+)").unwrap());
static RALINK_UBOOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Ralink UBoot Version: ([\d.]+)").unwrap());
static SQUASHFS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"squashfs: version (\d+\.\d+)").unwrap());

impl LogMatcher for BannerMatcher {
    fn name(&self) -> &'static str {
        self.name
    }

    fn scan(&self, text: &str, facts: &mut Vec<LogFact>) {
        for caps in self.pattern.captures_iter(text) {
            let version = caps.get(1).map(|m| m.as_str().to_string());
            let fact = if self.bootloader {
                LogFact::Bootloader {
                    name: self.package.to_string(),
                    version,
                }
            } else {
                LogFact::Package {
                    name: self.package.to_string(),
                    version,
                }
            };
            if !facts.contains(&fact) {
                facts.push(fact);
            }
        }
    }
}

// =============================================================================
// Linux kernel
// =============================================================================

static LINUX_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Linux version (\d+\.\d+[\w.\-+]*)").unwrap());
static BUILD_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"Linux version .*#\d+(?:\s+(?:SMP|PREEMPT|RT))*\s+(\w{3}\s+\w{3}\s+\d{1,2}\s+\d{2}:\d{2}:\d{2}\s+(?:[A-Z]{2,5}\s+)?\d{4})",
    )
    .unwrap()
});

/// `Linux version` banner: kernel version and build date.
struct LinuxVersionMatcher;

impl LogMatcher for LinuxVersionMatcher {
    fn name(&self) -> &'static str {
        "linux_version"
    }

    fn scan(&self, text: &str, facts: &mut Vec<LogFact>) {
        for caps in LINUX_VERSION.captures_iter(text) {
            let fact = LogFact::Package {
                name: "linux".to_string(),
                version: Some(caps[1].to_string()),
            };
            if !facts.contains(&fact) {
                facts.push(fact);
            }
        }
        for caps in BUILD_DATE.captures_iter(text) {
            let date = caps[1].split_whitespace().collect::<Vec<_>>().join(" ");
            let fact = LogFact::BuildDate(date);
            if !facts.contains(&fact) {
                facts.push(fact);
            }
        }
    }
}

static CMDLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Kernel command line:\s*(.*)").unwrap());
static CONSOLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(tty\w+),(\d+)").unwrap());
static MTDPART_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([\w.\-]+)\)").unwrap());

/// `Kernel command line:` and the parameters on it.
struct CommandLineMatcher;

impl LogMatcher for CommandLineMatcher {
    fn name(&self) -> &'static str {
        "kernel_command_line"
    }

    fn scan(&self, text: &str, facts: &mut Vec<LogFact>) {
        for caps in CMDLINE.captures_iter(text) {
            let line = caps[1].trim();
            if line.is_empty() {
                continue;
            }
            facts.push(LogFact::KernelCommandLine(line.to_string()));

            for param in line.split_whitespace() {
                let Some((key, value)) = param.split_once('=') else {
                    continue;
                };
                match key {
                    "console" => {
                        if let Some(c) = CONSOLE.captures(value) {
                            if let Ok(baud_rate) = c[2].parse() {
                                facts.push(LogFact::SerialConsole {
                                    console: c[1].to_string(),
                                    baud_rate,
                                });
                            }
                        }
                    }
                    "rootfstype" => {
                        for fs in value.split(',') {
                            if ROOT_FILESYSTEMS.contains(&fs) {
                                facts.push(LogFact::RootFs(fs.to_string()));
                            }
                        }
                    }
                    "root" => facts.push(LogFact::RootDevice(value.to_string())),
                    "init" => facts.push(LogFact::Init(value.to_string())),
                    "board" => facts.push(LogFact::Board(value.to_string())),
                    "mtdparts" => {
                        for name in MTDPART_NAME.captures_iter(value) {
                            facts.push(LogFact::Partition(name[1].to_string()));
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}

static NAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"NAND device: Manufacturer ID: 0x[0-9a-fA-F]{2}, Chip ID: 0x[0-9a-fA-F]{2} \(([\w\s]+?) (NAND [^)]+)\)")
        .unwrap()
});

/// NAND flash identification by the MTD layer.
struct NandMatcher;

impl LogMatcher for NandMatcher {
    fn name(&self) -> &'static str {
        "nand"
    }

    fn scan(&self, text: &str, facts: &mut Vec<LogFact>) {
        for caps in NAND.captures_iter(text) {
            facts.push(LogFact::Nand {
                manufacturer: caps[1].trim().to_string(),
                model: caps[2].trim().to_string(),
            });
        }
    }
}

static MODULE_LICENSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+): module license '([^']+)' taints kernel").unwrap());

/// Kernel modules that taint the kernel with their license.
struct ModuleLicenseMatcher;

impl LogMatcher for ModuleLicenseMatcher {
    fn name(&self) -> &'static str {
        "module_license"
    }

    fn scan(&self, text: &str, facts: &mut Vec<LogFact>) {
        for caps in MODULE_LICENSE.captures_iter(text) {
            let fact = LogFact::ModuleLicense {
                module: caps[1].to_string(),
                license: caps[2].to_string(),
            };
            if !facts.contains(&fact) {
                facts.push(fact);
            }
        }
    }
}

// =============================================================================
// Miner
// =============================================================================

/// Runs every registered matcher over a text.
pub struct LogMiner {
    matchers: Vec<Box<dyn LogMatcher>>,
}

impl LogMiner {
    /// Create a miner with all built-in matchers.
    pub fn new() -> Self {
        Self {
            matchers: vec![
                Box::new(BannerMatcher {
                    name: "busybox",
                    package: "busybox",
                    bootloader: false,
                    pattern: &BUSYBOX,
                }),
                Box::new(BannerMatcher {
                    name: "iptables",
                    package: "iptables",
                    bootloader: false,
                    pattern: &IPTABLES,
                }),
                Box::new(BannerMatcher {
                    name: "dropbear",
                    package: "dropbear",
                    bootloader: false,
                    pattern: &DROPBEAR,
                }),
                Box::new(BannerMatcher {
                    name: "squashfs",
                    package: "squashfs",
                    bootloader: false,
                    pattern: &SQUASHFS,
                }),
                Box::new(BannerMatcher {
                    name: "cfe",
                    package: "CFE",
                    bootloader: true,
                    pattern: &CFE,
                }),
                Box::new(BannerMatcher {
                    name: "u-boot",
                    package: "U-Boot",
                    bootloader: true,
                    pattern: &UBOOT,
                }),
                Box::new(BannerMatcher {
                    name: "ralink-u-boot",
                    package: "U-Boot",
                    bootloader: true,
                    pattern: &RALINK_UBOOT,
                }),
                Box::new(LinuxVersionMatcher),
                Box::new(CommandLineMatcher),
                Box::new(NandMatcher),
                Box::new(ModuleLicenseMatcher),
            ],
        }
    }

    /// Add a custom matcher.
    pub fn with_matcher(mut self, matcher: impl LogMatcher + 'static) -> Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    /// Run all matchers and collect their facts.
    pub fn mine(&self, text: &str) -> Vec<LogFact> {
        let mut facts = Vec::new();
        for matcher in &self.matchers {
            let before = facts.len();
            matcher.scan(text, &mut facts);
            if facts.len() > before {
                tracing::trace!(matcher = matcher.name(), found = facts.len() - before, "log matcher fired");
            }
        }
        facts
    }

    pub fn matcher_count(&self) -> usize {
        self.matchers.len()
    }
}

impl Default for LogMiner {
    fn default() -> Self {
        Self::new()
    }
}

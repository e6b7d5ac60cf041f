//! Folding mined log facts and deriving flags.

use crate::device::{Bootloader, CanonicalDevice, ModuleLicense};
use crate::normalize::LogFact;

/// Operating systems that imply a flag of the same name.
const OS_FLAGS: &[&str] = &["linux", "android", "vxworks"];

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// Merge facts into the device. Declared infobox values win over mined ones.
pub fn apply_facts(device: &mut CanonicalDevice, facts: &[LogFact]) {
    let software = &mut device.software;
    for fact in facts {
        match fact {
            LogFact::Package { name, version } => software.add_package(name, version.clone()),
            LogFact::Bootloader { name, version } => match software.bootloader.as_mut() {
                None => {
                    software.bootloader = Some(Bootloader {
                        manufacturer: name.clone(),
                        version: version.clone(),
                        ..Default::default()
                    })
                }
                Some(existing) => {
                    if existing.manufacturer.eq_ignore_ascii_case(name) && existing.version.is_none() {
                        existing.version = version.clone();
                    }
                }
            },
            LogFact::BuildDate(date) => push_unique(&mut software.build_dates, date),
            LogFact::KernelCommandLine(line) => push_unique(&mut software.kernel_cmdline, line),
            LogFact::SerialConsole { baud_rate, .. } => {
                let serial = &mut device.connectivity.serial;
                if serial.baud_rate.is_none() {
                    serial.baud_rate = Some(*baud_rate);
                }
            }
            LogFact::RootFs(fs) => push_unique(&mut software.rootfs, fs),
            LogFact::Partition(name) => push_unique(&mut software.partitions, name),
            LogFact::Nand { manufacturer, model } => {
                push_unique(&mut software.nand, &format!("{} {}", manufacturer, model))
            }
            LogFact::ModuleLicense { module, license } => {
                let entry = ModuleLicense {
                    module: module.clone(),
                    license: license.clone(),
                };
                if !software.module_licenses.contains(&entry) {
                    software.module_licenses.push(entry);
                }
            }
            // kept on the raw command line
            LogFact::RootDevice(_) | LogFact::Init(_) | LogFact::Board(_) => {}
        }
    }
}

/// Flags implied by the rest of the record.
pub fn derive_flags(device: &mut CanonicalDevice) {
    if let Some(os) = &device.software.os {
        let os = os.to_lowercase();
        for flag in OS_FLAGS {
            if os.contains(flag) {
                device.flags.insert(flag.to_string());
            }
        }
    }
    if device.software.packages.iter().any(|p| p.name == "linux") {
        device.flags.insert("linux".to_string());
    }
    if device.device_types.iter().any(|t| t.to_lowercase().contains("voip")) {
        device.flags.insert("voip".to_string());
    }
}

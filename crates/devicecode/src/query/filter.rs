//! Query evaluation: AND across names, OR within a name.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::device::{CanonicalDevice, ChipCategory, ChipInfo, PasswordState, PortInfo, Tristate};
use crate::error::Result;

use super::field::{FilterField, FilterValue};
use super::lexer::tokenize;
use super::parser::{parse_statement, Statement};

/// One value of an OR group, with the side table of its statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub value: FilterValue,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub params: IndexMap<String, String>,
}

impl Predicate {
    fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// A parsed query: an AND of OR groups, one group per filter name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    groups: IndexMap<FilterField, Vec<Predicate>>,
}

impl Query {
    /// Parse a query string. Any malformed statement rejects the whole query.
    pub fn parse(input: &str) -> Result<Self> {
        let mut query = Query::default();
        for token in tokenize(input)? {
            query.push(parse_statement(&token)?);
        }
        Ok(query)
    }

    /// Add a statement to its name's OR group.
    pub fn push(&mut self, statement: Statement) {
        let group = self.groups.entry(statement.field).or_default();
        for value in statement.values {
            group.push(Predicate {
                value,
                params: statement.params.clone(),
            });
        }
    }

    /// An empty query matches everything.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> impl Iterator<Item = (&FilterField, &[Predicate])> {
        self.groups.iter().map(|(f, p)| (f, p.as_slice()))
    }

    /// Evaluate against one record, stopping at the first failing group.
    pub fn matches(&self, device: &CanonicalDevice) -> bool {
        self.groups.iter().all(|(field, predicates)| {
            let any = predicates.iter().any(|p| matches_one(*field, p, device));
            if field.is_negated() { !any } else { any }
        })
    }

    /// Records matching the query, in input order.
    pub fn filter<'d>(&self, devices: &'d [CanonicalDevice]) -> Vec<&'d CanonicalDevice> {
        devices.iter().filter(|d| self.matches(d)).collect()
    }
}

fn eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b
}

fn eq_opt(a: Option<&str>, b: &str) -> bool {
    a.is_some_and(|a| eq(a, b))
}

fn any_eq<'a>(mut values: impl Iterator<Item = &'a str>, b: &str) -> bool {
    values.any(|a| eq(a, b))
}

fn cpus(device: &CanonicalDevice) -> impl Iterator<Item = &ChipInfo> {
    device.chips_in(ChipCategory::Cpu)
}

/// A port statement: the presence must match, and for a present port the
/// `populated` parameter must match as well when given.
fn port_matches(port: &PortInfo, want: Tristate, predicate: &Predicate) -> bool {
    if port.present != want {
        return false;
    }
    match predicate.param("populated") {
        Some(populated) if port.present == Tristate::Yes => port.populated.label() == populated,
        _ => true,
    }
}

fn matches_one(field: FilterField, predicate: &Predicate, device: &CanonicalDevice) -> bool {
    let text = match &predicate.value {
        FilterValue::Text(t) => t.as_str(),
        FilterValue::Number(n) => {
            return field == FilterField::Baud && device.connectivity.serial.baud_rate == Some(*n);
        }
        FilterValue::Year(y) => return device.years().contains(y),
        FilterValue::Flag(want) => {
            let has = match field {
                FilterField::Cpe => !device.regulatory.cpe_ids.is_empty(),
                FilterField::Cve => !device.regulatory.cve_ids.is_empty(),
                _ => !device.regulatory.fcc_ids.is_empty(),
            };
            return has == *want;
        }
        FilterValue::Presence(want) => {
            let port = match field {
                FilterField::Jtag => &device.connectivity.jtag,
                _ => &device.connectivity.serial,
            };
            return port_matches(port, *want, predicate);
        }
        FilterValue::Origin(origin) => return device.origin == *origin,
    };

    match field {
        FilterField::Bootloader => device.software.bootloader.as_ref().is_some_and(|b| {
            eq(&b.manufacturer, text)
                && predicate
                    .param("version")
                    .is_none_or(|v| eq_opt(b.version.as_deref(), v))
        }),
        FilterField::Brand | FilterField::IgnoreBrand => eq(&device.identity.brand, text),
        FilterField::Chip => any_eq(cpus(device).map(|c| c.model.as_str()), text),
        FilterField::ChipType => any_eq(cpus(device).filter_map(|c| c.chip_type.as_deref()), text),
        FilterField::ChipVendor => any_eq(cpus(device).map(|c| c.manufacturer.as_str()), text),
        FilterField::Connector => eq_opt(device.connectivity.serial.connector.as_deref(), text),
        FilterField::CveId => any_eq(device.regulatory.cve_ids.iter().map(String::as_str), text),
        FilterField::FccId => device.regulatory.fcc_ids.iter().any(|f| {
            eq(&f.id, text) && predicate.param("type").is_none_or(|t| f.fcc_type.label() == t)
        }),
        FilterField::Flag => any_eq(device.flags.iter().map(String::as_str), text),
        FilterField::Odm | FilterField::IgnoreOdm => eq_opt(device.manufacturer.name.as_deref(), text),
        FilterField::Ip => eq_opt(device.credentials.ip.as_deref(), text),
        FilterField::Os => eq_opt(device.software.os.as_deref(), text),
        FilterField::Package => device.software.packages.iter().any(|p| {
            eq(&p.name, text)
                && predicate
                    .param("version")
                    .is_none_or(|v| eq_opt(p.version.as_deref(), v))
        }),
        FilterField::Partition => any_eq(device.software.partitions.iter().map(String::as_str), text),
        FilterField::Password => match &device.credentials.password {
            PasswordState::Present(p) => eq(p, text),
            _ => false,
        },
        FilterField::PcbId => eq_opt(device.regulatory.pcb_id.as_deref(), text),
        FilterField::Rootfs => any_eq(device.software.rootfs.iter().map(String::as_str), text),
        FilterField::Sdk => device.software.sdk.as_ref().is_some_and(|s| {
            eq(&s.name, text)
                && predicate
                    .param("version")
                    .is_none_or(|v| eq_opt(s.version.as_deref(), v))
        }),
        FilterField::Type => any_eq(device.device_types.iter().map(String::as_str), text),
        _ => false,
    }
}

//! Overlays: partial records layered onto stored devices at read time.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::device::CanonicalDevice;
use crate::error::{DeviceCodeError, Result};

/// Value of the `type` field that marks an overlay document.
pub const OVERLAY_TYPE: &str = "overlay";

/// A supplementary partial record.
///
/// `data` has the shape of a (partial) [`CanonicalDevice`]; composing it
/// never changes the stored base record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    #[serde(rename = "type")]
    pub kind: String,
    /// Tool or person that produced the overlay.
    pub source: String,
    /// Name of the overlay, also its file name.
    pub name: String,
    pub data: Value,
}

impl Overlay {
    pub fn new(source: impl Into<String>, name: impl Into<String>, data: Value) -> Self {
        Self {
            kind: OVERLAY_TYPE.to_string(),
            source: source.into(),
            name: name.into(),
            data,
        }
    }

    pub fn is_overlay(&self) -> bool {
        self.kind == OVERLAY_TYPE
    }
}

/// Merge `patch` into `base`: objects merge key by key, everything else
/// replaces.
pub fn deep_merge(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, patch) => *base = patch.clone(),
    }
}

/// Apply overlays in order to a copy of `device`.
pub fn compose(device: &CanonicalDevice, overlays: &[Overlay]) -> Result<CanonicalDevice> {
    if overlays.is_empty() {
        return Ok(device.clone());
    }
    let mut value = serde_json::to_value(device)?;
    for overlay in overlays {
        if !overlay.data.is_object() {
            return Err(DeviceCodeError::Persistence(format!(
                "Overlay '{}' for '{}' does not hold an object",
                overlay.name, device.title
            )));
        }
        deep_merge(&mut value, &overlay.data);
    }
    serde_json::from_value(value).map_err(|e| {
        DeviceCodeError::Persistence(format!(
            "Overlays do not fit device '{}': {}",
            device.title, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Identity, Origin};
    use serde_json::json;

    fn device() -> CanonicalDevice {
        let mut d = CanonicalDevice::new(Origin::WikiDevi, "Netgear WNR3500L", Identity::new("Netgear", "WNR3500L"));
        d.regulatory.pcb_id = Some("2999".to_string());
        d.regulatory.cve_ids = vec!["CVE-2017-1".to_string()];
        d
    }

    #[test]
    fn test_deep_merge() {
        let mut base = json!({"a": {"b": 1, "c": [1, 2]}, "d": "x"});
        deep_merge(&mut base, &json!({"a": {"c": [3], "e": true}}));
        assert_eq!(base, json!({"a": {"b": 1, "c": [3], "e": true}, "d": "x"}));
    }

    #[test]
    fn test_compose_overlays() {
        let base = device();
        let overlays = vec![
            Overlay::new("cpe_overlay", "cve", json!({"regulatory": {"cve_ids": ["CVE-2020-2"]}})),
            Overlay::new("manual", "brand", json!({"identity": {"brand": "NETGEAR"}})),
        ];
        let composed = compose(&base, &overlays).unwrap();

        assert_eq!(composed.identity.brand, "NETGEAR");
        assert_eq!(composed.identity.model, "WNR3500L");
        assert_eq!(composed.regulatory.cve_ids, vec!["CVE-2020-2"]);
        assert_eq!(composed.regulatory.pcb_id.as_deref(), Some("2999"));
        assert_eq!(base.identity.brand, "Netgear");
    }

    #[test]
    fn test_compose_rejects_bad_overlays() {
        let base = device();
        assert!(compose(&base, &[Overlay::new("x", "y", json!([1]))]).is_err());
        assert!(compose(&base, &[Overlay::new("x", "y", json!({"origin": 5}))]).is_err());
    }

    #[test]
    fn test_overlay_wire_format() {
        let overlay = Overlay::new("oui_overlay", "network_oui", json!({}));
        let value = serde_json::to_value(&overlay).unwrap();
        assert_eq!(value["type"], "overlay");
        assert_eq!(value["name"], "network_oui");
    }
}

use std::collections::BTreeMap;

use serde::Serialize;

use crate::coordinator::Coordinator;
use crate::types::{FanSpeed, HvacMode, SystemSnapshot, ZoneState};

/// Support dump for one controller. Carries no credentials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub host: String,
    pub last_update_success: bool,
    pub system: Option<SystemDiagnostics>,
    pub zones: BTreeMap<u8, ZoneDiagnostics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemDiagnostics {
    pub power: &'static str,
    pub mode: &'static str,
    pub fan_speed: &'static str,
    pub current_temp: f64,
    pub target_temp: f64,
    pub num_zones: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneDiagnostics {
    pub name: String,
    pub power: &'static str,
    pub current_temp: f64,
    pub target_temp: f64,
    pub damper_position: u8,
    pub temp_sensor_available: bool,
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

impl Diagnostics {
    pub fn new(host: &str, last_update_success: bool, snapshot: Option<&SystemSnapshot>) -> Self {
        let system = snapshot.map(|s| SystemDiagnostics {
            power: on_off(s.is_on()),
            mode: HvacMode::from_code(s.mode).map_or("unknown", |m| m.as_str()),
            fan_speed: FanSpeed::from_code(s.fan_speed).map_or("unknown", |f| f.as_str()),
            current_temp: s.central_actual_temp,
            target_temp: s.central_desired_temp,
            num_zones: s.zones.len(),
        });
        let zones = snapshot
            .map(|s| {
                s.zones
                    .iter()
                    .map(|(id, zone)| (*id, ZoneDiagnostics::from(zone)))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            host: host.to_string(),
            last_update_success,
            system,
            zones,
        }
    }
}

impl From<&ZoneState> for ZoneDiagnostics {
    fn from(zone: &ZoneState) -> Self {
        Self {
            name: zone.name.clone(),
            power: on_off(zone.is_on()),
            current_temp: zone.actual_temp,
            target_temp: zone.desired_temp,
            damper_position: zone.user_percent_setting,
            temp_sensor_available: zone.temp_sensor_available(),
        }
    }
}

impl Coordinator {
    pub fn diagnostics(&self) -> Diagnostics {
        let snapshot = self.snapshot();
        Diagnostics::new(self.host(), self.last_update_success(), snapshot.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> SystemSnapshot {
        let mut zones = BTreeMap::new();
        zones.insert(
            1,
            ZoneState {
                id: 1,
                name: "Lounge".to_string(),
                setting: 1,
                desired_temp: 22.0,
                actual_temp: 21.0,
                user_percent_setting: 60,
                has_low_batt: true,
            },
        );
        SystemSnapshot {
            power: 1,
            mode: 7,
            fan_speed: 2,
            central_desired_temp: 23.0,
            central_actual_temp: 24.5,
            number_of_zones: 2,
            zones,
        }
    }

    #[test]
    fn labels_known_and_unknown_codes() {
        let diag = Diagnostics::new("10.0.0.5", true, Some(&snapshot()));
        let system = diag.system.unwrap();
        assert_eq!(system.power, "on");
        assert_eq!(system.mode, "unknown");
        assert_eq!(system.fan_speed, "medium");
        assert_eq!(system.current_temp, 24.5);
        assert_eq!(system.target_temp, 23.0);
        assert_eq!(system.num_zones, 1);

        let zone = &diag.zones[&1];
        assert_eq!(zone.name, "Lounge");
        assert_eq!(zone.power, "on");
        assert_eq!(zone.damper_position, 60);
        assert!(!zone.temp_sensor_available);
    }

    #[test]
    fn serializes_without_snapshot() {
        let diag = Diagnostics::new("10.0.0.5", false, None);
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["host"], "10.0.0.5");
        assert_eq!(json["last_update_success"], false);
        assert!(json["system"].is_null());
        assert!(json["zones"].as_object().unwrap().is_empty());
        assert!(!json.to_string().contains("password"));
    }
}

use std::collections::BTreeMap;

use serde::Serialize;

/// Lower end of the damper proxy scale (0 % open).
const PROXY_MIN_C: f64 = 15.0;
/// Span of the damper proxy scale (100 % open = 30 °C).
const PROXY_SPAN_C: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HvacMode {
    Off,
    Cool,
    Heat,
    FanOnly,
}

impl HvacMode {
    /// Device mode code. `Off` has none; it is expressed through system power.
    pub fn code(&self) -> Option<u8> {
        match self {
            HvacMode::Off => None,
            HvacMode::Cool => Some(1),
            HvacMode::Heat => Some(2),
            HvacMode::FanOnly => Some(3),
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(HvacMode::Cool),
            2 => Some(HvacMode::Heat),
            3 => Some(HvacMode::FanOnly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HvacMode::Off => "off",
            HvacMode::Cool => "cool",
            HvacMode::Heat => "heat",
            HvacMode::FanOnly => "fan",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FanSpeed {
    Low,
    Medium,
    High,
}

impl FanSpeed {
    pub fn code(&self) -> u8 {
        match self {
            FanSpeed::Low => 1,
            FanSpeed::Medium => 2,
            FanSpeed::High => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(FanSpeed::Low),
            2 => Some(FanSpeed::Medium),
            3 => Some(FanSpeed::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FanSpeed::Low => "low",
            FanSpeed::Medium => "medium",
            FanSpeed::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneState {
    pub id: u8,
    pub name: String,
    /// 0 = off, 1 = on.
    pub setting: u8,
    pub desired_temp: f64,
    pub actual_temp: f64,
    /// Damper position, 0-100.
    pub user_percent_setting: u8,
    pub has_low_batt: bool,
}

impl ZoneState {
    pub fn is_on(&self) -> bool {
        self.setting == 1
    }

    /// A zone with a flat sensor battery reports no usable temperature.
    pub fn temp_sensor_available(&self) -> bool {
        !self.has_low_batt
    }

    /// Damper position mapped onto 15-30 °C.
    pub fn damper_proxy_temp(&self) -> f64 {
        PROXY_MIN_C + f64::from(self.user_percent_setting) / 100.0 * PROXY_SPAN_C
    }

    pub fn current_temp(&self) -> f64 {
        if self.temp_sensor_available() {
            self.actual_temp
        } else {
            self.damper_proxy_temp()
        }
    }

    pub fn target_temp(&self) -> f64 {
        if self.temp_sensor_available() {
            self.desired_temp
        } else {
            self.damper_proxy_temp()
        }
    }
}

/// Complete device state from one refresh cycle. Never mutated after assembly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemSnapshot {
    /// 0 = off, 1 = on.
    pub power: u8,
    pub mode: u8,
    pub fan_speed: u8,
    pub central_desired_temp: f64,
    pub central_actual_temp: f64,
    /// Zone count as reported by the device; `zones` may hold fewer.
    pub number_of_zones: u8,
    pub zones: BTreeMap<u8, ZoneState>,
}

impl SystemSnapshot {
    pub fn is_on(&self) -> bool {
        self.power == 1
    }

    pub fn hvac_mode(&self) -> HvacMode {
        if self.power == 0 {
            return HvacMode::Off;
        }
        HvacMode::from_code(self.mode).unwrap_or(HvacMode::Off)
    }

    pub fn fan(&self) -> FanSpeed {
        FanSpeed::from_code(self.fan_speed).unwrap_or(FanSpeed::Low)
    }

    pub fn zone(&self, id: u8) -> Option<&ZoneState> {
        self.zones.get(&id)
    }
}

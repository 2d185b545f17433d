pub const LOGIN_PATH: &str = "/login";
pub const SYSTEM_DATA_PATH: &str = "/getSystemData";
pub const ZONE_DATA_PATH: &str = "/getZoneData";
pub const SET_SYSTEM_PATH: &str = "/setSystemData";
pub const SET_ZONE_PATH: &str = "/setZoneData";

/// The controller only accepts its factory password.
pub const LOGIN_PASSWORD: &str = "password";

pub const SYSTEM_ELEMENT: &str = "unitcontrol";

pub type Query = Vec<(&'static str, String)>;

pub fn login_query() -> Query {
    vec![("password", LOGIN_PASSWORD.to_string())]
}

pub fn zone_query(zone_id: u8) -> Query {
    vec![("zone", zone_id.to_string())]
}

pub fn zone_element(zone_id: u8) -> String {
    format!("zone{zone_id}")
}

/// One write GET against the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRequest {
    pub action: &'static str,
    pub zone: Option<u8>,
    pub endpoint: &'static str,
    pub params: Query,
}

impl WriteRequest {
    fn system(action: &'static str, field: &'static str, value: String) -> Self {
        Self {
            action,
            zone: None,
            endpoint: SET_SYSTEM_PATH,
            params: vec![(field, value)],
        }
    }
}

pub fn set_system_power(power: u8) -> WriteRequest {
    WriteRequest::system("set_system_power", "airconOnOff", power.to_string())
}

pub fn set_system_temp(temp: f64) -> WriteRequest {
    WriteRequest::system("set_system_temp", "centralDesiredTemp", format_temp(temp))
}

pub fn set_fan_speed(speed: u8) -> WriteRequest {
    WriteRequest::system("set_fan_speed", "fanSpeed", speed.to_string())
}

pub fn set_hvac_mode(mode: u8) -> WriteRequest {
    WriteRequest::system("set_hvac_mode", "mode", mode.to_string())
}

pub fn set_zone_power(zone_id: u8, power: u8) -> WriteRequest {
    WriteRequest {
        action: "set_zone_power",
        zone: Some(zone_id),
        endpoint: SET_ZONE_PATH,
        params: vec![("zone", zone_id.to_string()), ("zoneSetting", power.to_string())],
    }
}

/// The zone endpoint rejects a temperature without the zone's on/off
/// setting, so the current setting rides along.
pub fn set_zone_temp(zone_id: u8, temp: f64, setting: u8) -> WriteRequest {
    WriteRequest {
        action: "set_zone_temp",
        zone: Some(zone_id),
        endpoint: SET_ZONE_PATH,
        params: vec![
            ("zone", zone_id.to_string()),
            ("desiredTemp", format_temp(temp)),
            ("zoneSetting", setting.to_string()),
        ],
    }
}

/// Always at least one decimal place: `24.0`, `24.5`, `24.25`.
pub fn format_temp(temp: f64) -> String {
    if temp.is_finite() && temp.fract() == 0.0 {
        format!("{temp:.1}")
    } else {
        temp.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_formatting() {
        assert_eq!(format_temp(24.0), "24.0");
        assert_eq!(format_temp(24.5), "24.5");
        assert_eq!(format_temp(24.25), "24.25");
        assert_eq!(format_temp(-3.0), "-3.0");
    }

    #[test]
    fn system_writes_target_system_endpoint() {
        let req = set_system_power(1);
        assert_eq!(req.endpoint, SET_SYSTEM_PATH);
        assert_eq!(req.params, vec![("airconOnOff", "1".to_string())]);
        assert_eq!(req.zone, None);

        assert_eq!(set_fan_speed(3).params, vec![("fanSpeed", "3".to_string())]);
        assert_eq!(set_hvac_mode(2).params, vec![("mode", "2".to_string())]);
        assert_eq!(
            set_system_temp(22.5).params,
            vec![("centralDesiredTemp", "22.5".to_string())]
        );
    }

    #[test]
    fn zone_temp_resends_setting() {
        let req = set_zone_temp(2, 23.0, 1);
        assert_eq!(req.endpoint, SET_ZONE_PATH);
        assert_eq!(req.zone, Some(2));
        assert_eq!(
            req.params,
            vec![
                ("zone", "2".to_string()),
                ("desiredTemp", "23.0".to_string()),
                ("zoneSetting", "1".to_string()),
            ]
        );
    }

    #[test]
    fn out_of_range_values_pass_through() {
        assert_eq!(set_fan_speed(9).params, vec![("fanSpeed", "9".to_string())]);
        assert_eq!(
            set_zone_power(4, 7).params,
            vec![("zone", "4".to_string()), ("zoneSetting", "7".to_string())]
        );
    }

    #[test]
    fn zone_naming() {
        assert_eq!(zone_element(3), "zone3");
        assert_eq!(zone_query(3), vec![("zone", "3".to_string())]);
        assert_eq!(login_query(), vec![("password", "password".to_string())]);
    }
}

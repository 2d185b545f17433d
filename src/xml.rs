//! Permissive field access over the controller's XML documents.
//!
//! The firmware omits fields freely between versions, so every typed read
//! takes a default and falls back to it when the child is missing, empty,
//! or does not parse. Only document-level problems are errors.

use std::borrow::Cow;
use std::str::FromStr;

use xmltree::Element;

use crate::types::ZoneState;
use crate::Result;

pub(crate) const DEFAULT_TEMP_C: f64 = 20.0;
pub(crate) const DEFAULT_MODE: u8 = 1;
pub(crate) const DEFAULT_FAN_SPEED: u8 = 1;

pub(crate) fn parse_document(body: &str) -> Result<Element> {
    Ok(Element::parse(body.as_bytes())?)
}

/// Depth-first search for the first descendant named `name`.
/// The root itself is not a candidate.
pub(crate) fn find_element<'a>(root: &'a Element, name: &str) -> Option<&'a Element> {
    root.children
        .iter()
        .filter_map(|node| node.as_element())
        .find_map(|child| {
            if child.name == name {
                Some(child)
            } else {
                find_element(child, name)
            }
        })
}

/// Text of the child `field`, or `default` when the child is absent or empty.
pub(crate) fn text<'a>(element: &'a Element, field: &str, default: &'a str) -> Cow<'a, str> {
    match element.get_child(field).and_then(|c| c.get_text()) {
        Some(t) if !t.is_empty() => t,
        _ => Cow::Borrowed(default),
    }
}

pub(crate) fn number<T: FromStr>(element: &Element, field: &str, default: T) -> T {
    element
        .get_child(field)
        .and_then(|c| c.get_text())
        .and_then(|t| t.trim().parse().ok())
        .unwrap_or(default)
}

/// Device flags are `1` for set; anything else, including absence, is unset.
pub(crate) fn flag(element: &Element, field: &str) -> bool {
    number::<i64>(element, field, 0) == 1
}

/// System fields read from `unitcontrol`, before zones are attached.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UnitControl {
    pub power: u8,
    pub mode: u8,
    pub fan_speed: u8,
    pub central_desired_temp: f64,
    pub central_actual_temp: f64,
    pub number_of_zones: u32,
}

pub(crate) fn unit_control(element: &Element) -> UnitControl {
    UnitControl {
        power: number(element, "airconOnOff", 0),
        mode: number(element, "mode", DEFAULT_MODE),
        fan_speed: number(element, "fanSpeed", DEFAULT_FAN_SPEED),
        central_desired_temp: number(element, "centralDesiredTemp", DEFAULT_TEMP_C),
        central_actual_temp: number(element, "centralActualTemp", DEFAULT_TEMP_C),
        number_of_zones: number(element, "numberOfZones", 0),
    }
}

pub(crate) fn zone_state(zone_id: u8, element: &Element) -> ZoneState {
    let fallback_name = format!("Zone {zone_id}");
    ZoneState {
        id: zone_id,
        name: text(element, "name", &fallback_name).into_owned(),
        setting: number(element, "setting", 0),
        desired_temp: number(element, "desiredTemp", DEFAULT_TEMP_C),
        actual_temp: number(element, "actualTemp", DEFAULT_TEMP_C),
        user_percent_setting: number(element, "userPercentSetting", 0),
        has_low_batt: flag(element, "hasLowBatt"),
    }
}

use serde_json::Value;

use crate::types::{DeviceState, Event};

/// Collects `(path, old, new)` for every leaf that differs between two JSON
/// documents. Keys absent from `current` are not reported.
pub(crate) fn diff_json(
    previous: &Value,
    current: &Value,
    path_prefix: &str,
    changes: &mut Vec<(String, Value, Value)>,
) {
    match (previous, current) {
        (Value::Object(prev_map), Value::Object(curr_map)) => {
            for (key, curr_val) in curr_map {
                let path = if path_prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{path_prefix}.{key}")
                };
                match prev_map.get(key) {
                    Some(prev_val) => diff_json(prev_val, curr_val, &path, changes),
                    None if curr_val.is_object() => {
                        diff_json(&Value::Object(serde_json::Map::new()), curr_val, &path, changes);
                    }
                    None => changes.push((path, Value::Null, curr_val.clone())),
                }
            }
        }
        (prev, curr) if prev != curr => {
            changes.push((path_prefix.to_string(), prev.clone(), curr.clone()));
        }
        _ => {}
    }
}

/// Typed events for the fields a host cares about. A field that went back
/// to unknown does not produce an event.
pub(crate) fn state_events(
    device_id: &str,
    previous: &DeviceState,
    current: &DeviceState,
) -> Vec<Event> {
    let mut events = Vec::new();
    let id = || device_id.to_string();

    if let Some(power) = current.power
        && previous.power != Some(power)
    {
        events.push(Event::PowerChanged { device_id: id(), power });
    }
    if let Some(mode) = &current.operation_mode
        && previous.operation_mode.as_ref() != Some(mode)
    {
        events.push(Event::OperationModeChanged { device_id: id(), mode: mode.clone() });
    }
    if let Some(temp) = current.room_temperature
        && previous.room_temperature != Some(temp)
    {
        events.push(Event::RoomTemperatureChanged { device_id: id(), temp });
    }
    if let Some(temp) = current.target_temperature
        && previous.target_temperature != Some(temp)
    {
        events.push(Event::TargetTemperatureChanged { device_id: id(), temp });
    }
    if let Some(speed) = &current.fan_speed
        && previous.fan_speed.as_ref() != Some(speed)
    {
        events.push(Event::FanSpeedChanged { device_id: id(), speed: speed.clone() });
    }
    if let Some(position) = &current.vane_vertical
        && previous.vane_vertical.as_ref() != Some(position)
    {
        events.push(Event::VaneVerticalChanged { device_id: id(), position: position.clone() });
    }
    if let Some(position) = &current.vane_horizontal
        && previous.vane_horizontal.as_ref() != Some(position)
    {
        events.push(Event::VaneHorizontalChanged { device_id: id(), position: position.clone() });
    }
    if let Some(conf) = current.conf
        && previous.conf.map(|c| c.has_error) != Some(conf.has_error)
    {
        events.push(Event::ErrorStateChanged { device_id: id(), has_error: conf.has_error });
    }

    events
}

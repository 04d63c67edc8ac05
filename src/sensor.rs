use std::fmt;
use std::sync::Arc;

use crate::device::MelDevice;
use crate::types::{DeviceInfo, TemperatureUnit};
use crate::Result;

pub const ATTR_STATE_DEVICE_ID: &str = "device_id";

pub const STATE_ON: &str = "on";
pub const STATE_OFF: &str = "off";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Temperature,
    Problem,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Temperature => "temperature",
            DeviceClass::Problem => "problem",
        }
    }
}

/// Measurements projected from a device into sensor entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    RoomTemperature,
    ErrorState,
}

impl SensorKind {
    pub fn all() -> &'static [SensorKind] {
        &[SensorKind::RoomTemperature, SensorKind::ErrorState]
    }

    pub fn key(&self) -> &'static str {
        match self {
            SensorKind::RoomTemperature => "room_temperature",
            SensorKind::ErrorState => "error_state",
        }
    }

    pub fn measurement_name(&self) -> &'static str {
        match self {
            SensorKind::RoomTemperature => "Room Temperature",
            SensorKind::ErrorState => "Error State",
        }
    }

    pub fn icon(&self) -> Option<&'static str> {
        match self {
            SensorKind::RoomTemperature => Some("mdi:thermometer"),
            SensorKind::ErrorState => None,
        }
    }

    /// Room temperature is reported in whatever unit the vendor resolves
    /// for the device, the same one its climate entity shows.
    pub fn unit(&self, device: &MelDevice) -> Option<TemperatureUnit> {
        match self {
            SensorKind::RoomTemperature => Some(device.vendor().temperature_unit(&device.state())),
            SensorKind::ErrorState => None,
        }
    }

    pub fn device_class(&self) -> DeviceClass {
        match self {
            SensorKind::RoomTemperature => DeviceClass::Temperature,
            SensorKind::ErrorState => DeviceClass::Problem,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, SensorKind::ErrorState)
    }

    pub fn value(&self, device: &MelDevice) -> SensorValue {
        match self {
            SensorKind::RoomTemperature => device
                .state()
                .room_temperature
                .map_or(SensorValue::Unknown, SensorValue::Number),
            SensorKind::ErrorState => device
                .error_state()
                .map_or(SensorValue::Unknown, SensorValue::Bool),
        }
    }

    pub fn enabled(&self, _device: &MelDevice) -> bool {
        match self {
            SensorKind::RoomTemperature | SensorKind::ErrorState => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorValue {
    Number(f64),
    Bool(bool),
    Unknown,
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorValue::Number(v) => write!(f, "{v}"),
            SensorValue::Bool(true) => f.write_str(STATE_ON),
            SensorValue::Bool(false) => f.write_str(STATE_OFF),
            SensorValue::Unknown => f.write_str("unknown"),
        }
    }
}

/// Read-only sensor or binary sensor for one measurement of a device.
#[derive(Debug)]
pub struct SensorEntity {
    api: Arc<MelDevice>,
    kind: SensorKind,
}

impl SensorEntity {
    pub fn new(api: Arc<MelDevice>, kind: SensorKind) -> Self {
        Self { api, kind }
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub async fn update(&self) -> Result<()> {
        self.api.update().await
    }

    pub fn unique_id(&self) -> String {
        format!(
            "{}_heatpump_{}_{}",
            self.api.vendor().domain(),
            self.api.device_id(),
            self.kind.key()
        )
    }

    pub fn name(&self) -> String {
        format!("{} {}", self.api.name(), self.kind.measurement_name())
    }

    pub fn available(&self) -> bool {
        self.api.available()
    }

    pub fn icon(&self) -> Option<&'static str> {
        self.kind.icon()
    }

    pub fn unit_of_measurement(&self) -> Option<TemperatureUnit> {
        self.kind.unit(&self.api)
    }

    pub fn device_class(&self) -> DeviceClass {
        self.kind.device_class()
    }

    /// Binary sensors map their value to on/off; an unknown flag reads as off.
    pub fn state(&self) -> SensorValue {
        if self.kind.is_binary() {
            return SensorValue::Bool(self.is_on());
        }
        self.kind.value(&self.api)
    }

    pub fn is_on(&self) -> bool {
        self.kind.is_binary() && self.kind.value(&self.api) == SensorValue::Bool(true)
    }

    pub fn device_info(&self) -> DeviceInfo {
        self.api.device_info()
    }

    pub fn state_attributes(&self) -> Vec<(&'static str, String)> {
        vec![(ATTR_STATE_DEVICE_ID, self.api.device_id().to_string())]
    }
}

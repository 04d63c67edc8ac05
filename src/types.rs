use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// Platform fallback bounds, in Celsius.
pub const DEFAULT_MIN_TEMP_C: f64 = 7.0;
pub const DEFAULT_MAX_TEMP_C: f64 = 35.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "\u{00b0}C",
            TemperatureUnit::Fahrenheit => "\u{00b0}F",
        }
    }

    /// Unit codes as reported by the MELCloud device.
    pub fn from_vendor_str(s: &str) -> Option<Self> {
        match s {
            "celsius" => Some(TemperatureUnit::Celsius),
            "fahrenheit" => Some(TemperatureUnit::Fahrenheit),
            _ => None,
        }
    }

    pub fn convert_celsius(&self, c: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => c,
            TemperatureUnit::Fahrenheit => c * (9.0 / 5.0) + 32.0,
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform-facing HVAC modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HvacMode {
    Off,
    Heat,
    Cool,
    HeatCool,
    Dry,
    FanOnly,
}

impl HvacMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HvacMode::Off => "off",
            HvacMode::Heat => "heat",
            HvacMode::Cool => "cool",
            HvacMode::HeatCool => "heat_cool",
            HvacMode::Dry => "dry",
            HvacMode::FanOnly => "fan_only",
        }
    }

    pub fn from_platform_str(s: &str) -> Option<Self> {
        match s {
            "off" => Some(HvacMode::Off),
            "heat" => Some(HvacMode::Heat),
            "cool" => Some(HvacMode::Cool),
            "heat_cool" => Some(HvacMode::HeatCool),
            "dry" => Some(HvacMode::Dry),
            "fan_only" => Some(HvacMode::FanOnly),
            _ => None,
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// Air-to-air split units.
    Ata,
    /// Air-to-water heat pumps. Discovered but not exposed.
    Atw,
}

/// Bit set of climate capabilities, in the platform's numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SupportedFeatures(u32);

impl SupportedFeatures {
    pub const TARGET_TEMPERATURE: Self = Self(1);
    pub const FAN_MODE: Self = Self(8);
    pub const SWING_MODE: Self = Self(32);

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SupportedFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub device_id: String,
    pub name: String,
    pub building_id: Option<String>,
    pub serial: Option<String>,
    pub mac: Option<String>,
}

/// Vendor configuration block, fetched by the vendor library on its own
/// schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConf {
    pub has_error: bool,
    pub has_wide_vane: bool,
}

/// Last-polled device state. Mode, fan and vane values are vendor codes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    pub power: Option<bool>,
    pub operation_mode: Option<String>,
    #[serde(default)]
    pub operation_modes: Vec<String>,
    pub room_temperature: Option<f64>,
    pub target_temperature: Option<f64>,
    pub target_temperature_min: Option<f64>,
    pub target_temperature_max: Option<f64>,
    pub target_temperature_step: Option<f64>,
    pub fan_speed: Option<String>,
    #[serde(default)]
    pub fan_speeds: Vec<String>,
    pub vane_vertical: Option<String>,
    #[serde(default)]
    pub vane_vertical_positions: Vec<String>,
    pub vane_horizontal: Option<String>,
    #[serde(default)]
    pub vane_horizontal_positions: Vec<String>,
    pub temp_unit: Option<String>,
    pub conf: Option<DeviceConf>,
}

/// A batch of property writes sent to the vendor in one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_speed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vane_vertical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vane_horizontal: Option<String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn power(mut self, on: bool) -> Self {
        self.power = Some(on);
        self
    }

    pub fn operation_mode(mut self, code: impl Into<String>) -> Self {
        self.operation_mode = Some(code.into());
        self
    }

    pub fn target_temperature(mut self, temp: f64) -> Self {
        self.target_temperature = Some(temp);
        self
    }

    pub fn fan_speed(mut self, speed: impl Into<String>) -> Self {
        self.fan_speed = Some(speed.into());
        self
    }

    pub fn vane_vertical(mut self, code: impl Into<String>) -> Self {
        self.vane_vertical = Some(code.into());
        self
    }

    pub fn vane_horizontal(mut self, code: impl Into<String>) -> Self {
        self.vane_horizontal = Some(code.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Device registry description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: Vec<(String, String)>,
    pub manufacturer: String,
    pub name: String,
    pub model: String,
}

/// Events emitted by a device wrapper when its polled state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    AvailabilityChanged { device_id: String, available: bool },
    PowerChanged { device_id: String, power: bool },
    OperationModeChanged { device_id: String, mode: String },
    RoomTemperatureChanged { device_id: String, temp: f64 },
    TargetTemperatureChanged { device_id: String, temp: f64 },
    FanSpeedChanged { device_id: String, speed: String },
    VaneVerticalChanged { device_id: String, position: String },
    VaneHorizontalChanged { device_id: String, position: String },
    ErrorStateChanged { device_id: String, has_error: bool },
}

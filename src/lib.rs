mod auth;
mod climate;
mod config;
mod device;
mod diff;
mod error;
mod integration;
mod logger;
mod sensor;
pub mod tables;
mod types;
mod vendor;

pub use auth::{Authentication, Session, SessionBuilder};
pub use climate::{ATTR_VANE_HORIZONTAL, ATTR_VANE_VERTICAL, ClimateEntity};
pub use config::{EntryConfig, Language};
pub use device::{MIN_TIME_BETWEEN_UPDATES, MelDevice};
pub use error::{Error, Result};
pub use integration::{
    CONF_UPDATE_INTERVAL, DEVICE_SET_DEBOUNCE, DISCOVERY_TIMEOUT, Integration, IntegrationBuilder,
    Platform,
};
pub use logger::MessageLogMode;
pub use sensor::{DeviceClass, SensorEntity, SensorKind, SensorValue, STATE_OFF, STATE_ON};
pub use types::*;
pub use vendor::{Backend, Credentials, DeviceMap, MANUFACTURER, SessionToken, Vendor, VendorDevice};

/// Re-exported so vendor implementations can name the trait attribute
/// without depending on the crate directly.
pub use async_trait::async_trait;

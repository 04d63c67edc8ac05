use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::device::MelDevice;
use crate::tables::{self, DEFAULT_SWING_MODE, OPERATION_MODES, VANE_HORIZONTAL, VANE_VERTICAL};
use crate::types::*;
use crate::{Error, Result};

pub const ATTR_VANE_VERTICAL: &str = "vane_vertical";
pub const ATTR_VANE_HORIZONTAL: &str = "vane_horizontal";

/// Air-to-air climate entity.
///
/// Reads come from the wrapper's last polled state; writes go out through
/// the wrapper as a single property batch. The swing surface shows one
/// vane axis at a time: whichever axis the last swing command targeted.
#[derive(Debug)]
pub struct ClimateEntity {
    api: Arc<MelDevice>,
    support_ver_swing: bool,
    support_hor_swing: bool,
    set_hor_swing: bool,
}

impl ClimateEntity {
    pub fn new(api: Arc<MelDevice>) -> Self {
        let state = api.state();
        let support_ver_swing = !state.vane_vertical_positions.is_empty();
        let support_hor_swing = !state.vane_horizontal_positions.is_empty();
        Self {
            api,
            support_ver_swing,
            support_hor_swing,
            set_hor_swing: support_hor_swing && !support_ver_swing,
        }
    }

    pub fn device(&self) -> &Arc<MelDevice> {
        &self.api
    }

    pub async fn update(&self) -> Result<()> {
        self.api.update().await
    }

    pub fn unique_id(&self) -> String {
        self.api.vendor().climate_unique_id(self.api.identity())
    }

    pub fn name(&self) -> &str {
        self.api.name()
    }

    pub fn available(&self) -> bool {
        self.api.available()
    }

    pub fn device_info(&self) -> DeviceInfo {
        self.api.device_info()
    }

    pub fn temperature_unit(&self) -> TemperatureUnit {
        self.api.vendor().temperature_unit(&self.api.state())
    }

    /// `None` when the device reports an operation mode with no mapping.
    pub fn hvac_mode(&self) -> Option<HvacMode> {
        let state = self.api.state();
        match (state.power, state.operation_mode.as_deref()) {
            (Some(true), Some(code)) => {
                OPERATION_MODES.display(code).and_then(HvacMode::from_platform_str)
            }
            _ => Some(HvacMode::Off),
        }
    }

    pub fn hvac_modes(&self) -> Vec<HvacMode> {
        let state = self.api.state();
        std::iter::once(HvacMode::Off)
            .chain(
                state
                    .operation_modes
                    .iter()
                    .filter_map(|code| OPERATION_MODES.display(code))
                    .filter_map(HvacMode::from_platform_str),
            )
            .collect()
    }

    pub async fn set_hvac_mode(&self, hvac_mode: &str) -> Result<()> {
        if hvac_mode == HvacMode::Off.as_str() {
            return self.api.set(Properties::new().power(false)).await;
        }

        let code = OPERATION_MODES.code(hvac_mode)?;
        let mut props = Properties::new().operation_mode(code);
        if self.hvac_mode() == Some(HvacMode::Off) {
            props = props.power(true);
        }
        self.api.set(props).await
    }

    pub fn current_temperature(&self) -> Option<f64> {
        self.api.state().room_temperature
    }

    pub fn target_temperature(&self) -> Option<f64> {
        self.api.state().target_temperature
    }

    pub fn target_temperature_step(&self) -> Option<f64> {
        self.api.state().target_temperature_step
    }

    /// Writes the given target, or re-sends the current one when `None`.
    pub async fn set_temperature(&self, temperature: Option<f64>) -> Result<()> {
        let target = temperature
            .or_else(|| self.target_temperature())
            .ok_or_else(|| Error::invalid("temperature", "unset"))?;
        self.api.set(Properties::new().target_temperature(target)).await
    }

    pub fn fan_mode(&self) -> Option<String> {
        self.api.state().fan_speed
    }

    pub fn fan_modes(&self) -> Vec<String> {
        self.api.state().fan_speeds
    }

    pub async fn set_fan_mode(&self, fan_mode: &str) -> Result<()> {
        self.api.set(Properties::new().fan_speed(fan_mode)).await
    }

    pub fn swing_mode(&self) -> &'static str {
        let state = self.api.state();
        let swing = if self.set_hor_swing && self.support_hor_swing {
            state.vane_horizontal.as_deref().and_then(|m| VANE_HORIZONTAL.display(m))
        } else if self.support_ver_swing {
            state.vane_vertical.as_deref().and_then(|m| VANE_VERTICAL.display(m))
        } else {
            None
        };
        swing.unwrap_or(DEFAULT_SWING_MODE)
    }

    pub fn swing_modes(&self) -> Vec<&'static str> {
        let state = self.api.state();
        tables::swing_modes(
            &state.vane_vertical_positions,
            &state.vane_horizontal_positions,
            self.api.has_wide_vane(),
        )
    }

    /// Resolves the name against the vertical table, then the horizontal
    /// one, and remembers the matched axis. Writing the axis's current
    /// position is a no-op.
    pub async fn set_swing_mode(&mut self, swing_mode: &str) -> Result<()> {
        let state = self.api.state();
        let (is_hor_swing, code, current, advertised) = match VANE_VERTICAL.code(swing_mode) {
            Ok(code) => (false, code, state.vane_vertical, state.vane_vertical_positions),
            Err(_) => {
                let code = VANE_HORIZONTAL
                    .code(swing_mode)
                    .map_err(|_| Error::invalid("swing_mode", swing_mode))?;
                (true, code, state.vane_horizontal, state.vane_horizontal_positions)
            }
        };

        if self.api.vendor().validates_swing_positions() {
            let offered = advertised.iter().any(|p| p == code)
                && (!is_hor_swing || tables::horizontal_offered(code, self.api.has_wide_vane()));
            if !offered {
                return Err(Error::invalid("swing_mode", swing_mode));
            }
        }

        self.set_hor_swing = is_hor_swing;
        if current.as_deref() == Some(code) {
            debug!(device = %self.name(), swing_mode, "swing unchanged, skipping write");
            return Ok(());
        }

        let props = if is_hor_swing {
            Properties::new().vane_horizontal(code)
        } else {
            Properties::new().vane_vertical(code)
        };
        self.api.set(props).await
    }

    pub async fn turn_on(&self) -> Result<()> {
        self.api.set(Properties::new().power(true)).await
    }

    pub async fn turn_off(&self) -> Result<()> {
        self.api.set(Properties::new().power(false)).await
    }

    pub fn supported_features(&self) -> SupportedFeatures {
        let features = SupportedFeatures::FAN_MODE | SupportedFeatures::TARGET_TEMPERATURE;
        if self.support_ver_swing || self.support_hor_swing {
            features | SupportedFeatures::SWING_MODE
        } else {
            features
        }
    }

    pub fn min_temp(&self) -> f64 {
        self.api
            .state()
            .target_temperature_min
            .unwrap_or_else(|| self.temperature_unit().convert_celsius(DEFAULT_MIN_TEMP_C))
    }

    pub fn max_temp(&self) -> f64 {
        self.api
            .state()
            .target_temperature_max
            .unwrap_or_else(|| self.temperature_unit().convert_celsius(DEFAULT_MAX_TEMP_C))
    }

    /// Display names of both vane axes, for axes the device supports.
    pub fn state_attributes(&self) -> BTreeMap<&'static str, &'static str> {
        let state = self.api.state();
        let mut attrs = BTreeMap::new();
        if self.support_ver_swing
            && let Some(name) = state
                .vane_vertical
                .as_deref()
                .and_then(|m| VANE_VERTICAL.display(m))
        {
            attrs.insert(ATTR_VANE_VERTICAL, name);
        }
        if self.support_hor_swing
            && let Some(name) = state
                .vane_horizontal
                .as_deref()
                .and_then(|m| VANE_HORIZONTAL.display(m))
        {
            attrs.insert(ATTR_VANE_HORIZONTAL, name);
        }
        attrs
    }
}

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::{Authentication, Session};
use crate::climate::ClimateEntity;
use crate::config::EntryConfig;
use crate::device::{EventCallback, MelDevice, MIN_TIME_BETWEEN_UPDATES};
use crate::logger::{MessageLogMode, MessageLogger};
use crate::sensor::{SensorEntity, SensorKind};
use crate::types::{DeviceType, Event};
use crate::vendor::{Backend, Vendor};
use crate::{Error, Result};

pub const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);
pub const CONF_UPDATE_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEVICE_SET_DEBOUNCE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Climate,
    Sensor,
    BinarySensor,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Climate => "climate",
            Platform::Sensor => "sensor",
            Platform::BinarySensor => "binary_sensor",
        }
    }
}

pub struct IntegrationBuilder {
    config: EntryConfig,
    backend: Box<dyn Backend>,
    session: Option<Session>,
    update_interval: Duration,
    discovery_timeout: Duration,
    conf_update_interval: Duration,
    device_set_debounce: Duration,
    event_callbacks: Vec<EventCallback>,
    log_mode: Option<MessageLogMode>,
    log_path: Option<PathBuf>,
}

impl IntegrationBuilder {
    pub fn new(config: EntryConfig, backend: impl Backend + 'static) -> Self {
        Self {
            config,
            backend: Box::new(backend),
            session: None,
            update_interval: MIN_TIME_BETWEEN_UPDATES,
            discovery_timeout: DISCOVERY_TIMEOUT,
            conf_update_interval: CONF_UPDATE_INTERVAL,
            device_set_debounce: DEVICE_SET_DEBOUNCE,
            event_callbacks: Vec::new(),
            log_mode: None,
            log_path: None,
        }
    }

    /// Share an existing HTTP session instead of building a default one.
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    pub fn discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }

    pub fn conf_update_interval(mut self, interval: Duration) -> Self {
        self.conf_update_interval = interval;
        self
    }

    pub fn device_set_debounce(mut self, debounce: Duration) -> Self {
        self.device_set_debounce = debounce;
        self
    }

    pub fn on_event(mut self, f: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.event_callbacks.push(Arc::new(f));
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<PathBuf>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    /// Log in and discover devices. Any failure here leaves nothing
    /// behind; `Error::NotReady` means the caller should retry later.
    pub async fn setup(self) -> Result<Integration> {
        self.config.validate()?;
        let vendor = self.config.vendor;
        if self.backend.vendor() != vendor {
            return Err(Error::Config(format!(
                "entry is for {vendor} but the backend speaks {}",
                self.backend.vendor()
            )));
        }
        info!(
            domain = vendor.domain(),
            user = %self.config.username,
            language = self.config.language.code(),
            language_id = self.config.language.id(),
            "initializing"
        );

        let session = match self.session {
            Some(session) => session,
            None => Session::builder()
                .build()
                .map_err(|e| Error::NotReady(format!("HTTP session unavailable: {e}")))?,
        };

        let mut auth = Authentication::new(
            self.config.username.clone(),
            self.config.password.clone(),
            self.config.language,
        );
        let logged_in = auth.login(self.backend.as_ref(), Some(&session)).await;
        let Some(token) = auth.token().cloned().filter(|_| logged_in) else {
            return Err(Error::NotReady(format!("login to {vendor} failed")));
        };

        let discovery = self.backend.get_devices(
            &token,
            &session,
            self.conf_update_interval,
            self.device_set_debounce,
        );
        let discovered = match tokio::time::timeout(self.discovery_timeout, discovery).await {
            Ok(Ok(devices)) => devices,
            Ok(Err(e)) if e.is_connection() || matches!(e, Error::Timeout) => {
                warn!(error = %e, "device discovery failed");
                return Err(Error::NotReady(format!("device discovery failed: {e}")));
            }
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                warn!(timeout = ?self.discovery_timeout, "device discovery timed out");
                return Err(Error::NotReady("device discovery timed out".to_string()));
            }
        };

        // The traffic log is only created once setup can no longer fail.
        let logger = match (self.log_mode, &self.log_path) {
            (Some(mode), Some(path)) => {
                let mut logger = MessageLogger::new(mode, path)?;
                logger.log_login(&self.config.username, true);
                Some(Arc::new(Mutex::new(logger)))
            }
            _ => None,
        };

        let mut devices = HashMap::new();
        for (device_type, vendor_devices) in discovered {
            let wrapped: Vec<Arc<MelDevice>> = vendor_devices
                .into_iter()
                .map(|device| {
                    Arc::new(
                        MelDevice::with_interval(device, vendor, self.update_interval)
                            .with_hooks(self.event_callbacks.clone(), logger.clone()),
                    )
                })
                .collect();
            debug!(?device_type, count = wrapped.len(), "discovered devices");
            devices.insert(device_type, wrapped);
        }

        Ok(Integration {
            entry_id: Uuid::new_v4(),
            config: self.config,
            session,
            auth,
            devices,
        })
    }
}

/// Everything one configured account owns: session, login and device
/// wrappers. Entities are built from it and it is torn down by `unload`.
pub struct Integration {
    entry_id: Uuid,
    config: EntryConfig,
    session: Session,
    auth: Authentication,
    devices: HashMap<DeviceType, Vec<Arc<MelDevice>>>,
}

impl Integration {
    pub fn builder(config: EntryConfig, backend: impl Backend + 'static) -> IntegrationBuilder {
        IntegrationBuilder::new(config, backend)
    }

    pub fn entry_id(&self) -> Uuid {
        self.entry_id
    }

    pub fn config(&self) -> &EntryConfig {
        &self.config
    }

    pub fn vendor(&self) -> Vendor {
        self.config.vendor
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_logged_in(&self) -> bool {
        self.auth.is_logged_in()
    }

    pub fn platforms(&self) -> Vec<Platform> {
        if self.config.disable_sensors {
            vec![Platform::Climate]
        } else {
            vec![Platform::Climate, Platform::Sensor, Platform::BinarySensor]
        }
    }

    pub fn devices(&self, device_type: DeviceType) -> &[Arc<MelDevice>] {
        self.devices.get(&device_type).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn climate_entities(&self) -> Vec<ClimateEntity> {
        self.devices(DeviceType::Ata)
            .iter()
            .map(|device| ClimateEntity::new(Arc::clone(device)))
            .collect()
    }

    pub fn sensor_entities(&self) -> Vec<SensorEntity> {
        self.sensors(Platform::Sensor, false)
    }

    pub fn binary_sensor_entities(&self) -> Vec<SensorEntity> {
        self.sensors(Platform::BinarySensor, true)
    }

    fn sensors(&self, platform: Platform, binary: bool) -> Vec<SensorEntity> {
        if !self.platforms().contains(&platform) {
            return Vec::new();
        }
        let devices = self.devices(DeviceType::Ata);
        SensorKind::all()
            .iter()
            .filter(|kind| kind.is_binary() == binary)
            .flat_map(|kind| {
                devices
                    .iter()
                    .filter(move |device| kind.enabled(device))
                    .map(move |device| SensorEntity::new(Arc::clone(device), *kind))
            })
            .collect()
    }

    /// Tear down the entry. Entities still holding a device keep it alive
    /// until they are dropped.
    pub fn unload(self) {
        let count: usize = self.devices.values().map(Vec::len).sum();
        info!(entry = %self.entry_id, devices = count, "unloading");
    }
}

impl std::fmt::Debug for Integration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Integration")
            .field("entry_id", &self.entry_id)
            .field("config", &self.config)
            .field("devices", &self.devices)
            .finish()
    }
}

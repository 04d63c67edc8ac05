#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mel_climate::{
    Backend, Credentials, DeviceConf, DeviceIdentity, DeviceMap, DeviceState, DeviceType, Error,
    MelDevice, Properties, Result, Session, SessionToken, Vendor, VendorDevice, async_trait,
};

/// Shared view of a fake device, kept by the test after the device itself
/// is boxed and handed over.
#[derive(Clone, Default)]
pub struct Handle {
    pub state: Arc<Mutex<DeviceState>>,
    pub writes: Arc<Mutex<Vec<Properties>>>,
    pub updates: Arc<AtomicUsize>,
    pub offline: Arc<AtomicBool>,
}

impl Handle {
    pub fn writes(&self) -> Vec<Properties> {
        self.writes.lock().unwrap().clone()
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn go_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn edit(&self, f: impl FnOnce(&mut DeviceState)) {
        f(&mut self.state.lock().unwrap());
    }
}

pub struct FakeDevice {
    identity: DeviceIdentity,
    handle: Handle,
}

impl FakeDevice {
    pub fn new(device_id: &str, state: DeviceState) -> (Self, Handle) {
        let handle = Handle {
            state: Arc::new(Mutex::new(state)),
            ..Default::default()
        };
        let identity = DeviceIdentity {
            device_id: device_id.to_string(),
            name: format!("Unit {device_id}"),
            building_id: Some("b1".to_string()),
            serial: Some(format!("SN{device_id}")),
            mac: Some("00:11:22:33:44:55".to_string()),
        };
        (
            Self {
                identity,
                handle: handle.clone(),
            },
            handle,
        )
    }
}

#[async_trait]
impl VendorDevice for FakeDevice {
    fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    fn state(&self) -> DeviceState {
        self.handle.state.lock().unwrap().clone()
    }

    async fn update(&self) -> Result<()> {
        self.handle.updates.fetch_add(1, Ordering::SeqCst);
        if self.handle.offline.load(Ordering::SeqCst) {
            return Err(Error::Connection("connection reset by peer".into()));
        }
        Ok(())
    }

    async fn set(&self, properties: &Properties) -> Result<()> {
        self.handle.writes.lock().unwrap().push(properties.clone());
        if self.handle.offline.load(Ordering::SeqCst) {
            return Err(Error::Connection("connection reset by peer".into()));
        }
        let mut state = self.handle.state.lock().unwrap();
        if let Some(power) = properties.power {
            state.power = Some(power);
        }
        if let Some(mode) = &properties.operation_mode {
            state.operation_mode = Some(mode.clone());
        }
        if let Some(temp) = properties.target_temperature {
            state.target_temperature = Some(temp);
        }
        if let Some(speed) = &properties.fan_speed {
            state.fan_speed = Some(speed.clone());
        }
        if let Some(v) = &properties.vane_vertical {
            state.vane_vertical = Some(v.clone());
        }
        if let Some(h) = &properties.vane_horizontal {
            state.vane_horizontal = Some(h.clone());
        }
        Ok(())
    }
}

/// Route library logs to the test harness; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// A typical wall unit, running in heat mode.
pub fn heat_pump_state() -> DeviceState {
    DeviceState {
        power: Some(true),
        operation_mode: Some("heat".into()),
        operation_modes: strings(&["heat", "dry", "cool", "fan_only", "heat_cool"]),
        room_temperature: Some(20.5),
        target_temperature: Some(22.0),
        target_temperature_min: Some(10.0),
        target_temperature_max: Some(31.0),
        target_temperature_step: Some(0.5),
        fan_speed: Some("auto".into()),
        fan_speeds: strings(&["auto", "1", "2", "3"]),
        vane_vertical: Some("auto".into()),
        vane_vertical_positions: strings(&["auto", "1", "2", "3", "4", "5", "swing"]),
        vane_horizontal: Some("3".into()),
        vane_horizontal_positions: strings(&["auto", "1", "2", "3", "4", "5", "split", "swing"]),
        temp_unit: Some("celsius".into()),
        conf: Some(DeviceConf {
            has_error: false,
            has_wide_vane: false,
        }),
    }
}

pub fn wrap(vendor: Vendor, state: DeviceState) -> (Arc<MelDevice>, Handle) {
    let (device, handle) = FakeDevice::new("100", state);
    let wrapper = MelDevice::with_interval(Box::new(device), vendor, Duration::ZERO);
    (Arc::new(wrapper), handle)
}

#[derive(Clone, Default)]
pub struct BackendProbe {
    pub logins: Arc<AtomicUsize>,
    pub discoveries: Arc<AtomicUsize>,
}

pub enum Discovery {
    Devices(Vec<Box<dyn VendorDevice>>),
    ConnectionError,
    Fail(Error),
    Hang,
}

pub struct FakeBackend {
    vendor: Vendor,
    accept_login: bool,
    discovery: Mutex<Option<Discovery>>,
    probe: BackendProbe,
}

impl FakeBackend {
    pub fn new(vendor: Vendor, accept_login: bool, discovery: Discovery) -> (Self, BackendProbe) {
        let probe = BackendProbe::default();
        (
            Self {
                vendor,
                accept_login,
                discovery: Mutex::new(Some(discovery)),
                probe: probe.clone(),
            },
            probe,
        )
    }
}

#[async_trait]
impl Backend for FakeBackend {
    fn vendor(&self) -> Vendor {
        self.vendor
    }

    async fn login(&self, credentials: &Credentials, _session: &Session) -> Result<SessionToken> {
        self.probe.logins.fetch_add(1, Ordering::SeqCst);
        if self.accept_login {
            Ok(SessionToken::new(format!("token-for-{}", credentials.email)))
        } else {
            Err(Error::Vendor("bad credentials".into()))
        }
    }

    async fn get_devices(
        &self,
        _token: &SessionToken,
        _session: &Session,
        _conf_update_interval: Duration,
        _device_set_debounce: Duration,
    ) -> Result<DeviceMap> {
        self.probe.discoveries.fetch_add(1, Ordering::SeqCst);
        let discovery = self.discovery.lock().unwrap().take();
        match discovery {
            Some(Discovery::Devices(devices)) => {
                let mut map = DeviceMap::new();
                map.insert(DeviceType::Ata, devices);
                Ok(map)
            }
            Some(Discovery::ConnectionError) => Err(Error::Connection("connection refused".into())),
            Some(Discovery::Fail(e)) => Err(e),
            Some(Discovery::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(DeviceMap::new())
            }
            None => Ok(DeviceMap::new()),
        }
    }
}

mod common;

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{Discovery, FakeBackend, FakeDevice, heat_pump_state};
use mel_climate::{
    DeviceType, EntryConfig, Error, Event, Integration, MessageLogMode, Platform, Vendor,
    VendorDevice,
};

fn entry(vendor: Vendor) -> EntryConfig {
    EntryConfig::new(vendor, "owner@example.com", "hunter2")
}

fn two_units() -> (Vec<Box<dyn VendorDevice>>, Vec<common::Handle>) {
    let (a, ha) = FakeDevice::new("1", heat_pump_state());
    let (b, hb) = FakeDevice::new("2", heat_pump_state());
    let devices: Vec<Box<dyn VendorDevice>> = vec![Box::new(a), Box::new(b)];
    (devices, vec![ha, hb])
}

#[tokio::test]
async fn rejected_login_skips_discovery() {
    common::init_tracing();
    let (backend, probe) = FakeBackend::new(Vendor::MelCloud, false, Discovery::Devices(vec![]));

    let err = Integration::builder(entry(Vendor::MelCloud), backend)
        .setup()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotReady(_)), "got {err:?}");
    assert_eq!(probe.logins.load(Ordering::SeqCst), 1);
    assert_eq!(probe.discoveries.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn stalled_discovery_times_out() {
    common::init_tracing();
    let (backend, probe) = FakeBackend::new(Vendor::MelView, true, Discovery::Hang);

    let err = Integration::builder(entry(Vendor::MelView), backend)
        .setup()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotReady(ref msg) if msg.contains("timed out")), "got {err:?}");
    assert_eq!(probe.discoveries.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unreachable_discovery_is_retriable() {
    common::init_tracing();
    let (backend, _) = FakeBackend::new(Vendor::MelCloud, true, Discovery::ConnectionError);

    let err = Integration::builder(entry(Vendor::MelCloud), backend)
        .setup()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotReady(_)));
}

#[tokio::test]
async fn vendor_timeout_is_retriable() {
    common::init_tracing();
    let (backend, _) = FakeBackend::new(Vendor::MelView, true, Discovery::Fail(Error::Timeout));

    let err = Integration::builder(entry(Vendor::MelView), backend)
        .setup()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotReady(_)));
}

#[tokio::test]
async fn vendor_protocol_errors_propagate() {
    common::init_tracing();
    let failure = Error::Vendor("unexpected payload".into());
    let (backend, _) = FakeBackend::new(Vendor::MelCloud, true, Discovery::Fail(failure));

    let err = Integration::builder(entry(Vendor::MelCloud), backend)
        .setup()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Vendor(_)), "got {err:?}");
}

#[tokio::test]
async fn blank_credentials_are_a_config_error() {
    common::init_tracing();
    let (backend, probe) = FakeBackend::new(Vendor::MelCloud, true, Discovery::Devices(vec![]));

    let err = Integration::builder(EntryConfig::new(Vendor::MelCloud, "  ", "pw"), backend)
        .setup()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert_eq!(probe.logins.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn backend_must_match_entry_vendor() {
    common::init_tracing();
    let (backend, probe) = FakeBackend::new(Vendor::MelView, true, Discovery::Devices(vec![]));

    let err = Integration::builder(entry(Vendor::MelCloud), backend)
        .setup()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert_eq!(probe.logins.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn setup_builds_entities_per_device() {
    common::init_tracing();
    let (devices, _) = two_units();
    let (backend, _) = FakeBackend::new(Vendor::MelView, true, Discovery::Devices(devices));

    let integration = Integration::builder(entry(Vendor::MelView), backend)
        .setup()
        .await
        .unwrap();

    assert!(integration.is_logged_in());
    assert_eq!(integration.vendor(), Vendor::MelView);
    assert_eq!(
        integration.platforms(),
        vec![Platform::Climate, Platform::Sensor, Platform::BinarySensor]
    );
    assert_eq!(integration.devices(DeviceType::Ata).len(), 2);
    assert!(integration.devices(DeviceType::Atw).is_empty());

    let climates: Vec<String> = integration
        .climate_entities()
        .iter()
        .map(|c| c.unique_id())
        .collect();
    assert_eq!(climates, vec!["heatpump_1", "heatpump_2"]);

    let sensors = integration.sensor_entities();
    assert_eq!(sensors.len(), 2);
    assert_eq!(sensors[0].unique_id(), "melview_custom_heatpump_1_room_temperature");

    let binary = integration.binary_sensor_entities();
    assert_eq!(binary.len(), 2);
    assert_eq!(binary[1].name(), "Unit 2 Error State");

    integration.unload();
}

#[tokio::test]
async fn disabled_sensors_leave_only_climate() {
    common::init_tracing();
    let (devices, _) = two_units();
    let (backend, _) = FakeBackend::new(Vendor::MelCloud, true, Discovery::Devices(devices));

    let integration = Integration::builder(entry(Vendor::MelCloud).disable_sensors(true), backend)
        .setup()
        .await
        .unwrap();

    assert_eq!(integration.platforms(), vec![Platform::Climate]);
    assert_eq!(integration.climate_entities().len(), 2);
    assert!(integration.sensor_entities().is_empty());
    assert!(integration.binary_sensor_entities().is_empty());
}

#[tokio::test]
async fn entities_share_one_device_wrapper() {
    common::init_tracing();
    let (devices, handles) = two_units();
    let (backend, _) = FakeBackend::new(Vendor::MelCloud, true, Discovery::Devices(devices));
    let integration = Integration::builder(entry(Vendor::MelCloud), backend)
        .update_interval(Duration::ZERO)
        .setup()
        .await
        .unwrap();

    let climates = integration.climate_entities();
    let sensors = integration.sensor_entities();
    let (climate, sensor) = (&climates[0], &sensors[0]);
    assert!(Arc::ptr_eq(climate.device(), &integration.devices(DeviceType::Ata)[0]));

    handles[0].go_offline(true);
    sensor.update().await.unwrap();
    assert!(!climate.available());
    assert!(!sensor.available());
}

#[tokio::test]
async fn state_changes_reach_event_listeners() {
    common::init_tracing();
    let (devices, handles) = two_units();
    let (backend, _) = FakeBackend::new(Vendor::MelCloud, true, Discovery::Devices(devices));
    let seen: Arc<Mutex<Vec<Event>>> = Arc::default();
    let sink = Arc::clone(&seen);

    let integration = Integration::builder(entry(Vendor::MelCloud), backend)
        .update_interval(Duration::ZERO)
        .on_event(move |event| sink.lock().unwrap().push(event.clone()))
        .setup()
        .await
        .unwrap();
    let climates = integration.climate_entities();
    let climate = &climates[0];

    climate.set_hvac_mode("cool").await.unwrap();
    handles[0].go_offline(true);
    climate.update().await.unwrap();

    let events = seen.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            Event::OperationModeChanged {
                device_id: "1".into(),
                mode: "cool".into(),
            },
            Event::AvailabilityChanged {
                device_id: "1".into(),
                available: false,
            },
        ]
    );
}

#[tokio::test]
async fn message_log_records_traffic() {
    common::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("traffic.ndjson");
    let (devices, handles) = two_units();
    let (backend, _) = FakeBackend::new(Vendor::MelCloud, true, Discovery::Devices(devices));

    let integration = Integration::builder(entry(Vendor::MelCloud), backend)
        .update_interval(Duration::ZERO)
        .message_log(MessageLogMode::Diffed, &path)
        .setup()
        .await
        .unwrap();
    let climates = integration.climate_entities();
    let climate = &climates[0];
    climate.update().await.unwrap();
    handles[0].edit(|s| s.room_temperature = Some(18.0));
    climate.update().await.unwrap();

    let lines: Vec<serde_json::Value> = std::fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["dir"], "login");
    assert_eq!(lines[0]["ok"], true);
    assert_eq!(lines[1]["full"], true);
    assert_eq!(lines[2]["changes"][0]["path"], "room_temperature");
    assert_eq!(lines[2]["changes"][0]["new"], 18.0);
}

#[tokio::test]
async fn failed_setup_leaves_no_message_log() {
    common::init_tracing();
    let dir = tempfile::tempdir().unwrap();

    let path = dir.path().join("rejected.ndjson");
    let (backend, _) = FakeBackend::new(Vendor::MelCloud, false, Discovery::Devices(vec![]));
    let err = Integration::builder(entry(Vendor::MelCloud), backend)
        .message_log(MessageLogMode::Full, &path)
        .setup()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotReady(_)));
    assert!(!path.exists());

    let path = dir.path().join("unreachable.ndjson");
    let (backend, _) = FakeBackend::new(Vendor::MelCloud, true, Discovery::ConnectionError);
    let err = Integration::builder(entry(Vendor::MelCloud), backend)
        .message_log(MessageLogMode::Full, &path)
        .setup()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotReady(_)));
    assert!(!path.exists());
}

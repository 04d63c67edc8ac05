use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::diff::state_events;
use crate::logger::MessageLogger;
use crate::types::*;
use crate::vendor::{Vendor, VendorDevice};
use crate::Result;

pub const MIN_TIME_BETWEEN_UPDATES: Duration = Duration::from_secs(60);

pub(crate) type EventCallback = Arc<dyn Fn(&Event) + Send + Sync>;

/// Lets a call through at most once per interval. Suppressed calls are
/// dropped, not deferred.
pub(crate) struct Throttle {
    interval: Duration,
    last_call: Option<Instant>,
}

impl Throttle {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: None,
        }
    }

    pub(crate) fn try_acquire(&mut self) -> bool {
        let now = Instant::now();
        if let Some(last) = self.last_call
            && now.duration_since(last) < self.interval
        {
            return false;
        }
        self.last_call = Some(now);
        true
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Wraps one vendor device: throttled polling, write forwarding and the
/// availability flag. Shared by every entity of the device.
pub struct MelDevice {
    device: Box<dyn VendorDevice>,
    vendor: Vendor,
    available: AtomicBool,
    throttle: Mutex<Throttle>,
    last_state: Mutex<DeviceState>,
    callbacks: Vec<EventCallback>,
    logger: Option<Arc<Mutex<MessageLogger>>>,
}

impl MelDevice {
    pub fn new(device: Box<dyn VendorDevice>, vendor: Vendor) -> Self {
        Self::with_interval(device, vendor, MIN_TIME_BETWEEN_UPDATES)
    }

    pub fn with_interval(
        device: Box<dyn VendorDevice>,
        vendor: Vendor,
        update_interval: Duration,
    ) -> Self {
        let last_state = device.state();
        Self {
            device,
            vendor,
            available: AtomicBool::new(true),
            throttle: Mutex::new(Throttle::new(update_interval)),
            last_state: Mutex::new(last_state),
            callbacks: Vec::new(),
            logger: None,
        }
    }

    pub(crate) fn with_hooks(
        mut self,
        callbacks: Vec<EventCallback>,
        logger: Option<Arc<Mutex<MessageLogger>>>,
    ) -> Self {
        self.callbacks = callbacks;
        self.logger = logger;
        self
    }

    /// Pull the latest state from the vendor, at most once per update
    /// interval. Connection failures only clear `available`.
    pub async fn update(&self) -> Result<()> {
        if !lock(&self.throttle).try_acquire() {
            trace!(device = %self.name(), "update throttled");
            return Ok(());
        }
        debug!(device = %self.name(), "updating");
        let result = self.device.update().await;
        self.settle(result)
    }

    /// Forward a property batch to the vendor in a single call. An empty
    /// batch never reaches the vendor.
    pub async fn set(&self, properties: Properties) -> Result<()> {
        if properties.is_empty() {
            trace!(device = %self.name(), "empty write skipped");
            return Ok(());
        }
        debug!(device = %self.name(), ?properties, "writing properties");
        if let Some(logger) = &self.logger {
            lock(logger).log_set(self.device_id(), &properties);
        }
        let result = self.device.set(&properties).await;
        self.settle(result)
    }

    fn settle(&self, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => {
                self.set_available(true);
                self.publish_state();
                Ok(())
            }
            Err(e) if e.is_connection() => {
                warn!(device = %self.name(), error = %e, "connection failed");
                self.set_available(false);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn set_available(&self, available: bool) {
        let previous = self.available.swap(available, Ordering::SeqCst);
        if previous != available {
            self.dispatch(&[Event::AvailabilityChanged {
                device_id: self.device_id().to_string(),
                available,
            }]);
        }
    }

    fn publish_state(&self) {
        let current = self.device.state();
        if let Some(logger) = &self.logger {
            lock(logger).log_poll(self.device_id(), &current);
        }
        let events = {
            let mut last = lock(&self.last_state);
            let events = state_events(self.device_id(), &last, &current);
            *last = current;
            events
        };
        if !events.is_empty() {
            debug!(device = %self.name(), count = events.len(), "state changed");
            self.dispatch(&events);
        }
    }

    fn dispatch(&self, events: &[Event]) {
        for event in events {
            for cb in &self.callbacks {
                cb(event);
            }
        }
    }

    pub fn available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    pub fn identity(&self) -> &DeviceIdentity {
        self.device.identity()
    }

    pub fn name(&self) -> &str {
        &self.identity().name
    }

    pub fn device_id(&self) -> &str {
        &self.identity().device_id
    }

    pub fn building_id(&self) -> Option<&str> {
        self.identity().building_id.as_deref()
    }

    /// State cached by the vendor library as of its last update.
    pub fn state(&self) -> DeviceState {
        self.device.state()
    }

    /// `None` until the vendor has fetched the device configuration.
    pub fn error_state(&self) -> Option<bool> {
        self.device.state().conf.map(|c| c.has_error)
    }

    pub fn has_wide_vane(&self) -> bool {
        self.device.state().conf.is_some_and(|c| c.has_wide_vane)
    }

    pub fn device_info(&self) -> DeviceInfo {
        self.vendor.device_info(self.identity())
    }
}

impl std::fmt::Debug for MelDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MelDevice")
            .field("vendor", &self.vendor)
            .field("identity", self.identity())
            .field("available", &self.available())
            .finish()
    }
}

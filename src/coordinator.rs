use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::client::XmlClient;
use crate::logger::{MessageLogMode, MessageLogger};
use crate::protocol::{self, WriteRequest};
use crate::types::*;
use crate::xml;
use crate::{Error, Result};

pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// What listeners are told after each refresh attempt.
#[derive(Debug)]
pub enum Update<'a> {
    Refreshed(&'a Arc<SystemSnapshot>),
    Failed(&'a Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&Update<'_>) + Send + Sync>;

pub struct CoordinatorBuilder {
    host: String,
    protocol: String,
    update_interval: Duration,
    request_timeout: Duration,
    listeners: Vec<Listener>,
    log_mode: Option<MessageLogMode>,
    log_path: Option<String>,
}

impl CoordinatorBuilder {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            protocol: "http".to_string(),
            update_interval: DEFAULT_UPDATE_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            listeners: Vec::new(),
            log_mode: None,
            log_path: None,
        }
    }

    pub fn protocol(mut self, proto: &str) -> Self {
        self.protocol = proto.to_string();
        self
    }

    pub fn update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn on_update(mut self, f: impl Fn(&Update<'_>) + Send + Sync + 'static) -> Self {
        self.listeners.push(Arc::new(f));
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<String>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<Coordinator> {
        if self.update_interval.is_zero() {
            return Err(Error::Config("update interval must be non-zero".to_string()));
        }

        let logger = match (self.log_mode, self.log_path) {
            (Some(mode), Some(path)) => Some(MessageLogger::new(mode, &path)?),
            _ => None,
        };

        let client = XmlClient::new(
            format!("{}://{}", self.protocol, self.host),
            self.request_timeout,
            logger,
        )?;

        let listeners = self
            .listeners
            .into_iter()
            .enumerate()
            .map(|(i, f)| (ListenerId(i as u64), f))
            .collect::<Vec<_>>();
        let next_listener_id = AtomicU64::new(listeners.len() as u64);

        Ok(Coordinator {
            host: self.host,
            client,
            update_interval: self.update_interval,
            refresh_lock: tokio::sync::Mutex::new(()),
            state: RwLock::new(Published::default()),
            listeners: RwLock::new(listeners),
            next_listener_id,
        })
    }
}

#[derive(Default)]
struct Published {
    snapshot: Option<Arc<SystemSnapshot>>,
    last_update_success: bool,
}

/// Owns the polling timeline for one controller.
///
/// Refreshes are serialized: a command-triggered refresh and a timer refresh
/// never interleave, and each one either publishes a complete snapshot or
/// leaves the previous one in place and clears `last_update_success`.
pub struct Coordinator {
    host: String,
    client: XmlClient,
    update_interval: Duration,
    refresh_lock: tokio::sync::Mutex<()>,
    state: RwLock<Published>,
    listeners: RwLock<Vec<(ListenerId, Listener)>>,
    next_listener_id: AtomicU64,
}

impl Coordinator {
    pub fn builder(host: impl Into<String>) -> CoordinatorBuilder {
        CoordinatorBuilder::new(host)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// Last good snapshot. Still returned after a failed refresh; check
    /// `last_update_success` before trusting it as current.
    pub fn snapshot(&self) -> Option<Arc<SystemSnapshot>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
            .clone()
    }

    pub fn last_update_success(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last_update_success
    }

    pub fn zone(&self, zone_id: u8) -> Option<ZoneState> {
        self.snapshot().and_then(|s| s.zone(zone_id).cloned())
    }

    /// The damper position stands in for a zone's temperature only while its
    /// sensor is out and the snapshot is current.
    pub fn damper_sensor_available(&self, zone_id: u8) -> bool {
        self.last_update_success()
            && self
                .zone(zone_id)
                .is_some_and(|zone| !zone.temp_sensor_available())
    }

    /// Login followed by a system data fetch, both answered with 200. Does not
    /// touch the published snapshot.
    pub async fn check_connection(&self) -> Result<()> {
        let checked = async {
            self.client
                .fetch(protocol::LOGIN_PATH, &protocol::login_query())
                .await?;
            self.client.fetch(protocol::SYSTEM_DATA_PATH, &[]).await?;
            Ok(())
        }
        .await;
        if let Err(ref e) = checked {
            warn!(host = %self.host, error = %e, "connection check failed");
        }
        checked
    }

    /// Listeners run on the refreshing task, after the refresh has published.
    pub fn add_listener(&self, f: impl Fn(&Update<'_>) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(f)));
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// Initial refresh before handing the coordinator to `spawn`.
    pub async fn first_refresh(&self) -> Result<Arc<SystemSnapshot>> {
        info!(host = %self.host, "performing first refresh");
        self.refresh().await
    }

    /// Poll every `update_interval`, starting one interval from now.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            let period = coordinator.update_interval;
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                // Outcome is already published and logged by refresh().
                let _ = coordinator.refresh().await;
            }
        })
    }

    pub async fn refresh(&self) -> Result<Arc<SystemSnapshot>> {
        let _guard = self.refresh_lock.lock().await;

        match self.fetch_snapshot().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                {
                    let mut state = self.write_state();
                    state.snapshot = Some(Arc::clone(&snapshot));
                    state.last_update_success = true;
                }
                debug!(
                    host = %self.host,
                    zones = snapshot.zones.len(),
                    "refresh complete"
                );
                self.notify(&Update::Refreshed(&snapshot));
                Ok(snapshot)
            }
            Err(cause) => {
                let err = Error::Refresh(Box::new(cause));
                self.write_state().last_update_success = false;
                warn!(host = %self.host, error = %err, "refresh failed");
                self.notify(&Update::Failed(&err));
                Err(err)
            }
        }
    }

    async fn fetch_snapshot(&self) -> Result<SystemSnapshot> {
        self.client
            .fetch(protocol::LOGIN_PATH, &protocol::login_query())
            .await?;

        let body = self.client.fetch(protocol::SYSTEM_DATA_PATH, &[]).await?;
        let doc = xml::parse_document(&body)?;
        let unit = xml::find_element(&doc, protocol::SYSTEM_ELEMENT)
            .map(xml::unit_control)
            .ok_or(Error::MissingData(protocol::SYSTEM_ELEMENT))?;

        let number_of_zones = u8::try_from(unit.number_of_zones).unwrap_or_else(|_| {
            warn!(reported = unit.number_of_zones, "zone count out of range, capping");
            u8::MAX
        });

        let mut zones = BTreeMap::new();
        for zone_id in 1..=number_of_zones {
            let body = self
                .client
                .fetch(protocol::ZONE_DATA_PATH, &protocol::zone_query(zone_id))
                .await?;
            let doc = xml::parse_document(&body)?;
            match xml::find_element(&doc, &protocol::zone_element(zone_id)) {
                Some(element) => {
                    zones.insert(zone_id, xml::zone_state(zone_id, element));
                }
                None => debug!(zone = zone_id, "no zone element in response, skipping"),
            }
        }

        Ok(SystemSnapshot {
            power: unit.power,
            mode: unit.mode,
            fan_speed: unit.fan_speed,
            central_desired_temp: unit.central_desired_temp,
            central_actual_temp: unit.central_actual_temp,
            number_of_zones,
            zones,
        })
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, Published> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Calls a copy of the listener list so listeners may add or remove listeners.
    fn notify(&self, update: &Update<'_>) {
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(update);
        }
    }

    // -- Command methods --

    /// 0 = off, 1 = on.
    pub async fn set_system_power(&self, power: u8) -> Result<()> {
        self.write_then_refresh(Ok(protocol::set_system_power(power))).await
    }

    pub async fn set_system_temp(&self, temp: f64) -> Result<()> {
        self.write_then_refresh(Ok(protocol::set_system_temp(temp))).await
    }

    /// 1 = low, 2 = medium, 3 = high.
    pub async fn set_fan_speed(&self, speed: u8) -> Result<()> {
        self.write_then_refresh(Ok(protocol::set_fan_speed(speed))).await
    }

    pub async fn set_zone_power(&self, zone_id: u8, power: u8) -> Result<()> {
        self.write_then_refresh(Ok(protocol::set_zone_power(zone_id, power))).await
    }

    /// Resends the zone's last known on/off setting with the new temperature.
    /// Fails with `UnknownZone` when the snapshot has no such zone.
    pub async fn set_zone_temp(&self, zone_id: u8, temp: f64) -> Result<()> {
        let request = self
            .zone(zone_id)
            .map(|zone| protocol::set_zone_temp(zone_id, temp, zone.setting))
            .ok_or(Error::UnknownZone(zone_id));
        self.write_then_refresh(request).await
    }

    /// 1 = cool, 2 = heat, 3 = fan only.
    pub async fn set_hvac_mode(&self, mode: u8) -> Result<()> {
        self.write_then_refresh(Ok(protocol::set_hvac_mode(mode))).await
    }

    /// `Off` powers the system down. Any other mode powers it up first if
    /// the last snapshot shows it off (or there is no snapshot yet).
    pub async fn set_climate_mode(&self, mode: HvacMode) -> Result<()> {
        let Some(code) = mode.code() else {
            return self.set_system_power(0).await;
        };
        let powered = self.snapshot().is_some_and(|s| s.is_on());
        let mut read_back = None;
        if !powered {
            match self.set_system_power(1).await {
                Ok(()) => {}
                // The power write went out; only the read-back failed.
                Err(e @ Error::Refresh(_)) => read_back = Some(e),
                Err(e) => return Err(e),
            }
        }
        let mode_set = self.set_hvac_mode(code).await;
        match read_back {
            Some(e) => Err(e),
            None => mode_set,
        }
    }

    /// Exactly one refresh follows the write step whatever its outcome. A
    /// failed write alone is returned as-is, a failed refresh alone as
    /// `Error::Refresh`, and both together as `Error::Command`.
    async fn write_then_refresh(&self, request: Result<WriteRequest>) -> Result<()> {
        let written = match request {
            Ok(request) => {
                debug!(action = request.action, zone = ?request.zone, "sending command");
                self.client.write(&request).await
            }
            Err(e) => Err(e),
        };
        if let Err(ref e) = written {
            warn!(host = %self.host, error = %e, "command failed");
        }

        let refreshed = self.refresh().await;
        match (written, refreshed) {
            (Ok(()), Ok(_)) => Ok(()),
            (Ok(()), Err(refresh)) => Err(refresh),
            (Err(write), Ok(_)) => Err(write),
            (Err(write), Err(refresh)) => Err(Error::Command {
                write: Box::new(write),
                refresh: Box::new(refresh),
            }),
        }
    }
}

use crate::device::DeviceStore;
use crate::prelude::{FleetError, FleetResult};
use crate::simulation::simulator::TelemetrySimulator;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

struct Running {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Owned recurring task that ticks a [`TelemetrySimulator`] on a fixed period.
///
/// `start` and `stop` are idempotent. Once `stop` returns no further tick runs.
pub struct SimulatorTask {
    simulator: Arc<Mutex<TelemetrySimulator>>,
    store: Arc<DeviceStore>,
    period: Duration,
    running: Mutex<Option<Running>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SimulatorTask {
    pub fn new(
        simulator: TelemetrySimulator,
        store: Arc<DeviceStore>,
        period: Duration,
    ) -> FleetResult<Self> {
        if period.is_zero() {
            return Err(FleetError::Configuration(
                "simulator period must be greater than zero".into(),
            ));
        }
        Ok(Self {
            simulator: Arc::new(Mutex::new(simulator)),
            store,
            period,
            running: Mutex::new(None),
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Spawns the recurring task on the current tokio runtime.
    ///
    /// Returns `false` when a task is already running.
    pub fn start(&self) -> FleetResult<bool> {
        let mut running = lock(&self.running);
        if let Some(active) = running.as_ref() {
            if !active.handle.is_finished() {
                return Ok(false);
            }
        }
        let runtime = Handle::try_current().map_err(|err| FleetError::Runtime(err.to_string()))?;
        let (shutdown, receiver) = watch::channel(false);
        let handle = runtime.spawn(run_ticks(
            self.simulator.clone(),
            self.store.clone(),
            self.period,
            receiver,
        ));
        *running = Some(Running { shutdown, handle });
        info!("simulator started (period {} ms)", self.period.as_millis());
        Ok(true)
    }

    /// Cancels the recurring task. Returns `false` when nothing was running.
    pub fn stop(&self) -> bool {
        let Some(active) = lock(&self.running).take() else {
            return false;
        };
        let _ = active.shutdown.send(true);
        active.handle.abort();
        // A tick already holding the simulator finishes before we return;
        // any later wakeup sees the shutdown flag under the same lock.
        drop(lock(&self.simulator));
        info!("simulator stopped");
        true
    }

    pub fn is_running(&self) -> bool {
        lock(&self.running)
            .as_ref()
            .map(|active| !active.handle.is_finished())
            .unwrap_or(false)
    }

    /// Runs a single tick outside the recurring schedule.
    pub fn tick_now(&self) -> FleetResult<()> {
        lock(&self.simulator).tick(&self.store).map(|_| ())
    }
}

impl Drop for SimulatorTask {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_ticks(
    simulator: Arc<Mutex<TelemetrySimulator>>,
    store: Arc<DeviceStore>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = interval.tick() => {
                let mut guard = lock(&simulator);
                if *shutdown.borrow() {
                    break;
                }
                if let Err(err) = guard.tick(&store) {
                    warn!("simulator tick failed: {}", err);
                }
            }
        }
    }
    debug!("simulator loop exited");
}

//! The relay orchestrator.

use std::{future::Future, time::Duration};

use bridge_relay_core::{
    Chain, ChainError, CommitmentReceiver, CommitmentSender, CommitmentStore, Init, RelayConfig,
    StoreError, TaskGroup,
    channel::commitment_channel,
    config::{Config, DatabaseConfig, EthereumConfig, SubstrateConfig},
};
use tokio::{
    sync::oneshot,
    time::{sleep, timeout},
};
use tracing::{info, warn};

use crate::{
    Metrics, RelayError, Side, WiringPlan,
    shutdown::{
        DEFAULT_GRACE_PERIOD, ProcessKiller, SelfTerminate, ShutdownState, ShutdownSupervisor,
        termination_signal,
    },
};

/// Owns the commitment store and both chain adapters and runs them as one task group.
#[derive(Debug)]
pub struct Relay {
    store: Box<dyn CommitmentStore>,
    source: Box<dyn Chain>,
    destination: Box<dyn Chain>,
    plan: WiringPlan,
    grace_period: Duration,
}

impl Relay {
    /// Builds the store and both adapters and wires them.
    ///
    /// The store is built first, from the receiving half of the commitment channel. Adapter
    /// builders get a reference to it. The Ethereum adapter is the source side, the Substrate
    /// adapter the destination side.
    pub fn new<S, FS, FE, FD>(
        config: &Config,
        store_builder: FS,
        source_builder: FE,
        destination_builder: FD,
    ) -> Result<Self, RelayError>
    where
        S: CommitmentStore + 'static,
        FS: FnOnce(&DatabaseConfig, CommitmentReceiver) -> Result<S, StoreError>,
        FE: FnOnce(&EthereumConfig, &S) -> Result<Box<dyn Chain>, ChainError>,
        FD: FnOnce(&SubstrateConfig, &S) -> Result<Box<dyn Chain>, ChainError>,
    {
        config.validate()?;

        let (commitments, receiver) = commitment_channel();
        let store = store_builder(&config.database, receiver)?;
        let source = source_builder(&config.ethereum, &store)
            .map_err(|err| RelayError::chain(Side::Source.to_string(), err))?;
        let destination = destination_builder(&config.substrate, &store)
            .map_err(|err| RelayError::chain(Side::Destination.to_string(), err))?;

        Self::from_components(&config.relay, Box::new(store), commitments, source, destination)
    }

    /// Wires already built components.
    ///
    /// `commitments` must feed the store. It is cloned into both adapters and dropped here, so
    /// the store sees its channel close once both adapters are gone.
    pub fn from_components(
        config: &RelayConfig,
        store: Box<dyn CommitmentStore>,
        commitments: CommitmentSender,
        mut source: Box<dyn Chain>,
        mut destination: Box<dyn Chain>,
    ) -> Result<Self, RelayError> {
        let plan = WiringPlan::new(config);
        plan.wire(&mut *source, &mut *destination, &commitments)
            .map_err(|err| RelayError::chain("wiring", err))?;

        info!(
            target: "relay::service",
            direction = %config.direction,
            headers_only = config.headers_only,
            "Relay wired"
        );
        Ok(Self { store, source, destination, plan, grace_period: DEFAULT_GRACE_PERIOD })
    }

    /// Overrides how long tasks get to wind down once the relay is cancelled.
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// The channel layout the relay was wired with.
    pub const fn plan(&self) -> &WiringPlan {
        &self.plan
    }

    /// Runs the relay until `SIGINT`, `SIGTERM` or the first task failure.
    ///
    /// Kills the process if tasks do not wind down within the grace period.
    pub async fn start(self) -> Result<ShutdownState, RelayError> {
        self.start_with(termination_signal(), SelfTerminate).await
    }

    /// Runs the relay until `signal` resolves or a task fails.
    ///
    /// Returns an error if the store or an adapter fails to start. Adapters that were started
    /// are stopped before this returns, whatever the outcome.
    pub async fn start_with<F, K>(self, signal: F, killer: K) -> Result<ShutdownState, RelayError>
    where
        F: Future<Output = ()> + Send + 'static,
        K: ProcessKiller,
    {
        let Self { mut store, mut source, mut destination, plan, grace_period } = self;
        Metrics::init();

        let mut supervisor = ShutdownSupervisor::new(grace_period, killer);
        let mut tasks = TaskGroup::new();
        supervisor.listen(&mut tasks, signal);

        if let Err(err) = store.start(&mut tasks).await {
            warn!(target: "relay::service", %err, "Commitment store failed to start");
            drain(tasks, grace_period).await;
            return Err(err.into());
        }

        let (first, second) = match plan.start_order() {
            [Side::Source, _] => (&mut source, &mut destination),
            [Side::Destination, _] => (&mut destination, &mut source),
        };
        let (to_first, from_second) = oneshot::channel();
        let (to_second, from_first) = oneshot::channel();

        match start_adapter(&mut **first, &mut tasks, from_second, to_second, grace_period).await {
            Some(Ok(())) => {}
            Some(Err(err)) => {
                let chain = first.name().to_string();
                warn!(target: "relay::service", %chain, %err, "Adapter failed to start");
                drain(tasks, grace_period).await;
                return Err(RelayError::chain(chain, err));
            }
            None => return Ok(supervisor.kill(|| first.stop())),
        }
        let first = StopGuard::new(&**first);

        match start_adapter(&mut **second, &mut tasks, from_first, to_first, grace_period).await {
            Some(Ok(())) => {}
            Some(Err(err)) => {
                let chain = second.name().to_string();
                warn!(target: "relay::service", %chain, %err, "Adapter failed to start");
                drain(tasks, grace_period).await;
                return Err(RelayError::chain(chain, err));
            }
            None => {
                return Ok(supervisor.kill(|| {
                    second.stop();
                    first.stop();
                }));
            }
        }
        let second = StopGuard::new(&**second);

        info!(target: "relay::service", tasks = tasks.len(), "Relay started");
        let state = supervisor
            .supervise(tasks, || {
                first.stop();
                second.stop();
            })
            .await;
        Ok(state)
    }
}

/// Starts `chain`, giving up once `tasks` has been cancelled for `grace_period`.
async fn start_adapter(
    chain: &mut dyn Chain,
    tasks: &mut TaskGroup,
    inbound: oneshot::Receiver<Init>,
    outbound: oneshot::Sender<Init>,
    grace_period: Duration,
) -> Option<Result<(), ChainError>> {
    let name = chain.name().to_string();
    let cancel = tasks.token();
    tokio::select! {
        result = chain.start(tasks, inbound, outbound) => Some(result),
        _ = async {
            cancel.cancelled().await;
            sleep(grace_period).await;
        } => {
            warn!(
                target: "relay::service",
                chain = %name,
                ?grace_period,
                "Adapter did not finish starting after cancellation"
            );
            None
        }
    }
}

/// Cancels `tasks` and gives them `grace_period` to finish.
async fn drain(tasks: TaskGroup, grace_period: Duration) {
    tasks.cancel();
    if timeout(grace_period, tasks.wait()).await.is_err() {
        warn!(target: "relay::service", ?grace_period, "Tasks did not stop in time, aborting them");
    }
}

/// Stops a started adapter when dropped.
#[derive(Debug)]
struct StopGuard<'a> {
    chain: &'a dyn Chain,
}

impl<'a> StopGuard<'a> {
    fn new(chain: &'a dyn Chain) -> Self {
        Metrics::record_adapter_started(chain.name());
        Self { chain }
    }

    fn stop(&self) {
        self.chain.stop();
    }
}

impl Drop for StopGuard<'_> {
    fn drop(&mut self) {
        self.chain.stop();
    }
}

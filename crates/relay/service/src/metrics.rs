use crate::ShutdownState;

/// Container for relay service metrics.
#[derive(Debug, Clone)]
pub(crate) struct Metrics;

impl Metrics {
    pub(crate) const SHUTDOWNS_TOTAL: &'static str = "bridge_relay_shutdowns_total";
    pub(crate) const ADAPTERS_STARTED_TOTAL: &'static str = "bridge_relay_adapters_started_total";

    pub(crate) fn init() {
        Self::describe();
        Self::zero();
    }

    fn describe() {
        metrics::describe_counter!(
            Self::SHUTDOWNS_TOTAL,
            metrics::Unit::Count,
            "Relay shutdowns by final state"
        );
        metrics::describe_counter!(
            Self::ADAPTERS_STARTED_TOTAL,
            metrics::Unit::Count,
            "Chain adapters started by the relay"
        );
    }

    fn zero() {
        for state in [ShutdownState::Terminated, ShutdownState::Killed] {
            metrics::counter!(Self::SHUTDOWNS_TOTAL, "state" => state.as_str()).increment(0);
        }
    }

    pub(crate) fn record_shutdown(state: ShutdownState) {
        metrics::counter!(Self::SHUTDOWNS_TOTAL, "state" => state.as_str()).increment(1);
    }

    pub(crate) fn record_adapter_started(chain: &str) {
        metrics::counter!(Self::ADAPTERS_STARTED_TOTAL, "chain" => chain.to_string()).increment(1);
    }
}

/// Container for commitment store metrics.
#[derive(Debug, Clone)]
pub(crate) struct Metrics;

impl Metrics {
    pub(crate) const STORE_COMMANDS_TOTAL: &'static str = "bridge_relay_store_commands_total";
    pub(crate) const STORE_ERRORS_TOTAL: &'static str = "bridge_relay_store_errors_total";
    pub(crate) const STORE_RECORDS: &'static str = "bridge_relay_store_records";

    const COMMANDS: [&'static str; 3] = ["create", "update", "delete"];

    pub(crate) fn init() {
        Self::describe();
        Self::zero();
    }

    fn describe() {
        metrics::describe_counter!(
            Self::STORE_COMMANDS_TOTAL,
            metrics::Unit::Count,
            "Total number of commitment store commands applied"
        );
        metrics::describe_counter!(
            Self::STORE_ERRORS_TOTAL,
            metrics::Unit::Count,
            "Total number of commitment store commands that failed"
        );
        metrics::describe_gauge!(
            Self::STORE_RECORDS,
            metrics::Unit::Count,
            "Number of BEEFY records held by the commitment store"
        );
    }

    fn zero() {
        for command in Self::COMMANDS {
            metrics::counter!(Self::STORE_COMMANDS_TOTAL, "command" => command).increment(0);
            metrics::counter!(Self::STORE_ERRORS_TOTAL, "command" => command).increment(0);
        }
        metrics::gauge!(Self::STORE_RECORDS).set(0.0);
    }

    pub(crate) fn record_command(command: &'static str, records: usize) {
        metrics::counter!(Self::STORE_COMMANDS_TOTAL, "command" => command).increment(1);
        metrics::gauge!(Self::STORE_RECORDS).set(records as f64);
    }

    pub(crate) fn record_error(command: &'static str) {
        metrics::counter!(Self::STORE_ERRORS_TOTAL, "command" => command).increment(1);
    }
}

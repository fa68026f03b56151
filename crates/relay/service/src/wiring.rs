//! Channel layout between the two adapters.

use std::fmt;

use bridge_relay_core::{
    Chain, ChainError, CommitmentSender, RelayConfig,
    channel::{header_channel, message_channel},
};
use tracing::debug;

/// One side of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The Ethereum adapter.
    Source,
    /// The Substrate adapter.
    Destination,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("ethereum"),
            Self::Destination => f.write_str("substrate"),
        }
    }
}

/// A directional relay pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Leg {
    /// Ethereum to Substrate.
    SourceToDest,
    /// Substrate to Ethereum.
    DestToSource,
}

impl Leg {
    /// Side observing its chain and producing heads and messages.
    pub const fn producer(&self) -> Side {
        match self {
            Self::SourceToDest => Side::Source,
            Self::DestToSource => Side::Destination,
        }
    }

    /// Side submitting heads and messages to its chain.
    pub const fn consumer(&self) -> Side {
        match self {
            Self::SourceToDest => Side::Destination,
            Self::DestToSource => Side::Source,
        }
    }
}

/// Channels built for one leg. The head channel is always built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegPlan {
    /// The leg.
    pub leg: Leg,
    /// Whether a message channel is built.
    pub messages: bool,
}

/// Which channels the relay builds and in which order it starts the adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WiringPlan {
    legs: Vec<LegPlan>,
}

impl WiringPlan {
    /// Derives the plan from the relay policy.
    pub fn new(config: &RelayConfig) -> Self {
        let messages = !config.headers_only;
        let mut legs = Vec::with_capacity(2);
        if config.direction.source_to_dest() {
            legs.push(LegPlan { leg: Leg::SourceToDest, messages });
        }
        if config.direction.dest_to_source() {
            legs.push(LegPlan { leg: Leg::DestToSource, messages });
        }
        Self { legs }
    }

    /// Active legs.
    pub fn legs(&self) -> &[LegPlan] {
        &self.legs
    }

    /// Returns the plan of `leg` if it is active.
    pub fn leg(&self, leg: Leg) -> Option<&LegPlan> {
        self.legs.iter().find(|plan| plan.leg == leg)
    }

    /// Adapter start order: the consumer of a single active leg starts first, so it is ready
    /// before anything is produced for it. With both legs active the source side starts first.
    pub fn start_order(&self) -> [Side; 2] {
        match self.legs.as_slice() {
            [only] => [only.leg.consumer(), only.leg.producer()],
            _ => [Side::Source, Side::Destination],
        }
    }

    /// Builds the channels and registers them with the adapters.
    pub(crate) fn wire(
        &self,
        source: &mut (dyn Chain + 'static),
        destination: &mut (dyn Chain + 'static),
        commitments: &CommitmentSender,
    ) -> Result<(), ChainError> {
        for plan in &self.legs {
            let (header_tx, header_rx) = header_channel();
            let (message_tx, message_rx) = if plan.messages {
                let (tx, rx) = message_channel();
                (Some(tx), Some(rx))
            } else {
                (None, None)
            };

            let (producer, consumer) = match plan.leg {
                Leg::SourceToDest => (&mut *source, &mut *destination),
                Leg::DestToSource => (&mut *destination, &mut *source),
            };
            debug!(
                target: "relay::service",
                from = producer.name(),
                to = consumer.name(),
                messages = plan.messages,
                "Wiring relay leg"
            );

            consumer.set_sender(message_rx, Some(header_rx), commitments.clone())?;
            producer.set_receiver(message_tx, Some(header_tx), commitments.clone())?;
        }
        Ok(())
    }
}

impl fmt::Display for WiringPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, plan) in self.legs.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            let carries = if plan.messages { "headers, messages" } else { "headers" };
            write!(f, "{} -> {}: {carries}", plan.leg.producer(), plan.leg.consumer())?;
        }
        let [first, second] = self.start_order();
        write!(f, "\nstart order: {first}, {second}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{EventLog, RecordingChain};
    use alloy_primitives::{B256, Bytes};
    use bridge_relay_core::{
        Direction, HeadRecord, Header, MessageBatch, channel::commitment_channel,
    };
    use rstest::rstest;

    #[rstest]
    #[case::bidirectional(Direction::Bidirectional, false, &[Leg::SourceToDest, Leg::DestToSource])]
    #[case::forward(Direction::SourceToDest, false, &[Leg::SourceToDest])]
    #[case::backward(Direction::DestToSource, true, &[Leg::DestToSource])]
    fn test_plan_legs(
        #[case] direction: Direction,
        #[case] headers_only: bool,
        #[case] expected: &[Leg],
    ) {
        let plan = WiringPlan::new(&RelayConfig::new(direction, headers_only));
        let legs: Vec<Leg> = plan.legs().iter().map(|plan| plan.leg).collect();
        assert_eq!(legs, expected);
        assert!(plan.legs().iter().all(|plan| plan.messages != headers_only));
    }

    #[rstest]
    #[case(Direction::Bidirectional, [Side::Source, Side::Destination])]
    #[case(Direction::SourceToDest, [Side::Destination, Side::Source])]
    #[case(Direction::DestToSource, [Side::Source, Side::Destination])]
    fn test_start_order(#[case] direction: Direction, #[case] expected: [Side; 2]) {
        assert_eq!(WiringPlan::new(&RelayConfig::new(direction, false)).start_order(), expected);
    }

    #[rstest]
    #[case::bidirectional(Direction::Bidirectional)]
    #[case::forward(Direction::SourceToDest)]
    #[case::backward(Direction::DestToSource)]
    fn test_wire_registers_channels(
        #[case] direction: Direction,
        #[values(false, true)] headers_only: bool,
    ) {
        let log = EventLog::new();
        let mut source = RecordingChain::new("ethereum", log.clone());
        let mut destination = RecordingChain::new("substrate", log.clone());
        let (commitments, _rx) = commitment_channel();

        let config = RelayConfig::new(direction, headers_only);
        WiringPlan::new(&config).wire(&mut source, &mut destination, &commitments).unwrap();

        let forward = direction.source_to_dest();
        let backward = direction.dest_to_source();
        let messages = !headers_only;

        // What the destination reads and the source writes belongs to the forward leg.
        assert_eq!(destination.reads(), forward.then_some((messages, true)));
        assert_eq!(source.writes(), forward.then_some((messages, true)));
        assert_eq!(source.reads(), backward.then_some((messages, true)));
        assert_eq!(destination.writes(), backward.then_some((messages, true)));
    }

    #[tokio::test]
    async fn test_wired_legs_are_connected() {
        let log = EventLog::new();
        let mut source = RecordingChain::new("ethereum", log.clone());
        let mut destination = RecordingChain::new("substrate", log.clone());
        let (commitments, _rx) = commitment_channel();

        let plan = WiringPlan::new(&RelayConfig::new(Direction::SourceToDest, false));
        plan.wire(&mut source, &mut destination, &commitments).unwrap();

        let (Some(message_tx), Some(header_tx)) = source.take_writers() else {
            panic!("source leg not wired");
        };
        let (Some(mut message_rx), Some(mut header_rx)) = destination.take_readers() else {
            panic!("destination leg not wired");
        };

        let head = HeadRecord::new(1000, 9, B256::repeat_byte(9), Bytes::new());
        let forward = tokio::spawn({
            let head = head.clone();
            async move {
                header_tx.send(Header::new(head.clone())).await.unwrap();
                message_tx.send(MessageBatch::new(head.number, head.hash, vec![])).await.unwrap();
            }
        });

        assert_eq!(header_rx.recv().await.unwrap().head, head);
        assert!(message_rx.recv().await.unwrap().belongs_to(&head));
        forward.await.unwrap();
    }

    #[test]
    fn test_display_plan() {
        let plan = WiringPlan::new(&RelayConfig::new(Direction::Bidirectional, true));
        assert_eq!(
            plan.to_string(),
            "ethereum -> substrate: headers\nsubstrate -> ethereum: headers\nstart order: ethereum, substrate"
        );
    }
}

//! BEEFY commitment store of the bridge relay.
//!
//! Both chain adapters report the BEEFY commitments they witness and the progress of their
//! verification on Ethereum as [`StoreCommand`](bridge_relay_core::StoreCommand)s. The
//! [`BeefyDatabase`] drains those commands on a single worker task, keeps the records in memory
//! and optionally journals them to a JSON lines file, replayed on start.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod database;
pub use database::{BeefyDatabase, BeefyReader};

mod journal;

mod metrics;
pub(crate) use metrics::Metrics;

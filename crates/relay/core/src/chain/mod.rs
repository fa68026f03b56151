//! The chain adapter contract.

mod traits;
pub use traits::Chain;

mod types;
pub use types::{HeadRecord, Header, Init, Message, MessageBatch};

mod error;
pub use error::ChainError;

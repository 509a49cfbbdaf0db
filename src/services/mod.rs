pub mod ingestion;
pub mod notification;
pub mod pipeline;
pub mod rivalry_ledger;
pub mod server;
pub mod standings;

pub use notification::{LogNotifier, Notifier};
pub use pipeline::{DeliveryOutcome, RoundPipeline};

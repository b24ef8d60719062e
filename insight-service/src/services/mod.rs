pub mod activity;
pub mod analysis;
pub mod authorization;
pub mod metrics;
pub mod providers;
pub mod records;

pub use analysis::ModelProxy;
pub use authorization::{AccessScope, AuthorizationGate};
pub use providers::gateway::GatewayChatProvider;
pub use records::{PostgrestRecordStore, RecordStore};

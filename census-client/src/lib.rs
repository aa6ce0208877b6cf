pub mod api;
pub mod processing;
pub mod snapshot;

pub use api::{CensusClient, GroupTable};
pub use processing::{clean_label, process_table, split_label};
pub use snapshot::{fetch_snapshot, CensusSnapshot};

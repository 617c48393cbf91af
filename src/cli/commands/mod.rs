//! CLI command implementations.

mod ask;
mod config;
mod doctor;
mod eval;
mod index;
mod ingest;
mod init;
mod list;
mod search;
mod telemetry;
mod weather;

pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use eval::run_eval;
pub use index::run_index;
pub use ingest::run_ingest;
pub use init::run_init;
pub use list::run_list;
pub use search::run_search;
pub use telemetry::run_telemetry;
pub use weather::run_weather;

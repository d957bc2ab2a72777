pub mod aggregate;
pub mod board;
pub mod config;
pub mod db;
pub mod logs;
pub mod models;
pub mod source;
pub mod supabase;
mod utils;

use log::info;

pub use aggregate::{aggregate, FetchError};
pub use board::{partition, BoardStats, EventBoard};
pub use config::{AppConfig, Backend, ConfigError};
pub use db::SqliteStore;
pub use models::{Difficulty, EnrichedEvent, Event, EventType};
pub use source::{EventSource, QueryError};
pub use supabase::{SupabaseConfig, SupabaseSource};

/// Builds the event source selected by `config.backend`.
pub fn open_source(config: &AppConfig) -> anyhow::Result<Box<dyn EventSource>> {
    match config.backend {
        Backend::Supabase => {
            let supabase = config.supabase()?;
            info!("reading events from {}", supabase.url);
            Ok(Box::new(SupabaseSource::new(&supabase)?))
        }
        Backend::Sqlite => {
            let store = SqliteStore::open(config.sqlite_path());
            info!("reading events from {:?}", store.path());
            Ok(Box::new(store))
        }
    }
}

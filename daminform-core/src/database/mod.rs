pub mod ports;
pub mod postgres;

pub use ports::{AssetStore, DispatchState, QueueStore, RelationshipStore};
pub use postgres::PostgresDatabase;

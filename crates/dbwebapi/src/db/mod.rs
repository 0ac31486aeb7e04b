//! HANA access: connection pool, timeout guard, database context

mod context;
mod guard;
mod pool;

pub use context::DbContext;
pub use guard::QueryGuard;
pub use pool::{ConnectionManager, Pool, PooledConnection, create_pool, get_connection};

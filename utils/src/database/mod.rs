mod statement;

pub use deadpool_postgres::{Pool, PoolError};
pub use postgres_from_row::FromRow;
pub use statement::{Assignments, Statement};
pub use {deadpool_postgres, tokio_postgres};

mod memory;
mod poem;
pub(crate) mod postgres;
mod store;

pub use memory::MemoryPoemStore;
pub use poem::*;
pub use postgres::PgPoemStore;
pub use store::{PoemStore, StoreError};

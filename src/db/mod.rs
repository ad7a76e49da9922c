pub mod memory;
pub mod postgres;
pub mod repository;
pub mod seed;

pub use memory::InMemoryRepository;
pub use postgres::{create_pool, run_migrations, PgRepository, PgTransactionRepository};
pub use repository::Repository;
#[cfg(test)]
pub use repository::MockRepository;

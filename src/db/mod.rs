pub mod memory;
pub mod pool;
pub mod postgres;
pub mod queries;
pub mod repository;

pub use memory::InMemoryRepository;
pub use pool::create_pool;
pub use postgres::PgRepository;
pub use repository::VerificationRepository;

pub mod cache;
pub mod db;
pub mod memory;

pub use cache::{DisabledCache, RedisCache};
pub use db::DbAdapter;
pub use memory::MemoryDb;

pub mod domain;
pub mod ports;

pub use domain::{AuthSession, NewUser, Project, User, UserCredentials};
pub use ports::{CacheService, DatabaseService, PortError, PortResult};

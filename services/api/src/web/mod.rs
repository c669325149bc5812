pub mod auth;
pub mod middleware;
pub mod models;
pub mod projects;
pub mod rest;
pub mod router;
pub mod state;

// Re-export the router builder to make it easily accessible
// to the binary that will serve it.
pub use router::build_router;

pub mod classify;
pub mod emails;
pub mod handlers;
pub mod routes;
pub mod scrape;
pub mod speakers;

pub use routes::create_router;

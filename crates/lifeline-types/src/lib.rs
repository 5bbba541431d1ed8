pub mod api;
pub mod districts;
pub mod models;

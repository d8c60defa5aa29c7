mod connection;
pub mod helpers;
mod migrations;
pub mod models;
mod repositories;
pub mod store;

pub use connection::Database;
pub use store::{Collection, Document, DocumentStore, SetMode};

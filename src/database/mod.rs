pub mod connection;
pub mod events;
pub mod feed;
pub mod models;
pub mod opponents;
pub mod rivalries;
pub mod rounds;
pub mod series;
pub mod setup;

pub use connection::{create_pool, get_connection, with_retry, DbConn, DbPool};
pub use models::*;

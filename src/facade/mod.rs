pub mod database;
pub mod session;

pub use database::JsonDB;
pub use session::Session;

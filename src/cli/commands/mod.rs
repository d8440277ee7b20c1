pub mod db;
pub mod session;
pub mod user;

pub mod manager;
pub mod models;
pub mod patch;
pub mod postgres;
pub mod schemas;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use patch::{EntitySchema, FieldSpec, FieldType, Patch, PatchError, PatchValue};
pub use postgres::PgStore;
pub use store::Store;

pub mod db;
pub mod file_store;

pub use db::PgDonorStore;
pub use file_store::JsonFileStore;

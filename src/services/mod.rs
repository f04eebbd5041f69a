// Service exports
pub mod catalog;
pub mod store;

pub use catalog::{load_breed_table, BreedCatalog};
pub use store::{RecordStore, StoreError};

//! Infrastructure layer: tenant-scoped persistence.

pub mod store;

pub use store::{
    InMemoryScopedStore, Page, PageRequest, PostgresScopedStore, ScopedStore, StoreError,
};

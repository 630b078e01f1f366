//! Storage handle shared by the request handlers. Each operation opens its
//! own transaction scope (or lock) and closes it before returning.

pub mod department;
pub mod employee;
pub mod memory;
mod postgres;

use std::sync::Arc;

use sqlx::PgPool;

use memory::MemoryStore;

#[derive(Clone)]
pub enum Storage {
    Postgres(PgPool),
    Memory(Arc<MemoryStore>),
}

impl Storage {
    pub fn memory() -> Self {
        Storage::Memory(Arc::new(MemoryStore::default()))
    }
}

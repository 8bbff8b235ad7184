// crates/keepsake-server/src/db/mod.rs
// Async SQLite storage layer (rusqlite + deadpool-sqlite)

mod memories;
mod pool;
mod questions;
mod schema;
mod summaries;

pub use memories::{
    MemoryFilter, NewMemory, get_memory, insert_memory, list_memories, memories_for_day,
    parse_memory_row, recent_window,
};
pub use pool::DatabasePool;
pub use questions::{insert_question, list_questions, questions_for_day};
pub use summaries::{get_summary, list_summaries, upsert_summary};

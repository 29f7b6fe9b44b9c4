#![forbid(unsafe_code)]

pub mod repository;
pub mod sample;
pub mod sqlite;

pub use repository::{
    AttemptRow, InMemoryRepository, ProgressHistory, ProgressSink, QuestionBank, QuestionSource,
    Storage, StorageError,
};

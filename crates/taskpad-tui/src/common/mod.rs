//! Shared UI building blocks.

pub mod form;
pub mod task;

pub use form::Field;
pub use task::{TaskId, TaskKind, TaskSeq, TaskState, Tasks};

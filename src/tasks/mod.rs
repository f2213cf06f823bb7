// src/tasks/mod.rs

//! One-shot maintenance tasks, run at startup or from an operator hook.

pub mod embeddings;

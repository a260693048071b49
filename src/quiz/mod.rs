// src/quiz/mod.rs
//
// The in-house core: everything here is plain state and pure functions.
// Collaborator I/O (database, AI, payments) stays in handlers/ and services/.

pub mod countdown;
pub mod history;
pub mod prompt;
pub mod resolver;
pub mod result;
pub mod session;

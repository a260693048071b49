// src/services/mod.rs
//
// Outbound collaborator clients. Each external system sits behind a narrow
// trait so handlers (and tests) never touch the wire format directly.

pub mod ai;
pub mod email;
pub mod payments;

// src/lib.rs

// Account operations: store, hashing, tokens, service, HTTP dispatcher
pub mod accounts;

// HTTP server wiring
pub mod server;

//! HTTP API: routing, request/response mapping, and server wiring.

pub mod app;

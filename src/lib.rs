//! Classroom Hub - Realtime connection hub for a classroom platform
//!
//! Keeps one WebSocket per connected device, routes course chat to the
//! other members of a course and pushes targeted notifications to their
//! recipients. Liveness is monitored with server pings.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;

//! Fareline - Conversational Flight Search Assistant
//!
//! This crate implements the conversational core of a flight-search
//! assistant: a slot-filling dialogue state machine that collects origin,
//! destination, date, and preference from free-text turns, and a
//! multi-criteria ranking engine that scores and categorizes candidate
//! flight offers. External collaborators (flight data, city resolution,
//! session storage) sit behind ports with in-process adapters.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

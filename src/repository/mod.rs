//! Explicit query functions per entity. Every function takes the connection
//! it runs on; nothing here holds a connection of its own.

pub mod diagnosis;
pub mod patient;
pub mod sample;

//! HTTP handlers for the person CRUD surface.

pub mod persons;

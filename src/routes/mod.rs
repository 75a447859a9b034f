pub mod common;
pub mod persons;

pub use common::common_routes;
pub use persons::person_routes;

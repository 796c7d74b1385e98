pub mod routes;
pub mod startup;
pub mod context;
pub mod errors;
pub mod openapi;

pub use startup::run;

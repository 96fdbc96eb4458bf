#![doc = "The `tasknest` library crate."]
#![doc = ""]
#![doc = "This crate contains the core business logic, domain models, authentication"]
#![doc = "mechanisms, persistence contracts, routing configuration, and error handling"]
#![doc = "for the TaskNest application. It is used by the main binary (`main.rs`) to"]
#![doc = "construct and run the application, and by the integration tests to build the"]
#![doc = "same app on top of the in-memory store."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

// lib.rs primarily declares modules for the library crate. The application
// setup (app factory) lives in main.rs and is mirrored inline by the
// integration tests, since actix's HttpServiceFactory trait bounds make a
// shared factory function awkward to express here.

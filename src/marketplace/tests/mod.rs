//! Unit and service-level tests for the marketplace module.

mod helpers;

mod domain_tests;
mod review_service_tests;

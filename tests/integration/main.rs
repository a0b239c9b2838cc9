//! HTTP-level integration tests for the storage server.

mod auth_test;
mod fs_test;
mod helpers;
mod routing_test;
mod scenario_test;

//! Integration tests for the transport and the execution controller.

pub mod controller_test;
pub mod server;
pub mod transport_test;

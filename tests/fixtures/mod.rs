//! Test fixtures shared by the integration suites
#![allow(dead_code)]

pub mod mock_services;
pub mod test_data;

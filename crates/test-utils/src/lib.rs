//! Generators and fakes shared by the tests of the stake mirror crates.

pub mod gateway;
pub mod prelude;
pub mod tx;

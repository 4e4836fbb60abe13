//! Access to the contracts of the destination chain.
//!
//! [`gateway::DestinationGateway`] is the seam the mirror engine is written against.
//! [`evm::EvmGateway`] implements it on top of an `alloy` provider.

pub mod bindings;
pub mod config;
pub mod errors;
pub mod evm;
pub mod gateway;

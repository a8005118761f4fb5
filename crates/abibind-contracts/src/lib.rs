//! # abibind-contracts
//!
//! Typed bindings for the store registry, relay registry and payment
//! factory contracts. The modules are generated by `build.rs` from the JSON
//! ABIs under `abis/` and run on `abibind-runtime`.

#![warn(clippy::all)]

/// Store registry (ERC-721 store ownership and access control)
#[allow(clippy::too_many_arguments, clippy::type_complexity)]
pub mod reg_store {
    include!(concat!(env!("OUT_DIR"), "/reg_store.rs"));
}

/// Relay registry (ERC-721 relay tokens with metadata)
#[allow(clippy::too_many_arguments, clippy::type_complexity)]
pub mod reg_relay {
    include!(concat!(env!("OUT_DIR"), "/reg_relay.rs"));
}

/// Payment factory (deterministic payment addresses)
#[allow(clippy::too_many_arguments, clippy::type_complexity)]
pub mod payment_factory {
    include!(concat!(env!("OUT_DIR"), "/payment_factory.rs"));
}

pub use payment_factory::PaymentFactory;
pub use reg_relay::RegRelay;
pub use reg_store::RegStore;

//! The cNGN contract set.

use starknet::core::types::Felt;

use crate::ContractSpec;

/// The cNGN contracts in declaration order.
///
/// Both operations contracts only take the owner. The forwarder is bound to
/// `Operations2`, and each token is bound to the forwarder and its operations
/// contract.
pub fn cngn_contracts(owner: Felt) -> Vec<ContractSpec> {
    vec![
        ContractSpec::new("Operations").literal(owner),
        ContractSpec::new("Operations2").literal(owner),
        ContractSpec::new("Cngn")
            .address_of("Forwarder")
            .address_of("Operations")
            .literal(owner),
        ContractSpec::new("Cngn2")
            .address_of("Forwarder")
            .address_of("Operations2")
            .literal(owner),
        ContractSpec::new("Forwarder")
            .address_of("Operations2")
            .literal(owner),
    ]
}

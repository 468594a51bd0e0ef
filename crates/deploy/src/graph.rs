//! Contract specifications and their deployment order.
//!
//! Contracts form a small static dependency graph: an edge `A -> B` exists when
//! one of `B`'s constructor arguments is the address of `A`. Declarations have no
//! cross-contract dependency; deployments follow a topological order of the graph.

use std::collections::{BTreeSet, HashMap};

use starknet::core::types::Felt;

use crate::{DeployError, InstanceRecord};

/// One constructor argument of a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructorArg {
    /// A value known before the run starts (e.g. the owner address).
    Literal(Felt),
    /// The address of a contract deployed earlier in the run.
    AddressOf(String),
}

/// A deployable contract and the shape of its constructor calldata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSpec {
    pub name: String,
    pub constructor_args: Vec<ConstructorArg>,
}

impl ContractSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constructor_args: Vec::new(),
        }
    }

    /// Append a literal constructor argument.
    pub fn literal(mut self, value: Felt) -> Self {
        self.constructor_args.push(ConstructorArg::Literal(value));
        self
    }

    /// Append the address of `contract` as a constructor argument.
    pub fn address_of(mut self, contract: impl Into<String>) -> Self {
        self.constructor_args
            .push(ConstructorArg::AddressOf(contract.into()));
        self
    }

    /// Names of the contracts whose address this contract needs.
    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.constructor_args.iter().filter_map(|arg| match arg {
            ConstructorArg::AddressOf(name) => Some(name.as_str()),
            ConstructorArg::Literal(_) => None,
        })
    }

    /// Resolve the constructor calldata against the contracts deployed so far.
    pub fn calldata(
        &self,
        deployed: &HashMap<String, InstanceRecord>,
    ) -> Result<Vec<Felt>, DeployError> {
        self.constructor_args
            .iter()
            .map(|arg| match arg {
                ConstructorArg::Literal(value) => Ok(*value),
                ConstructorArg::AddressOf(name) => deployed
                    .get(name)
                    .map(|instance| instance.address)
                    .ok_or_else(|| {
                        DeployError::DependencyGraph(format!(
                            "{} needs the address of {} which is not deployed yet",
                            self.name, name
                        ))
                    }),
            })
            .collect()
    }
}

/// The validated contract set with its deployment order.
#[derive(Debug, Clone)]
pub struct DeploymentGraph {
    contracts: Vec<ContractSpec>,
    /// Indices into `contracts`, in deployment order.
    deploy_order: Vec<usize>,
}

impl DeploymentGraph {
    /// Validate `contracts` (given in declaration order) and compute the deploy order.
    ///
    /// Fails on duplicate names, references to unknown contracts and cycles.
    pub fn new(contracts: Vec<ContractSpec>) -> Result<Self, DeployError> {
        let mut index = HashMap::with_capacity(contracts.len());
        for (i, spec) in contracts.iter().enumerate() {
            if index.insert(spec.name.as_str(), i).is_some() {
                return Err(DeployError::DependencyGraph(format!(
                    "contract {} is listed twice",
                    spec.name
                )));
            }
        }

        let mut in_degree = vec![0usize; contracts.len()];
        let mut dependents = vec![Vec::new(); contracts.len()];
        for (i, spec) in contracts.iter().enumerate() {
            for dependency in spec.dependencies() {
                let &j = index.get(dependency).ok_or_else(|| {
                    DeployError::DependencyGraph(format!(
                        "{} depends on unknown contract {}",
                        spec.name, dependency
                    ))
                })?;
                in_degree[i] += 1;
                dependents[j].push(i);
            }
        }

        // Kahn's algorithm, always picking the earliest declared ready contract.
        let mut ready: BTreeSet<usize> = (0..contracts.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();
        let mut deploy_order = Vec::with_capacity(contracts.len());
        while let Some(i) = ready.pop_first() {
            deploy_order.push(i);
            for &k in &dependents[i] {
                in_degree[k] -= 1;
                if in_degree[k] == 0 {
                    ready.insert(k);
                }
            }
        }

        if deploy_order.len() != contracts.len() {
            let stuck: Vec<&str> = contracts
                .iter()
                .enumerate()
                .filter(|(i, _)| in_degree[*i] > 0)
                .map(|(_, spec)| spec.name.as_str())
                .collect();
            return Err(DeployError::DependencyGraph(format!(
                "dependency cycle between {}",
                stuck.join(", ")
            )));
        }

        Ok(Self {
            contracts,
            deploy_order,
        })
    }

    /// Contracts in declaration order.
    pub fn contracts(&self) -> &[ContractSpec] {
        &self.contracts
    }

    /// Contracts in deployment order.
    pub fn deploy_order(&self) -> impl Iterator<Item = &ContractSpec> {
        self.deploy_order.iter().map(|&i| &self.contracts[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<'a>(specs: impl Iterator<Item = &'a ContractSpec>) -> Vec<&'a str> {
        specs.map(|spec| spec.name.as_str()).collect()
    }

    #[test]
    fn test_dependencies_deploy_first() {
        let owner = Felt::from(7u8);
        let graph = DeploymentGraph::new(vec![
            ContractSpec::new("B").address_of("A").literal(owner),
            ContractSpec::new("A").literal(owner),
        ])
        .unwrap();

        assert_eq!(names(graph.contracts().iter()), vec!["B", "A"]);
        assert_eq!(names(graph.deploy_order()), vec!["A", "B"]);
    }

    #[test]
    fn test_ties_keep_declaration_order() {
        let graph = DeploymentGraph::new(vec![
            ContractSpec::new("C").address_of("B"),
            ContractSpec::new("A"),
            ContractSpec::new("B"),
        ])
        .unwrap();

        assert_eq!(names(graph.deploy_order()), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_unknown_dependency_is_rejected() {
        let result = DeploymentGraph::new(vec![ContractSpec::new("A").address_of("Missing")]);

        assert!(matches!(result, Err(DeployError::DependencyGraph(_))));
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let result = DeploymentGraph::new(vec![ContractSpec::new("A"), ContractSpec::new("A")]);

        assert!(matches!(result, Err(DeployError::DependencyGraph(_))));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let result = DeploymentGraph::new(vec![
            ContractSpec::new("A").address_of("B"),
            ContractSpec::new("B").address_of("A"),
            ContractSpec::new("C"),
        ]);

        let err = result.unwrap_err();
        assert!(err.to_string().contains("A, B"));
    }

    #[test]
    fn test_calldata_resolves_addresses_in_argument_order() {
        let spec = ContractSpec::new("B")
            .address_of("A")
            .literal(Felt::from(0xe1u32));
        let deployed = HashMap::from([(
            "A".to_string(),
            InstanceRecord {
                address: Felt::from(0xa1u32),
            },
        )]);

        assert_eq!(
            spec.calldata(&deployed).unwrap(),
            vec![Felt::from(0xa1u32), Felt::from(0xe1u32)]
        );
        assert!(spec.calldata(&HashMap::new()).is_err());
    }
}

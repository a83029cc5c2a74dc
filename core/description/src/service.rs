// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use soap_codec::CodecKind;
use tracing::{info, warn};

use crate::contract::ContractDescription;
use crate::errors::DescriptionError;
use crate::metadata::OperationContract;
use crate::operation::OperationDescription;
use crate::parameter::ParameterBinding;
use crate::signature::MethodSignature;

/// All operations of one contract, indexed by SOAP action.
#[derive(Debug)]
pub struct ServiceDescription {
    contract: Arc<ContractDescription>,
    operations: Vec<Arc<OperationDescription>>,
    by_action: HashMap<String, usize>,
}

impl ServiceDescription {
    pub fn builder(contract: ContractDescription) -> ServiceDescriptionBuilder {
        ServiceDescriptionBuilder::new(contract)
    }

    pub fn contract(&self) -> &Arc<ContractDescription> {
        &self.contract
    }

    /// Operation whose action equals `action` exactly (case-sensitive, no
    /// normalization)
    pub fn operation_by_action(&self, action: &str) -> Option<&Arc<OperationDescription>> {
        self.by_action.get(action).map(|i| &self.operations[*i])
    }

    pub fn operation_by_name(&self, name: &str) -> Option<&Arc<OperationDescription>> {
        self.operations.iter().find(|op| op.name() == name)
    }

    /// Operations in registration order
    pub fn operations(&self) -> impl Iterator<Item = &Arc<OperationDescription>> {
        self.operations.iter()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Collects the methods of a contract and validates them as a whole.
#[derive(Debug)]
pub struct ServiceDescriptionBuilder {
    contract: ContractDescription,
    methods: Vec<(MethodSignature, OperationContract)>,
    overrides: HashMap<String, OperationContract>,
    default_codec: Option<CodecKind>,
}

impl ServiceDescriptionBuilder {
    pub fn new(contract: ContractDescription) -> Self {
        ServiceDescriptionBuilder {
            contract,
            methods: Vec::new(),
            overrides: HashMap::new(),
            default_codec: None,
        }
    }

    /// Register a method without operation-level overrides
    pub fn operation(self, signature: MethodSignature) -> Self {
        self.operation_with(signature, OperationContract::default())
    }

    pub fn operation_with(mut self, signature: MethodSignature, metadata: OperationContract) -> Self {
        self.methods.push((signature, metadata));
        self
    }

    /// Replace the metadata of methods by declared method name. Every key
    /// must name a registered method.
    pub fn with_overrides(mut self, overrides: HashMap<String, OperationContract>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    /// Codec for operations whose metadata does not choose one
    pub fn with_default_codec(mut self, codec: CodecKind) -> Self {
        self.default_codec = Some(codec);
        self
    }

    pub fn build(self) -> Result<ServiceDescription, DescriptionError> {
        let ServiceDescriptionBuilder {
            contract,
            methods,
            mut overrides,
            default_codec,
        } = self;
        let contract = Arc::new(contract);

        let mut operations: Vec<Arc<OperationDescription>> = Vec::with_capacity(methods.len());
        let mut by_action: HashMap<String, usize> = HashMap::new();

        for (signature, metadata) in methods {
            let mut metadata = overrides.remove(signature.name()).unwrap_or(metadata);
            if let (None, Some(codec)) = (metadata.codec(), default_codec) {
                metadata = metadata.with_codec(codec);
            }
            let operation = OperationDescription::new(contract.clone(), signature, &metadata);

            check_wire_names(&operation)?;

            if let Some(first) = by_action.get(operation.soap_action()) {
                let first = &operations[*first];
                warn!(action = %operation.soap_action(), "duplicate soap action");
                return Err(DescriptionError::DuplicateAction {
                    action: operation.soap_action().to_string(),
                    first: first.name().to_string(),
                    second: operation.name().to_string(),
                });
            }

            by_action.insert(operation.soap_action().to_string(), operations.len());
            operations.push(Arc::new(operation));
        }

        if let Some(method) = overrides.into_keys().next() {
            warn!(%method, contract = %contract.name(), "override for unknown method");
            return Err(DescriptionError::MissingOperation(method));
        }

        info!(
            contract = %contract.name(),
            namespace = %contract.namespace(),
            operations = operations.len(),
            "service description registered"
        );

        Ok(ServiceDescription {
            contract,
            operations,
            by_action,
        })
    }
}

// Request slots and reply slots must each be unique by qualified name.
fn check_wire_names(operation: &OperationDescription) -> Result<(), DescriptionError> {
    let namespace = operation.contract().namespace();
    let request = operation
        .parameters()
        .iter()
        .map(|b| (b.name(), b.namespace()));
    check_unique(operation, request)?;

    let reply = operation
        .out_parameters()
        .iter()
        .map(|b: &ParameterBinding| (b.name(), b.namespace()))
        .chain(operation.return_name().map(|name| (name, namespace)));
    check_unique(operation, reply)
}

fn check_unique<'a>(
    operation: &OperationDescription,
    slots: impl Iterator<Item = (&'a str, &'a str)>,
) -> Result<(), DescriptionError> {
    let mut seen = HashSet::new();
    for (name, namespace) in slots {
        if !seen.insert((name, namespace)) {
            warn!(operation = %operation.name(), %name, %namespace, "duplicate wire name");
            return Err(DescriptionError::DuplicateWireName {
                operation: operation.name().to_string(),
                name: name.to_string(),
                namespace: namespace.to_string(),
            });
        }
    }
    Ok(())
}

// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::future::Future;

use crate::dispatch::{Arguments, DispatchTarget, Outcome};
use crate::errors::InvokeError;
use crate::metadata::ParameterContract;

/// Declared shape of a service method: name, ordered parameters and entry
/// point. Whether the result is deferred is fixed by the constructor used.
#[derive(Debug, Clone)]
pub struct MethodSignature {
    name: String,
    parameters: Vec<ParameterContract>,
    target: DispatchTarget,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>, target: DispatchTarget) -> Self {
        MethodSignature {
            name: name.into(),
            parameters: Vec::new(),
            target,
        }
    }

    /// Method returning its result directly
    pub fn direct<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arguments) -> Result<Outcome, InvokeError> + Send + Sync + 'static,
    {
        Self::new(name, DispatchTarget::direct(handler))
    }

    /// Method returning a future of its result
    pub fn deferred<F, Fut>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Outcome, InvokeError>> + Send + 'static,
    {
        Self::new(name, DispatchTarget::deferred(handler))
    }

    pub fn with_parameter(mut self, parameter: ParameterContract) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[ParameterContract] {
        &self.parameters
    }

    pub fn target(&self) -> &DispatchTarget {
        &self.target
    }

    pub(crate) fn into_parts(self) -> (String, Vec<ParameterContract>, DispatchTarget) {
        (self.name, self.parameters, self.target)
    }
}

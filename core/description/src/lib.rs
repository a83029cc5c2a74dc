// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Description of SOAP service contracts.
//!
//! A [`ServiceDescription`] is built once at registration time from a
//! [`ContractDescription`] and a set of [`MethodSignature`]s, each paired with
//! its [`OperationContract`] metadata. Every operation is resolved into an
//! immutable [`OperationDescription`] that a dispatcher can use without any
//! further inspection: SOAP action, wire names of parameters and return
//! value, invocation shape and a private codec cache.

pub mod contract;
pub mod dispatch;
pub mod errors;
pub mod metadata;
pub mod operation;
pub mod parameter;
pub mod service;
pub mod signature;

pub use contract::ContractDescription;
pub use dispatch::{Arguments, DispatchTarget, Invocation, Outcome, Value};
pub use errors::{DescriptionError, InvokeError};
pub use metadata::{OperationContract, ParameterContract, ParameterDirection};
pub use operation::OperationDescription;
pub use parameter::ParameterBinding;
pub use service::{ServiceDescription, ServiceDescriptionBuilder};
pub use signature::MethodSignature;

// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use tracing::debug;

use serde::Serialize;
use serde::de::DeserializeOwned;
use soap_codec::{BodyCodec, CodecCache, CodecError, CodecKind, Payload, XmlValue};

use crate::contract::ContractDescription;
use crate::dispatch::{Arguments, DispatchTarget, Invocation, Outcome};
use crate::errors::InvokeError;
use crate::metadata::OperationContract;
use crate::parameter::ParameterBinding;
use crate::signature::MethodSignature;

/// Everything a dispatcher needs to serve one operation.
///
/// Built once at registration time and read-only afterwards. The only
/// mutable state is the codec cache, which is safe for concurrent use.
#[derive(Debug)]
pub struct OperationDescription {
    contract: Arc<ContractDescription>,
    soap_action: String,
    reply_action: Option<String>,
    name: String,
    is_one_way: bool,
    dispatch_target: DispatchTarget,
    parameters: Vec<ParameterBinding>,
    out_parameters: Vec<ParameterBinding>,
    return_name: String,
    codec_kind: CodecKind,
    codecs: CodecCache,
}

impl OperationDescription {
    /// Resolve names, action and parameter bindings of a method. Never fails:
    /// absent overrides fall back to values derived from the signature and
    /// the contract.
    pub fn new(
        contract: Arc<ContractDescription>,
        signature: MethodSignature,
        metadata: &OperationContract,
    ) -> Self {
        let (method_name, declared, dispatch_target) = signature.into_parts();

        let name = metadata.name().map(str::to_string).unwrap_or(method_name);
        let soap_action = metadata
            .action()
            .map(str::to_string)
            .unwrap_or_else(|| contract.default_action(&name));
        let return_name = metadata
            .return_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}Result", name));

        let (out_parameters, parameters): (Vec<_>, Vec<_>) = declared
            .into_iter()
            .enumerate()
            .map(|(position, parameter)| ParameterBinding::resolve(&contract, position, parameter))
            .partition(|binding| binding.parameter().direction().is_output());

        debug!(
            contract = %contract.name(),
            operation = %name,
            action = %soap_action,
            inputs = parameters.len(),
            outputs = out_parameters.len(),
            deferred = dispatch_target.is_deferred(),
            "operation description built"
        );

        OperationDescription {
            contract,
            soap_action,
            reply_action: metadata.reply_action().map(str::to_string),
            name,
            is_one_way: metadata.is_one_way(),
            dispatch_target,
            parameters,
            out_parameters,
            return_name,
            codec_kind: metadata.codec().unwrap_or_default(),
            codecs: CodecCache::new(),
        }
    }

    pub fn contract(&self) -> &Arc<ContractDescription> {
        &self.contract
    }

    /// Dispatch key, matched exactly against the incoming action
    pub fn soap_action(&self) -> &str {
        &self.soap_action
    }

    pub fn reply_action(&self) -> Option<&str> {
        self.reply_action.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_one_way(&self) -> bool {
        self.is_one_way
    }

    /// True if the result arrives through a future and must be awaited
    pub fn is_deferred_result(&self) -> bool {
        self.dispatch_target.is_deferred()
    }

    pub fn dispatch_target(&self) -> &DispatchTarget {
        &self.dispatch_target
    }

    /// Input parameters, in wire order
    pub fn parameters(&self) -> &[ParameterBinding] {
        &self.parameters
    }

    /// Output and by-reference parameters, in declaration order
    pub fn out_parameters(&self) -> &[ParameterBinding] {
        &self.out_parameters
    }

    /// Wire name of the return value. One-way operations have no reply, so
    /// none is exposed for them.
    pub fn return_name(&self) -> Option<&str> {
        if self.is_one_way {
            None
        } else {
            Some(&self.return_name)
        }
    }

    /// Root element name of the reply body
    pub fn response_name(&self) -> String {
        format!("{}Response", self.name)
    }

    /// Codec kind used for this operation's bodies
    pub fn codec_kind(&self) -> CodecKind {
        self.codec_kind
    }

    pub fn codecs(&self) -> &CodecCache {
        &self.codecs
    }

    /// Codec for the request body element `{contract namespace}name`
    pub fn request_codec<T: Payload>(&self) -> Result<Arc<dyn BodyCodec<T>>, CodecError> {
        self.codecs.get(self.codec_kind, &self.name, self.contract.namespace())
    }

    /// Codec for the reply body element, absent for one-way operations
    pub fn response_codec<T: Payload>(&self) -> Result<Option<Arc<dyn BodyCodec<T>>>, CodecError> {
        if self.is_one_way {
            return Ok(None);
        }

        let name = self.response_name();
        self.codecs.get(self.codec_kind, &name, self.contract.namespace()).map(Some)
    }

    /// Codec for a single parameter element
    pub fn parameter_codec<T: Payload>(
        &self,
        binding: &ParameterBinding,
    ) -> Result<Arc<dyn BodyCodec<T>>, CodecError> {
        self.codecs.get(self.codec_kind, binding.name(), binding.namespace())
    }

    /// Codec for the return value element, absent for one-way operations
    pub fn return_codec<T: Payload>(&self) -> Result<Option<Arc<dyn BodyCodec<T>>>, CodecError> {
        self.return_name()
            .map(|name| self.codecs.get(self.codec_kind, name, self.contract.namespace()))
            .transpose()
    }

    /// Schema-driven codec for the element `{namespace}name`, for payloads
    /// without an annotation-driven mapping. Fails if the operation uses the
    /// other kind.
    pub fn schema_codec<T>(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<Arc<dyn BodyCodec<T>>, CodecError>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.expect_kind(CodecKind::SchemaDriven)?;
        self.codecs.schema_driven(name, namespace)
    }

    /// Annotation-driven codec for the element `{namespace}name`, for
    /// payloads without a serde mapping. Fails if the operation uses the
    /// other kind.
    pub fn annotated_codec<T>(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<Arc<dyn BodyCodec<T>>, CodecError>
    where
        T: XmlValue + Send + Sync + 'static,
    {
        self.expect_kind(CodecKind::AnnotationDriven)?;
        self.codecs.annotation_driven(name, namespace)
    }

    fn expect_kind(&self, requested: CodecKind) -> Result<(), CodecError> {
        if requested != self.codec_kind {
            return Err(CodecError::KindMismatch {
                configured: self.codec_kind,
                requested,
            });
        }
        Ok(())
    }

    /// Call the entry point without waiting for a deferred result
    pub fn start(&self, args: Arguments) -> Invocation {
        self.dispatch_target.invoke(args)
    }

    /// Call the entry point and wait for its outcome. One-way operations
    /// complete with `None`: their outcome is never turned into a reply.
    pub async fn invoke(&self, args: Arguments) -> Result<Option<Outcome>, InvokeError> {
        let outcome = self.start(args).resolve().await?;

        if self.is_one_way {
            Ok(None)
        } else {
            Ok(Some(outcome))
        }
    }
}

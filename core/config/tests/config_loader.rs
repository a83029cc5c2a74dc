// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use soap_codec::CodecKind;
use soap_config::{ConfigError, ConfigLoader};
use soap_description::{InvokeError, MethodSignature, Outcome, ParameterContract};
use soap_tracing::LogLevel;
use tracing_test::traced_test;

static TEST_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/testdata");

const PING_NS: &str = "http://example.org/PingService";

fn loader(file: &str) -> ConfigLoader {
    ConfigLoader::new(&format!("{}/{}", TEST_PATH, file)).unwrap()
}

#[test]
#[traced_test]
fn test_full_config() {
    let mut loader = loader("gateway.yaml");

    let tracing = loader.tracing();
    assert_eq!(tracing.level(), LogLevel::Debug);
    assert_eq!(tracing.level_for("soap_codec::cache"), LogLevel::Trace);

    assert_eq!(loader.codec().unwrap(), CodecKind::AnnotationDriven);

    let contracts = loader.contracts().unwrap();
    assert_eq!(contracts.len(), 2);
    assert_eq!(contracts[0].name(), "IPingService");
    assert_eq!(contracts[0].operations().len(), 2);
    assert!(contracts[1].operations().is_empty());

    let echo = &contracts[0].operations()["Echo"];
    assert_eq!(echo.action(), Some("urn:ping/echo"));
    assert_eq!(echo.return_name(), Some("EchoOut"));

    assert!(logs_contain("Contracts configuration loaded"));
}

#[test]
fn test_configured_service() {
    let gateway = loader("gateway.yaml").gateway().unwrap();

    let service = gateway
        .service_builder(PING_NS, "IPingService")
        .unwrap()
        .operation(
            MethodSignature::direct("Echo", |mut args| {
                let s: String = args.take(0)?;
                Ok(Outcome::returning(s))
            })
            .with_parameter(ParameterContract::input("str")),
        )
        .operation(
            MethodSignature::deferred("EchoAsync", |_| async {
                Ok::<_, InvokeError>(Outcome::empty())
            })
            .with_parameter(ParameterContract::input("str")),
        )
        .build()
        .unwrap();

    let echo = service.operation_by_action("urn:ping/echo").unwrap();
    assert_eq!(echo.return_name(), Some("EchoOut"));
    assert_eq!(echo.codec_kind(), CodecKind::AnnotationDriven);

    let echo_async = service
        .operation_by_action("http://example.org/PingService/IPingService/EchoAsync")
        .unwrap();
    assert!(echo_async.is_one_way());
    assert!(echo_async.is_deferred_result());
    assert_eq!(echo_async.return_name(), None);
    assert_eq!(echo_async.codec_kind(), CodecKind::SchemaDriven);

    let orders = gateway
        .service_builder("http://example.org/Orders/", "IOrderService")
        .unwrap()
        .operation(MethodSignature::direct("List", |_| Ok(Outcome::empty())))
        .build()
        .unwrap();
    assert_eq!(
        orders.operations().next().unwrap().soap_action(),
        "http://example.org/Orders/IOrderService/List"
    );
}

#[test]
fn test_no_contracts_affects_only_contracts() {
    let mut loader = loader("gateway-no-contracts.yaml");
    assert_eq!(loader.tracing().level(), LogLevel::Warn);
    assert_eq!(loader.codec().unwrap(), CodecKind::SchemaDriven);
    assert!(matches!(
        loader.contracts(),
        Err(ConfigError::InvalidNoContracts)
    ));
}

#[test]
fn test_empty_config() {
    let mut loader = loader("gateway-empty.yaml");
    assert_eq!(loader.tracing().level(), LogLevel::Info);
    assert!(loader.gateway().is_err());
}

#[test]
fn test_duplicate_contract() {
    let mut loader = loader("gateway-duplicate.yaml");
    assert!(matches!(
        loader.contracts(),
        Err(ConfigError::DuplicateContract { .. })
    ));
}

#[test]
fn test_unknown_operation_field() {
    let mut loader = loader("gateway-unknown-field.yaml");
    assert!(matches!(loader.contracts(), Err(ConfigError::YamlError(_))));
}

#[test]
fn test_missing_file() {
    let res = ConfigLoader::new(&format!("{}/missing.yaml", TEST_PATH));
    assert!(matches!(res, Err(ConfigError::NotFound(_))));
}

#[test]
fn test_unknown_codec_kind() {
    let mut loader = loader("gateway-bad-codec.yaml");
    assert!(matches!(loader.codec(), Err(ConfigError::YamlError(_))));
    assert!(matches!(loader.gateway(), Err(ConfigError::YamlError(_))));

    // the other sections are still usable
    assert_eq!(loader.tracing().level(), LogLevel::Info);
    assert_eq!(loader.contracts().unwrap().len(), 1);
}

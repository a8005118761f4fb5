//! Generator output tests for abibind-gen
//!
//! Renders the ABIs under `abis/` and checks the emitted source for the
//! names, constants and views the runtime contract relies on.

use abibind_abi::AbiError;
use abibind_gen::{
    contract_name, generate, generate_all, generate_file, render_index, write_if_changed, GenError,
};
use std::path::Path;

const REG_STORE: &str = include_str!("../../../abis/RegStore.json");
const REG_RELAY: &str = include_str!("../../../abis/RegRelay.json");
const PAYMENT_FACTORY: &str = include_str!("../../../abis/PaymentFactory.json");

fn abis_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../abis"))
}

/// Source between `start` and the next line matching `end`
fn section<'a>(source: &'a str, start: &str, end: &str) -> &'a str {
    let from = source.find(start).expect("section start");
    let rest = &source[from..];
    let to = rest.find(end).unwrap_or(rest.len());
    &rest[..to]
}

// ==================== Determinism Tests ====================

#[test]
fn test_generation_is_deterministic() {
    let a = generate("RegStore", REG_STORE, None).unwrap();
    let b = generate("RegStore", REG_STORE, None).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_header_and_abi_constant() {
    let source = generate("RegStore", REG_STORE, None).unwrap();
    assert!(source.starts_with("// Code generated by abibind. DO NOT EDIT.\n"));
    assert!(source.contains("pub const ABI: &str = \"[{"));
    assert!(!source.contains("pub const BYTECODE"));
    assert!(!source.contains("#!["));
    assert!(!source.contains("//!"));
}

#[test]
fn test_runtime_path_override() {
    let source = generate("RegStore", REG_STORE, Some("crate::rt")).unwrap();
    assert!(source.contains("contract: crate::rt::BoundContract,"));
    assert!(!source.contains("::abibind_runtime"));
}

// ==================== Function Tests ====================

#[test]
fn test_selector_constants() {
    let source = generate("RegStore", REG_STORE, None).unwrap();
    assert!(source.contains("pub const BALANCE_OF: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];"));
    assert!(source.contains("pub const SAFE_TRANSFER_FROM: [u8; 4] = [0x42, 0x84, 0x2e, 0x0e];"));
    assert!(source.contains("pub const SAFE_TRANSFER_FROM_0: [u8; 4] = [0xb8, 0x8d, 0x4f, 0xde];"));
    assert!(source.contains("/// `safeTransferFrom(address,address,uint256,bytes)`"));
}

#[test]
fn test_views_split_by_mutability() {
    let source = generate("RegStore", REG_STORE, None).unwrap();
    let caller = section(&source, "impl RegStoreCaller {", "\n}\n");
    let transactor = section(&source, "impl RegStoreTransactor {", "\n}\n");

    assert!(caller.contains("pub async fn balance_of("));
    assert!(caller.contains("pub async fn require_only_admin_or_higher("));
    assert!(!caller.contains("pub async fn approve("));

    assert!(transactor.contains("pub async fn approve("));
    assert!(transactor.contains("pub async fn safe_transfer_from("));
    assert!(transactor.contains("pub async fn safe_transfer_from_0("));
    assert!(!transactor.contains("pub async fn balance_of("));
}

#[test]
fn test_output_shapes() {
    let source = generate("RegStore", REG_STORE, None).unwrap();

    let balance = section(&source, "pub async fn balance_of(", "\n    }\n");
    assert!(balance.contains(
        ") -> Result<::abibind_runtime::U256, ::abibind_runtime::BindError> {"
    ));
    assert!(balance.contains("let (output,): (::abibind_runtime::U256,)"));

    let stores = section(&source, "pub async fn stores_to_users(", "\n    }\n");
    assert!(stores.contains("arg0: ::abibind_runtime::U256,"));
    assert!(stores.contains("arg1: ::abibind_runtime::Address,"));
    assert!(stores.contains(") -> Result<u8, ::abibind_runtime::BindError> {"));

    let require = section(&source, "pub async fn require_only_admin_or_higher(", "\n    }\n");
    assert!(require.contains(") -> Result<(), ::abibind_runtime::BindError> {"));
    assert!(require.contains("Ok(())"));
}

#[test]
fn test_argument_types() {
    let source = generate("RegStore", REG_STORE, None).unwrap();
    let update = section(&source, "pub async fn update_relays(", "\n    }\n");
    assert!(update.contains("relays: Vec<::abibind_runtime::U256>,"));
    assert!(update.contains("::abibind_runtime::ParamType::Array(Box::new(::abibind_runtime::ParamType::Uint(256)))"));

    let supports = section(&source, "pub async fn supports_interface(", "\n    }\n");
    assert!(supports.contains("interface_id: ::abibind_runtime::FixedBytes<4>,"));

    let factory = generate("PaymentFactory", PAYMENT_FACTORY, None).unwrap();
    let batch = section(&factory, "pub async fn batch(", "\n    }\n");
    assert!(batch.contains("reciept_hashes: Vec<::abibind_runtime::FixedBytes<32>>,"));
}

#[test]
fn test_constructor_helpers() {
    let store = generate("RegStore", REG_STORE, None).unwrap();
    assert!(store.contains("pub fn encode_constructor_args("));
    assert!(store.contains("r: ::abibind_runtime::Address,"));
    assert!(!store.contains("pub fn deploy_data("));

    let factory = generate("PaymentFactory", PAYMENT_FACTORY, None).unwrap();
    assert!(!factory.contains("encode_constructor_args"));
}

#[test]
fn test_artifact_bytecode() {
    let artifact = r#"{
        "abi": [{"type":"constructor","stateMutability":"nonpayable",
                 "inputs":[{"name":"owner","type":"address"}]}],
        "bytecode": "0x6080604052"
    }"#;
    let source = generate("Vault", artifact, None).unwrap();
    assert!(source.contains("pub const BYTECODE: &str = \"0x6080604052\";"));
    assert!(source.contains("pub fn deploy_data("));
    assert!(source.contains("bytecode_from_hex(BYTECODE)?"));
}

#[test]
fn test_fallback_and_receive() {
    let abi = r#"[{"type":"fallback","stateMutability":"payable"},
                  {"type":"receive","stateMutability":"payable"}]"#;
    let source = generate("Wallet", abi, None).unwrap();
    let transactor = section(&source, "impl WalletTransactor {", "\n}\n");
    assert!(transactor.contains("pub async fn fallback("));
    assert!(transactor.contains("self.contract.transact_raw(opts, calldata, true).await"));
    assert!(transactor.contains("pub async fn receive("));
    assert!(!source.contains("pub mod selectors"));
}

// ==================== Event Tests ====================

#[test]
fn test_event_structs_and_topics() {
    let source = generate("RegStore", REG_STORE, None).unwrap();
    assert!(source.contains("pub mod topics {"));
    assert!(source.contains("pub const TRANSFER: [u8; 32] = ["));
    assert!(source.contains("0xdd, 0xf2, 0x52, 0xad,"));
    assert!(source.contains("pub struct RegStoreTransfer {"));
    assert!(source.contains("pub token_id: ::abibind_runtime::U256,"));
    assert!(source.contains("impl ::abibind_runtime::ContractEvent for RegStoreApprovalForAll {"));

    let filterer = section(&source, "impl RegStoreFilterer {", "\n}\n");
    for accessor in ["filter_transfer(", "watch_transfer(", "parse_transfer(", "fn transfer_topics("] {
        assert!(filterer.contains(accessor), "missing {}", accessor);
    }
    let topics = section(filterer, "fn approval_for_all_topics(", "\n    }\n");
    assert!(topics.contains("owner: &[::abibind_runtime::Address],"));
    assert!(!topics.contains("approved"));
}

#[test]
fn test_event_data_fields() {
    let source = generate("RegRelay", REG_RELAY, None).unwrap();
    let event = section(&source, "pub struct RegRelayBatchMetadataUpdate {", "\n}\n");
    assert!(event.contains("pub from_token_id: ::abibind_runtime::U256,"));
    assert!(event.contains("pub to_token_id: ::abibind_runtime::U256,"));
    assert!(event.contains("pub raw: ::abibind_runtime::Log,"));

    let decode = section(&source, "for RegRelayBatchMetadataUpdate {", "\n}\n");
    assert!(decode.contains("indexed_topics(&log,"));
    assert!(decode.contains("let (from_token_id, to_token_id):"));

    // No indexed fields means the filter takes no slices
    let filter = section(&source, "pub async fn filter_metadata_update(", "\n    }\n");
    assert!(filter.contains("opts: &::abibind_runtime::FilterOpts,\n    )"));
}

#[test]
fn test_indexed_dynamic_event_field() {
    let abi = r#"[{"type":"event","name":"Named","anonymous":false,
                   "inputs":[{"name":"label","type":"string","indexed":true},
                             {"name":"id","type":"uint64","indexed":true}]}]"#;
    let source = generate("Names", abi, None).unwrap();
    assert!(source.contains("pub label: ::abibind_runtime::H256,"));
    assert!(source.contains("/// `label` (indexed, hash of the value)"));
    assert!(source.contains("let label = indexed[0];"));
    assert!(source.contains("label.to_vec(),"));
    assert!(source.contains("let id: u64 = ::abibind_runtime::decode_indexed("));
}

#[test]
fn test_anonymous_event_has_no_signature_topic() {
    let abi = r#"[{"type":"event","name":"Ping","anonymous":true,
                   "inputs":[{"name":"who","type":"address","indexed":true}]}]"#;
    let source = generate("Pinger", abi, None).unwrap();
    assert!(source.contains("indexed_topics(&log, None, 1)?"));
    let topics = section(&source, "fn ping_topics(", "\n    }\n");
    assert!(!topics.contains("topics::PING"));
}

#[test]
fn test_overloaded_events() {
    let abi = r#"[{"type":"event","name":"Moved","anonymous":false,"inputs":[]},
                  {"type":"event","name":"Moved","anonymous":false,
                   "inputs":[{"name":"to","type":"address","indexed":false}]}]"#;
    let source = generate("Mover", abi, None).unwrap();
    assert!(source.contains("pub struct MoverMoved {"));
    assert!(source.contains("pub struct MoverMoved0 {"));
    assert!(source.contains("pub async fn watch_moved_0("));
    assert!(source.contains("pub const MOVED_0: [u8; 32]"));
}

// ==================== Error Tests ====================

#[test]
fn test_errors_enum() {
    let source = generate("RegStore", REG_STORE, None).unwrap();
    assert!(source.contains("pub mod error_selectors {"));
    assert!(source.contains("pub const ERC721_NONEXISTENT_TOKEN: [u8; 4] = [0x7e, 0x27, 0x32, 0x89];"));
    let errors = section(&source, "pub enum RegStoreErrors {", "\n}\n");
    assert!(errors.contains("ERC721NonexistentToken {"));
    assert!(errors.contains("ERC721IncorrectOwner {"));
    assert!(source.contains("pub fn from_revert(error: &::abibind_runtime::BindError) -> Option<Self> {"));
}

#[test]
fn test_no_errors_no_enum() {
    let source = generate("PaymentFactory", PAYMENT_FACTORY, None).unwrap();
    assert!(!source.contains("error_selectors"));
    assert!(!source.contains("pub mod topics"));
    assert!(source.contains("impl PaymentFactoryFilterer {"));
}

#[test]
fn test_unit_error_variant() {
    let abi = r#"[{"type":"error","name":"Paused","inputs":[]}]"#;
    let source = generate("Switch", abi, None).unwrap();
    assert!(source.contains("    Paused,\n"));
    assert!(source.contains("let selector = &data[..4];"));
    assert!(source.contains("return Ok(Some(Self::Paused));"));
}

// ==================== Failure Tests ====================

#[test]
fn test_malformed_abi() {
    let err = generate("Broken", "{not json", None).unwrap_err();
    assert!(matches!(err, GenError::Abi(AbiError::MalformedAbi(_))));
}

#[test]
fn test_duplicate_signature_rejected() {
    let abi = r#"[{"type":"function","name":"f","stateMutability":"view","inputs":[],"outputs":[]},
                  {"type":"function","name":"f","stateMutability":"view","inputs":[],"outputs":[]}]"#;
    let err = generate("Dup", abi, None).unwrap_err();
    assert!(matches!(
        err,
        GenError::Abi(AbiError::DuplicateSignature { .. })
    ));
}

#[test]
fn test_wide_outputs_rejected() {
    let outputs: Vec<String> = (0..13)
        .map(|_| r#"{"name":"","type":"bool"}"#.to_string())
        .collect();
    let abi = format!(
        r#"[{{"type":"function","name":"wide","stateMutability":"view","inputs":[],"outputs":[{}]}}]"#,
        outputs.join(",")
    );
    let err = generate("Wide", &abi, None).unwrap_err();
    assert!(matches!(err, GenError::Abi(AbiError::UnsupportedType(_))));
}

#[test]
fn test_invalid_contract_name() {
    let err = generate("123", "[]", None).unwrap_err();
    assert!(matches!(err, GenError::InvalidName(_)));
}

// ==================== File Tests ====================

#[test]
fn test_contract_name_from_path() {
    assert_eq!(contract_name(Path::new("abis/RegStore.json")).unwrap(), "RegStore");
    assert_eq!(
        contract_name(Path::new("payment-factory.abi.json")).unwrap(),
        "PaymentFactory"
    );
}

#[test]
fn test_generate_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = generate_file(&abis_dir().join("RegStore.json"), None, dir.path(), None).unwrap();
    assert_eq!(path, dir.path().join("reg_store.rs"));

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, generate("RegStore", REG_STORE, None).unwrap());
}

#[test]
fn test_generate_file_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let err = generate_file(Path::new("no/such/abi.json"), None, dir.path(), None).unwrap_err();
    assert!(matches!(err, GenError::Io { .. }));
}

#[test]
fn test_generate_all_writes_index() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![
        abis_dir().join("RegStore.json"),
        abis_dir().join("PaymentFactory.json"),
    ];
    let written = generate_all(&inputs, dir.path(), None).unwrap();
    assert_eq!(written.len(), 3);

    let index = std::fs::read_to_string(dir.path().join("mod.rs")).unwrap();
    assert!(index.ends_with("pub mod payment_factory;\npub mod reg_store;\n"));
}

#[test]
fn test_generate_all_is_idempotent() {
    let inputs = vec![
        abis_dir().join("RegStore.json"),
        abis_dir().join("RegRelay.json"),
        abis_dir().join("PaymentFactory.json"),
    ];
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let written = generate_all(&inputs, first.path(), None).unwrap();
    generate_all(&inputs, second.path(), None).unwrap();
    assert_eq!(written.len(), 4);

    for path in &written {
        let file_name = path.file_name().unwrap();
        let a = std::fs::read(path).unwrap();
        let b = std::fs::read(second.path().join(file_name)).unwrap();
        assert_eq!(a, b, "{:?} differs between runs", file_name);
    }

    // A rerun into the same directory finds nothing to rewrite
    let again = generate_all(&inputs, first.path(), None).unwrap();
    assert_eq!(again, written);
    for (name, abi) in [
        ("RegStore", REG_STORE),
        ("RegRelay", REG_RELAY),
        ("PaymentFactory", PAYMENT_FACTORY),
    ] {
        let module = first.path().join(format!("{}.rs", abibind_gen::snake_case(name)));
        let source = generate(name, abi, None).unwrap();
        assert!(!write_if_changed(&module, &source).unwrap(), "{} rewritten", name);
    }
    let index = render_index(&[
        "reg_store".to_string(),
        "reg_relay".to_string(),
        "payment_factory".to_string(),
    ]);
    assert!(!write_if_changed(&first.path().join("mod.rs"), &index).unwrap());
}

#[test]
fn test_generate_all_rejects_module_clash() {
    let dir = tempfile::tempdir().unwrap();
    let inputs_dir = tempfile::tempdir().unwrap();
    let dashed = inputs_dir.path().join("reg-store.json");
    std::fs::write(&dashed, REG_STORE).unwrap();
    let inputs = vec![abis_dir().join("RegStore.json"), dashed];

    let err = generate_all(&inputs, dir.path(), None).unwrap_err();
    match err {
        GenError::DuplicateModule { module, .. } => assert_eq!(module, "reg_store"),
        other => panic!("unexpected error: {}", other),
    }
    assert!(!dir.path().join("mod.rs").exists());
    assert!(!dir.path().join("reg_store.rs").exists());
}

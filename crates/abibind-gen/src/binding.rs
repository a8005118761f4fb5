//! Resolved binding model for one contract

use std::collections::HashSet;

use abibind_abi::{
    disambiguate, AbiDocument, AbiEntry, AbiError, AbiParam, OverloadName, StateMutability,
};

use crate::error::GenError;
use crate::naming::{
    constant_name, escape, method_name, param_names, pascal_case, snake_case, type_name,
};
use crate::types::{AbiTypeDescriptor, TypeMapper, MAX_TUPLE_LEN};

/// Names taken by generated accessor locals and arguments
const ARG_RESERVED: &[&str] = &["opts"];
/// Constructor arguments also share `deploy_data` with the decoded bytecode
const CONSTRUCTOR_RESERVED: &[&str] = &["opts", "bytecode"];
/// Type names the binder, its views and the errors enum occupy
const VIEW_SUFFIXES: &[&str] = &["", "Caller", "Transactor", "Filterer", "Errors"];
/// Accessor names every view already defines
const METHOD_RESERVED: &[&str] = &["address", "raw", "fallback", "receive"];
/// Names taken by generated event struct members and decoder locals
const EVENT_RESERVED: &[&str] = &["opts", "raw", "log", "indexed"];

/// A parameter with its Rust identifier and type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamBinding {
    /// Rust identifier
    pub ident: String,
    /// Name as declared in the ABI
    pub abi_name: String,
    /// Type mapping
    pub ty: AbiTypeDescriptor,
    /// Stored in a topic (event inputs only)
    pub indexed: bool,
}

/// A function accessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionBinding {
    /// Declared name plus overload suffix
    pub name: OverloadName,
    /// Accessor method name
    pub method: String,
    /// Selector constant name
    pub constant: String,
    /// Canonical signature
    pub signature: String,
    /// 4-byte selector
    pub selector: [u8; 4],
    /// Arguments
    pub inputs: Vec<ParamBinding>,
    /// Return values
    pub outputs: Vec<ParamBinding>,
    /// Mutability
    pub state_mutability: StateMutability,
}

impl FunctionBinding {
    /// Served by `eth_call` rather than a transaction
    pub fn is_read_only(&self) -> bool {
        self.state_mutability.is_read_only()
    }

    /// Accepts a non-zero value
    pub fn is_payable(&self) -> bool {
        self.state_mutability == StateMutability::Payable
    }
}

/// An event struct and its filterer accessors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBinding {
    /// Declared name plus overload suffix
    pub name: OverloadName,
    /// Snake-case stem of the `filter_`/`watch_`/`parse_` accessors
    pub method: String,
    /// Event struct name
    pub struct_name: String,
    /// Topic constant name
    pub constant: String,
    /// Canonical signature
    pub signature: String,
    /// Topic 0
    pub topic: [u8; 32],
    /// No signature topic is emitted
    pub anonymous: bool,
    /// Fields in declaration order
    pub inputs: Vec<ParamBinding>,
}

impl EventBinding {
    /// Parameters stored in topics
    pub fn indexed(&self) -> impl Iterator<Item = &ParamBinding> {
        self.inputs.iter().filter(|p| p.indexed)
    }

    /// Parameters stored in the log data
    pub fn data(&self) -> impl Iterator<Item = &ParamBinding> {
        self.inputs.iter().filter(|p| !p.indexed)
    }
}

/// A custom error variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBinding {
    /// Declared name plus overload suffix
    pub name: OverloadName,
    /// Enum variant name
    pub variant: String,
    /// Selector constant name
    pub constant: String,
    /// Canonical signature
    pub signature: String,
    /// 4-byte selector
    pub selector: [u8; 4],
    /// Fields
    pub inputs: Vec<ParamBinding>,
}

/// Everything the emitter needs to render one contract.
///
/// Built once per ABI document; immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractBinding {
    /// Binder type name
    pub name: String,
    /// Module/file stem
    pub module: String,
    /// Runtime crate path used in emitted code
    pub runtime: String,
    /// Source entries in declaration order
    pub entries: Vec<AbiEntry>,
    /// Compact ABI JSON
    pub abi_json: String,
    /// Creation bytecode from an artifact
    pub bytecode: Option<String>,
    /// Function accessors in declaration order
    pub functions: Vec<FunctionBinding>,
    /// Events in declaration order
    pub events: Vec<EventBinding>,
    /// Custom errors in declaration order
    pub errors: Vec<ErrorBinding>,
    /// Constructor arguments, if a constructor is declared
    pub constructor: Option<Vec<ParamBinding>>,
    /// Fallback mutability, if declared
    pub fallback: Option<StateMutability>,
    /// Receive function declared
    pub receive: bool,
}

impl ContractBinding {
    /// Resolve names, types and selectors for `doc`
    pub fn new(name: &str, doc: &AbiDocument, mapper: &TypeMapper) -> Result<Self, GenError> {
        let type_ident = pascal_case(name);
        if type_ident.is_empty() || type_ident.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(GenError::InvalidName(name.to_string()));
        }

        let functions = bind_functions(doc, mapper)?;
        let events = bind_events(&type_ident, doc, mapper)?;
        let errors = bind_errors(doc, mapper)?;
        let constructor = doc
            .constructor()
            .map(|(inputs, _)| bind_params(inputs, CONSTRUCTOR_RESERVED, mapper))
            .transpose()?;

        Ok(Self {
            module: escape(&snake_case(&type_ident)),
            name: type_ident,
            runtime: mapper.runtime().to_string(),
            entries: doc.entries.clone(),
            abi_json: doc.abi_json.clone(),
            bytecode: doc.bytecode.clone(),
            functions,
            events,
            errors,
            constructor,
            fallback: doc.fallback(),
            receive: doc.has_receive(),
        })
    }

    /// Read-only functions, served by the caller view
    pub fn calls(&self) -> impl Iterator<Item = &FunctionBinding> {
        self.functions.iter().filter(|f| f.is_read_only())
    }

    /// State-changing functions, served by the transactor view
    pub fn transactions(&self) -> impl Iterator<Item = &FunctionBinding> {
        self.functions.iter().filter(|f| !f.is_read_only())
    }

    /// Rendered Rust source
    pub fn render(&self) -> String {
        crate::emit::render(self)
    }
}

fn bind_params(
    params: &[AbiParam],
    reserved: &[&str],
    mapper: &TypeMapper,
) -> Result<Vec<ParamBinding>, GenError> {
    let idents = param_names(params.iter().map(|p| p.name.as_str()), reserved);
    params
        .iter()
        .zip(idents)
        .map(|(param, ident)| {
            let ty = if param.indexed {
                mapper.indexed_descriptor(param)?
            } else {
                mapper.descriptor(param)?
            };
            Ok(ParamBinding {
                ident,
                abi_name: param.name.clone(),
                ty,
                indexed: param.indexed,
            })
        })
        .collect()
}

/// Decoded value lists become Rust tuples
fn check_arity(what: &str, signature: &str, count: usize) -> Result<(), GenError> {
    if count > MAX_TUPLE_LEN {
        return Err(AbiError::UnsupportedType(format!(
            "{} of {}: more than {} values",
            what, signature, MAX_TUPLE_LEN
        ))
        .into());
    }
    Ok(())
}

/// Final Rust identifiers for one entry category.
///
/// `idents` maps a name to one identifier per namespace (method, constant,
/// struct, ...). Entries keeping their declared name are placed first, so an
/// overload never takes the identifier of a differently declared entry. Any
/// remaining clash bumps the overload suffix until every namespace is free.
fn assign_idents<const N: usize>(
    names: Vec<OverloadName>,
    idents: impl Fn(&OverloadName) -> [String; N],
) -> Vec<(OverloadName, [String; N])> {
    let mut taken: [HashSet<String>; N] = std::array::from_fn(|_| HashSet::new());
    let mut assigned: Vec<Option<(OverloadName, [String; N])>> = vec![None; names.len()];

    let (bare, overloaded): (Vec<_>, Vec<_>) = names
        .into_iter()
        .enumerate()
        .partition(|(_, name)| name.suffix.is_none());

    for (index, mut name) in bare.into_iter().chain(overloaded) {
        let ids = loop {
            let ids = idents(&name);
            if ids.iter().zip(&taken).all(|(id, used)| !used.contains(id)) {
                break ids;
            }
            name.suffix = Some(name.suffix.map_or(0, |n| n + 1));
        };
        for (id, used) in ids.iter().zip(taken.iter_mut()) {
            used.insert(id.clone());
        }
        assigned[index] = Some((name, ids));
    }

    assigned.into_iter().flatten().collect()
}

fn bind_functions(doc: &AbiDocument, mapper: &TypeMapper) -> Result<Vec<FunctionBinding>, GenError> {
    let functions: Vec<_> = doc.functions().collect();
    let names = disambiguate(functions.iter().map(|f| f.name.as_str()));
    let names = assign_idents(names, |name| {
        let mut method = method_name(name);
        if METHOD_RESERVED.contains(&method.as_str()) {
            method.push('_');
        }
        [method, constant_name(name)]
    });

    functions
        .into_iter()
        .zip(names)
        .map(|(function, (name, [method, constant]))| {
            let signature = function.signature()?;
            check_arity("outputs", &signature, function.outputs.len())?;
            Ok(FunctionBinding {
                method,
                constant,
                selector: function.selector()?,
                inputs: bind_params(&function.inputs, ARG_RESERVED, mapper)?,
                outputs: bind_params(&function.outputs, &[], mapper)?,
                state_mutability: function.state_mutability,
                signature,
                name,
            })
        })
        .collect()
}

fn bind_events(
    contract: &str,
    doc: &AbiDocument,
    mapper: &TypeMapper,
) -> Result<Vec<EventBinding>, GenError> {
    let events: Vec<_> = doc.events().collect();
    let names = disambiguate(events.iter().map(|e| e.name.as_str()));
    let names = assign_idents(names, |name| {
        let mut struct_name = format!("{}{}", contract, type_name(name));
        if VIEW_SUFFIXES.iter().any(|s| struct_name == format!("{}{}", contract, s)) {
            struct_name.push_str("Event");
        }
        [method_name(name), struct_name, constant_name(name)]
    });

    events
        .into_iter()
        .zip(names)
        .map(|(event, (name, [method, struct_name, constant]))| {
            let signature = event.signature()?;
            let data_count = event.inputs.iter().filter(|p| !p.indexed).count();
            check_arity("data fields", &signature, data_count)?;
            Ok(EventBinding {
                method,
                struct_name,
                constant,
                topic: *event.topic()?.as_bytes(),
                anonymous: event.anonymous,
                inputs: bind_params(&event.inputs, EVENT_RESERVED, mapper)?,
                signature,
                name,
            })
        })
        .collect()
}

fn bind_errors(doc: &AbiDocument, mapper: &TypeMapper) -> Result<Vec<ErrorBinding>, GenError> {
    let errors: Vec<_> = doc.errors().collect();
    let names = disambiguate(errors.iter().map(|e| e.name.as_str()));
    let names = assign_idents(names, |name| [type_name(name), constant_name(name)]);

    errors
        .into_iter()
        .zip(names)
        .map(|(error, (name, [variant, constant]))| {
            let signature = error.signature()?;
            check_arity("inputs", &signature, error.inputs.len())?;
            Ok(ErrorBinding {
                variant,
                constant,
                selector: error.selector()?,
                inputs: bind_params(&error.inputs, &[], mapper)?,
                signature,
                name,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const OVERLOADED: &str = r#"[
        {"type":"function","name":"safeTransferFrom","stateMutability":"nonpayable",
         "inputs":[{"name":"from","type":"address"},{"name":"to","type":"address"},
                   {"name":"tokenId","type":"uint256"}],"outputs":[]},
        {"type":"function","name":"safeTransferFrom","stateMutability":"nonpayable",
         "inputs":[{"name":"from","type":"address"},{"name":"to","type":"address"},
                   {"name":"tokenId","type":"uint256"},{"name":"data","type":"bytes"}],"outputs":[]},
        {"type":"function","name":"balanceOf","stateMutability":"view",
         "inputs":[{"name":"owner","type":"address"}],
         "outputs":[{"name":"","type":"uint256"}]},
        {"type":"event","name":"Transfer","anonymous":false,
         "inputs":[{"name":"from","type":"address","indexed":true},
                   {"name":"to","type":"address","indexed":true},
                   {"name":"tokenId","type":"uint256","indexed":true}]},
        {"type":"error","name":"ERC721NonexistentToken",
         "inputs":[{"name":"tokenId","type":"uint256"}]}
    ]"#;

    fn binding(json: &str) -> ContractBinding {
        let doc = AbiDocument::parse(json).unwrap();
        ContractBinding::new("reg-store", &doc, &TypeMapper::default()).unwrap()
    }

    #[test]
    fn test_overloads_and_selectors() {
        let b = binding(OVERLOADED);
        assert_eq!(b.name, "RegStore");
        assert_eq!(b.module, "reg_store");

        let methods: Vec<&str> = b.functions.iter().map(|f| f.method.as_str()).collect();
        assert_eq!(methods, vec!["safe_transfer_from", "safe_transfer_from_0", "balance_of"]);
        assert_eq!(b.functions[0].selector, [0x42, 0x84, 0x2e, 0x0e]);
        assert_eq!(b.functions[1].selector, [0xb8, 0x8d, 0x4f, 0xde]);
        assert_eq!(b.functions[1].constant, "SAFE_TRANSFER_FROM_0");
        assert_eq!(b.calls().count(), 1);
        assert_eq!(b.transactions().count(), 2);
    }

    #[test]
    fn test_event_binding() {
        let b = binding(OVERLOADED);
        let transfer = &b.events[0];
        assert_eq!(transfer.struct_name, "RegStoreTransfer");
        assert_eq!(transfer.method, "transfer");
        assert_eq!(transfer.topic[..4], [0xdd, 0xf2, 0x52, 0xad]);
        assert_eq!(transfer.indexed().count(), 3);
        assert_eq!(transfer.data().count(), 0);
    }

    #[test]
    fn test_error_binding() {
        let b = binding(OVERLOADED);
        assert_eq!(b.errors[0].variant, "ERC721NonexistentToken");
        assert_eq!(b.errors[0].selector, [0x7e, 0x27, 0x32, 0x89]);
        assert_eq!(b.errors[0].inputs[0].ident, "token_id");
    }

    #[test]
    fn test_reserved_names() {
        let b = binding(
            r#"[{"type":"function","name":"f","stateMutability":"view",
                 "inputs":[{"name":"opts","type":"uint8"},{"name":"","type":"bool"}],
                 "outputs":[]},
                {"type":"event","name":"E","anonymous":true,
                 "inputs":[{"name":"raw","type":"string","indexed":true}]}]"#,
        );
        let idents: Vec<&str> = b.functions[0].inputs.iter().map(|p| p.ident.as_str()).collect();
        assert_eq!(idents, vec!["opts_", "arg1"]);

        let field = &b.events[0].inputs[0];
        assert_eq!(field.ident, "raw_");
        assert!(field.ty.rust_type.ends_with("H256"));
    }

    #[test]
    fn test_view_accessor_names_kept_free() {
        let b = binding(
            r#"[{"type":"function","name":"receive","stateMutability":"nonpayable",
                 "inputs":[],"outputs":[]},
                {"type":"constructor","stateMutability":"nonpayable",
                 "inputs":[{"name":"bytecode","type":"bytes"}]}]"#,
        );
        assert_eq!(b.functions[0].method, "receive_");
        assert_eq!(b.constructor.unwrap()[0].ident, "bytecode_");
    }

    #[test]
    fn test_event_struct_avoids_view_names() {
        let b = binding(
            r#"[{"type":"event","name":"Caller","anonymous":false,"inputs":[]}]"#,
        );
        assert_eq!(b.events[0].struct_name, "RegStoreCallerEvent");
        assert_eq!(b.events[0].method, "caller");
    }

    #[test]
    fn test_case_folded_names_stay_distinct() {
        let b = binding(
            r#"[{"type":"function","name":"balanceOf","stateMutability":"view",
                 "inputs":[],"outputs":[]},
                {"type":"function","name":"balance_of","stateMutability":"view",
                 "inputs":[{"name":"id","type":"uint8"}],"outputs":[]},
                {"type":"event","name":"Moved","anonymous":false,"inputs":[]},
                {"type":"event","name":"moved","anonymous":false,"inputs":[]},
                {"type":"error","name":"Failed","inputs":[]},
                {"type":"error","name":"failed","inputs":[]}]"#,
        );
        let methods: Vec<&str> = b.functions.iter().map(|f| f.method.as_str()).collect();
        let constants: Vec<&str> = b.functions.iter().map(|f| f.constant.as_str()).collect();
        assert_eq!(methods, vec!["balance_of", "balance_of_0"]);
        assert_eq!(constants, vec!["BALANCE_OF", "BALANCE_OF_0"]);

        let structs: Vec<&str> = b.events.iter().map(|e| e.struct_name.as_str()).collect();
        assert_eq!(structs, vec!["RegStoreMoved", "RegStoreMoved0"]);
        assert_eq!(b.events[1].method, "moved_0");

        let variants: Vec<&str> = b.errors.iter().map(|e| e.variant.as_str()).collect();
        assert_eq!(variants, vec!["Failed", "Failed0"]);
    }

    #[test]
    fn test_overload_suffix_skips_declared_name() {
        let b = binding(
            r#"[{"type":"function","name":"f","stateMutability":"nonpayable",
                 "inputs":[],"outputs":[]},
                {"type":"function","name":"f","stateMutability":"nonpayable",
                 "inputs":[{"name":"x","type":"uint8"}],"outputs":[]},
                {"type":"function","name":"f_0","stateMutability":"nonpayable",
                 "inputs":[],"outputs":[]}]"#,
        );
        let methods: Vec<&str> = b.functions.iter().map(|f| f.method.as_str()).collect();
        assert_eq!(methods, vec!["f", "f_1", "f_0"]);
        let constants: HashSet<&str> = b.functions.iter().map(|f| f.constant.as_str()).collect();
        assert_eq!(constants.len(), 3);
        assert_eq!(b.functions[1].name.suffix, Some(1));
    }

    #[test]
    fn test_keyword_contract_module() {
        let doc = AbiDocument::parse("[]").unwrap();
        let b = ContractBinding::new("Match", &doc, &TypeMapper::default()).unwrap();
        assert_eq!(b.name, "Match");
        assert_eq!(b.module, "match_");
    }

    #[test]
    fn test_invalid_contract_name() {
        let doc = AbiDocument::parse("[]").unwrap();
        assert!(matches!(
            ContractBinding::new("--", &doc, &TypeMapper::default()),
            Err(GenError::InvalidName(_))
        ));
    }
}

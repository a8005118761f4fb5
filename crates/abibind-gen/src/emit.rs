//! Rust source rendering for a [`ContractBinding`]

use crate::binding::{ContractBinding, ErrorBinding, EventBinding, FunctionBinding, ParamBinding};
use crate::types::tuple_type;

/// First line of every generated file
pub const HEADER: &str = "// Code generated by abibind. DO NOT EDIT.";

/// Clippy's default `too_many_arguments` threshold
const MAX_ARGS: usize = 7;

/// Indenting line writer
struct Writer {
    out: String,
    indent: usize,
}

impl Writer {
    fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
        }
    }

    fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.out.push_str("    ");
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.indent += 1;
    }

    fn close(&mut self, text: impl AsRef<str>) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
    }

    fn doc(&mut self, text: impl AsRef<str>) {
        self.line(format!("/// {}", text.as_ref()));
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Render the module source for one contract
pub fn render(binding: &ContractBinding) -> String {
    let mut emitter = Emitter {
        b: binding,
        rt: &binding.runtime,
        w: Writer::new(),
    };
    emitter.contract();
    emitter.w.finish()
}

/// `mod.rs` declaring the generated modules, sorted by name
pub fn render_index(modules: &[String]) -> String {
    let mut modules: Vec<&String> = modules.iter().collect();
    modules.sort();
    modules.dedup();

    let mut w = Writer::new();
    w.line(HEADER);
    w.blank();
    for module in modules {
        w.line(format!("pub mod {};", module));
    }
    w.finish()
}

struct Emitter<'a> {
    b: &'a ContractBinding,
    rt: &'a str,
    w: Writer,
}

impl Emitter<'_> {
    fn contract(&mut self) {
        self.w.line(HEADER);
        self.w.line(format!("// Contract: {}", self.b.name));
        self.w.blank();

        self.w.doc(format!("JSON ABI of `{}`", self.b.name));
        self.w.line(format!("pub const ABI: &str = {:?};", self.b.abi_json));
        if let Some(bytecode) = &self.b.bytecode {
            self.w.blank();
            self.w.doc(format!("Creation bytecode of `{}`", self.b.name));
            self.w.line(format!("pub const BYTECODE: &str = {:?};", bytecode));
        }

        self.constants();
        self.binder();
        self.caller();
        self.transactor();
        self.filterer();
        for event in &self.b.events {
            self.event_struct(event);
        }
        self.errors();
    }

    fn ty(&self, item: &str) -> String {
        format!("{}::{}", self.rt, item)
    }

    fn result(&self, ok: &str) -> String {
        format!("Result<{}, {}>", ok, self.ty("BindError"))
    }

    // ==================== Constants ====================

    fn constants(&mut self) {
        let b = self.b;
        if !b.functions.is_empty() {
            self.w.blank();
            self.w.doc("Function selectors");
            self.w.open("pub mod selectors {");
            for (i, f) in b.functions.iter().enumerate() {
                if i > 0 {
                    self.w.blank();
                }
                self.w.doc(format!("`{}`", f.signature));
                self.w.line(format!("pub const {}: [u8; 4] = {};", f.constant, byte_array(&f.selector)));
            }
            self.w.close("}");
        }

        if !b.events.is_empty() {
            self.w.blank();
            self.w.doc("Event topics");
            self.w.open("pub mod topics {");
            for (i, e) in b.events.iter().enumerate() {
                if i > 0 {
                    self.w.blank();
                }
                self.w.doc(format!("`{}`", e.signature));
                self.w.open(format!("pub const {}: [u8; 32] = [", e.constant));
                for chunk in e.topic.chunks(8) {
                    let bytes: Vec<String> = chunk.iter().map(|b| format!("0x{:02x},", b)).collect();
                    self.w.line(bytes.join(" "));
                }
                self.w.close("];");
            }
            self.w.close("}");
        }

        if !b.errors.is_empty() {
            self.w.blank();
            self.w.doc("Custom error selectors");
            self.w.open("pub mod error_selectors {");
            for (i, e) in b.errors.iter().enumerate() {
                if i > 0 {
                    self.w.blank();
                }
                self.w.doc(format!("`{}`", e.signature));
                self.w.line(format!("pub const {}: [u8; 4] = {};", e.constant, byte_array(&e.selector)));
            }
            self.w.close("}");
        }
    }

    // ==================== Binder ====================

    fn binder(&mut self) {
        let b = self.b;
        let name = &b.name;
        let contract = self.ty("BoundContract");
        let address = self.ty("Address");

        self.w.blank();
        self.w.doc(format!("Typed binding to a deployed `{}` contract", name));
        self.w.line("#[derive(Debug, Clone)]");
        self.w.open(format!("pub struct {} {{", name));
        self.w.line(format!("contract: {},", contract));
        self.w.close("}");
        self.w.blank();

        self.w.open(format!("impl {} {{", name));
        self.w.doc("Bind to the contract deployed at `address`");
        self.w.open(format!(
            "pub fn new(address: {}, transport: std::sync::Arc<dyn {}>) -> Self {{",
            address,
            self.ty("Transport")
        ));
        self.w.open("Self {");
        self.w.line(format!("contract: {}::new(address, transport),", contract));
        self.w.close("}");
        self.w.close("}");
        self.w.blank();

        self.w.doc("Contract address");
        self.w.open(format!("pub fn address(&self) -> {} {{", address));
        self.w.line("self.contract.address()");
        self.w.close("}");

        for (view, what) in [
            ("Caller", "Read-only accessors, one per `view`/`pure` function"),
            ("Transactor", "Transaction accessors, one per state-changing function"),
            ("Filterer", "Event queries, subscriptions and log parsing"),
        ] {
            self.w.blank();
            self.w.doc(what);
            self.w.open(format!(
                "pub fn {}(&self) -> {}{} {{",
                view.to_ascii_lowercase(),
                name,
                view
            ));
            self.w.open(format!("{}{} {{", name, view));
            self.w.line("contract: self.contract.clone(),");
            self.w.close("}");
            self.w.close("}");
        }

        if let Some(inputs) = &b.constructor {
            self.w.blank();
            self.w.doc("ABI-encoded constructor arguments");
            self.signature_line("pub fn encode_constructor_args(", None, inputs, &self.result(&self.ty("Bytes")));
            self.w.line(format!(
                "{}::encode_constructor(None, {}, {})",
                self.rt,
                codecs(inputs),
                tokens(self.rt, inputs)
            ));
            self.w.close("}");
        }

        if b.bytecode.is_some() {
            let inputs = b.constructor.clone().unwrap_or_default();
            self.w.blank();
            self.w.doc("Creation bytecode followed by the encoded constructor arguments");
            self.signature_line("pub fn deploy_data(", None, &inputs, &self.result(&self.ty("Bytes")));
            self.w.line(format!("let bytecode = {}::bytecode_from_hex(BYTECODE)?;", self.rt));
            self.w.line(format!(
                "{}::encode_constructor(Some(bytecode.as_slice()), {}, {})",
                self.rt,
                codecs(&inputs),
                tokens(self.rt, &inputs)
            ));
            self.w.close("}");
        }

        self.w.close("}");
    }

    /// Open a function whose parameters are `receiver`, then `inputs`
    fn signature_line(
        &mut self,
        head: &str,
        receiver: Option<&[String]>,
        inputs: &[ParamBinding],
        ret: &str,
    ) {
        let mut params: Vec<String> = receiver.map(<[String]>::to_vec).unwrap_or_default();
        params.extend(inputs.iter().map(|p| format!("{}: {}", p.ident, p.ty.rust_type)));
        self.params(head, &params, ret);
    }

    fn params(&mut self, head: &str, params: &[String], ret: &str) {
        if params.len() > MAX_ARGS {
            self.w.line("#[allow(clippy::too_many_arguments)]");
        }
        if params.is_empty() {
            self.w.open(format!("{}) -> {} {{", head, ret));
            return;
        }
        self.w.open(head);
        for param in params {
            self.w.line(format!("{},", param));
        }
        self.w.close(format!(") -> {} {{", ret));
        self.w.indent += 1;
    }

    fn view_header(&mut self, view: &str, doc: &str) -> String {
        let name = format!("{}{}", self.b.name, view);
        self.w.blank();
        self.w.doc(doc);
        self.w.line("#[derive(Debug, Clone)]");
        self.w.open(format!("pub struct {} {{", name));
        self.w.line(format!("contract: {},", self.ty("BoundContract")));
        self.w.close("}");
        self.w.blank();
        self.w.open(format!("impl {} {{", name));
        self.w.doc("Contract address");
        self.w.open(format!("pub fn address(&self) -> {} {{", self.ty("Address")));
        self.w.line("self.contract.address()");
        self.w.close("}");
        name
    }

    // ==================== Caller ====================

    fn caller(&mut self) {
        let b = self.b;
        self.view_header("Caller", &format!("Read-only view of `{}`", b.name));
        for f in b.calls() {
            self.w.blank();
            self.call_accessor(f);
        }
        self.w.close("}");
    }

    fn call_accessor(&mut self, f: &FunctionBinding) {
        let rt = self.rt;
        let out_types: Vec<String> = f.outputs.iter().map(|p| p.ty.rust_type.clone()).collect();
        let ret = match out_types.as_slice() {
            [] => "()".to_string(),
            [single] => single.clone(),
            _ => tuple_type(&out_types),
        };

        self.w.doc(format!("Calls `{}` (`0x{}`)", f.signature, hex::encode(f.selector)));
        let receiver = ["&self".to_string(), format!("opts: &{}", self.ty("CallOpts"))];
        self.signature_line(
            &format!("pub async fn {}(", f.method),
            Some(&receiver[..]),
            &f.inputs,
            &self.result(&ret),
        );

        let bind = if f.outputs.is_empty() { "" } else { "let outputs = " };
        self.w.line(format!("{}self", bind));
        self.w.indent += 1;
        self.w.line(".contract");
        self.w.open(".call(");
        self.w.line("opts,");
        self.w.line(format!("selectors::{},", f.constant));
        self.w.line(format!("{},", codecs(&f.inputs)));
        self.w.line(format!("{},", tokens(rt, &f.inputs)));
        self.w.line(format!("{},", codecs(&f.outputs)));
        self.w.close(")");
        self.w.line(".await?;");
        self.w.indent -= 1;

        match out_types.as_slice() {
            [] => self.w.line("Ok(())"),
            [single] => {
                self.w.line(format!(
                    "let (output,): ({},) = {}::from_tokens(outputs)?;",
                    single, rt
                ));
                self.w.line("Ok(output)");
            }
            _ => self.w.line(format!("Ok({}::from_tokens(outputs)?)", rt)),
        }
        self.w.close("}");
    }

    // ==================== Transactor ====================

    fn transactor(&mut self) {
        let b = self.b;
        let pending = self.ty("PendingTransaction");
        let opts = format!("opts: &{}", self.ty("TransactOpts"));
        self.view_header("Transactor", &format!("State-changing view of `{}`", b.name));

        self.w.blank();
        self.w.doc("Untyped access to the bound contract");
        self.w.open(format!("pub fn raw(&self) -> &{} {{", self.ty("BoundContract")));
        self.w.line("&self.contract");
        self.w.close("}");

        for f in b.transactions() {
            self.w.blank();
            self.w.doc(format!("Sends `{}` (`0x{}`)", f.signature, hex::encode(f.selector)));
            let receiver = ["&self".to_string(), opts.clone()];
            self.signature_line(
                &format!("pub async fn {}(", f.method),
                Some(&receiver[..]),
                &f.inputs,
                &self.result(&pending),
            );
            self.w.line("self.contract");
            self.w.indent += 1;
            self.w.open(".transact(");
            self.w.line("opts,");
            self.w.line(format!("selectors::{},", f.constant));
            self.w.line(format!("{},", codecs(&f.inputs)));
            self.w.line(format!("{},", tokens(self.rt, &f.inputs)));
            self.w.line(format!("{},", f.is_payable()));
            self.w.close(")");
            self.w.line(".await");
            self.w.indent -= 1;
            self.w.close("}");
        }

        if let Some(mutability) = b.fallback {
            let payable = mutability == abibind_abi::StateMutability::Payable;
            self.w.blank();
            self.w.doc("Sends arbitrary calldata to the fallback function");
            let params = [
                "&self".to_string(),
                opts.clone(),
                format!("calldata: {}", self.ty("Bytes")),
            ];
            self.params("pub async fn fallback(", &params, &self.result(&pending));
            self.w.line(format!("self.contract.transact_raw(opts, calldata, {}).await", payable));
            self.w.close("}");
        }

        if b.receive {
            self.w.blank();
            self.w.doc("Sends plain value to the receive function");
            let params = ["&self".to_string(), opts.clone()];
            self.params("pub async fn receive(", &params, &self.result(&pending));
            self.w.line("self.contract.transfer(opts).await");
            self.w.close("}");
        }

        self.w.close("}");
    }

    // ==================== Filterer ====================

    fn filterer(&mut self) {
        let b = self.b;
        self.view_header("Filterer", &format!("Event view of `{}`", b.name));
        for event in &b.events {
            self.event_accessors(event);
        }
        self.w.close("}");
    }

    fn event_accessors(&mut self, e: &EventBinding) {
        let rt = self.rt;
        let indexed: Vec<&ParamBinding> = e.indexed().collect();
        let rule_params: Vec<String> = indexed
            .iter()
            .map(|p| format!("{}: &[{}]", p.ident, p.ty.rust_type))
            .collect();
        let rule_args: Vec<&str> = indexed.iter().map(|p| p.ident.as_str()).collect();
        let topics_call = format!("Self::{}_topics({})?", e.method, rule_args.join(", "));

        // Topic rules shared by filter_ and watch_
        self.w.blank();
        self.params(
            &format!("fn {}_topics(", e.method),
            &rule_params,
            &self.result(&format!("Vec<Vec<{}>>", self.ty("H256"))),
        );
        self.w.open("Ok(vec![");
        if !e.anonymous {
            self.w.line(format!("vec![{}::H256::from_bytes(topics::{})],", rt, e.constant));
        }
        for p in &indexed {
            if p.ty.param.is_value_type() {
                self.w.line(format!("{}::topic_rule(&{}, {})?,", rt, p.ty.codec, p.ident));
            } else {
                self.w.line(format!("{}.to_vec(),", p.ident));
            }
        }
        self.w.close("])");
        self.w.close("}");

        let mut params = vec!["&self".to_string(), format!("opts: &{}", self.ty("FilterOpts"))];
        params.extend(rule_params.iter().cloned());
        self.w.blank();
        self.w.doc(format!("Historical `{}` events.", e.signature));
        if !indexed.is_empty() {
            self.w.doc("");
            self.w.doc("Each slice lists accepted values for one indexed field; an empty");
            self.w.doc("slice matches any value.");
        }
        self.params(
            &format!("pub async fn filter_{}(", e.method),
            &params,
            &self.result(&format!("{}::EventQuery<{}>", rt, e.struct_name)),
        );
        self.w.line(format!(
            "let logs = self.contract.filter_logs(opts, {}).await?;",
            topics_call
        ));
        self.w.line(format!("Ok({}::EventQuery::new(logs))", rt));
        self.w.close("}");

        params[1] = format!("opts: &{}", self.ty("WatchOpts"));
        self.w.blank();
        self.w.doc(format!("Live `{}` events", e.signature));
        self.params(
            &format!("pub async fn watch_{}(", e.method),
            &params,
            &self.result(&format!("{}::EventSubscription<{}>", rt, e.struct_name)),
        );
        self.w.line(format!(
            "let logs = self.contract.watch_logs(opts, {}).await?;",
            topics_call
        ));
        self.w.line(format!("Ok({}::EventSubscription::spawn(logs))", rt));
        self.w.close("}");

        self.w.blank();
        self.w.doc(format!("Decode a `{}` log", e.name.base));
        self.w.open(format!(
            "pub fn parse_{}(&self, log: {}) -> {} {{",
            e.method,
            self.ty("Log"),
            self.result(&e.struct_name)
        ));
        self.w.line(format!(
            "<{} as {}::ContractEvent>::decode_log(log)",
            e.struct_name, rt
        ));
        self.w.close("}");
    }

    fn event_struct(&mut self, e: &EventBinding) {
        let rt = self.rt;
        self.w.blank();
        self.w.doc(format!("`{}` event of `{}`", e.signature, self.b.name));
        self.w.line("#[derive(Debug, Clone, PartialEq)]");
        self.w.open(format!("pub struct {} {{", e.struct_name));
        for p in &e.inputs {
            let note = match (p.indexed, p.ty.param.is_value_type()) {
                (true, true) => " (indexed)",
                (true, false) => " (indexed, hash of the value)",
                _ => "",
            };
            self.w.doc(format!("`{}`{}", label(p), note));
            self.w.line(format!("pub {}: {},", p.ident, p.ty.rust_type));
        }
        self.w.doc("Log the event was decoded from");
        self.w.line(format!("pub raw: {},", self.ty("Log")));
        self.w.close("}");
        self.w.blank();

        self.w.open(format!("impl {}::ContractEvent for {} {{", rt, e.struct_name));
        self.w.open(format!(
            "fn decode_log(log: {}) -> {} {{",
            self.ty("Log"),
            self.result("Self")
        ));

        let indexed: Vec<&ParamBinding> = e.indexed().collect();
        let signature = if e.anonymous {
            "None".to_string()
        } else {
            format!("Some(&{}::H256::from_bytes(topics::{}))", rt, e.constant)
        };
        let check = format!(
            "{}::indexed_topics(&log, {}, {})?",
            rt,
            signature,
            indexed.len()
        );
        if indexed.is_empty() {
            self.w.line(format!("{};", check));
        } else {
            self.w.line(format!("let indexed = {};", check));
        }
        for (i, p) in indexed.iter().enumerate() {
            if p.ty.param.is_value_type() {
                self.w.line(format!(
                    "let {}: {} = {}::decode_indexed(&{}, &indexed[{}])?;",
                    p.ident, p.ty.rust_type, rt, p.ty.codec, i
                ));
            } else {
                self.w.line(format!("let {} = indexed[{}];", p.ident, i));
            }
        }

        let data: Vec<&ParamBinding> = e.data().collect();
        if !data.is_empty() {
            self.w.line(format!(
                "let {}: {} = {}::from_tokens({}::decode({}, &log.data)?)?;",
                tuple_pattern(&data),
                tuple_type(&data.iter().map(|p| p.ty.rust_type.clone()).collect::<Vec<_>>()),
                rt,
                rt,
                codecs_of(&data)
            ));
        }

        let mut fields: Vec<String> = e.inputs.iter().map(|p| p.ident.clone()).collect();
        fields.push("raw: log".to_string());
        self.w.line(format!("Ok(Self {{ {} }})", fields.join(", ")));
        self.w.close("}");
        self.w.blank();
        self.w.open(format!("fn raw(&self) -> &{} {{", self.ty("Log")));
        self.w.line("&self.raw");
        self.w.close("}");
        self.w.close("}");
    }

    // ==================== Errors ====================

    fn errors(&mut self) {
        let b = self.b;
        if b.errors.is_empty() {
            return;
        }
        let name = format!("{}Errors", b.name);

        self.w.blank();
        self.w.doc(format!("Custom errors of `{}`", b.name));
        self.w.line("#[derive(Debug, Clone, PartialEq)]");
        self.w.line("#[allow(clippy::enum_variant_names)]");
        self.w.open(format!("pub enum {} {{", name));
        for e in &b.errors {
            self.w.doc(format!("`{}`", e.signature));
            if e.inputs.is_empty() {
                self.w.line(format!("{},", e.variant));
                continue;
            }
            self.w.open(format!("{} {{", e.variant));
            for p in &e.inputs {
                self.w.doc(format!("`{}`", label(p)));
                self.w.line(format!("{}: {},", p.ident, p.ty.rust_type));
            }
            self.w.close("},");
        }
        self.w.close("}");
        self.w.blank();

        self.w.open(format!("impl {} {{", name));
        self.w.doc("Match revert data against the declared errors.");
        self.w.doc("");
        self.w.doc("Returns `None` when the selector belongs to none of them.");
        self.w.open(format!(
            "pub fn decode(data: &[u8]) -> Result<Option<Self>, {}> {{",
            self.ty("AbiError")
        ));
        self.w.open("if data.len() < 4 {");
        self.w.line("return Ok(None);");
        self.w.close("}");
        let any_inputs = b.errors.iter().any(|e| !e.inputs.is_empty());
        if any_inputs {
            self.w.line("let (selector, body) = data.split_at(4);");
        } else {
            self.w.line("let selector = &data[..4];");
        }
        for e in &b.errors {
            self.error_arm(e);
        }
        self.w.line("Ok(None)");
        self.w.close("}");
        self.w.blank();

        self.w.doc("Decode the custom error carried by a reverted call");
        self.w.open(format!(
            "pub fn from_revert(error: &{}) -> Option<Self> {{",
            self.ty("BindError")
        ));
        self.w.line("Self::decode(error.revert_data()?).ok().flatten()");
        self.w.close("}");
        self.w.blank();

        self.w.doc("Selector of this error");
        self.w.open("pub fn selector(&self) -> [u8; 4] {");
        self.w.open("match self {");
        for e in &b.errors {
            let pattern = if e.inputs.is_empty() {
                format!("Self::{}", e.variant)
            } else {
                format!("Self::{} {{ .. }}", e.variant)
            };
            self.w.line(format!("{} => error_selectors::{},", pattern, e.constant));
        }
        self.w.close("}");
        self.w.close("}");
        self.w.close("}");
    }

    fn error_arm(&mut self, e: &ErrorBinding) {
        let rt = self.rt;
        self.w.open(format!("if selector == error_selectors::{} {{", e.constant));
        if e.inputs.is_empty() {
            self.w.line(format!("return Ok(Some(Self::{}));", e.variant));
        } else {
            let inputs: Vec<&ParamBinding> = e.inputs.iter().collect();
            self.w.line(format!(
                "let {}: {} = {}::from_tokens({}::decode({}, body)?)?;",
                tuple_pattern(&inputs),
                tuple_type(&inputs.iter().map(|p| p.ty.rust_type.clone()).collect::<Vec<_>>()),
                rt,
                rt,
                codecs_of(&inputs)
            ));
            let fields: Vec<&str> = inputs.iter().map(|p| p.ident.as_str()).collect();
            self.w.line(format!(
                "return Ok(Some(Self::{} {{ {} }}));",
                e.variant,
                fields.join(", ")
            ));
        }
        self.w.close("}");
    }
}

/// Declared name, or the identifier for unnamed parameters
fn label(p: &ParamBinding) -> &str {
    if p.abi_name.is_empty() {
        &p.ident
    } else {
        &p.abi_name
    }
}

/// `[0x70, 0xa0, 0x82, 0x31]`
fn byte_array(bytes: &[u8]) -> String {
    let parts: Vec<String> = bytes.iter().map(|b| format!("0x{:02x}", b)).collect();
    format!("[{}]", parts.join(", "))
}

/// `&[ParamType::Address, ...]`
fn codecs(params: &[ParamBinding]) -> String {
    codecs_of(&params.iter().collect::<Vec<_>>())
}

fn codecs_of(params: &[&ParamBinding]) -> String {
    let parts: Vec<&str> = params.iter().map(|p| p.ty.codec.as_str()).collect();
    format!("&[{}]", parts.join(", "))
}

/// `vec![AbiValue::into_token(owner), ...]`
fn tokens(rt: &str, params: &[ParamBinding]) -> String {
    let parts: Vec<String> = params
        .iter()
        .map(|p| format!("{}::AbiValue::into_token({})", rt, p.ident))
        .collect();
    format!("vec![{}]", parts.join(", "))
}

/// `(a,)` or `(a, b)`
fn tuple_pattern(params: &[&ParamBinding]) -> String {
    let idents: Vec<String> = params.iter().map(|p| p.ident.clone()).collect();
    tuple_type(&idents)
}

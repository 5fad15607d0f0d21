//! End-to-end checks over a compilation shaped like a small library:
//!
//! ```text
//! record B([Match(@"^\d*$")] string? Unused = default) {
//!     public string this[[Match(@"^\d*$")] string a] => a;
//!     public static implicit operator B([Match(@"^\d*$")] string _) => new();
//!     public static string Static([Match(@"^\d*$")] string a) => a;
//!     public static string[] Static([Match(@"^\d*$")] params string[] a) => a;
//!     public string Instance([Match(@"^\d*$")] string a) => a;
//!     public static string EvilRegex([Match(@"^([^t]+)+t$")] string a) => a;
//!     public static void Discard(B _) { }
//! }
//! record Ab([Match("True")] params bool[] Value);
//! record Aa() : Ab(true, false);
//! ```
//!
//! Every call site is exercised with a constant that matches, a constant
//! that does not, and a non-constant slice of the matching one.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use std::time::Duration;

use eam_analysis::{Analyzer, AnalyzerConfig};
use eam_diagnostic::{Diagnostic, ErrorCode, Severity};
use eam_ir::{
    Argument, Attribute, Compilation, CompilationBuilder, Constant, ExprId, Parameter, Span,
    SymbolId, SyntaxNode, TypeId, MATCH_ATTRIBUTE,
};
use eam_regex::CacheConfig;
use pretty_assertions::assert_eq;

const DIGITS: &str = r"^\d*$";
const EVIL: &str = "^([^t]+)+t$";
const YES: &str = "017893567891";

fn matching(name: &str, ty: TypeId, pattern: &str) -> Parameter {
    Parameter::new(name, ty)
        .with_attribute(Attribute::new(MATCH_ATTRIBUTE, vec![Constant::str(pattern)]))
}

/// Declarations of `B`, `Ab`, and the `const string Yes` local.
struct Library {
    b: CompilationBuilder,
    record: TypeId,
    ctor: SymbolId,
    indexer: SymbolId,
    static_single: SymbolId,
    static_params: SymbolId,
    instance: SymbolId,
    evil: SymbolId,
    discard: SymbolId,
    ab_ctor: SymbolId,
    yes: SymbolId,
}

impl Library {
    fn new() -> Self {
        let mut b = CompilationBuilder::new();
        let record = b.class("B");
        let strings = b.array_of(TypeId::STRING);
        let bools = b.array_of(TypeId::BOOL);

        let ctor = b.constructor(record, vec![matching("Unused", TypeId::STRING, DIGITS).optional()]);
        let indexer = b.indexer(record, vec![matching("a", TypeId::STRING, DIGITS)], TypeId::STRING);
        b.implicit_operator(record, matching("_", TypeId::STRING, DIGITS));
        let static_single = b.method(
            Some(record),
            "Static",
            vec![matching("a", TypeId::STRING, DIGITS)],
            TypeId::STRING,
        );
        let static_params = b.method(
            Some(record),
            "Static",
            vec![matching("a", strings, DIGITS).variadic()],
            strings,
        );
        let instance = b.method(
            Some(record),
            "Instance",
            vec![matching("a", TypeId::STRING, DIGITS)],
            TypeId::STRING,
        );
        let evil = b.method(
            Some(record),
            "EvilRegex",
            vec![matching("a", TypeId::STRING, EVIL)],
            TypeId::STRING,
        );
        let discard = b.method(
            Some(record),
            "Discard",
            vec![Parameter::new("_", record)],
            TypeId::OBJECT,
        );

        let ab = b.class("Ab");
        let ab_ctor = b.constructor(ab, vec![matching("Value", bools, "True").variadic()]);

        let text = b.str(YES);
        let yes = b.local("Yes", TypeId::STRING, Some(text), true);

        Library {
            b,
            record,
            ctor,
            indexer,
            static_single,
            static_params,
            instance,
            evil,
            discard,
            ab_ctor,
            yes,
        }
    }

    /// `Yes`, `"text"`, or `Yes[..]`.
    fn value(&mut self, value: Value) -> ExprId {
        match value {
            Value::Yes => self.b.reference(self.yes),
            Value::Text(text) => self.b.str(text),
            Value::YesSlice => {
                let yes = self.b.reference(self.yes);
                self.b.slice(yes)
            }
        }
    }

    /// Every call shape of `DoesItWork`, each given `value`.
    fn call_sites(&mut self, value: Value) -> Vec<ExprId> {
        let mut subjects = Vec::new();

        // Static(v)
        let arg = self.value(value);
        self.b
            .invoke(None, self.static_single, [Argument::positional(arg)]);
        subjects.push(arg);

        // new B().Instance(v)
        let object = self.b.new_object(self.record, Some(self.ctor), []);
        let arg = self.value(value);
        self.b
            .invoke(Some(object), self.instance, [Argument::positional(arg)]);
        subjects.push(arg);

        // new B()[v]
        let object = self.b.new_object(self.record, Some(self.ctor), []);
        let arg = self.value(value);
        self.b.index(object, self.indexer, [Argument::positional(arg)]);
        subjects.push(arg);

        // B unused1 = new(v), unused2 = new(v);
        for _ in 0..2 {
            let arg = self.value(value);
            let created = self.b.implicit_new(self.ctor, [Argument::positional(arg)]);
            self.b.declarator(self.record, Some(created));
            subjects.push(arg);
        }

        // B unused3 = v, unused4 = v;
        for _ in 0..2 {
            let arg = self.value(value);
            self.b.declarator(self.record, Some(arg));
            subjects.push(arg);
        }

        // Discard(v)
        let arg = self.value(value);
        self.b
            .invoke(None, self.discard, [Argument::positional(arg)]);
        subjects.push(arg);

        subjects
    }

    fn finish(self) -> Compilation {
        self.b.finish()
    }
}

#[derive(Copy, Clone)]
enum Value {
    Yes,
    Text(&'static str),
    YesSlice,
}

fn analyzer() -> Analyzer {
    let cache = CacheConfig::default().with_match_timeout(Duration::from_millis(50));
    Analyzer::new(AnalyzerConfig::default().with_cache(cache))
}

fn primary_spans(c: &Compilation, exprs: &[ExprId]) -> Vec<Option<Span>> {
    exprs
        .iter()
        .map(|e| Some(c.exprs.get(*e).unwrap().span))
        .collect()
}

fn codes(diagnostics: &[Diagnostic]) -> Vec<ErrorCode> {
    diagnostics.iter().map(|d| d.code).collect()
}

// -- Call-site shapes --

#[test]
fn matching_constants_pass() {
    let mut lib = Library::new();
    lib.call_sites(Value::Yes);
    let c = lib.finish();

    assert_eq!(analyzer().analyze(&c), Vec::<Diagnostic>::new());
}

#[test]
fn mismatching_literals_are_errors() {
    let mut lib = Library::new();
    let subjects = lib.call_sites(Value::Text("this should fail"));
    let c = lib.finish();

    let diagnostics = analyzer().analyze(&c);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::EAM001; 8]);
    assert!(diagnostics.iter().all(|d| d.severity == Severity::Error));
    assert_eq!(
        diagnostics.iter().map(Diagnostic::primary_span).collect::<Vec<_>>(),
        primary_spans(&c, &subjects)
    );
}

#[test]
fn non_constant_values_are_warnings() {
    let mut lib = Library::new();
    let subjects = lib.call_sites(Value::YesSlice);
    let c = lib.finish();

    let diagnostics = analyzer().analyze(&c);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::EAM002; 8]);
    assert_eq!(
        diagnostics.iter().map(Diagnostic::primary_span).collect::<Vec<_>>(),
        primary_spans(&c, &subjects)
    );
}

#[test]
fn variadic_overload_checks_each_argument() {
    let mut lib = Library::new();
    let args: Vec<ExprId> = ["", "", "x", ""].iter().map(|t| lib.b.str(t)).collect();
    let call = lib.b.invoke(
        None,
        lib.static_params,
        args.iter().copied().map(Argument::positional),
    );
    let c = lib.finish();

    let diagnostics = analyzer().analyze_node(&c, SyntaxNode::Expr(call));
    assert_eq!(codes(&diagnostics), vec![ErrorCode::EAM001]);
    assert_eq!(
        diagnostics[0].primary_span(),
        Some(c.exprs.get(args[2]).unwrap().span)
    );
}

#[test]
fn catastrophic_backtracking_is_a_hint() {
    let mut lib = Library::new();
    let arg = lib
        .b
        .str("bingbingbang ana boonk ana bonk ana ting witta tingtang");
    lib.b
        .invoke(None, lib.evil, [Argument::positional(arg)]);
    let c = lib.finish();

    let diagnostics = analyzer().analyze(&c);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::EAM003]);
    assert_eq!(diagnostics[0].severity, Severity::Note);
}

#[test]
fn base_constructor_arguments_are_checked() {
    let mut lib = Library::new();
    let yes = lib.b.lit(Constant::Bool(true), TypeId::BOOL);
    let no = lib.b.lit(Constant::Bool(false), TypeId::BOOL);
    let base = lib.b.base_initializer(
        Some(lib.ab_ctor),
        [Argument::positional(yes), Argument::positional(no)],
    );
    let c = lib.finish();

    let diagnostics = analyzer().analyze_node(&c, SyntaxNode::BaseInitializer(base));
    assert_eq!(codes(&diagnostics), vec![ErrorCode::EAM001]);
    assert_eq!(
        diagnostics[0].primary_span(),
        Some(c.exprs.get(no).unwrap().span)
    );
}

#[test]
fn diagnostics_point_back_at_the_pattern() {
    let mut b = CompilationBuilder::new();
    let attribute = Attribute::new(MATCH_ATTRIBUTE, vec![Constant::str(DIGITS)])
        .with_span(Span::new(1000, 1010));
    let method = b.method(
        None,
        "Static",
        vec![Parameter::new("a", TypeId::STRING).with_attribute(attribute)],
        TypeId::STRING,
    );
    let arg = b.str("nope");
    b.invoke(None, method, [Argument::positional(arg)]);
    let c = b.finish();

    let diagnostics = analyzer().analyze(&c);
    assert_eq!(diagnostics.len(), 1);
    let rendered = diagnostics[0].to_string();
    assert!(rendered.starts_with(r"error [EAM001]: argument does not match the pattern `^\d*$`"));
    assert!(rendered.contains("1000..1010: pattern declared here"));
}

// -- Pattern dialect --

/// `static string M([Match(pattern)] string a)` called once per argument.
fn calls_against(pattern: &str, args: &[&str]) -> (Compilation, Vec<ExprId>) {
    let mut b = CompilationBuilder::new();
    let method = b.method(
        None,
        "M",
        vec![matching("a", TypeId::STRING, pattern)],
        TypeId::STRING,
    );
    let subjects = args
        .iter()
        .map(|text| {
            let arg = b.str(text);
            b.invoke(None, method, [Argument::positional(arg)]);
            arg
        })
        .collect();
    (b.finish(), subjects)
}

#[test]
fn lookaround_backreference_and_atomic_patterns_are_checked() {
    let cases = [
        (r"^(?=.*\d)\w+$", "pa55word", "password"),
        (r"^(\w)\w*\1$", "abca", "abcd"),
        (r"^(?>\d+)px$", "12px", "12em"),
        (r"^\d+\Z", "12", "1x"),
    ];
    for (pattern, passing, failing) in cases {
        let (c, subjects) = calls_against(pattern, &[passing, failing]);
        let diagnostics = analyzer().analyze(&c);
        assert_eq!(codes(&diagnostics), vec![ErrorCode::EAM001], "{pattern}");
        assert_eq!(
            diagnostics[0].primary_span(),
            primary_spans(&c, &subjects[1..])[0]
        );
    }
}

#[test]
fn class_subtraction_rejects_subtracted_characters() {
    let (c, _) = calls_against("[a-z-[aeiou]]+", &["rhythm", "aei", "-"]);
    assert_eq!(
        codes(&analyzer().analyze(&c)),
        vec![ErrorCode::EAM001, ErrorCode::EAM001]
    );
}

#[test]
fn unusable_pattern_is_not_blamed_on_the_argument() {
    let (c, _) = calls_against("(?(x)a|b)", &["a"]);
    let diagnostics = analyzer().analyze(&c);

    assert_eq!(codes(&diagnostics), vec![ErrorCode::EAM002]);
    let rendered = diagnostics[0].to_string();
    assert!(rendered.contains("cannot be compiled"), "{rendered}");
    assert!(!rendered.contains("not a compile-time constant"), "{rendered}");
}

// -- Capture arity --

struct Accessors {
    by_arity: Vec<SymbolId>,
}

impl Accessors {
    /// `Match(this Regex, string, out Group ...)` for one to three outputs.
    fn declare(b: &mut CompilationBuilder) -> Self {
        let by_arity = (1..=3)
            .map(|n| {
                let mut params = vec![
                    Parameter::new("regex", TypeId::REGEX),
                    Parameter::new("input", TypeId::STRING),
                ];
                params.extend(
                    (1..=n).map(|i| Parameter::new(format!("g{i}"), TypeId::GROUP).out()),
                );
                b.extension_method(None, "Match", params, TypeId::BOOL)
            })
            .collect();
        Accessors { by_arity }
    }

    fn call(&self, b: &mut CompilationBuilder, receiver: ExprId, outputs: usize) -> ExprId {
        let input = b.str("");
        let mut args = vec![Argument::positional(input)];
        for i in 1..=outputs {
            args.push(b.out_var(&format!("v{i}"), TypeId::GROUP));
        }
        b.invoke(Some(receiver), self.by_arity[outputs - 1], args)
    }
}

fn regex(b: &mut CompilationBuilder, pattern: &str) -> ExprId {
    let text = b.str(pattern);
    b.new_object(TypeId::REGEX, None, [Argument::positional(text)])
}

#[test]
fn arity_from_every_pattern_source() {
    let mut b = CompilationBuilder::new();
    let accessors = Accessors::declare(&mut b);
    let holder = b.class("B");

    // [GeneratedRegex("foobar(a)")] static partial Regex PartialMethodRegex();
    let mut generated = eam_ir::Symbol::new(
        "PartialMethodRegex",
        eam_ir::SymbolKind::Method(eam_ir::MethodSymbol {
            kind: eam_ir::MethodKind::Ordinary,
            params: vec![],
            return_type: TypeId::REGEX,
            is_extension: false,
        }),
    );
    generated.attributes.push(Attribute::new(
        eam_ir::GENERATED_PATTERN_ATTRIBUTE,
        vec![Constant::str("foobar(a)")],
    ));
    let generated = b.symbol(Some(holder), generated);
    let receiver = b.invoke(None, generated, []);
    accessors.call(&mut b, receiver, 2);

    // new Regex("foobar(a)").Match("", out var c, out var d);
    let receiver = regex(&mut b, "foobar(a)");
    accessors.call(&mut b, receiver, 2);

    // static readonly Regex s_fieldRegex = new Regex("a(b)");
    let init = regex(&mut b, "a(b)");
    let field = b.field(holder, "s_fieldRegex", TypeId::REGEX, &[init]);
    let receiver = b.reference(field);
    accessors.call(&mut b, receiver, 2);

    // static Regex MethodBodyRegex() => new Regex("a(b)");
    let body_method = b.method(Some(holder), "MethodBodyRegex", vec![], TypeId::REGEX);
    let body = regex(&mut b, "a(b)");
    b.add_initializer(body_method, body);
    let receiver = b.invoke(None, body_method, []);
    accessors.call(&mut b, receiver, 2);
    let c = b.finish();

    assert_eq!(analyzer().analyze(&c), Vec::<Diagnostic>::new());
}

#[test]
fn arity_mismatch_and_unknown_pattern() {
    let mut b = CompilationBuilder::new();
    let accessors = Accessors::declare(&mut b);

    // new Regex("foobar(a)(b)").Match("", out var x, out var y);
    let receiver = regex(&mut b, "foobar(a)(b)");
    let mismatch = accessors.call(&mut b, receiver, 2);

    // Rgx().Match("", out var x, out var y, out var z), where Rgx is opaque.
    let opaque = b.method(None, "Rgx", vec![], TypeId::REGEX);
    let receiver = b.invoke(None, opaque, []);
    let unknown = accessors.call(&mut b, receiver, 3);
    let c = b.finish();

    let diagnostics = analyzer().analyze(&c);
    assert_eq!(
        codes(&diagnostics),
        vec![ErrorCode::EAM004, ErrorCode::EAM005]
    );
    assert_eq!(
        diagnostics[0].message,
        "pattern produces 3 groups, but 2 are destructured"
    );
    assert_eq!(
        diagnostics[0].primary_span(),
        Some(c.exprs.get(mismatch).unwrap().span)
    );
    assert_eq!(
        diagnostics[1].primary_span(),
        Some(c.exprs.get(unknown).unwrap().span)
    );
}

#[test]
fn static_form_accessor_calls_are_checked() {
    let mut b = CompilationBuilder::new();
    let accessors = Accessors::declare(&mut b);

    // Extensions.Match(new Regex("(a)(b)"), "", out var g1);
    let pattern = regex(&mut b, "(a)(b)");
    let input = b.str("");
    let out = b.out_var("g1", TypeId::GROUP);
    let call = b.invoke(
        None,
        accessors.by_arity[0],
        [Argument::positional(pattern), Argument::positional(input), out],
    );
    let c = b.finish();

    let diagnostics = analyzer().analyze(&c);
    assert_eq!(codes(&diagnostics), vec![ErrorCode::EAM004]);
    assert_eq!(
        diagnostics[0].message,
        "pattern produces 3 groups, but 1 are destructured"
    );
    assert_eq!(
        diagnostics[0].primary_span(),
        Some(c.exprs.get(call).unwrap().span)
    );
}

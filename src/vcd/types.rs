use std::collections::HashMap;

use chrono::prelude::*;

use super::signal::{Signal, Value};
use super::utilities::ordered_step_lookup;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timescale {
    Fs,
    Ps,
    Ns,
    Us,
    Ms,
    S,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    /// Body of `$date`, words joined by single spaces.
    pub date: Option<String>,
    /// `date` interpreted as a calendar date, when it looks like one.
    pub parsed_date: Option<DateTime<Utc>>,
    pub version: Option<Version>,
    /// Body of `$timescale`, words joined by single spaces.
    pub timescale: Option<String>,
    pub parsed_timescale: Option<(u32, Timescale)>,
    pub comments: Vec<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ScopeIdx(pub usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SignalIdx(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// The synthetic scope every trace is rooted at.
    Root,
    Module,
    Task,
    Function,
    Begin,
    Fork,
    Generate,
    Struct,
    Union,
    Class,
    Interface,
    Package,
    Program,
    VhdlArchitecture,
    VhdlProcedure,
    VhdlFunction,
    VhdlRecord,
    VhdlProcess,
    VhdlBlock,
    VhdlForGenerate,
    VhdlIfGenerate,
    VhdlGenerate,
    VhdlPackage,
}

impl ScopeKind {
    pub(crate) const KEYWORDS: [&'static str; 22] = [
        "module",
        "task",
        "function",
        "begin",
        "fork",
        "generate",
        "struct",
        "union",
        "class",
        "interface",
        "package",
        "program",
        "vhdl_architecture",
        "vhdl_procedure",
        "vhdl_function",
        "vhdl_record",
        "vhdl_process",
        "vhdl_block",
        "vhdl_for_generate",
        "vhdl_if_generate",
        "vhdl_generate",
        "vhdl_package",
    ];

    pub(crate) fn from_word(word: &str) -> Option<ScopeKind> {
        let kind = match word {
            "module" => ScopeKind::Module,
            "task" => ScopeKind::Task,
            "function" => ScopeKind::Function,
            "begin" => ScopeKind::Begin,
            "fork" => ScopeKind::Fork,
            "generate" => ScopeKind::Generate,
            "struct" => ScopeKind::Struct,
            "union" => ScopeKind::Union,
            "class" => ScopeKind::Class,
            "interface" => ScopeKind::Interface,
            "package" => ScopeKind::Package,
            "program" => ScopeKind::Program,
            "vhdl_architecture" => ScopeKind::VhdlArchitecture,
            "vhdl_procedure" => ScopeKind::VhdlProcedure,
            "vhdl_function" => ScopeKind::VhdlFunction,
            "vhdl_record" => ScopeKind::VhdlRecord,
            "vhdl_process" => ScopeKind::VhdlProcess,
            "vhdl_block" => ScopeKind::VhdlBlock,
            "vhdl_for_generate" => ScopeKind::VhdlForGenerate,
            "vhdl_if_generate" => ScopeKind::VhdlIfGenerate,
            "vhdl_generate" => ScopeKind::VhdlGenerate,
            "vhdl_package" => ScopeKind::VhdlPackage,
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    pub(crate) name: String,
    pub(crate) kind: ScopeKind,

    pub(crate) parent_idx: Option<ScopeIdx>,
    pub(crate) self_idx: ScopeIdx,

    pub(crate) child_signals: Vec<SignalIdx>,
    pub(crate) child_scopes: Vec<ScopeIdx>,
}

impl Scope {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Convenience back reference; `None` only for the root.
    pub fn parent_idx(&self) -> Option<ScopeIdx> {
        self.parent_idx
    }

    pub fn self_idx(&self) -> ScopeIdx {
        self.self_idx
    }

    pub fn child_signals(&self) -> &[SignalIdx] {
        &self.child_signals
    }

    pub fn child_scopes(&self) -> &[ScopeIdx] {
        &self.child_scopes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueChange {
    pub identifier: String,
    pub value: Value,
}

/// All changes recorded at one simulation time. A later change to the same
/// identifier replaces the earlier one in place.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeStep {
    pub time: u64,
    pub changes: Vec<ValueChange>,
}

impl TimeStep {
    pub(crate) fn new(time: u64) -> TimeStep {
        TimeStep {
            time,
            changes: vec![],
        }
    }

    /// Value recorded for `identifier` at this instant, if it changed.
    pub fn value_of(&self, identifier: &str) -> Option<&Value> {
        self.changes
            .iter()
            .rev()
            .find(|change| change.identifier == identifier)
            .map(|change| &change.value)
    }
}

/// A fully parsed dump. Scopes and signals live in flat arenas addressed by
/// `ScopeIdx` and `SignalIdx`; the root scope is always at index 0 and every
/// other scope is reachable from it through `child_scopes`.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub(crate) metadata: Metadata,
    pub(crate) all_scopes: Vec<Scope>,
    pub(crate) all_signals: Vec<Signal>,
    // identifier -> every signal declared with it, in declaration order
    pub(crate) signal_map: HashMap<String, Vec<SignalIdx>>,
    pub(crate) time_steps: Vec<TimeStep>,
}

pub(crate) const ROOT_SCOPE: ScopeIdx = ScopeIdx(0);

/// An empty trace holding only the root scope.
impl Default for Trace {
    fn default() -> Trace {
        Trace {
            metadata: Metadata::default(),
            all_scopes: vec![Scope {
                name: "$root".to_string(),
                kind: ScopeKind::Root,
                parent_idx: None,
                self_idx: ROOT_SCOPE,
                child_signals: vec![],
                child_scopes: vec![],
            }],
            all_signals: vec![],
            signal_map: HashMap::new(),
            time_steps: vec![],
        }
    }
}

impl Trace {
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn root_scope(&self) -> &Scope {
        &self.all_scopes[ROOT_SCOPE.0]
    }

    pub fn scope(&self, idx: ScopeIdx) -> &Scope {
        &self.all_scopes[idx.0]
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.all_scopes
    }

    pub fn signal(&self, idx: SignalIdx) -> &Signal {
        &self.all_signals[idx.0]
    }

    /// Every declared signal, across all scopes, in declaration order.
    pub fn signals(&self) -> &[Signal] {
        &self.all_signals
    }

    pub fn child_scopes(&self, idx: ScopeIdx) -> impl Iterator<Item = &Scope> {
        self.scope(idx)
            .child_scopes
            .iter()
            .map(move |child| self.scope(*child))
    }

    pub fn child_signals(&self, idx: ScopeIdx) -> impl Iterator<Item = &Signal> {
        self.scope(idx)
            .child_signals
            .iter()
            .map(move |signal| self.signal(*signal))
    }

    /// All signals sharing `identifier`. Empty if it was never declared.
    pub fn signals_for_identifier(&self, identifier: &str) -> impl Iterator<Item = &Signal> {
        self.signal_map
            .get(identifier)
            .into_iter()
            .flatten()
            .map(move |idx| self.signal(*idx))
    }

    /// Finds a signal by its dotted path below the root, e.g. `top.cpu.clk`.
    pub fn signal_by_path(&self, path: &str) -> Option<&Signal> {
        let wanted: Vec<&str> = path.split('.').collect();
        self.all_signals
            .iter()
            .find(|signal| signal.path.iter().map(String::as_str).eq(wanted.iter().copied()))
    }

    pub fn time_steps(&self) -> &[TimeStep] {
        &self.time_steps
    }

    /// The most recent value `identifier` took at or before `time`.
    pub fn value_at(&self, identifier: &str, time: u64) -> Option<&Value> {
        let last = ordered_step_lookup(&self.time_steps, time)?;
        self.time_steps[..=last]
            .iter()
            .rev()
            .find_map(|step| step.value_of(identifier))
    }

    /// Depth first walk of the scope tree starting at `root`, calling `visit`
    /// with each scope and its depth below `root`.
    pub fn walk_scopes(&self, root: ScopeIdx, visit: &mut impl FnMut(&Scope, usize)) {
        self.walk_scopes_inner(root, 0, visit);
    }

    fn walk_scopes_inner(&self, idx: ScopeIdx, depth: usize, visit: &mut impl FnMut(&Scope, usize)) {
        let scope = self.scope(idx);
        visit(scope, depth);
        for child in &scope.child_scopes {
            self.walk_scopes_inner(*child, depth + 1, visit);
        }
    }

    pub fn print_scopes(&self) {
        self.walk_scopes(ROOT_SCOPE, &mut |scope, depth| {
            let indent = " ".repeat(depth * 4);
            println!("{indent}scope: {}", scope.name);
            for signal in &scope.child_signals {
                let signal = self.signal(*signal);
                let range = signal.index.map(|range| range.to_string()).unwrap_or_default();
                println!("{indent} - sig: {}{range} ({})", signal.name, signal.identifier);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcd::signal::Bit;

    fn change(identifier: &str, bit: Bit) -> ValueChange {
        ValueChange {
            identifier: identifier.to_string(),
            value: Value::Scalar(bit),
        }
    }

    #[test]
    fn value_at_falls_back_to_earlier_steps() {
        let mut trace = Trace::default();
        trace.time_steps = vec![
            TimeStep {
                time: 0,
                changes: vec![change("!", Bit::Zero), change("\"", Bit::X)],
            },
            TimeStep {
                time: 10,
                changes: vec![change("!", Bit::One)],
            },
        ];

        assert_eq!(trace.value_at("!", 5), Some(&Value::Scalar(Bit::Zero)));
        assert_eq!(trace.value_at("!", 10), Some(&Value::Scalar(Bit::One)));
        assert_eq!(trace.value_at("\"", 50), Some(&Value::Scalar(Bit::X)));
        assert_eq!(trace.value_at("#", 50), None);
    }

    #[test]
    fn fresh_trace_has_only_root() {
        let trace = Trace::default();
        assert_eq!(trace.scopes().len(), 1);
        assert_eq!(trace.root_scope().kind(), ScopeKind::Root);
        assert!(trace.root_scope().parent_idx().is_none());
        assert!(trace.signals().is_empty());
    }

    #[test]
    fn scope_keywords_round_trip() {
        for word in ScopeKind::KEYWORDS {
            assert!(ScopeKind::from_word(word).is_some(), "{word}");
        }
        assert!(ScopeKind::from_word("$root").is_none());
    }
}

//! Semantic actions of the grammar. Everything the grammar learns about the
//! dump reaches the in-progress trace through `ParseState`, which also holds
//! the transient state of one parse: the open scope stack, the current time
//! and the slots of the time step being filled.
use std::collections::HashMap;

use super::super::signal::{BitRange, Signal, SignalType, Value};
use super::super::types::{
    Metadata, Scope, ScopeIdx, ScopeKind, SignalIdx, TimeStep, Trace, ValueChange, ROOT_SCOPE,
};

pub(crate) struct ParseState {
    trace: Trace,
    scopes: Vec<ScopeIdx>,
    current_time: u64,
    // step collecting changes for `current_time`, once one was opened
    open_step: Option<usize>,
    // identifier -> position in the open step's changes
    step_slots: HashMap<String, usize>,
    start_time: u64,
    end_time: u64,
    trace_parsing: bool,
}

impl ParseState {
    pub(crate) fn new() -> ParseState {
        ParseState {
            trace: Trace::default(),
            scopes: vec![],
            current_time: 0,
            open_step: None,
            step_slots: HashMap::new(),
            start_time: 0,
            end_time: u64::MAX,
            trace_parsing: false,
        }
    }

    /// Prepares for a new parse: a fresh trace with its root scope open, and
    /// the time cursor back at zero.
    pub(crate) fn begin(&mut self, start_time: u64, end_time: u64, trace_parsing: bool) {
        self.reset_transient();
        self.trace = Trace::default();
        self.scopes.push(ROOT_SCOPE);
        self.start_time = start_time;
        self.end_time = end_time;
        self.trace_parsing = trace_parsing;
    }

    /// Hands the finished trace over, leaving nothing of it behind.
    pub(crate) fn finish(&mut self) -> Trace {
        self.reset_transient();
        std::mem::take(&mut self.trace)
    }

    /// Drops the partial trace after a failed parse.
    pub(crate) fn abandon(&mut self) {
        self.reset_transient();
        self.trace = Trace::default();
    }

    fn reset_transient(&mut self) {
        self.scopes.clear();
        self.current_time = 0;
        self.open_step = None;
        self.step_slots.clear();
    }

    pub(crate) fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.trace.metadata
    }

    pub(crate) fn has_declarations(&self) -> bool {
        self.trace.all_scopes.len() > 1 || !self.trace.all_signals.is_empty()
    }

    /// Name of the innermost scope still open below the root.
    pub(crate) fn open_scope_name(&self) -> Option<&str> {
        match self.scopes.as_slice() {
            [_root, .., innermost] => Some(&self.trace.all_scopes[innermost.0].name),
            _ => None,
        }
    }

    fn top_scope(&self) -> ScopeIdx {
        self.scopes.last().copied().unwrap_or(ROOT_SCOPE)
    }

    pub(crate) fn open_scope(&mut self, kind: ScopeKind, name: String) -> ScopeIdx {
        let parent_idx = self.top_scope();
        let self_idx = ScopeIdx(self.trace.all_scopes.len());

        if self.trace_parsing {
            tracing::debug!(target: "vcd::parse", ?kind, %name, depth = self.scopes.len(), "open scope");
        }

        self.trace.all_scopes[parent_idx.0].child_scopes.push(self_idx);
        self.trace.all_scopes.push(Scope {
            name,
            kind,
            parent_idx: Some(parent_idx),
            self_idx,
            child_signals: vec![],
            child_scopes: vec![],
        });
        self.scopes.push(self_idx);
        self_idx
    }

    /// Pops the innermost scope. Returns `None` when only the root is open,
    /// i.e. the `$upscope` has nothing to close.
    pub(crate) fn close_scope(&mut self) -> Option<ScopeIdx> {
        if self.scopes.len() <= 1 {
            return None;
        }
        let closed = self.scopes.pop();
        if self.trace_parsing {
            tracing::debug!(target: "vcd::parse", ?closed, "close scope");
        }
        closed
    }

    pub(crate) fn declare_signal(
        &mut self,
        signal_type: SignalType,
        num_bits: u32,
        identifier: String,
        name: String,
        index: Option<BitRange>,
    ) -> SignalIdx {
        let scope_parent = self.top_scope();
        let self_idx = SignalIdx(self.trace.all_signals.len());

        // nameless scopes are left out of the path
        let path = self
            .scopes
            .iter()
            .skip(1)
            .map(|idx| &self.trace.all_scopes[idx.0].name)
            .filter(|scope_name| !scope_name.is_empty())
            .cloned()
            .chain([name.clone()])
            .collect();

        let aliases = self.trace.signal_map.entry(identifier.clone()).or_default();
        if self.trace_parsing {
            tracing::debug!(
                target: "vcd::parse",
                %identifier,
                %name,
                num_bits,
                aliases = aliases.len(),
                "declare signal"
            );
        }
        aliases.push(self_idx);

        self.trace.all_signals.push(Signal {
            name,
            path,
            signal_type,
            num_bits,
            index,
            identifier,
            self_idx,
            scope_parent,
        });
        self.trace.all_scopes[scope_parent.0].child_signals.push(self_idx);
        self_idx
    }

    /// Every signal declared with `identifier`.
    pub(crate) fn resolve(&self, identifier: &str) -> Option<impl Iterator<Item = &Signal>> {
        let indices = self.trace.signal_map.get(identifier)?;
        Some(indices.iter().map(|idx| &self.trace.all_signals[idx.0]))
    }

    pub(crate) fn current_time(&self) -> u64 {
        self.current_time
    }

    /// Moves the time cursor to `time` and opens its step. A marker equal to
    /// the current time reuses the open step. Returns `false` if `time` lies
    /// before the current time.
    pub(crate) fn advance_time(&mut self, time: u64) -> bool {
        if time < self.current_time {
            return false;
        }
        if time != self.current_time {
            self.current_time = time;
            self.open_step = None;
        }
        if self.trace_parsing {
            tracing::debug!(target: "vcd::parse", time, "advance time");
        }
        self.step_for_current_time();
        true
    }

    fn step_for_current_time(&mut self) -> Option<usize> {
        if !(self.start_time..=self.end_time).contains(&self.current_time) {
            return None;
        }
        if let Some(step_idx) = self.open_step {
            return Some(step_idx);
        }

        let step_idx = self.trace.time_steps.len();
        self.trace.time_steps.push(TimeStep::new(self.current_time));
        self.step_slots.clear();
        self.open_step = Some(step_idx);
        Some(step_idx)
    }

    /// Records `value` for `identifier` at the current time. A second change
    /// to the same identifier in one step overwrites the first.
    pub(crate) fn record_change(&mut self, identifier: &str, value: Value) {
        let Some(step_idx) = self.step_for_current_time() else {
            if self.trace_parsing {
                tracing::debug!(
                    target: "vcd::parse",
                    time = self.current_time,
                    %identifier,
                    "change outside retained time window"
                );
            }
            return;
        };

        if self.trace_parsing {
            tracing::debug!(target: "vcd::parse", time = self.current_time, %identifier, %value, "value change");
        }

        let step = &mut self.trace.time_steps[step_idx];
        match self.step_slots.get(identifier) {
            Some(&slot) => step.changes[slot].value = value,
            None => {
                self.step_slots
                    .insert(identifier.to_string(), step.changes.len());
                step.changes.push(ValueChange {
                    identifier: identifier.to_string(),
                    value,
                });
            }
        }
    }
}

//! Action building blocks and combinators.
//!
//! Groups hold the union of their children's claims. A group's kind is the
//! first non-automation kind among its children, and it only rejects
//! contenders when every child does. `handed_over` reaches every child.

use super::action::{Action, ActionKind, EndReason, InterruptBehavior};
use super::ownership::Claim;

// ─── Leaves ─────────────────────────────────────────────────────────

/// Runs a closure at start and finishes immediately.
pub struct RunOnce {
    f: Option<Box<dyn FnOnce()>>,
    claims: Vec<Claim>,
}

impl RunOnce {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self {
            f: Some(Box::new(f)),
            claims: Vec::new(),
        }
    }

    pub fn requiring(mut self, claims: impl IntoIterator<Item = Claim>) -> Self {
        self.claims.extend(claims);
        self
    }
}

impl Action for RunOnce {
    fn name(&self) -> &str {
        "RunOnce"
    }

    fn claims(&self) -> &[Claim] {
        &self.claims
    }

    fn start(&mut self) {
        if let Some(f) = self.f.take() {
            f();
        }
    }

    fn is_finished(&self) -> bool {
        true
    }
}

/// Never finishes.
#[derive(Debug, Default)]
pub struct Idle {
    claims: Vec<Claim>,
}

impl Idle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requiring(mut self, claims: impl IntoIterator<Item = Claim>) -> Self {
        self.claims.extend(claims);
        self
    }
}

impl Action for Idle {
    fn name(&self) -> &str {
        "Idle"
    }

    fn claims(&self) -> &[Claim] {
        &self.claims
    }
}

/// Finishes once `condition` holds. Claims nothing.
pub struct WaitUntil {
    condition: Box<dyn Fn() -> bool>,
}

impl WaitUntil {
    pub fn new(condition: impl Fn() -> bool + 'static) -> Self {
        Self {
            condition: Box::new(condition),
        }
    }
}

impl Action for WaitUntil {
    fn name(&self) -> &str {
        "WaitUntil"
    }

    fn is_finished(&self) -> bool {
        (self.condition)()
    }
}

// ─── Groups ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
struct Summary {
    claims: Vec<Claim>,
    kind: ActionKind,
    behavior: InterruptBehavior,
}

impl Summary {
    fn of(children: &[Box<dyn Action>]) -> Self {
        let mut claims: Vec<Claim> = Vec::new();
        for claim in children.iter().flat_map(|c| c.claims()) {
            if !claims.contains(claim) {
                claims.push(claim.clone());
            }
        }
        let kind = children
            .iter()
            .map(|c| c.kind())
            .find(|k| *k != ActionKind::Automation)
            .unwrap_or_default();
        let behavior = if !children.is_empty()
            && children
                .iter()
                .all(|c| c.interrupt_behavior() == InterruptBehavior::CancelIncoming)
        {
            InterruptBehavior::CancelIncoming
        } else {
            InterruptBehavior::CancelSelf
        };
        Self {
            claims,
            kind,
            behavior,
        }
    }
}

/// Runs children one after another.
pub struct Sequence {
    children: Vec<Box<dyn Action>>,
    current: usize,
    summary: Summary,
}

impl Sequence {
    pub fn new(children: Vec<Box<dyn Action>>) -> Self {
        let summary = Summary::of(&children);
        Self {
            children,
            current: 0,
            summary,
        }
    }
}

impl Action for Sequence {
    fn name(&self) -> &str {
        "Sequence"
    }

    fn claims(&self) -> &[Claim] {
        &self.summary.claims
    }

    fn kind(&self) -> ActionKind {
        self.summary.kind
    }

    fn interrupt_behavior(&self) -> InterruptBehavior {
        self.summary.behavior
    }

    fn start(&mut self) {
        self.current = 0;
        if let Some(first) = self.children.first_mut() {
            first.start();
        }
    }

    fn execute(&mut self) {
        let Some(child) = self.children.get_mut(self.current) else {
            return;
        };
        child.execute();
        if child.is_finished() {
            child.end(EndReason::Finished);
            self.current += 1;
            if let Some(next) = self.children.get_mut(self.current) {
                next.start();
            }
        }
    }

    fn is_finished(&self) -> bool {
        self.current >= self.children.len()
    }

    fn end(&mut self, reason: EndReason) {
        if reason.is_interrupted() {
            if let Some(child) = self.children.get_mut(self.current) {
                child.end(reason);
            }
        }
    }

    fn handed_over(&mut self) {
        for child in &mut self.children {
            child.handed_over();
        }
    }
}

/// Runs children together until all have finished.
pub struct Parallel {
    children: Vec<Box<dyn Action>>,
    running: Vec<bool>,
    summary: Summary,
}

impl Parallel {
    pub fn new(children: Vec<Box<dyn Action>>) -> Self {
        let summary = Summary::of(&children);
        let running = vec![false; children.len()];
        Self {
            children,
            running,
            summary,
        }
    }
}

impl Action for Parallel {
    fn name(&self) -> &str {
        "Parallel"
    }

    fn claims(&self) -> &[Claim] {
        &self.summary.claims
    }

    fn kind(&self) -> ActionKind {
        self.summary.kind
    }

    fn interrupt_behavior(&self) -> InterruptBehavior {
        self.summary.behavior
    }

    fn start(&mut self) {
        for (child, running) in self.children.iter_mut().zip(self.running.iter_mut()) {
            child.start();
            *running = true;
        }
    }

    fn execute(&mut self) {
        for (child, running) in self.children.iter_mut().zip(self.running.iter_mut()) {
            if !*running {
                continue;
            }
            child.execute();
            if child.is_finished() {
                child.end(EndReason::Finished);
                *running = false;
            }
        }
    }

    fn is_finished(&self) -> bool {
        !self.running.iter().any(|r| *r)
    }

    fn end(&mut self, reason: EndReason) {
        for (child, running) in self.children.iter_mut().zip(self.running.iter_mut()) {
            if *running {
                child.end(reason);
                *running = false;
            }
        }
    }

    fn handed_over(&mut self) {
        for child in &mut self.children {
            child.handed_over();
        }
    }
}

/// Runs children together until the first one finishes; the rest are cancelled.
pub struct Race {
    children: Vec<Box<dyn Action>>,
    winner: Option<usize>,
    summary: Summary,
}

impl Race {
    pub fn new(children: Vec<Box<dyn Action>>) -> Self {
        let summary = Summary::of(&children);
        Self {
            children,
            winner: None,
            summary,
        }
    }
}

impl Action for Race {
    fn name(&self) -> &str {
        "Race"
    }

    fn claims(&self) -> &[Claim] {
        &self.summary.claims
    }

    fn kind(&self) -> ActionKind {
        self.summary.kind
    }

    fn interrupt_behavior(&self) -> InterruptBehavior {
        self.summary.behavior
    }

    fn start(&mut self) {
        self.winner = None;
        for child in &mut self.children {
            child.start();
        }
    }

    fn execute(&mut self) {
        for (i, child) in self.children.iter_mut().enumerate() {
            child.execute();
            if self.winner.is_none() && child.is_finished() {
                self.winner = Some(i);
            }
        }
    }

    fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    fn end(&mut self, reason: EndReason) {
        for (i, child) in self.children.iter_mut().enumerate() {
            let child_reason = match reason {
                EndReason::Finished if Some(i) == self.winner => EndReason::Finished,
                EndReason::Finished => EndReason::Cancelled,
                other => other,
            };
            child.end(child_reason);
        }
    }

    fn handed_over(&mut self) {
        for child in &mut self.children {
            child.handed_over();
        }
    }
}

// ─── Decorators ─────────────────────────────────────────────────────

/// Runs a closure after the inner action's `end`.
pub struct FinallyDo<A> {
    inner: A,
    f: Box<dyn FnMut(EndReason)>,
}

impl<A: Action> Action for FinallyDo<A> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn claims(&self) -> &[Claim] {
        self.inner.claims()
    }

    fn kind(&self) -> ActionKind {
        self.inner.kind()
    }

    fn interrupt_behavior(&self) -> InterruptBehavior {
        self.inner.interrupt_behavior()
    }

    fn start(&mut self) {
        self.inner.start();
    }

    fn execute(&mut self) {
        self.inner.execute();
    }

    fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    fn end(&mut self, reason: EndReason) {
        self.inner.end(reason);
        (self.f)(reason);
    }

    fn handed_over(&mut self) {
        self.inner.handed_over();
    }
}

/// Renames the inner action.
pub struct Named<A> {
    inner: A,
    name: String,
}

impl<A: Action> Action for Named<A> {
    fn name(&self) -> &str {
        &self.name
    }

    fn claims(&self) -> &[Claim] {
        self.inner.claims()
    }

    fn kind(&self) -> ActionKind {
        self.inner.kind()
    }

    fn interrupt_behavior(&self) -> InterruptBehavior {
        self.inner.interrupt_behavior()
    }

    fn start(&mut self) {
        self.inner.start();
    }

    fn execute(&mut self) {
        self.inner.execute();
    }

    fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    fn end(&mut self, reason: EndReason) {
        self.inner.end(reason);
    }

    fn handed_over(&mut self) {
        self.inner.handed_over();
    }
}

/// Replaces the inner action's interrupt behaviour.
pub struct WithInterruptBehavior<A> {
    inner: A,
    behavior: InterruptBehavior,
}

impl<A: Action> Action for WithInterruptBehavior<A> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn claims(&self) -> &[Claim] {
        self.inner.claims()
    }

    fn kind(&self) -> ActionKind {
        self.inner.kind()
    }

    fn interrupt_behavior(&self) -> InterruptBehavior {
        self.behavior
    }

    fn start(&mut self) {
        self.inner.start();
    }

    fn execute(&mut self) {
        self.inner.execute();
    }

    fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    fn end(&mut self, reason: EndReason) {
        self.inner.end(reason);
    }

    fn handed_over(&mut self) {
        self.inner.handed_over();
    }
}

/// Combinators available on every sized action.
pub trait ActionExt: Action + Sized + 'static {
    fn boxed(self) -> Box<dyn Action> {
        Box::new(self)
    }

    fn finally_do(self, f: impl FnMut(EndReason) + 'static) -> FinallyDo<Self> {
        FinallyDo {
            inner: self,
            f: Box::new(f),
        }
    }

    fn along_with(self, other: impl Action + 'static) -> Parallel {
        Parallel::new(vec![self.boxed(), Box::new(other)])
    }

    fn race_with(self, other: impl Action + 'static) -> Race {
        Race::new(vec![self.boxed(), Box::new(other)])
    }

    fn and_then(self, next: impl Action + 'static) -> Sequence {
        Sequence::new(vec![self.boxed(), Box::new(next)])
    }

    fn with_name(self, name: impl Into<String>) -> Named<Self> {
        Named {
            inner: self,
            name: name.into(),
        }
    }

    fn with_interrupt_behavior(self, behavior: InterruptBehavior) -> WithInterruptBehavior<Self> {
        WithInterruptBehavior {
            inner: self,
            behavior,
        }
    }
}

impl<A: Action + 'static> ActionExt for A {}

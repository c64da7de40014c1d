//! Hierarchical state machine engine.
//!
//! States form a tree described by a [`Chart`]: every state has at most one
//! parent, and only leaves are ever current. A signal goes to the current
//! leaf first; a handler that answers [`Outcome::Delegate`] passes it to its
//! parent, and so on up to the root, where unhandled signals are dropped.
//!
//! ```text
//!   On ──┬── Idle
//!        ├── Busy ──┬── LampOn          signal ──► leaf
//!        │          └── LampOff                     │ Delegate
//!        └── ...                                    ▼
//!                                                 parent ... root (drop)
//! ```
//!
//! A transition to `target` runs, in order:
//!
//! 1. [`Event::Exit`] from the current leaf upward, stopping at the first
//!    state that strictly contains `target`. A transition to the source
//!    itself or to one of its ancestors therefore exits and re-enters it.
//! 2. [`Event::Entry`] from below that common ancestor down to `target`.
//! 3. [`Event::Init`] on `target`; answering `Transition(child)` enters the
//!    child and repeats until a state stops descending.
//!
//! `Init`, `Entry` and `Exit` are delivered to exactly one state and never
//! delegated.

use core::fmt::Debug;

use heapless::Vec;
use log::{debug, info, warn};

/// Deepest supported nesting, root included.
pub const MAX_DEPTH: usize = 8;

/// What a state handler is asked to process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event<S> {
    /// Pick an initial child after the state was entered as a target.
    Init,
    /// The state is being entered.
    Entry,
    /// The state is being left.
    Exit,
    /// A domain signal.
    Signal(S),
}

/// Handler result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome<S> {
    /// Consumed; no state change.
    Handled,
    /// Not handled here; ask the parent.
    Delegate,
    /// Consumed; move to the given state once the handler returns.
    Transition(S),
}

/// A state tree together with the context its handlers act on.
pub trait Chart {
    /// State identifier.
    type State: Copy + Eq + Debug;
    /// Domain signal payload.
    type Signal: Debug;

    /// Parent of `state`, or `None` for the root.
    fn parent(state: Self::State) -> Option<Self::State>;

    /// Handle one event in `state`.
    fn handle(
        &mut self,
        state: Self::State,
        event: &Event<Self::Signal>,
    ) -> Outcome<Self::State>;
}

/// Tracks the current leaf of a [`Chart`] and runs its transitions.
#[derive(Clone, Copy, Debug)]
pub struct Machine<S> {
    current: S,
}

impl<S: Copy + Eq + Debug> Machine<S> {
    /// A machine that will start in `top`. Nothing runs until
    /// [`start`](Self::start).
    pub fn new(top: S) -> Self {
        Self { current: top }
    }

    /// Enter the top state (and its ancestors) and drill down through `Init`.
    pub fn start<C: Chart<State = S>>(&mut self, chart: &mut C) {
        let top = self.current;
        info!("hsm: start in {:?}", top);
        let path = path_down::<C>(None, top);
        for &state in path.iter() {
            deliver(chart, state, &Event::Entry);
        }
        self.drill(chart);
    }

    /// Deliver `signal`, delegating upward until some state handles it.
    pub fn dispatch<C: Chart<State = S>>(&mut self, chart: &mut C, signal: C::Signal) {
        let event = Event::Signal(signal);
        let mut state = Some(self.current);
        while let Some(s) = state {
            match chart.handle(s, &event) {
                Outcome::Handled => return,
                Outcome::Delegate => state = C::parent(s),
                Outcome::Transition(target) => {
                    self.transition(chart, target);
                    return;
                }
            }
        }
        debug!("hsm: {:?} unhandled in {:?}", event, self.current);
    }

    /// Move to `target` from outside any handler.
    pub fn transition<C: Chart<State = S>>(&mut self, chart: &mut C, target: S) {
        info!("hsm: {:?} -> {:?}", self.current, target);

        let mut state = Some(self.current);
        while let Some(s) = state {
            if strictly_contains::<C>(s, target) {
                break;
            }
            deliver(chart, s, &Event::Exit);
            state = C::parent(s);
        }

        for &s in path_down::<C>(state, target).iter() {
            deliver(chart, s, &Event::Entry);
        }
        self.current = target;
        self.drill(chart);
    }

    /// The current leaf.
    #[inline]
    pub fn current(&self) -> S {
        self.current
    }

    /// True when `state` is the current leaf or one of its ancestors.
    pub fn is_in<C: Chart<State = S>>(&self, state: S) -> bool {
        self.current == state || strictly_contains::<C>(state, self.current)
    }

    fn drill<C: Chart<State = S>>(&mut self, chart: &mut C) {
        for _ in 0..MAX_DEPTH {
            let child = match chart.handle(self.current, &Event::Init) {
                Outcome::Transition(child) => child,
                _ => return,
            };
            if !strictly_contains::<C>(self.current, child) {
                warn!("hsm: init of {:?} names non-child {:?}", self.current, child);
                return;
            }
            for &s in path_down::<C>(Some(self.current), child).iter() {
                deliver(chart, s, &Event::Entry);
            }
            debug!("hsm: init {:?} -> {:?}", self.current, child);
            self.current = child;
        }
        warn!("hsm: init chain deeper than {}", MAX_DEPTH);
    }
}

/// Entry and exit run in exactly one state; a transition asked for there is
/// dropped.
fn deliver<C: Chart>(chart: &mut C, state: C::State, event: &Event<C::Signal>) {
    if let Outcome::Transition(target) = chart.handle(state, event) {
        warn!("hsm: {:?} in {:?} asked for {:?}, ignored", event, state, target);
    }
}

/// Whether `outer` is a proper ancestor of `inner`.
fn strictly_contains<C: Chart>(outer: C::State, inner: C::State) -> bool {
    let mut state = C::parent(inner);
    for _ in 0..MAX_DEPTH {
        match state {
            Some(s) if s == outer => return true,
            Some(s) => state = C::parent(s),
            None => return false,
        }
    }
    false
}

/// States from just below `from` down to `to`, outermost first.
///
/// `from = None` means "from the root", so the root itself is included.
fn path_down<C: Chart>(from: Option<C::State>, to: C::State) -> Vec<C::State, MAX_DEPTH> {
    let mut path: Vec<C::State, MAX_DEPTH> = Vec::new();
    let mut state = Some(to);
    while let Some(s) = state {
        if Some(s) == from || path.push(s).is_err() {
            break;
        }
        state = C::parent(s);
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;
    use alloc::vec::Vec;

    // Root ─┬─ A ─┬─ A1
    //       │     └─ A2
    //       └─ B
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum S {
        Root,
        A,
        A1,
        A2,
        B,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Sig {
        Go(S),
        Poke,
        Nobody,
    }

    #[derive(Default)]
    struct Recorder {
        log: Vec<String>,
        a_init_to: Option<S>,
        entry_bounce: bool,
        a_pokes: u32,
    }

    impl Recorder {
        fn take(&mut self) -> Vec<String> {
            core::mem::take(&mut self.log)
        }
    }

    impl Chart for Recorder {
        type State = S;
        type Signal = Sig;

        fn parent(state: S) -> Option<S> {
            match state {
                S::Root => None,
                S::A | S::B => Some(S::Root),
                S::A1 | S::A2 => Some(S::A),
            }
        }

        fn handle(&mut self, state: S, event: &Event<Sig>) -> Outcome<S> {
            match event {
                Event::Entry => {
                    self.log.push(format!("{:?}:entry", state));
                    if self.entry_bounce && state == S::B {
                        return Outcome::Transition(S::A);
                    }
                    Outcome::Handled
                }
                Event::Exit => {
                    self.log.push(format!("{:?}:exit", state));
                    Outcome::Handled
                }
                Event::Init => match (state, self.a_init_to) {
                    (S::Root, _) => Outcome::Transition(S::A),
                    (S::A, Some(child)) => Outcome::Transition(child),
                    (S::A, None) => Outcome::Transition(S::A1),
                    _ => Outcome::Handled,
                },
                Event::Signal(Sig::Go(target)) if state == S::Root => Outcome::Transition(*target),
                Event::Signal(Sig::Poke) if state == S::A => {
                    self.a_pokes += 1;
                    Outcome::Handled
                }
                Event::Signal(_) => Outcome::Delegate,
            }
        }
    }

    fn started() -> (Machine<S>, Recorder) {
        let mut chart = Recorder::default();
        let mut machine = Machine::new(S::Root);
        machine.start(&mut chart);
        chart.take();
        (machine, chart)
    }

    #[test]
    fn start_enters_and_drills_to_leaf() {
        let mut chart = Recorder::default();
        let mut machine = Machine::new(S::Root);
        machine.start(&mut chart);
        assert_eq!(machine.current(), S::A1);
        assert_eq!(chart.log, ["Root:entry", "A:entry", "A1:entry"]);
    }

    #[test]
    fn start_in_nested_state_enters_ancestors() {
        let mut chart = Recorder::default();
        let mut machine = Machine::new(S::A2);
        machine.start(&mut chart);
        assert_eq!(machine.current(), S::A2);
        assert_eq!(chart.log, ["Root:entry", "A:entry", "A2:entry"]);
    }

    #[test]
    fn sibling_transition_exits_to_common_parent() {
        let (mut machine, mut chart) = started();
        machine.dispatch(&mut chart, Sig::Go(S::A2));
        assert_eq!(machine.current(), S::A2);
        assert_eq!(chart.take(), ["A1:exit", "A2:entry"]);
    }

    #[test]
    fn cross_branch_transition() {
        let (mut machine, mut chart) = started();
        machine.dispatch(&mut chart, Sig::Go(S::B));
        assert_eq!(machine.current(), S::B);
        assert_eq!(chart.take(), ["A1:exit", "A:exit", "B:entry"]);
    }

    #[test]
    fn self_transition_exits_and_reenters() {
        let (mut machine, mut chart) = started();
        machine.dispatch(&mut chart, Sig::Go(S::A1));
        assert_eq!(chart.take(), ["A1:exit", "A1:entry"]);
    }

    #[test]
    fn transition_to_ancestor_reenters_and_drills() {
        let (mut machine, mut chart) = started();
        machine.dispatch(&mut chart, Sig::Go(S::A2));
        chart.take();

        machine.dispatch(&mut chart, Sig::Go(S::A));
        assert_eq!(machine.current(), S::A1);
        assert_eq!(chart.take(), ["A2:exit", "A:exit", "A:entry", "A1:entry"]);
    }

    #[test]
    fn transition_to_root_restarts_everything() {
        let (mut machine, mut chart) = started();
        machine.dispatch(&mut chart, Sig::Go(S::Root));
        assert_eq!(machine.current(), S::A1);
        assert_eq!(
            chart.take(),
            ["A1:exit", "A:exit", "Root:exit", "Root:entry", "A:entry", "A1:entry"]
        );
    }

    #[test]
    fn init_picks_child() {
        let (mut machine, mut chart) = started();
        chart.a_init_to = Some(S::A2);
        machine.dispatch(&mut chart, Sig::Go(S::A));
        assert_eq!(machine.current(), S::A2);
    }

    #[test]
    fn init_to_non_child_is_ignored() {
        let (mut machine, mut chart) = started();
        chart.a_init_to = Some(S::B);
        machine.dispatch(&mut chart, Sig::Go(S::A));
        assert_eq!(machine.current(), S::A);
    }

    #[test]
    fn signal_delegates_to_parent() {
        let (mut machine, mut chart) = started();
        machine.dispatch(&mut chart, Sig::Poke);
        assert_eq!(chart.a_pokes, 1);
        assert_eq!(machine.current(), S::A1);
        assert!(chart.take().is_empty());
    }

    #[test]
    fn unhandled_signal_is_dropped() {
        let (mut machine, mut chart) = started();
        machine.dispatch(&mut chart, Sig::Go(S::B));
        chart.take();
        machine.dispatch(&mut chart, Sig::Poke); // only A handles Poke
        machine.dispatch(&mut chart, Sig::Nobody);
        assert_eq!(chart.a_pokes, 0);
        assert_eq!(machine.current(), S::B);
        assert!(chart.take().is_empty());
    }

    #[test]
    fn transition_from_entry_is_ignored() {
        let (mut machine, mut chart) = started();
        chart.entry_bounce = true;
        machine.dispatch(&mut chart, Sig::Go(S::B));
        assert_eq!(machine.current(), S::B);
    }

    #[test]
    fn forced_transition() {
        let (mut machine, mut chart) = started();
        machine.transition(&mut chart, S::A2);
        assert_eq!(machine.current(), S::A2);
        assert_eq!(chart.take(), ["A1:exit", "A2:entry"]);
    }

    #[test]
    fn is_in_checks_ancestry() {
        let (machine, _chart) = started();
        assert!(machine.is_in::<Recorder>(S::A1));
        assert!(machine.is_in::<Recorder>(S::A));
        assert!(machine.is_in::<Recorder>(S::Root));
        assert!(!machine.is_in::<Recorder>(S::A2));
        assert!(!machine.is_in::<Recorder>(S::B));
    }
}

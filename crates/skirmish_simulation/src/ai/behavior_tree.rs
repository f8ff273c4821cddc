//! Behavior tree core: node protocol and the two composite nodes.
//!
//! Nodes are evaluated every AI tick against a context snapshot. A node
//! either finished (`Success`), could not run (`Failure`), or is mid-way
//! through a multi-tick task (`Running`).

/// Result of evaluating a behavior node for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    Running,
    Success,
    Failure,
}

/// A behavior tree node evaluated against a context of type `C`.
///
/// `tick` takes `&mut self` so stateful leaves (combo progression, timers)
/// can remember where they were between ticks.
pub trait Behavior<C>: Send + Sync {
    fn tick(&mut self, ctx: &mut C) -> NodeStatus;
}

impl<C> Behavior<C> for Box<dyn Behavior<C>> {
    #[inline]
    fn tick(&mut self, ctx: &mut C) -> NodeStatus {
        (**self).tick(ctx)
    }
}

/// Evaluates children in order until one returns Success or Running;
/// Failure only if every child fails. Short-circuited OR.
pub struct Selector<C> {
    children: Vec<Box<dyn Behavior<C>>>,
}

impl<C> Selector<C> {
    /// Panics if `children` is empty: a childless selector is a
    /// programming error.
    pub fn new(children: Vec<Box<dyn Behavior<C>>>) -> Self {
        assert!(!children.is_empty(), "Selector must have at least one child");
        Self { children }
    }
}

impl<C> Behavior<C> for Selector<C> {
    fn tick(&mut self, ctx: &mut C) -> NodeStatus {
        for child in &mut self.children {
            match child.tick(ctx) {
                NodeStatus::Failure => continue,
                NodeStatus::Success => return NodeStatus::Success,
                NodeStatus::Running => return NodeStatus::Running,
            }
        }
        NodeStatus::Failure
    }
}

/// Evaluates children in order until one fails. If none failed, reports
/// Running while any child is still running, Success once all succeeded.
/// Short-circuited AND.
pub struct Sequence<C> {
    children: Vec<Box<dyn Behavior<C>>>,
}

impl<C> Sequence<C> {
    /// Panics if `children` is empty.
    pub fn new(children: Vec<Box<dyn Behavior<C>>>) -> Self {
        assert!(!children.is_empty(), "Sequence must have at least one child");
        Self { children }
    }
}

impl<C> Behavior<C> for Sequence<C> {
    fn tick(&mut self, ctx: &mut C) -> NodeStatus {
        let mut any_running = false;

        for child in &mut self.children {
            match child.tick(ctx) {
                NodeStatus::Failure => return NodeStatus::Failure,
                NodeStatus::Success => continue,
                NodeStatus::Running => any_running = true,
            }
        }

        if any_running {
            NodeStatus::Running
        } else {
            NodeStatus::Success
        }
    }
}

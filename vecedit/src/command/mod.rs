//! Reversible edits. Every mutation a tool commits goes through a [`Command`].
//!
//! Lifecycle: pending -> applied <-> undone. A command is either applied by
//! [`stack::CommandStack::execute`] or recorded after the fact with
//! [`stack::CommandStack::push`] when live preview already mutated the nodes.

pub mod attrs;
pub mod nodes;
pub mod stack;

use crate::error::Result;
use crate::node::NodeId;
use crate::scene::NodeStore;
use serde::Serialize;
use std::fmt;

pub use attrs::{AttrChange, SetAttrs};
pub use nodes::{AddNodes, RemoveNodes};
pub use stack::CommandStack;

/// Non-geometric editor state a batch needs restored before replay.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "target", rename_all = "camelCase")]
pub enum EditorEffect {
    EnterPathEdit(NodeId),
    ExitPathEdit,
    Select(Vec<NodeId>),
}

/// Host side of [`EditorEffect`]; the stack calls it before replaying a command.
pub trait EffectHandler {
    fn handle(&mut self, effect: &EditorEffect);
}

/// Ignores every effect.
pub struct NoEffects;

impl EffectHandler for NoEffects {
    fn handle(&mut self, _effect: &EditorEffect) {}
}

impl EffectHandler for Vec<EditorEffect> {
    fn handle(&mut self, effect: &EditorEffect) {
        self.push(effect.clone());
    }
}

pub trait Command: fmt::Debug {
    fn desc(&self) -> &str;

    /// Forward operation. On error no node is left modified.
    fn apply(&mut self, store: &mut dyn NodeStore) -> Result<()>;

    /// Exact inverse of `apply`.
    fn undo(&mut self, store: &mut dyn NodeStore) -> Result<()>;

    fn before_redo(&self) -> Option<&EditorEffect> { None }

    fn before_undo(&self) -> Option<&EditorEffect> { None }

    /// Hooks to run before undoing this entry, in firing order.
    fn undo_hooks<'a>(&'a self, out: &mut Vec<&'a EditorEffect>) {
        out.extend(self.before_undo());
    }

    /// Hooks to run before redoing this entry, in firing order.
    fn redo_hooks<'a>(&'a self, out: &mut Vec<&'a EditorEffect>) {
        out.extend(self.before_redo());
    }
}

/// Children applied in order and undone in reverse as one step.
///
/// Hooks of nested batches are collected too: the stack fires the outer
/// hook first, then the children's in replay order.
#[derive(Debug)]
pub struct Batch {
    desc: String,
    children: Vec<Box<dyn Command>>,
    before_redo: Option<EditorEffect>,
    before_undo: Option<EditorEffect>,
}

impl Batch {
    pub fn new(desc: impl Into<String>) -> Self {
        Batch { desc: desc.into(), children: Vec::new(), before_redo: None, before_undo: None }
    }

    pub fn with_hooks(mut self, before_redo: Option<EditorEffect>, before_undo: Option<EditorEffect>) -> Self {
        self.before_redo = before_redo;
        self.before_undo = before_undo;
        self
    }

    pub fn push(&mut self, cmd: Box<dyn Command>) {
        self.children.push(cmd);
    }

    pub fn len(&self) -> usize { self.children.len() }

    pub fn is_empty(&self) -> bool { self.children.is_empty() }
}

impl Command for Batch {
    fn desc(&self) -> &str { &self.desc }

    fn apply(&mut self, store: &mut dyn NodeStore) -> Result<()> {
        for i in 0..self.children.len() {
            if let Err(e) = self.children[i].apply(store) {
                // roll back what already ran
                for done in self.children[..i].iter_mut().rev() {
                    done.undo(store)?;
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn undo(&mut self, store: &mut dyn NodeStore) -> Result<()> {
        let n = self.children.len();
        for i in (0..n).rev() {
            if let Err(e) = self.children[i].undo(store) {
                for done in self.children[i + 1..].iter_mut() {
                    done.apply(store)?;
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn before_redo(&self) -> Option<&EditorEffect> { self.before_redo.as_ref() }

    fn before_undo(&self) -> Option<&EditorEffect> { self.before_undo.as_ref() }

    fn undo_hooks<'a>(&'a self, out: &mut Vec<&'a EditorEffect>) {
        out.extend(self.before_undo.as_ref());
        for child in self.children.iter().rev() {
            child.undo_hooks(out);
        }
    }

    fn redo_hooks<'a>(&'a self, out: &mut Vec<&'a EditorEffect>) {
        out.extend(self.before_redo.as_ref());
        for child in &self.children {
            child.redo_hooks(out);
        }
    }
}

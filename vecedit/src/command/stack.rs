use super::{Batch, Command, EditorEffect, EffectHandler};
use crate::error::Result;
use crate::scene::NodeStore;
use crate::settings::Settings;

/// Undo/redo history. Commands pushed between `batch_start` and
/// `batch_command_end` collapse into one [`Batch`].
#[derive(Debug)]
pub struct CommandStack {
    undo: Vec<Box<dyn Command>>,
    redo: Vec<Box<dyn Command>>,
    open: Option<Batch>,
    depth: usize,
    limit: usize,
}

impl Default for CommandStack {
    fn default() -> Self { CommandStack::new(Settings::default().undo_limit) }
}

impl CommandStack {
    pub fn new(limit: usize) -> Self {
        CommandStack { undo: Vec::new(), redo: Vec::new(), open: None, depth: 0, limit: limit.max(1) }
    }

    pub fn from_settings(settings: &Settings) -> Self { CommandStack::new(settings.undo_limit) }

    /// Apply `cmd` and record it.
    pub fn execute(&mut self, mut cmd: Box<dyn Command>, store: &mut dyn NodeStore) -> Result<()> {
        cmd.apply(store)?;
        tracing::debug!(desc = cmd.desc(), "execute");
        self.record(cmd);
        Ok(())
    }

    /// Record a command whose effect is already in the store.
    pub fn push(&mut self, cmd: Box<dyn Command>) {
        tracing::debug!(desc = cmd.desc(), "push");
        self.record(cmd);
    }

    fn record(&mut self, cmd: Box<dyn Command>) {
        self.redo.clear();
        match self.open.as_mut() {
            Some(batch) => batch.push(cmd),
            None => self.push_undo(cmd),
        }
    }

    fn push_undo(&mut self, cmd: Box<dyn Command>) {
        self.undo.push(cmd);
        if self.undo.len() > self.limit {
            let overflow = self.undo.len() - self.limit;
            self.undo.drain(..overflow);
        }
    }

    pub fn batch_start(&mut self, desc: impl Into<String>) {
        self.batch_start_with_hooks(desc, None, None);
    }

    /// Open a batch. Nested starts join the outer batch.
    pub fn batch_start_with_hooks(
        &mut self,
        desc: impl Into<String>,
        before_redo: Option<EditorEffect>,
        before_undo: Option<EditorEffect>,
    ) {
        self.depth += 1;
        if self.open.is_none() {
            let desc = desc.into();
            tracing::debug!(desc = %desc, "batch start");
            self.open = Some(Batch::new(desc).with_hooks(before_redo, before_undo));
        }
    }

    pub fn batch_command_end(&mut self) {
        if self.depth == 0 {
            tracing::warn!("batch end without matching start");
            return;
        }
        self.depth -= 1;
        if self.depth > 0 {
            return;
        }
        if let Some(batch) = self.open.take() {
            if batch.is_empty() {
                tracing::warn!(desc = batch.desc(), "empty batch discarded");
            } else {
                tracing::debug!(desc = batch.desc(), children = batch.len(), "batch end");
                self.push_undo(Box::new(batch));
            }
        }
    }

    pub fn is_batch_open(&self) -> bool { self.open.is_some() }

    pub fn can_undo(&self) -> bool { self.open.is_none() && !self.undo.is_empty() }

    pub fn can_redo(&self) -> bool { self.open.is_none() && !self.redo.is_empty() }

    pub fn undo_len(&self) -> usize { self.undo.len() }

    pub fn peek_undo(&self) -> Option<&str> { self.undo.last().map(|c| c.desc()) }

    /// Undo the latest entry. Returns `false` when there is nothing to undo or a batch is open.
    pub fn undo(&mut self, store: &mut dyn NodeStore, effects: &mut dyn EffectHandler) -> Result<bool> {
        if self.open.is_some() {
            tracing::warn!("undo while a batch is open ignored");
            return Ok(false);
        }
        let Some(mut cmd) = self.undo.pop() else { return Ok(false) };
        let mut hooks = Vec::new();
        cmd.undo_hooks(&mut hooks);
        for e in hooks {
            effects.handle(e);
        }
        if let Err(e) = cmd.undo(store) {
            self.undo.push(cmd);
            return Err(e);
        }
        tracing::debug!(desc = cmd.desc(), "undo");
        self.redo.push(cmd);
        Ok(true)
    }

    pub fn redo(&mut self, store: &mut dyn NodeStore, effects: &mut dyn EffectHandler) -> Result<bool> {
        if self.open.is_some() {
            tracing::warn!("redo while a batch is open ignored");
            return Ok(false);
        }
        let Some(mut cmd) = self.redo.pop() else { return Ok(false) };
        let mut hooks = Vec::new();
        cmd.redo_hooks(&mut hooks);
        for e in hooks {
            effects.handle(e);
        }
        if let Err(e) = cmd.apply(store) {
            self.redo.push(cmd);
            return Err(e);
        }
        tracing::debug!(desc = cmd.desc(), "redo");
        self.undo.push(cmd);
        Ok(true)
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.open = None;
        self.depth = 0;
    }
}

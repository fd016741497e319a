//! Optimistic local board copy.
//!
//! # Responsibility
//! - Apply commands to a local layout before the authoritative copy answers.
//! - Restore the pre-edit snapshot when the authoritative copy rejects an edit.
//!
//! # Invariants
//! - Local edits run the same `index::apply` as the authoritative path.
//! - Pending edits are ordered; rolling one back discards every later edit.

use crate::index::{self, BoardCommand, IndexResult};
use crate::model::board::{BoardIndex, ItemId};

/// Handle identifying one locally applied, unconfirmed edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EditToken(u64);

#[derive(Debug, Clone)]
struct PendingEdit {
    token: EditToken,
    command: BoardCommand,
    before: BoardIndex,
}

/// Local layout plus the stack of unconfirmed edits applied on top of it.
#[derive(Debug, Clone)]
pub struct OptimisticBoard {
    current: BoardIndex,
    version: i64,
    pending: Vec<PendingEdit>,
    next_token: u64,
}

impl OptimisticBoard {
    /// Starts from an authoritative layout at `version`.
    pub fn new(index: BoardIndex, version: i64) -> Self {
        Self {
            current: index,
            version,
            pending: Vec::new(),
            next_token: 0,
        }
    }

    /// Layout to display, including unconfirmed edits.
    pub fn current(&self) -> &BoardIndex {
        &self.current
    }

    /// Last authoritative version seen.
    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Applies `command` locally and records the pre-edit snapshot.
    ///
    /// Returns the edit token and the items the edit removed locally.
    /// A rejected command leaves the local copy unchanged.
    pub fn apply_local(
        &mut self,
        command: BoardCommand,
    ) -> IndexResult<(EditToken, Vec<ItemId>)> {
        let applied = index::apply(&self.current, &command)?;
        let token = EditToken(self.next_token);
        self.next_token += 1;
        let before = std::mem::replace(&mut self.current, applied.board);
        self.pending.push(PendingEdit {
            token,
            command,
            before,
        });
        Ok((token, applied.removed_items))
    }

    /// Accepts the authoritative result for edit `token`.
    ///
    /// Edits up to and including `token` are settled. Later pending edits are
    /// replayed on top of `authoritative`; the ones that no longer apply are
    /// dropped and returned.
    /// Unknown or already settled tokens leave the copy unchanged.
    pub fn confirm(
        &mut self,
        token: EditToken,
        authoritative: BoardIndex,
        version: i64,
    ) -> Vec<BoardCommand> {
        let Some(position) = self.pending.iter().position(|edit| edit.token == token) else {
            return Vec::new();
        };
        let remaining = self.pending.split_off(position + 1);
        self.pending.clear();
        self.current = authoritative;
        self.version = version;

        let mut dropped = Vec::new();
        for edit in remaining {
            match index::apply(&self.current, &edit.command) {
                Ok(applied) => {
                    let before = std::mem::replace(&mut self.current, applied.board);
                    self.pending.push(PendingEdit { before, ..edit });
                }
                Err(_) => dropped.push(edit.command),
            }
        }
        dropped
    }

    /// Restores the snapshot taken before edit `token`.
    ///
    /// Edits applied after `token` were built on the rejected layout and are
    /// discarded too; all discarded commands are returned oldest first.
    /// Unknown tokens leave the copy unchanged.
    pub fn rollback(&mut self, token: EditToken) -> Vec<BoardCommand> {
        let Some(position) = self.pending.iter().position(|edit| edit.token == token) else {
            return Vec::new();
        };
        let mut discarded = self.pending.split_off(position);
        let first = discarded.remove(0);
        self.current = first.before;
        std::iter::once(first.command)
            .chain(discarded.into_iter().map(|edit| edit.command))
            .collect()
    }
}

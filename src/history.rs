//! Undo/redo history for interactive course editing.
//!
//! [`CourseEditor`] owns the markers of one course-creation session and
//! records every marker edit as a reversible [`EditAction`]. History is
//! linear: recording a new action drops the redo branch. Undo and redo
//! never fail; when there is nothing to do they leave the state unchanged.

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

/// A recorded, reversible marker edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditAction {
    /// A marker appended at `index`.
    AddMarker { index: usize, position: Coordinate },
    /// The last marker removed; `position` restores it.
    RemoveLastMarker { position: Coordinate },
    MoveMarker {
        marker_index: usize,
        previous_position: Coordinate,
        new_position: Coordinate,
    },
    /// Marker order reversed; `previous_order` is the order before.
    SwapMarkers { previous_order: Vec<Coordinate> },
    /// Markers replaced by an uploaded GPX track. Not reversible.
    BulkReplace,
}

/// An edit requested by the map UI.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerEdit {
    Add(Coordinate),
    RemoveLast,
    /// Marker positions after a drag. Exactly one index is expected to
    /// differ; only the first difference is taken.
    Move(Vec<Coordinate>),
    /// Reverse the course so the end becomes the start.
    Swap,
    /// Uploaded GPX coordinates replace the markers.
    BulkReplace(Vec<Coordinate>),
}

/// Whether the history is recording or replaying an undo/redo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryMode {
    #[default]
    Idle,
    Replaying,
}

/// Two stacks of actions, most recent last.
#[derive(Debug, Clone, Default)]
pub struct EditHistory {
    undo_stack: Vec<EditAction>,
    redo_stack: Vec<EditAction>,
    mode: HistoryMode,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a fresh action and discard the redo branch.
    ///
    /// Ignored while replaying; returns whether the action was recorded.
    pub fn record(&mut self, action: EditAction) -> bool {
        if self.mode == HistoryMode::Replaying {
            tracing::trace!(?action, "ignoring edit recorded during replay");
            return false;
        }
        self.undo_stack.push(action);
        self.redo_stack.clear();
        true
    }

    /// An uploaded GPX track on top of the stack blocks undo.
    pub fn can_undo(&self) -> bool {
        matches!(self.undo_stack.last(), Some(action) if *action != EditAction::BulkReplace)
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_stack(&self) -> &[EditAction] {
        &self.undo_stack
    }

    pub fn redo_stack(&self) -> &[EditAction] {
        &self.redo_stack
    }

    pub fn mode(&self) -> HistoryMode {
        self.mode
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Move the newest undoable action onto the redo stack.
    fn step_back(&mut self) -> Option<&EditAction> {
        if !self.can_undo() {
            return None;
        }
        let action = self.undo_stack.pop()?;
        self.redo_stack.push(action);
        self.redo_stack.last()
    }

    /// Move the newest undone action back onto the undo stack.
    fn step_forward(&mut self) -> Option<&EditAction> {
        let action = self.redo_stack.pop()?;
        self.undo_stack.push(action);
        self.undo_stack.last()
    }
}

/// Markers of one course under construction plus their edit history.
///
/// Index 0 is the start and the last marker the end. After a GPX upload the
/// markers are empty and the uploaded coordinates are authoritative.
#[derive(Debug, Clone, Default)]
pub struct CourseEditor {
    markers: Vec<Coordinate>,
    gpx_coordinates: Option<Vec<Coordinate>>,
    history: EditHistory,
    route_generated: bool,
}

impl CourseEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> &[Coordinate] {
        &self.markers
    }

    pub fn gpx_coordinates(&self) -> Option<&[Coordinate]> {
        self.gpx_coordinates.as_deref()
    }

    /// Points a route should be planned or exported from.
    pub fn waypoints(&self) -> &[Coordinate] {
        self.gpx_coordinates.as_deref().unwrap_or(&self.markers)
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn is_route_generated(&self) -> bool {
        self.route_generated
    }

    /// Once a route is generated, undo and redo do nothing until reset.
    pub fn set_route_generated(&mut self, generated: bool) {
        self.route_generated = generated;
    }

    pub fn can_undo(&self) -> bool {
        !self.route_generated && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.route_generated && self.history.can_redo()
    }

    /// Apply a UI edit and record it.
    ///
    /// Returns false when the edit changed nothing (or arrived during a
    /// replay) and so was not recorded. While uploaded GPX coordinates are
    /// authoritative only another `BulkReplace` is accepted; marker edits are
    /// rejected until [`CourseEditor::clear`].
    pub fn apply(&mut self, edit: MarkerEdit) -> bool {
        if self.history.mode() == HistoryMode::Replaying {
            tracing::trace!(?edit, "ignoring edit during replay");
            return false;
        }
        if self.gpx_coordinates.is_some() && !matches!(edit, MarkerEdit::BulkReplace(_)) {
            tracing::debug!(?edit, "ignoring marker edit over uploaded track");
            return false;
        }

        let action = match edit {
            MarkerEdit::Add(position) => {
                self.markers.push(position);
                EditAction::AddMarker {
                    index: self.markers.len() - 1,
                    position,
                }
            }
            MarkerEdit::RemoveLast => match self.markers.pop() {
                Some(position) => EditAction::RemoveLastMarker { position },
                None => return false,
            },
            MarkerEdit::Move(snapshot) => {
                if snapshot.len() != self.markers.len() {
                    tracing::warn!(
                        markers = self.markers.len(),
                        snapshot = snapshot.len(),
                        "move snapshot length mismatch"
                    );
                    return false;
                }
                let Some(marker_index) = self
                    .markers
                    .iter()
                    .zip(&snapshot)
                    .position(|(current, moved)| current != moved)
                else {
                    return false;
                };
                let previous_position = self.markers[marker_index];
                let new_position = snapshot[marker_index];
                self.markers[marker_index] = new_position;
                EditAction::MoveMarker {
                    marker_index,
                    previous_position,
                    new_position,
                }
            }
            MarkerEdit::Swap => {
                if self.markers.len() < 2 {
                    return false;
                }
                let previous_order = self.markers.clone();
                self.markers.reverse();
                EditAction::SwapMarkers { previous_order }
            }
            MarkerEdit::BulkReplace(coordinates) => {
                self.markers.clear();
                self.gpx_coordinates = Some(coordinates);
                EditAction::BulkReplace
            }
        };

        tracing::trace!(?action, "recording edit");
        self.history.record(action)
    }

    pub fn undo(&mut self) -> bool {
        self.undo_with(|_| {})
    }

    pub fn redo(&mut self) -> bool {
        self.redo_with(|_| {})
    }

    /// Undo the newest action, then run `sync` in replay mode.
    ///
    /// `sync` is where the map layer redraws markers; edits it applies while
    /// replaying are not recorded, and nested undo/redo calls are no-ops.
    /// Returns false for a no-op.
    pub fn undo_with(&mut self, sync: impl FnOnce(&mut Self)) -> bool {
        if self.route_generated || self.history.mode() == HistoryMode::Replaying {
            return false;
        }
        let Some(action) = self.history.step_back() else {
            return false;
        };
        revert(&mut self.markers, action);
        self.replay(sync);
        true
    }

    /// Redo the newest undone action, then run `sync` in replay mode.
    pub fn redo_with(&mut self, sync: impl FnOnce(&mut Self)) -> bool {
        if self.route_generated || self.history.mode() == HistoryMode::Replaying {
            return false;
        }
        let Some(action) = self.history.step_forward() else {
            return false;
        };
        reapply(&mut self.markers, action);
        self.replay(sync);
        true
    }

    /// Drop markers, GPX coordinates and history; start over.
    pub fn clear(&mut self) {
        self.markers.clear();
        self.gpx_coordinates = None;
        self.history.clear();
        self.route_generated = false;
    }

    fn replay(&mut self, sync: impl FnOnce(&mut Self)) {
        let previous = std::mem::replace(&mut self.history.mode, HistoryMode::Replaying);
        sync(self);
        self.history.mode = previous;
    }
}

/// Restore the state before `action`.
fn revert(markers: &mut Vec<Coordinate>, action: &EditAction) {
    match action {
        EditAction::AddMarker { index, .. } => {
            if *index < markers.len() {
                markers.remove(*index);
            }
        }
        EditAction::RemoveLastMarker { position } => markers.push(*position),
        EditAction::MoveMarker {
            marker_index,
            previous_position,
            ..
        } => {
            if let Some(marker) = markers.get_mut(*marker_index) {
                *marker = *previous_position;
            }
        }
        EditAction::SwapMarkers { previous_order } => {
            markers.clone_from(previous_order);
        }
        EditAction::BulkReplace => {}
    }
}

/// Restore the state after `action`.
fn reapply(markers: &mut Vec<Coordinate>, action: &EditAction) {
    match action {
        EditAction::AddMarker { index, position } => {
            let index = (*index).min(markers.len());
            markers.insert(index, *position);
        }
        EditAction::RemoveLastMarker { .. } => {
            markers.pop();
        }
        EditAction::MoveMarker {
            marker_index,
            new_position,
            ..
        } => {
            if let Some(marker) = markers.get_mut(*marker_index) {
                *marker = *new_position;
            }
        }
        EditAction::SwapMarkers { previous_order } => {
            markers.clear();
            markers.extend(previous_order.iter().rev().copied());
        }
        EditAction::BulkReplace => markers.clear(),
    }
}

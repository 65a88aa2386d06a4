//! Routine editor state machine.
//!
//! The editor is either ready to add a new class or editing one existing
//! entry. It operates on a `Routine` passed in by the caller and never
//! touches storage itself; see `features::routine` for persistence.

use crate::models::{ClassEntry, Routine};
use crate::utils::new_id;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditState {
    /// Idle: the "Add" action is available.
    #[default]
    Adding,
    /// An existing entry is loaded into the form.
    Editing { day: String, id: String },
}

/// Form contents for adding or updating a class.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassForm {
    pub day: String,
    pub name: String,
    pub time: String,
}

impl ClassForm {
    pub fn new(day: &str, name: &str, time: &str) -> Self {
        Self {
            day: day.to_string(),
            name: name.to_string(),
            time: time.to_string(),
        }
    }

    /// Trimmed copy, or `None` when the day or name is missing.
    fn validated(&self) -> Option<ClassForm> {
        let form = ClassForm::new(self.day.trim(), self.name.trim(), self.time.trim());
        if form.day.is_empty() || form.name.is_empty() {
            None
        } else {
            Some(form)
        }
    }
}

#[derive(Debug, Default)]
pub struct RoutineEditor {
    state: EditState,
}

impl RoutineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing { .. })
    }

    /// Reset when the routine dialog is opened.
    pub fn open(&mut self) {
        self.state = EditState::Adding;
    }

    /// Add a class. Ignored while editing or when day/name are empty.
    /// Returns the generated id.
    pub fn add(&mut self, routine: &mut Routine, form: &ClassForm) -> Option<String> {
        if self.is_editing() {
            return None;
        }
        let form = form.validated()?;
        let id = new_id();
        routine.push_entry(
            &form.day,
            ClassEntry {
                id: id.clone(),
                name: form.name,
                time: form.time,
            },
        );
        Some(id)
    }

    /// Load an entry into the form. Unknown entries leave the state unchanged.
    pub fn begin_edit(&mut self, routine: &Routine, day: &str, id: &str) -> Option<ClassForm> {
        let entry = routine.find(day, id)?;
        self.state = EditState::Editing {
            day: day.to_string(),
            id: id.to_string(),
        };
        Some(ClassForm::new(day, &entry.name, &entry.time))
    }

    /// Apply the form to the entry being edited. The entry keeps its id and
    /// may move to a different day. Returns false if nothing changed.
    pub fn update(&mut self, routine: &mut Routine, form: &ClassForm) -> bool {
        let EditState::Editing { ref day, ref id } = self.state else {
            return false;
        };
        let Some(form) = form.validated() else {
            return false;
        };
        let id = id.clone();
        routine.remove_entry(day, &id);
        routine.push_entry(
            &form.day,
            ClassEntry {
                id,
                name: form.name,
                time: form.time,
            },
        );
        self.state = EditState::Adding;
        true
    }

    pub fn cancel(&mut self) {
        self.state = EditState::Adding;
    }

    /// Delete an entry from any state. Deleting the entry under edit also
    /// cancels the edit.
    pub fn delete(&mut self, routine: &mut Routine, day: &str, id: &str) -> bool {
        let removed = routine.remove_entry(day, id).is_some();
        if let EditState::Editing { day: ref d, id: ref i } = self.state {
            if d == day && i == id {
                self.state = EditState::Adding;
            }
        }
        removed
    }
}

// To-do list state container with write-through persistence

use crate::error::{Error, Result};
use crate::filter::Filter;
use crate::storage::KeyValueStorage;
use crate::task::{StoredTask, Task, TaskId};
use tracing::{debug, info, warn};

/// Storage key holding the serialized task list
pub const TODOS_KEY: &str = "todos";

/// Result of hydrating the store from storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The stored list replaced the in-memory one
    Loaded(usize),
    /// Nothing stored under the key yet
    Absent,
    /// A value was stored but could not be parsed; the list was left as-is
    Discarded,
}

/// Owns the task list, the display filter and the inline-edit state.
///
/// Every mutation of the task list is written through to storage as a full
/// JSON array under [`TODOS_KEY`]. The filter and edit state are session
/// only and never persisted.
pub struct TodoStore<S: KeyValueStorage> {
    storage: S,
    todos: Vec<Task>,
    filter: Filter,
    editing: Option<TaskId>,
}

impl<S: KeyValueStorage> TodoStore<S> {
    /// Create a store on top of `storage` and hydrate it from any saved list.
    ///
    /// Fails only if the storage itself cannot be read. A malformed saved
    /// value is logged and ignored.
    pub fn open(storage: S) -> Result<Self> {
        let mut store = Self {
            storage,
            todos: Vec::new(),
            filter: Filter::default(),
            editing: None,
        };
        store.init()?;
        Ok(store)
    }

    fn init(&mut self) -> Result<()> {
        let outcome = self.load_from_storage()?;
        debug!(?outcome, "Store initialized");
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Consume the store, handing back its storage backend
    pub fn into_storage(self) -> S {
        self.storage
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn todos(&self) -> &[Task] {
        &self.todos
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.todos.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Translate a position in the unfiltered list into a task id
    pub fn id_at(&self, index: usize) -> Result<TaskId> {
        self.todos.get(index).map(|t| t.id).ok_or(Error::IndexOutOfRange {
            index,
            len: self.todos.len(),
        })
    }

    /// Tasks visible under the current filter, in list order
    pub fn filtered_todos(&self) -> Vec<&Task> {
        self.todos.iter().filter(|t| self.filter.matches(t)).collect()
    }

    pub fn unfinished_todos(&self) -> usize {
        self.todos.iter().filter(|t| !t.done).count()
    }

    pub fn completed_todos(&self) -> usize {
        self.todos.iter().filter(|t| t.done).count()
    }

    /// The task currently in inline-edit mode, if any
    pub fn editing(&self) -> Option<TaskId> {
        self.editing
    }

    pub fn is_editing(&self, id: TaskId) -> bool {
        self.editing == Some(id)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Append a new, not yet done task. The text is taken as-is.
    ///
    /// If saving fails the task stays appended in memory and the
    /// persistence error is returned; it is the last entry of
    /// [`todos`](Self::todos) and is written by the next successful save.
    pub fn add_todo(&mut self, text: impl Into<String>) -> Result<TaskId> {
        let task = Task::new(text);
        let id = task.id;
        debug!(%id, "add_todo");
        self.todos.push(task);
        self.persist()?;
        Ok(id)
    }

    /// Remove a task, keeping the order of the rest
    pub fn remove(&mut self, id: TaskId) -> Result<Task> {
        let index = self.position(id)?;
        let task = self.todos.remove(index);
        if self.editing == Some(id) {
            self.editing = None;
        }
        debug!(%id, index, "remove");
        self.persist()?;
        Ok(task)
    }

    /// Flip the done flag, returning its new value
    pub fn toggle_todo(&mut self, id: TaskId) -> Result<bool> {
        let index = self.position(id)?;
        let task = &mut self.todos[index];
        task.done = !task.done;
        let done = task.done;
        debug!(%id, done, "toggle_todo");
        self.persist()?;
        Ok(done)
    }

    /// Replace the text of a task and leave edit mode for it
    pub fn edit(&mut self, id: TaskId, new_text: impl Into<String>) -> Result<()> {
        let index = self.position(id)?;
        self.todos[index].text = new_text.into();
        if self.editing == Some(id) {
            self.editing = None;
        }
        debug!(%id, "edit");
        self.persist()
    }

    /// Enter or leave inline-edit mode for a task.
    ///
    /// Only one task can be in edit mode; entering it on one task leaves it on
    /// any other. Edit state is not written to storage.
    pub fn set_editing(&mut self, id: TaskId, editing: bool) -> Result<()> {
        self.position(id)?;
        if editing {
            self.editing = Some(id);
        } else if self.editing == Some(id) {
            self.editing = None;
        }
        Ok(())
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// Drop every completed task, returning how many were removed
    pub fn remove_completed_todos(&mut self) -> Result<usize> {
        let before = self.todos.len();
        self.todos.retain(|t| !t.done);
        let removed = before - self.todos.len();

        if let Some(id) = self.editing {
            if self.get(id).is_none() {
                self.editing = None;
            }
        }

        debug!(removed, "remove_completed_todos");
        self.persist()?;
        Ok(removed)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Write the whole task list to storage, overwriting any previous value
    pub fn save_to_storage(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.todos)?;
        self.storage.set(TODOS_KEY, &json)?;
        debug!(count = self.todos.len(), "Saved todos");
        Ok(())
    }

    /// Replace the task list with the stored one, if there is a valid one.
    ///
    /// Records saved without an id get one here, and the list is written
    /// back at once so those ids stay the same on the next load.
    pub fn load_from_storage(&mut self) -> Result<LoadOutcome> {
        let raw = match self.storage.get(TODOS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(LoadOutcome::Absent),
            Err(Error::Corrupt { key, reason }) => {
                warn!(%key, %reason, "Stored todos are not readable, ignoring");
                return Ok(LoadOutcome::Discarded);
            }
            Err(e) => return Err(e),
        };

        let stored = match serde_json::from_str::<Option<Vec<StoredTask>>>(&raw) {
            Ok(Some(stored)) => stored,
            Ok(None) => return Ok(LoadOutcome::Absent),
            Err(e) => {
                warn!(
                    key = TODOS_KEY,
                    error = ?e,
                    "Stored todos are malformed, ignoring"
                );
                return Ok(LoadOutcome::Discarded);
            }
        };

        let mut assigned = 0;
        self.todos = stored
            .into_iter()
            .map(|s| {
                let (task, new_id) = s.into_task();
                assigned += usize::from(new_id);
                task
            })
            .collect();
        self.editing = None;

        let count = self.todos.len();
        info!(count, "Loaded todos from storage");

        if assigned > 0 {
            debug!(assigned, "Assigned ids to stored todos");
            if let Err(e) = self.save_to_storage() {
                warn!(error = %e, "Failed to save newly assigned ids");
            }
        }

        Ok(LoadOutcome::Loaded(count))
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn position(&self, id: TaskId) -> Result<usize> {
        self.todos
            .iter()
            .position(|t| t.id == id)
            .ok_or(Error::TaskNotFound(id))
    }

    fn persist(&mut self) -> Result<()> {
        self.save_to_storage().inspect_err(|e| {
            warn!(error = %e, "Failed to persist todos, keeping in-memory state");
        })
    }
}

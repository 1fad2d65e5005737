//! The process-wide list collection
//!
//! Holds every reminder list plus the selection pointer and keeps the
//! collection-level invariants: never empty, at most one list carrying the
//! default name, and a selection that always points at an existing list.

use super::models::ReminderList;
use crate::config::DEFAULT_LIST_NAME;
use uuid::Uuid;

/// Result of asking the collection to drop a list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRemoval {
    /// No list with that id
    NotFound,
    /// The default list stays while other lists exist
    DefaultProtected,
    /// The list is gone; `replacement` is set when a fresh default list had
    /// to be synthesized because the collection became empty
    Removed { replacement: Option<Uuid> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    lists: Vec<ReminderList>,
    selected: Uuid,
}

impl Collection {
    /// Build a collection from loaded parts, repairing an empty list set or a
    /// stale selection pointer
    pub fn from_parts(mut lists: Vec<ReminderList>, selected: Option<Uuid>) -> Self {
        if lists.is_empty() {
            tracing::info!("No reminder lists found, creating default list");
            lists.push(ReminderList::default_list());
        }

        let selected = selected
            .filter(|id| lists.iter().any(|list| list.id == *id))
            .unwrap_or(lists[0].id);

        Self { lists, selected }
    }

    pub fn lists(&self) -> &[ReminderList] {
        &self.lists
    }

    pub fn into_lists(self) -> Vec<ReminderList> {
        self.lists
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// Never true: an emptied collection gets a fresh default list
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn find(&self, id: Uuid) -> Option<&ReminderList> {
        self.lists.iter().find(|list| list.id == id)
    }

    pub fn find_mut(&mut self, id: Uuid) -> Option<&mut ReminderList> {
        self.lists.iter_mut().find(|list| list.id == id)
    }

    pub fn selected_id(&self) -> Uuid {
        self.selected
    }

    pub fn selected_list(&self) -> &ReminderList {
        self.find(self.selected).unwrap_or(&self.lists[0])
    }

    /// Whether `name` would give a second list the default name
    pub fn conflicts_with_default(&self, name: &str, except: Option<Uuid>) -> bool {
        name.trim() == DEFAULT_LIST_NAME
            && self
                .lists
                .iter()
                .any(|list| list.is_default() && Some(list.id) != except)
    }

    /// Append a list. Rejected when it would duplicate the default name.
    pub fn add_list(&mut self, list: ReminderList) -> bool {
        if self.conflicts_with_default(&list.name, None) {
            return false;
        }
        self.lists.push(list);
        true
    }

    pub fn select(&mut self, id: Uuid) -> bool {
        if self.find(id).is_none() {
            return false;
        }
        self.selected = id;
        true
    }

    pub fn remove_list(&mut self, id: Uuid) -> ListRemoval {
        let Some(index) = self.lists.iter().position(|list| list.id == id) else {
            return ListRemoval::NotFound;
        };

        if self.lists.len() > 1 && self.lists[index].is_default() {
            return ListRemoval::DefaultProtected;
        }

        self.lists.remove(index);

        let replacement = if self.lists.is_empty() {
            let list = ReminderList::default_list();
            let id = list.id;
            self.lists.push(list);
            Some(id)
        } else {
            None
        };

        if self.selected == id {
            self.selected = self.lists[0].id;
        }

        ListRemoval::Removed { replacement }
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::from_parts(Vec::new(), None)
    }
}

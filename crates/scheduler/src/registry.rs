//! Registry of live tasks, grouped by family
//!
//! Lookups never hand out internal references: callers get cloned `Arc`s and
//! can wake or complete tasks without holding any registry lock.

use dashmap::DashMap;
use lifeboat_core::DocumentRef;
use std::sync::Arc;

/// Tag grouping related tasks for bulk lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Family(&'static str);

impl Family {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Family shared by all snapshot tasks
pub const SNAPSHOT_FAMILY: Family = Family::new("lifeboat:snapshots");

/// A task the registry can track
pub trait FamilyMember: Send + Sync {
    fn family(&self) -> Family;

    fn belongs_to(&self, family: Family) -> bool {
        self.family() == family
    }

    /// Whether this task serves `document`
    fn is_for(&self, document: &DocumentRef) -> bool;

    /// Cut any pending wait short
    fn wake_up(&self);
}

/// Live tasks, by family
#[derive(Debug)]
pub struct TaskRegistry<T> {
    families: DashMap<Family, Vec<Arc<T>>>,
}

impl<T> Default for TaskRegistry<T> {
    fn default() -> Self {
        Self {
            families: DashMap::new(),
        }
    }
}

impl<T: FamilyMember> TaskRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, task: Arc<T>) {
        self.families.entry(task.family()).or_default().push(task);
    }

    /// Remove `task`; returns whether it was registered
    pub fn unregister(&self, task: &Arc<T>) -> bool {
        let family = task.family();
        let removed = match self.families.get_mut(&family) {
            Some(mut members) => {
                let before = members.len();
                members.retain(|t| !Arc::ptr_eq(t, task));
                members.len() != before
            }
            None => false,
        };
        self.families.remove_if(&family, |_, members| members.is_empty());
        removed
    }

    /// All live tasks of `family`
    pub fn find_by_family(&self, family: Family) -> Vec<Arc<T>> {
        self.families
            .get(&family)
            .map(|members| members.clone())
            .unwrap_or_default()
    }

    /// The task of `family` serving `document`, if any
    pub fn find_for_document(&self, family: Family, document: &DocumentRef) -> Option<Arc<T>> {
        self.families
            .get(&family)?
            .iter()
            .find(|t| t.belongs_to(family) && t.is_for(document))
            .cloned()
    }

    /// Wake every task of `family`; returns how many were woken
    pub fn wake_all(&self, family: Family) -> usize {
        let members = self.find_by_family(family);
        for task in &members {
            task.wake_up();
        }
        members.len()
    }

    /// Total number of registered tasks
    pub fn len(&self) -> usize {
        self.families.iter().map(|members| members.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

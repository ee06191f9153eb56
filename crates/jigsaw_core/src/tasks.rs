//! The day's task list, whose completed count drives the board.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

impl Task {
    pub fn new(title: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_owned(),
            completed: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskList(Vec<Task>);

impl TaskList {
    /// The tasks every new day starts with.
    pub fn starter() -> Self {
        let titles = ["Initialize System", "Review Directives", "Charge Battery"];
        Self(
            titles
                .iter()
                .zip(1..)
                .map(|(title, id)| Task {
                    id: id.to_string(),
                    title: (*title).to_owned(),
                    completed: false,
                })
                .collect(),
        )
    }

    /// Appends a task. Blank titles are refused.
    pub fn add(&mut self, title: &str) -> Option<&Task> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        self.0.push(Task::new(title));
        self.0.last()
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        let Some(task) = self.0.iter_mut().find(|task| task.id == id) else {
            return false;
        };
        task.completed = !task.completed;
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|task| task.id != id);
        self.0.len() != before
    }

    pub fn completed_count(&self) -> usize {
        self.0.iter().filter(|task| task.completed).count()
    }

    /// At least one task, and all of them done.
    pub fn all_completed(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|task| task.completed)
    }

    pub fn progress_percent(&self) -> u32 {
        if self.0.is_empty() {
            return 0;
        }
        (self.completed_count() as f32 / self.0.len() as f32 * 100.).round() as u32
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_tasks_are_open() {
        let tasks = TaskList::starter();
        assert_eq!(tasks.len(), 3, "three starter tasks");
        assert_eq!(tasks.get(0).map(|task| task.id.as_str()), Some("1"), "numbered ids");
        assert_eq!(tasks.completed_count(), 0, "nothing done yet");
        assert!(!tasks.all_completed(), "still open");
    }

    #[test]
    fn add_trims_and_rejects_blank_titles() {
        let mut tasks = TaskList::default();
        assert!(tasks.add("   ").is_none(), "blank");
        let task = tasks.add("  Drink water ").cloned().expect("added");
        assert_eq!(task.title, "Drink water", "trimmed");
        assert!(Uuid::parse_str(&task.id).is_ok(), "uuid id");
    }

    #[test]
    fn progress_follows_toggles() {
        let mut tasks = TaskList::starter();
        assert!(tasks.toggle("1"), "toggled");
        assert_eq!(tasks.progress_percent(), 33, "one of three");
        tasks.toggle("2");
        tasks.toggle("3");
        assert!(tasks.all_completed(), "all done");
        assert!(tasks.toggle("3"), "untoggled");
        assert_eq!(tasks.completed_count(), 2, "two done");
        assert!(!tasks.toggle("missing"), "unknown id");
    }

    #[test]
    fn empty_list_is_never_complete() {
        let mut tasks = TaskList::starter();
        for id in ["1", "2", "3"] {
            assert!(tasks.remove(id), "removed {id}");
        }
        assert!(!tasks.remove("1"), "already gone");
        assert!(!tasks.all_completed(), "empty list");
        assert_eq!(tasks.progress_percent(), 0, "no progress");
    }
}

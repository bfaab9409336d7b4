//! Board Projection
//!
//! Client-side filtering and the split of the collection into the three
//! workflow lanes.

use crate::task::{Priority, Task, TaskState};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring of the title; empty matches everything
    pub text: String,
    pub priority: Option<Priority>,
}

impl TaskFilter {
    pub fn new(text: impl Into<String>, priority: Option<Priority>) -> Self {
        Self {
            text: text.into(),
            priority,
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        let needle = self.text.to_lowercase();
        let text_ok = needle.is_empty() || task.title.to_lowercase().contains(&needle);
        let priority_ok = self.priority.map_or(true, |p| task.priority == p);
        text_ok && priority_ok
    }

    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }
}

/// Filtered tasks grouped by state, each lane in collection order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lanes {
    pub todo: Vec<Task>,
    pub doing: Vec<Task>,
    pub done: Vec<Task>,
}

impl Lanes {
    pub fn partition(tasks: &[Task], filter: &TaskFilter) -> Self {
        let mut lanes = Lanes::default();
        for task in tasks.iter().filter(|task| filter.matches(task)) {
            lanes.lane_mut(task.state).push(task.clone());
        }
        lanes
    }

    pub fn get(&self, state: TaskState) -> &[Task] {
        match state {
            TaskState::Todo => &self.todo,
            TaskState::Doing => &self.doing,
            TaskState::Done => &self.done,
        }
    }

    fn lane_mut(&mut self, state: TaskState) -> &mut Vec<Task> {
        match state {
            TaskState::Todo => &mut self.todo,
            TaskState::Doing => &mut self.doing,
            TaskState::Done => &mut self.done,
        }
    }

    pub fn len(&self) -> usize {
        self.todo.len() + self.doing.len() + self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

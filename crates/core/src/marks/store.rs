use super::Mark;
use std::collections::HashMap;

/// Side table of marks per task id, filled while collecting task definitions
#[derive(Debug, Clone, Default)]
pub struct MarkStore {
    marks: HashMap<String, Vec<Mark>>,
}

impl MarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, task_id: &str, mark: Mark) {
        self.marks.entry(task_id.to_string()).or_default().push(mark);
    }

    pub fn extend(&mut self, task_id: &str, marks: impl IntoIterator<Item = Mark>) {
        self.marks
            .entry(task_id.to_string())
            .or_default()
            .extend(marks);
    }

    pub fn has_mark(&self, task_id: &str, name: &str) -> bool {
        self.marks
            .get(task_id)
            .is_some_and(|marks| marks.iter().any(|mark| mark.name == name))
    }

    /// Marks named `name`, in declaration order
    pub fn get_marks(&self, task_id: &str, name: &str) -> Vec<&Mark> {
        self.marks
            .get(task_id)
            .map(|marks| marks.iter().filter(|mark| mark.name == name).collect())
            .unwrap_or_default()
    }

    /// Detach and return all marks named `name`, keeping the others
    pub fn remove_marks(&mut self, task_id: &str, name: &str) -> Vec<Mark> {
        let Some(marks) = self.marks.get_mut(task_id) else {
            return Vec::new();
        };
        let (removed, kept): (Vec<Mark>, Vec<Mark>) =
            marks.drain(..).partition(|mark| mark.name == name);
        *marks = kept;
        removed
    }

    /// Detach every remaining mark of a task
    pub fn take_all(&mut self, task_id: &str) -> Vec<Mark> {
        self.marks.remove(task_id).unwrap_or_default()
    }
}

use crate::domain::models::Task;

/// A task that flipped to done and is owed a completion record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub task_id: String,
    pub text: String,
}

/// In-memory, insertion-ordered task list.
///
/// Tasks carry a synthetic id assigned at creation. The text-keyed operations
/// match every task with equal text, so duplicate names are all affected.
#[derive(Debug, Default)]
pub struct TaskRoster {
    tasks: Vec<Task>,
    next_sequence: u64,
}

impl TaskRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an unfinished task. Empty text is ignored.
    pub fn add(&mut self, text: &str) -> Option<Task> {
        if text.is_empty() {
            return None;
        }
        self.next_sequence += 1;
        let task = Task {
            id: format!("tsk-{}", self.next_sequence),
            text: text.to_string(),
            done: false,
        };
        self.tasks.push(task.clone());
        Some(task)
    }

    pub fn toggle(&mut self, text: &str, done: bool) -> Vec<Completion> {
        self.tasks
            .iter_mut()
            .filter(|task| task.text == text)
            .filter_map(|task| set_done(task, done))
            .collect()
    }

    /// Returns the updated task and, if it just became done, its completion.
    pub fn toggle_by_id(&mut self, id: &str, done: bool) -> Option<(Task, Option<Completion>)> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        let completion = set_done(task, done);
        Some((task.clone(), completion))
    }

    /// Removes every task with the given text and returns how many went.
    pub fn delete(&mut self, text: &str) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.text != text);
        before - self.tasks.len()
    }

    pub fn delete_by_id(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        before != self.tasks.len()
    }

    /// Texts of tasks not yet done, in roster order. This is the wheel's pool.
    pub fn unfinished(&self) -> Vec<String> {
        self.tasks
            .iter()
            .filter(|task| !task.done)
            .map(|task| task.text.clone())
            .collect()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }
}

fn set_done(task: &mut Task, done: bool) -> Option<Completion> {
    let became_done = done && !task.done;
    task.done = done;
    became_done.then(|| Completion {
        task_id: task.id.clone(),
        text: task.text.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(roster: &TaskRoster) -> Vec<&str> {
        roster.tasks().iter().map(|task| task.text.as_str()).collect()
    }

    #[test]
    fn add_ignores_empty_text_and_keeps_order() {
        let mut roster = TaskRoster::new();
        assert!(roster.add("").is_none());
        roster.add("first").expect("add first");
        roster.add("second").expect("add second");
        assert_eq!(texts(&roster), vec!["first", "second"]);
        assert!(roster.tasks().iter().all(|task| !task.done));
    }

    #[test]
    fn add_assigns_distinct_ids_to_duplicate_text() {
        let mut roster = TaskRoster::new();
        let first = roster.add("x").expect("add");
        let second = roster.add("x").expect("add");
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn toggle_to_done_yields_one_completion() {
        let mut roster = TaskRoster::new();
        roster.add("x");
        let completions = roster.toggle("x", true);
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].text, "x");
        assert!(roster.tasks()[0].done);
    }

    #[test]
    fn toggle_matches_every_duplicate() {
        let mut roster = TaskRoster::new();
        roster.add("x");
        roster.add("y");
        roster.add("x");
        let completions = roster.toggle("x", true);
        assert_eq!(completions.len(), 2);
        assert_eq!(roster.unfinished(), vec!["y".to_string()]);
    }

    #[test]
    fn toggle_back_to_undone_yields_nothing() {
        let mut roster = TaskRoster::new();
        roster.add("x");
        roster.toggle("x", true);
        assert!(roster.toggle("x", false).is_empty());
        assert_eq!(roster.unfinished(), vec!["x".to_string()]);
    }

    #[test]
    fn toggle_by_id_only_touches_that_task() {
        let mut roster = TaskRoster::new();
        let first = roster.add("x").expect("add");
        roster.add("x");

        let (task, completion) = roster.toggle_by_id(&first.id, true).expect("task exists");
        assert!(task.done);
        assert_eq!(completion.map(|c| c.task_id), Some(first.id.clone()));
        assert_eq!(roster.unfinished(), vec!["x".to_string()]);

        let (_, repeated) = roster.toggle_by_id(&first.id, true).expect("task exists");
        assert!(repeated.is_none());
        assert!(roster.toggle_by_id("tsk-missing", true).is_none());
    }

    #[test]
    fn delete_removes_all_matches_and_preserves_order() {
        let mut roster = TaskRoster::new();
        for text in ["a", "x", "b", "x", "c"] {
            roster.add(text);
        }
        assert_eq!(roster.delete("x"), 2);
        assert_eq!(texts(&roster), vec!["a", "b", "c"]);
        assert_eq!(roster.delete("missing"), 0);
    }

    #[test]
    fn delete_by_id_removes_one_task() {
        let mut roster = TaskRoster::new();
        let first = roster.add("x").expect("add");
        roster.add("x");
        assert!(roster.delete_by_id(&first.id));
        assert!(!roster.delete_by_id(&first.id));
        assert_eq!(roster.tasks().len(), 1);
    }
}

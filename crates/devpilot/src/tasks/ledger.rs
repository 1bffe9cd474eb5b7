use super::task::{Task, TaskStatus, TaskUpdate};

/// Callback invoked synchronously with a full snapshot after every mutation.
pub type TaskObserver = Box<dyn Fn(Vec<Task>) + Send + Sync>;

/// Append-only record of the tasks attempted in the current exchange.
///
/// Tasks are never removed individually; [`TaskLedger::clear`] empties the whole ledger.
#[derive(Default)]
pub struct TaskLedger {
    tasks: Vec<Task>,
    observer: Option<TaskObserver>,
}

impl TaskLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the observer, replacing any previous one.
    pub fn subscribe(&mut self, observer: TaskObserver) {
        self.observer = Some(observer);
    }

    pub fn unsubscribe(&mut self) {
        self.observer = None;
    }

    pub fn create(&mut self, description: impl Into<String>) -> Task {
        let task = Task::new(description.into());
        self.tasks.push(task.clone());
        self.notify();
        task
    }

    /// Merge `update` into the task with `id`.
    ///
    /// Unknown ids and status regressions are ignored. Returns whether the task changed
    /// state; the observer is notified only in that case.
    pub fn update(&mut self, id: &str, update: TaskUpdate) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return false;
        };

        if let Some(next) = update.status {
            if !task.status.can_transition_to(next) {
                tracing::warn!(
                    "ignoring task {} transition {:?} -> {:?}",
                    task.id,
                    task.status,
                    next
                );
                return false;
            }
            task.status = next;
            if next == TaskStatus::Failed {
                task.error = update
                    .error
                    .or_else(|| task.error.take())
                    .or_else(|| Some("failed".to_string()));
            } else {
                task.error = None;
            }
        } else if let Some(error) = update.error {
            if task.status != TaskStatus::Failed {
                return false;
            }
            task.error = Some(error);
        }

        self.notify();
        true
    }

    /// Snapshot copy; mutating it does not affect the ledger.
    pub fn list(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Fail every task that has not reached a terminal status. Returns how many changed.
    pub fn fail_open(&mut self, error: &str) -> usize {
        let mut changed = 0;
        for task in self.tasks.iter_mut().filter(|task| !task.status.is_terminal()) {
            task.status = TaskStatus::Failed;
            task.error = Some(error.to_string());
            changed += 1;
        }
        if changed > 0 {
            self.notify();
        }
        changed
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
        self.notify();
    }

    fn notify(&self) {
        if let Some(observer) = &self.observer {
            observer(self.list());
        }
    }
}

use crate::api::TaskStore;
use crate::error::ApiError;
use crate::task::{Draft, DraftEdit, Task, TaskPatch};

/// What the screen should show right now.
#[derive(Debug, PartialEq, Eq)]
pub enum View<'a> {
    Loading,
    Error(&'a str),
    Ready(&'a [Task]),
}

/// In-memory copy of the task list plus the new-task form.
///
/// Changes to `tasks` are applied only from server responses; nothing is
/// updated ahead of confirmation, so failures never need a rollback.
pub struct TodoBoard<S> {
    store: S,
    tasks: Vec<Task>,
    loading: bool,
    error: Option<String>,
    draft: Draft,
}

impl<S: TaskStore> TodoBoard<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            tasks: Vec::new(),
            loading: true,
            error: None,
            draft: Draft::default(),
        }
    }

    pub fn view(&self) -> View<'_> {
        if self.loading {
            View::Loading
        } else if let Some(message) = &self.error {
            View::Error(message)
        } else {
            View::Ready(&self.tasks)
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Drops all session state and goes back to Loading, as on startup.
    pub fn reset(&mut self) {
        self.tasks.clear();
        self.loading = true;
        self.error = None;
        self.draft = Draft::default();
    }

    pub fn refresh(&mut self) {
        self.loading = true;
        match self.store.list() {
            Ok(Some(tasks)) => self.tasks = tasks,
            Ok(None) => self.tasks.clear(),
            Err(err) => {
                self.fail(err);
                self.tasks.clear();
            }
        }
        self.loading = false;
    }

    pub fn update_draft(&mut self, edit: DraftEdit) {
        self.draft.apply(edit);
    }

    /// Does nothing when the title is blank. The title is sent untrimmed.
    /// An accepted draft is cleared even if the reply carries no task.
    pub fn submit_draft(&mut self) {
        if !self.draft.is_submittable() {
            return;
        }
        match self.store.create(&self.draft) {
            Ok(created) => {
                if let Some(task) = created {
                    self.tasks.insert(0, task);
                }
                self.draft = Draft::default();
            }
            Err(err) => self.fail(err),
        }
    }

    pub fn toggle_status(&mut self, task: &Task) {
        let patch = TaskPatch::status(task.status.toggled());
        match self.store.patch(&task.id, &patch) {
            Ok(Some(updated)) => {
                if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == updated.id) {
                    *slot = updated;
                }
            }
            Ok(None) => {}
            Err(err) => self.fail(err),
        }
    }

    pub fn remove(&mut self, id: &str) {
        match self.store.delete(id) {
            Ok(()) => self.tasks.retain(|t| t.id != id),
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: ApiError) {
        tracing::error!(error = %err, "task store call failed");
        self.error = Some(err.user_message().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Transport;
    use crate::task::{Priority, Status};
    use reqwest::StatusCode;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        List,
        Create(Draft),
        Patch(String, TaskPatch),
        Delete(String),
    }

    enum Reply {
        List(Option<Vec<Task>>),
        Task(Task),
        NoTask,
        Done,
        Fail,
    }

    /// Replays canned replies in order and records what was asked of it.
    #[derive(Default)]
    struct ScriptedStore {
        replies: RefCell<VecDeque<Reply>>,
        calls: RefCell<Vec<Call>>,
    }

    impl ScriptedStore {
        fn with(replies: Vec<Reply>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                calls: RefCell::default(),
            }
        }

        fn next(&self, call: Call) -> Reply {
            self.calls.borrow_mut().push(call);
            self.replies
                .borrow_mut()
                .pop_front()
                .expect("unscripted store call")
        }
    }

    fn failure() -> Transport {
        Transport::Status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    impl TaskStore for &ScriptedStore {
        fn list(&self) -> Result<Option<Vec<Task>>, ApiError> {
            match self.next(Call::List) {
                Reply::List(tasks) => Ok(tasks),
                Reply::Fail => Err(ApiError::Fetch(failure())),
                _ => panic!("unexpected reply to list"),
            }
        }

        fn create(&self, draft: &Draft) -> Result<Option<Task>, ApiError> {
            match self.next(Call::Create(draft.clone())) {
                Reply::Task(task) => Ok(Some(task)),
                Reply::NoTask => Ok(None),
                Reply::Fail => Err(ApiError::Create(failure())),
                _ => panic!("unexpected reply to create"),
            }
        }

        fn patch(&self, id: &str, patch: &TaskPatch) -> Result<Option<Task>, ApiError> {
            match self.next(Call::Patch(id.to_string(), patch.clone())) {
                Reply::Task(task) => Ok(Some(task)),
                Reply::NoTask => Ok(None),
                Reply::Fail => Err(ApiError::Update(failure())),
                _ => panic!("unexpected reply to patch"),
            }
        }

        fn delete(&self, id: &str) -> Result<(), ApiError> {
            match self.next(Call::Delete(id.to_string())) {
                Reply::Done => Ok(()),
                Reply::Fail => Err(ApiError::Delete(failure())),
                _ => panic!("unexpected reply to delete"),
            }
        }
    }

    fn task(id: &str, status: Status) -> Task {
        Task {
            id: id.into(),
            title: format!("Task {id}"),
            description: String::new(),
            priority: Priority::Medium,
            status,
        }
    }

    fn loaded(store: &ScriptedStore, tasks: Vec<Task>) -> TodoBoard<&ScriptedStore> {
        store.replies.borrow_mut().push_front(Reply::List(Some(tasks)));
        let mut board = TodoBoard::new(store);
        board.refresh();
        board
    }

    #[test]
    fn starts_in_loading() {
        let store = ScriptedStore::default();
        let board = TodoBoard::new(&store);
        assert_eq!(board.view(), View::Loading);
        assert!(store.calls.borrow().is_empty());
    }

    #[test]
    fn refresh_keeps_server_order() {
        let tasks = vec![task("b", Status::Pending), task("a", Status::Completed)];
        let store = ScriptedStore::default();
        let board = loaded(&store, tasks.clone());

        assert!(!board.is_loading());
        assert_eq!(board.view(), View::Ready(&tasks));
    }

    #[test]
    fn refresh_with_non_list_payload_is_empty_not_error() {
        let store = ScriptedStore::with(vec![Reply::List(None)]);
        let mut board = TodoBoard::new(&store);
        board.refresh();

        assert_eq!(board.view(), View::Ready(&[]));
    }

    #[test]
    fn refresh_failure_clears_tasks_and_sets_error() {
        let store = ScriptedStore::default();
        let mut board = loaded(&store, vec![task("1", Status::Pending)]);
        store.replies.borrow_mut().push_back(Reply::Fail);

        board.refresh();

        assert!(board.tasks().is_empty());
        assert!(!board.is_loading());
        assert_eq!(board.view(), View::Error("Failed to load tasks"));
    }

    #[test]
    fn blank_title_submits_nothing() {
        let store = ScriptedStore::default();
        let mut board = loaded(&store, vec![]);
        board.update_draft(DraftEdit::Title("   ".into()));
        let before = board.draft().clone();

        board.submit_draft();

        assert_eq!(store.calls.borrow().as_slice(), &[Call::List]);
        assert_eq!(board.draft(), &before);
        assert!(board.tasks().is_empty());
    }

    #[test]
    fn submit_prepends_created_task_and_resets_draft() {
        let existing = task("0", Status::Pending);
        let store = ScriptedStore::default();
        let mut board = loaded(&store, vec![existing.clone()]);
        let created = Task {
            id: "1".into(),
            title: "Buy milk".into(),
            description: String::new(),
            priority: Priority::Low,
            status: Status::Pending,
        };
        store.replies.borrow_mut().push_back(Reply::Task(created.clone()));

        board.update_draft(DraftEdit::Title("Buy milk".into()));
        board.update_draft(DraftEdit::Priority(Priority::Low));
        board.submit_draft();

        assert_eq!(board.tasks(), &[created, existing]);
        assert_eq!(board.draft(), &Draft::default());
        assert_eq!(board.draft().priority, Priority::Medium);
    }

    #[test]
    fn submit_sends_untrimmed_title() {
        let store = ScriptedStore::default();
        let mut board = loaded(&store, vec![]);
        store
            .replies
            .borrow_mut()
            .push_back(Reply::Task(task("1", Status::Pending)));

        board.update_draft(DraftEdit::Title("  padded ".into()));
        board.submit_draft();

        let calls = store.calls.borrow();
        let Call::Create(sent) = &calls[1] else {
            panic!("expected a create call, got {:?}", calls[1]);
        };
        assert_eq!(sent.title, "  padded ");
    }

    #[test]
    fn submit_failure_keeps_draft_and_tasks() {
        let store = ScriptedStore::default();
        let mut board = loaded(&store, vec![task("0", Status::Pending)]);
        store.replies.borrow_mut().push_back(Reply::Fail);

        board.update_draft(DraftEdit::Title("Buy milk".into()));
        board.submit_draft();

        assert_eq!(board.draft().title, "Buy milk");
        assert_eq!(board.tasks().len(), 1);
        assert_eq!(board.view(), View::Error("Failed to create task"));
    }

    #[test]
    fn toggle_replaces_only_matching_task() {
        let tasks = vec![
            task("1", Status::Pending),
            task("2", Status::Pending),
            task("3", Status::Completed),
        ];
        let store = ScriptedStore::default();
        let mut board = loaded(&store, tasks.clone());
        let updated = task("2", Status::Completed);
        store.replies.borrow_mut().push_back(Reply::Task(updated.clone()));

        board.toggle_status(&tasks[1]);

        assert_eq!(
            store.calls.borrow()[1],
            Call::Patch("2".into(), TaskPatch::status(Status::Completed))
        );
        assert_eq!(board.tasks(), &[tasks[0].clone(), updated, tasks[2].clone()]);
    }

    #[test]
    fn submit_without_returned_task_still_clears_draft() {
        let existing = task("0", Status::Pending);
        let store = ScriptedStore::default();
        let mut board = loaded(&store, vec![existing.clone()]);
        store.replies.borrow_mut().push_back(Reply::NoTask);

        board.update_draft(DraftEdit::Title("Buy milk".into()));
        board.submit_draft();

        assert_eq!(board.draft(), &Draft::default());
        assert_eq!(board.view(), View::Ready(&[existing]));
    }

    #[test]
    fn toggle_without_returned_task_changes_nothing() {
        let pending = task("1", Status::Pending);
        let store = ScriptedStore::default();
        let mut board = loaded(&store, vec![pending.clone()]);
        store.replies.borrow_mut().push_back(Reply::NoTask);

        board.toggle_status(&pending);

        assert_eq!(board.view(), View::Ready(&[pending]));
    }

    #[test]
    fn reset_returns_to_loading_with_empty_state() {
        let store = ScriptedStore::default();
        let mut board = loaded(&store, vec![task("1", Status::Pending)]);
        store.replies.borrow_mut().push_back(Reply::Fail);
        board.remove("1");
        board.update_draft(DraftEdit::Title("half typed".into()));

        board.reset();

        assert_eq!(board.view(), View::Loading);
        assert!(board.tasks().is_empty());
        assert_eq!(board.draft(), &Draft::default());
    }

    #[test]
    fn toggle_completed_sends_pending() {
        let done = task("1", Status::Completed);
        let store = ScriptedStore::default();
        let mut board = loaded(&store, vec![done.clone()]);
        store
            .replies
            .borrow_mut()
            .push_back(Reply::Task(task("1", Status::Pending)));

        board.toggle_status(&done);

        assert_eq!(
            store.calls.borrow()[1],
            Call::Patch("1".into(), TaskPatch::status(Status::Pending))
        );
        assert_eq!(board.tasks()[0].status, Status::Pending);
    }

    #[test]
    fn toggle_failure_keeps_stale_status() {
        let pending = task("1", Status::Pending);
        let store = ScriptedStore::default();
        let mut board = loaded(&store, vec![pending.clone()]);
        store.replies.borrow_mut().push_back(Reply::Fail);

        board.toggle_status(&pending);

        assert_eq!(board.tasks(), &[pending]);
        assert_eq!(board.view(), View::Error("Failed to update task"));
    }

    #[test]
    fn remove_drops_only_that_id() {
        let tasks = vec![
            task("1", Status::Pending),
            task("2", Status::Pending),
            task("3", Status::Pending),
        ];
        let store = ScriptedStore::default();
        let mut board = loaded(&store, tasks.clone());
        store.replies.borrow_mut().push_back(Reply::Done);

        board.remove("2");

        assert_eq!(board.tasks(), &[tasks[0].clone(), tasks[2].clone()]);
        assert_eq!(store.calls.borrow()[1], Call::Delete("2".into()));
    }

    #[test]
    fn remove_failure_keeps_tasks() {
        let tasks = vec![task("1", Status::Pending)];
        let store = ScriptedStore::default();
        let mut board = loaded(&store, tasks.clone());
        store.replies.borrow_mut().push_back(Reply::Fail);

        board.remove("1");

        assert_eq!(board.tasks(), tasks.as_slice());
        assert_eq!(board.view(), View::Error("Failed to delete task"));
    }
}

use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{AppError, AppResult, InFlight};
use crate::domain::*;
use crate::ports::{Notification, Notifier, TaskGateway};

pub const MSG_TASKS_LOADED: &str = "Tasks loaded successfully!";
pub const MSG_TASKS_LOAD_FAILED: &str =
    "Failed to load tasks. Make sure the server is running and reachable.";
pub const MSG_TASK_ADDED: &str = "Task added successfully!";
pub const MSG_TASK_ADD_FAILED: &str = "Failed to add task. Check server connection.";
pub const MSG_TASK_UPDATED: &str = "Task updated successfully!";
pub const MSG_TASK_UPDATE_FAILED: &str = "Failed to update task.";
pub const MSG_TASK_DELETED: &str = "Task deleted successfully!";
pub const MSG_TASK_DELETE_FAILED: &str = "Failed to delete task.";
pub const MSG_TASK_BUSY: &str = "That task is still being updated, please wait.";

/// Owns the session's task list. Every mutation goes to the server first
/// and is followed by a full re-fetch; the local list is never patched.
pub struct TaskService {
    gateway: Arc<dyn TaskGateway>,
    notifier: Arc<dyn Notifier>,
    session: Session,
    tasks: RwLock<Vec<Task>>,
    in_flight: InFlight<TaskId>,
}

impl TaskService {
    pub fn new(
        gateway: Arc<dyn TaskGateway>,
        notifier: Arc<dyn Notifier>,
        session: Session,
    ) -> Self {
        Self {
            gateway,
            notifier,
            session,
            tasks: RwLock::new(Vec::new()),
            in_flight: InFlight::new(),
        }
    }

    /// Snapshot of the current list.
    pub async fn tasks(&self) -> Vec<Task> {
        self.tasks.read().await.clone()
    }

    pub async fn find(&self, id: TaskId) -> Option<Task> {
        self.tasks.read().await.iter().find(|t| t.id == id).cloned()
    }

    /// Initial fetch, announced with a banner either way.
    pub async fn load(&self) -> AppResult<usize> {
        let count = self.refresh().await?;
        self.notifier.notify(Notification::success(MSG_TASKS_LOADED));
        Ok(count)
    }

    /// Replaces the list with the server's. On failure the list becomes
    /// empty and an error banner is raised.
    pub async fn refresh(&self) -> AppResult<usize> {
        let username = &self.session.username;
        tracing::info!("Fetching tasks for user: {}", username);

        match self.gateway.list(username).await {
            Ok(tasks) => {
                let count = tasks.len();
                *self.tasks.write().await = tasks;
                tracing::info!("Loaded {} tasks for {}", count, username);
                Ok(count)
            }
            Err(e) => {
                tracing::error!("Error loading tasks: {}", e);
                self.tasks.write().await.clear();
                self.notifier.notify(Notification::error(MSG_TASKS_LOAD_FAILED));
                Err(e.into())
            }
        }
    }

    pub async fn create(&self, draft: &TaskDraft) -> AppResult<Task> {
        let task = match draft.validate(TaskId::generate(), &self.session.username) {
            Ok(task) => task,
            Err(e) => {
                self.notifier.notify(Notification::error(e.user_message()));
                return Err(e.into());
            }
        };

        // A new id is not on the server yet, so there is nothing to race.
        tracing::info!("Adding new task {} ({})", task.id, task.name);

        if let Err(e) = self.gateway.create(&task).await {
            tracing::error!("Add task error: {}", e);
            self.notifier.notify(Notification::error(MSG_TASK_ADD_FAILED));
            return Err(e.into());
        }

        self.finish_mutation(MSG_TASK_ADDED).await;
        Ok(task)
    }

    pub async fn toggle_complete(&self, id: TaskId) -> AppResult<()> {
        let _guard = self.begin(id)?;
        tracing::info!("Toggling completion of task {}", id);

        if let Err(e) = self.gateway.set_completed(id, &self.session.username).await {
            tracing::error!("Toggle complete error: {}", e);
            self.notifier.notify(Notification::error(MSG_TASK_UPDATE_FAILED));
            return Err(e.into());
        }

        self.finish_mutation(MSG_TASK_UPDATED).await;
        Ok(())
    }

    pub async fn delete(&self, id: TaskId) -> AppResult<()> {
        let _guard = self.begin(id)?;
        tracing::info!("Deleting task {}", id);

        if let Err(e) = self.gateway.remove(id, &self.session.username).await {
            tracing::error!("Delete task error: {}", e);
            self.notifier.notify(Notification::error(MSG_TASK_DELETE_FAILED));
            return Err(e.into());
        }

        self.finish_mutation(MSG_TASK_DELETED).await;
        Ok(())
    }

    fn begin(&self, id: TaskId) -> AppResult<super::InFlightGuard<TaskId>> {
        self.in_flight.try_begin(id).ok_or_else(|| {
            tracing::warn!("Rejected concurrent mutation of task {}", id);
            self.notifier.notify(Notification::error(MSG_TASK_BUSY));
            AppError::MutationInFlight(id)
        })
    }

    /// The mutation already landed on the server; a failed re-fetch has
    /// raised its own banner, so the success banner is skipped then.
    async fn finish_mutation(&self, success_message: &str) {
        if self.refresh().await.is_ok() {
            self.notifier.notify(Notification::success(success_message));
        }
    }

    pub async fn dashboard(&self, today: NaiveDate) -> Dashboard {
        Dashboard::compute(&self.tasks.read().await, today)
    }

    pub async fn tasks_for_date(&self, date: NaiveDate) -> Vec<Task> {
        tasks_for_date(&self.tasks.read().await, date)
    }

    pub async fn calendar(&self, year: i32, month: u32) -> AppResult<CalendarMonth> {
        Ok(CalendarMonth::build(&self.tasks.read().await, year, month)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::NotificationCenter;
    use crate::ports::{MockTaskGateway, NotificationKind, TransportError, TransportResult};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn stored(id: i64, deadline: &str, completed: bool) -> Task {
        Task {
            id: TaskId(id),
            name: format!("task {id}"),
            category: "Study".to_string(),
            priority: Priority::from_label("High"),
            deadline: Some(date(deadline)),
            completed,
            username: Username::from("alice"),
        }
    }

    fn draft(name: &str) -> TaskDraft {
        TaskDraft {
            name: name.to_string(),
            category: "Study".to_string(),
            priority: "High".to_string(),
            deadline: Some("2024-06-20".to_string()),
        }
    }

    fn service(gateway: MockTaskGateway) -> (TaskService, Arc<NotificationCenter>) {
        let center = Arc::new(NotificationCenter::new());
        let service = TaskService::new(Arc::new(gateway), center.clone(), Session::new("alice"));
        (service, center)
    }

    fn down() -> TransportError {
        TransportError::Network("connection refused".to_string())
    }

    #[tokio::test]
    async fn load_scopes_to_session_user() {
        let mut gateway = MockTaskGateway::new();
        gateway
            .expect_list()
            .withf(|user| user.as_str() == "alice")
            .times(1)
            .returning(|_| Ok(vec![stored(1, "2024-06-10", false)]));

        let (service, center) = service(gateway);
        assert_eq!(service.load().await.unwrap(), 1);
        assert_eq!(service.tasks().await.len(), 1);
        assert_eq!(center.latest().unwrap().message, MSG_TASKS_LOADED);
    }

    #[tokio::test]
    async fn failed_load_degrades_to_empty_list() {
        let mut gateway = MockTaskGateway::new();
        let mut seq = mockall::Sequence::new();
        gateway
            .expect_list()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![stored(1, "2024-06-10", false)]));
        gateway
            .expect_list()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(down()));

        let (service, center) = service(gateway);
        service.load().await.unwrap();

        let err = service.load().await.unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
        assert!(service.tasks().await.is_empty());
        let banner = center.latest().unwrap();
        assert_eq!(banner.kind, NotificationKind::Error);
        assert_eq!(banner.message, MSG_TASKS_LOAD_FAILED);
    }

    #[tokio::test]
    async fn create_sends_full_task_then_refetches() {
        let mut gateway = MockTaskGateway::new();
        let mut seq = mockall::Sequence::new();
        gateway
            .expect_create()
            .withf(|task| {
                task.name == "Essay"
                    && task.username.as_str() == "alice"
                    && !task.completed
                    && task.deadline == Some(date("2024-06-20"))
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        gateway
            .expect_list()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![stored(5, "2024-06-20", false)]));

        let (service, center) = service(gateway);
        let task = service.create(&draft("Essay")).await.unwrap();

        assert_eq!(task.priority.as_str(), "High");
        // The list is whatever the server says, not the local draft.
        assert_eq!(service.tasks().await, vec![stored(5, "2024-06-20", false)]);
        assert_eq!(center.latest().unwrap().message, MSG_TASK_ADDED);
    }

    #[tokio::test]
    async fn failed_create_leaves_list_untouched() {
        let mut gateway = MockTaskGateway::new();
        gateway
            .expect_list()
            .times(1)
            .returning(|_| Ok(vec![stored(1, "2024-06-10", true), stored(2, "2024-06-11", false)]));
        gateway.expect_create().times(1).returning(|_| Err(down()));

        let (service, center) = service(gateway);
        service.load().await.unwrap();
        let before = service.tasks().await;

        let err = service.create(&draft("Essay")).await.unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
        assert_eq!(service.tasks().await, before);
        assert_eq!(center.latest().unwrap().message, MSG_TASK_ADD_FAILED);
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_gateway() {
        let mut gateway = MockTaskGateway::new();
        gateway.expect_create().never();
        gateway.expect_list().never();

        let (service, center) = service(gateway);
        let mut no_deadline = draft("Essay");
        no_deadline.deadline = None;

        assert!(matches!(
            service.create(&draft("  ")).await,
            Err(AppError::Validation(ValidationError::MissingField("name")))
        ));
        assert_eq!(center.latest().unwrap().message, "Please enter a task name");

        assert!(matches!(
            service.create(&no_deadline).await,
            Err(AppError::Validation(ValidationError::MissingField("deadline")))
        ));
        assert_eq!(center.latest().unwrap().message, "Please select a deadline");
    }

    #[tokio::test]
    async fn toggle_and_delete_refetch_after_success() {
        let mut gateway = MockTaskGateway::new();
        let mut seq = mockall::Sequence::new();
        gateway
            .expect_set_completed()
            .withf(|id, user| *id == TaskId(1) && user.as_str() == "alice")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        gateway
            .expect_list()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![stored(1, "2024-06-10", true)]));
        gateway
            .expect_remove()
            .withf(|id, _| *id == TaskId(1))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        gateway
            .expect_list()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Vec::new()));

        let (service, center) = service(gateway);

        service.toggle_complete(TaskId(1)).await.unwrap();
        assert!(service.find(TaskId(1)).await.unwrap().completed);
        assert_eq!(center.latest().unwrap().message, MSG_TASK_UPDATED);

        service.delete(TaskId(1)).await.unwrap();
        assert!(service.tasks().await.is_empty());
        assert_eq!(center.latest().unwrap().message, MSG_TASK_DELETED);
    }

    #[tokio::test]
    async fn failed_toggle_keeps_previous_state() {
        let mut gateway = MockTaskGateway::new();
        gateway
            .expect_list()
            .times(1)
            .returning(|_| Ok(vec![stored(1, "2024-06-10", false)]));
        gateway
            .expect_set_completed()
            .times(1)
            .returning(|_, _| Err(TransportError::Status {
                status: 500,
                body: "boom".to_string(),
            }));

        let (service, center) = service(gateway);
        service.load().await.unwrap();

        assert!(service.toggle_complete(TaskId(1)).await.is_err());
        assert!(!service.find(TaskId(1)).await.unwrap().completed);
        assert_eq!(center.latest().unwrap().message, MSG_TASK_UPDATE_FAILED);
    }

    #[tokio::test]
    async fn refetch_failure_after_mutation_skips_success_banner() {
        let mut gateway = MockTaskGateway::new();
        gateway.expect_remove().times(1).returning(|_, _| Ok(()));
        gateway.expect_list().times(1).returning(|_| Err(down()));

        let (service, center) = service(gateway);
        service.delete(TaskId(3)).await.unwrap();

        let messages: Vec<String> = center.history().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec![MSG_TASKS_LOAD_FAILED.to_string()]);
    }

    #[tokio::test]
    async fn views_read_the_current_list() {
        let mut gateway = MockTaskGateway::new();
        gateway.expect_list().times(1).returning(|_| {
            Ok(vec![
                stored(1, "2024-06-10", true),
                stored(2, "2024-06-09", true),
                stored(3, "2024-06-12", false),
            ])
        });

        let (service, _) = service(gateway);
        service.load().await.unwrap();

        let dash = service.dashboard(date("2024-06-10")).await;
        assert_eq!(dash.streak, 2);
        assert_eq!(dash.metrics.completion_rate, 67);
        assert_eq!(dash.upcoming.len(), 1);
        assert_eq!(service.tasks_for_date(date("2024-06-09")).await.len(), 1);
        assert_eq!(service.calendar(2024, 6).await.unwrap().busy_days().count(), 3);
    }

    /// Holds `set_completed` and `create` open until released so a second
    /// call can race them.
    struct GatedGateway {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl TaskGateway for GatedGateway {
        async fn list(&self, _username: &Username) -> TransportResult<Vec<Task>> {
            Ok(Vec::new())
        }

        async fn create(&self, _task: &Task) -> TransportResult<()> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(())
        }

        async fn set_completed(&self, _id: TaskId, _username: &Username) -> TransportResult<()> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(())
        }

        async fn remove(&self, _id: TaskId, _username: &Username) -> TransportResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn concurrent_mutation_of_same_task_is_rejected() {
        let gateway = Arc::new(GatedGateway {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let center = Arc::new(NotificationCenter::new());
        let service = Arc::new(TaskService::new(
            gateway.clone(),
            center.clone(),
            Session::new("alice"),
        ));

        let first = tokio::spawn({
            let service = service.clone();
            async move { service.toggle_complete(TaskId(1)).await }
        });
        gateway.entered.notified().await;

        let err = service.delete(TaskId(1)).await.unwrap_err();
        assert!(matches!(err, AppError::MutationInFlight(TaskId(1))));
        assert_eq!(center.latest().unwrap().message, MSG_TASK_BUSY);

        // A different record is not blocked.
        service.delete(TaskId(2)).await.unwrap();

        gateway.release.notify_one();
        first.await.unwrap().unwrap();

        // Released once the first call finished.
        service.delete(TaskId(1)).await.unwrap();
    }

    #[tokio::test]
    async fn overlapping_creates_are_not_rejected() {
        let gateway = Arc::new(GatedGateway {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let center = Arc::new(NotificationCenter::new());
        let service = Arc::new(TaskService::new(
            gateway.clone(),
            center.clone(),
            Session::new("alice"),
        ));

        let mut pending = Vec::new();
        for name in ["Essay", "Reading"] {
            let service = service.clone();
            pending.push(tokio::spawn(async move {
                service.create(&draft(name)).await
            }));
            gateway.entered.notified().await;
        }

        gateway.release.notify_waiters();
        for handle in pending {
            handle.await.unwrap().unwrap();
        }
        assert!(center.history().iter().all(|n| !n.is_error()));
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::domain::*;

/// A task as the schedule server sends it. `/schedule` leaves out the
/// owner, and older records may carry odd deadlines.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

// Request DTOs
#[derive(Debug, Serialize)]
pub struct NewTaskDto<'a> {
    pub id: i64,
    pub name: &'a str,
    pub category: &'a str,
    pub priority: &'a str,
    pub deadline: String,
    pub completed: bool,
    pub username: &'a str,
}

#[derive(Debug, Serialize)]
pub struct TaskRefDto<'a> {
    pub id: i64,
    pub username: &'a str,
}

impl TaskDto {
    /// Converts into a domain task, filling in `owner` when the server left
    /// the username out.
    pub fn into_task(self, owner: &Username) -> Task {
        let deadline = NaiveDate::parse_from_str(self.deadline.trim(), "%Y-%m-%d").ok();
        if deadline.is_none() {
            tracing::debug!("Task {} has no usable deadline: {:?}", self.id, self.deadline);
        }

        Task {
            id: TaskId(self.id),
            name: self.name,
            category: self.category,
            priority: Priority::from_label(&self.priority),
            deadline,
            completed: self.completed,
            username: self.username.map(Username).unwrap_or_else(|| owner.clone()),
        }
    }
}

impl<'a> From<&'a Task> for NewTaskDto<'a> {
    fn from(task: &'a Task) -> Self {
        Self {
            id: task.id.0,
            name: &task.name,
            category: &task.category,
            priority: task.priority.as_str(),
            deadline: task
                .deadline
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            completed: task.completed,
            username: task.username.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_rows_without_owner_get_the_queried_user() {
        let dto: TaskDto = serde_json::from_str(
            r#"{"id":1717000000000,"name":"Essay","category":"Writing","priority":"High","deadline":"2024-06-01","completed":false}"#,
        )
        .unwrap();
        let task = dto.into_task(&Username::from("alice"));

        assert_eq!(task.username.as_str(), "alice");
        assert_eq!(task.priority.as_str(), "High");
        assert_eq!(task.deadline, NaiveDate::from_ymd_opt(2024, 6, 1));
    }

    #[test]
    fn malformed_deadline_becomes_none() {
        let dto: TaskDto =
            serde_json::from_str(r#"{"id":2,"name":"Odd","deadline":"soon"}"#).unwrap();
        let task = dto.into_task(&Username::from("alice"));
        assert_eq!(task.deadline, None);
        assert!(!task.completed);
    }

    #[test]
    fn new_task_body_has_every_field() {
        let task = TaskDraft {
            name: "Essay".to_string(),
            category: "Writing".to_string(),
            priority: "📈 Medium Priority".to_string(),
            deadline: Some("2024-06-01".to_string()),
        }
        .validate(TaskId(42), &Username::from("alice"))
        .unwrap();

        let body = serde_json::to_value(NewTaskDto::from(&task)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "id": 42,
                "name": "Essay",
                "category": "Writing",
                "priority": "Medium",
                "deadline": "2024-06-01",
                "completed": false,
                "username": "alice"
            })
        );
    }

    #[test]
    fn priority_case_survives_both_directions() {
        let task = TaskDraft {
            name: "Essay".to_string(),
            priority: "low".to_string(),
            deadline: Some("2024-06-01".to_string()),
            ..Default::default()
        }
        .validate(TaskId(1), &Username::from("alice"))
        .unwrap();
        let body = serde_json::to_value(NewTaskDto::from(&task)).unwrap();
        assert_eq!(body["priority"], "low");

        let dto: TaskDto =
            serde_json::from_str(r#"{"id":3,"name":"Odd","priority":"hIGH","deadline":"2024-06-01"}"#)
                .unwrap();
        assert_eq!(dto.into_task(&Username::from("alice")).priority.as_str(), "hIGH");
    }
}

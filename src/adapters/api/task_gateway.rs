use async_trait::async_trait;

use super::{NewTaskDto, ScheduleClient, TaskDto, TaskRefDto};
use crate::{
    domain::{Task, TaskId, Username},
    ports::{TaskGateway, TransportResult},
};

pub struct HttpTaskGateway {
    client: ScheduleClient,
}

impl HttpTaskGateway {
    pub fn new(client: ScheduleClient) -> Self {
        Self { client }
    }

    fn schedule_path(username: &Username) -> String {
        format!("/schedule?user={}", urlencoding::encode(username.as_str()))
    }
}

#[async_trait]
impl TaskGateway for HttpTaskGateway {
    async fn list(&self, username: &Username) -> TransportResult<Vec<Task>> {
        let task_dtos: Vec<TaskDto> = self.client.get_json(&Self::schedule_path(username)).await?;
        tracing::debug!("Fetched {} tasks for {}", task_dtos.len(), username);

        Ok(task_dtos
            .into_iter()
            .map(|dto| dto.into_task(username))
            .collect())
    }

    async fn create(&self, task: &Task) -> TransportResult<()> {
        self.client
            .post_json("/add_task", &NewTaskDto::from(task))
            .await
    }

    async fn set_completed(&self, id: TaskId, username: &Username) -> TransportResult<()> {
        let body = TaskRefDto {
            id: id.0,
            username: username.as_str(),
        };
        self.client.post_json("/toggle_complete", &body).await
    }

    async fn remove(&self, id: TaskId, username: &Username) -> TransportResult<()> {
        let body = TaskRefDto {
            id: id.0,
            username: username.as_str(),
        };
        self.client.post_json("/delete_task", &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::TransportError;
    use axum::{
        extract::{Query, State},
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::Value;
    use std::{collections::HashMap, sync::Arc, time::Duration};
    use tokio::sync::Mutex;

    /// In-process stand-in for the schedule server.
    #[derive(Clone, Default)]
    struct FakeServer {
        tasks: Arc<Mutex<Vec<Value>>>,
    }

    async fn schedule(
        State(server): State<FakeServer>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<Vec<Value>> {
        let user = params.get("user").cloned().unwrap_or_default();
        let tasks = server.tasks.lock().await;
        let rows = tasks
            .iter()
            .filter(|t| t["username"] == user.as_str())
            .map(|t| {
                // The real server strips the owner from list rows.
                let mut row = t.clone();
                if let Some(fields) = row.as_object_mut() {
                    fields.remove("username");
                }
                row
            })
            .collect();
        Json(rows)
    }

    async fn add_task(State(server): State<FakeServer>, Json(body): Json<Value>) -> StatusCode {
        server.tasks.lock().await.push(body);
        StatusCode::OK
    }

    async fn toggle(State(server): State<FakeServer>, Json(body): Json<Value>) -> StatusCode {
        let mut tasks = server.tasks.lock().await;
        match tasks
            .iter_mut()
            .find(|t| t["id"] == body["id"] && t["username"] == body["username"])
        {
            Some(task) => {
                let done = task["completed"].as_bool().unwrap_or(false);
                task["completed"] = Value::Bool(!done);
                StatusCode::OK
            }
            None => StatusCode::NOT_FOUND,
        }
    }

    async fn delete(State(server): State<FakeServer>, Json(body): Json<Value>) -> StatusCode {
        let mut tasks = server.tasks.lock().await;
        let before = tasks.len();
        tasks.retain(|t| !(t["id"] == body["id"] && t["username"] == body["username"]));
        if tasks.len() < before {
            StatusCode::OK
        } else {
            StatusCode::NOT_FOUND
        }
    }

    async fn spawn_server() -> String {
        let app = Router::new()
            .route("/schedule", get(schedule))
            .route("/add_task", post(add_task))
            .route("/toggle_complete", post(toggle))
            .route("/delete_task", post(delete))
            .with_state(FakeServer::default());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn gateway(base_url: &str) -> HttpTaskGateway {
        HttpTaskGateway::new(ScheduleClient::new(base_url, Duration::from_secs(5)).unwrap())
    }

    fn essay(id: i64, owner: &Username) -> Task {
        crate::domain::TaskDraft {
            name: "Essay".to_string(),
            category: "Writing".to_string(),
            priority: "High".to_string(),
            deadline: Some("2024-06-01".to_string()),
        }
        .validate(TaskId(id), owner)
        .unwrap()
    }

    #[tokio::test]
    async fn full_task_lifecycle_against_server() {
        let base = spawn_server().await;
        let gateway = gateway(&base);
        let alice = Username::from("alice");
        let bob = Username::from("bob");

        gateway.create(&essay(1, &alice)).await.unwrap();
        gateway.create(&essay(2, &bob)).await.unwrap();

        let listed = gateway.list(&alice).await.unwrap();
        assert_eq!(listed, vec![essay(1, &alice)]);

        gateway.set_completed(TaskId(1), &alice).await.unwrap();
        assert!(gateway.list(&alice).await.unwrap()[0].completed);

        gateway.remove(TaskId(1), &alice).await.unwrap();
        assert!(gateway.list(&alice).await.unwrap().is_empty());
        assert_eq!(gateway.list(&bob).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn non_success_status_is_transport_error() {
        let base = spawn_server().await;
        let gateway = gateway(&base);

        let err = gateway
            .remove(TaskId(99), &Username::from("alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = gateway(&format!("http://{addr}"))
            .list(&Username::from("alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
    }

    #[test]
    fn usernames_are_url_encoded() {
        assert_eq!(
            HttpTaskGateway::schedule_path(&Username::from("ann lee&co")),
            "/schedule?user=ann%20lee%26co"
        );
    }
}

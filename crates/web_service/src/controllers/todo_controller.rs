use actix_web::{web, HttpResponse};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use todo_core::{TodoItem, TodoStore};

use crate::error::{AppError, Result};
use crate::server::AppState;
use crate::services::session_manager::TodoSession;

/// Response for `POST /api/sessions`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
    pub created_at: String,
}

/// Snapshot of one session's list, returned by every todo route.
#[derive(Debug, Serialize)]
pub struct TodoListResponse {
    pub items: Vec<TodoItem>,
}

#[derive(Debug, Deserialize)]
pub struct AddTodoRequest {
    pub text: String,
}

/// Body of the assignee route. `null` or an empty string clears the
/// assignee.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTodoRequest {
    #[serde(default)]
    pub assigned_to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

/// POST /api/sessions
pub async fn create_session(app_state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = app_state.sessions.create_session()?;
    Ok(HttpResponse::Ok().json(SessionCreatedResponse {
        session_id: session.id,
        created_at: session.created_at.to_rfc3339(),
    }))
}

/// DELETE /api/sessions/{session_id}
///
/// Destroys the session and the list it owns.
pub async fn delete_session(
    app_state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let session_id = path.into_inner();
    if !app_state.sessions.remove(session_id) {
        return Err(AppError::SessionNotFound(session_id.to_string()));
    }
    Ok(HttpResponse::Ok().json(SuccessResponse {
        message: format!("Session {} deleted", session_id),
    }))
}

/// GET /api/sessions/{session_id}/todos
pub async fn list_todos(
    app_state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let session = app_state.sessions.resolve(Some(path.into_inner()))?;
    let store = session.store.read().await;
    Ok(list_response(&store))
}

/// POST /api/sessions/{session_id}/todos
///
/// Whitespace-only text adds nothing; the unchanged list comes back.
pub async fn add_todo(
    app_state: web::Data<AppState>,
    path: web::Path<Uuid>,
    request: web::Json<AddTodoRequest>,
) -> Result<HttpResponse> {
    let session = app_state.sessions.resolve(Some(path.into_inner()))?;
    add_to_session(&session, &request.text).await
}

/// POST /api/sessions/{session_id}/todos/{todo_id}/toggle
pub async fn toggle_todo(
    app_state: web::Data<AppState>,
    path: web::Path<(Uuid, String)>,
) -> Result<HttpResponse> {
    let (session_id, todo_id) = path.into_inner();
    let session = app_state.sessions.resolve(Some(session_id))?;
    toggle_in_session(&session, &todo_id).await
}

/// PUT /api/sessions/{session_id}/todos/{todo_id}/assignee
pub async fn assign_todo(
    app_state: web::Data<AppState>,
    path: web::Path<(Uuid, String)>,
    request: web::Json<AssignTodoRequest>,
) -> Result<HttpResponse> {
    let (session_id, todo_id) = path.into_inner();
    let session = app_state.sessions.resolve(Some(session_id))?;
    assign_in_session(&session, &todo_id, request.into_inner()).await
}

/// DELETE /api/sessions/{session_id}/todos/{todo_id}
pub async fn delete_todo(
    app_state: web::Data<AppState>,
    path: web::Path<(Uuid, String)>,
) -> Result<HttpResponse> {
    let (session_id, todo_id) = path.into_inner();
    let session = app_state.sessions.resolve(Some(session_id))?;
    delete_in_session(&session, &todo_id).await
}

/// GET /api/todos
pub async fn list_default_todos(app_state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = app_state.sessions.resolve(None)?;
    let store = session.store.read().await;
    Ok(list_response(&store))
}

/// POST /api/todos
pub async fn add_default_todo(
    app_state: web::Data<AppState>,
    request: web::Json<AddTodoRequest>,
) -> Result<HttpResponse> {
    let session = app_state.sessions.resolve(None)?;
    add_to_session(&session, &request.text).await
}

/// POST /api/todos/{todo_id}/toggle
pub async fn toggle_default_todo(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let session = app_state.sessions.resolve(None)?;
    toggle_in_session(&session, &path.into_inner()).await
}

/// PUT /api/todos/{todo_id}/assignee
pub async fn assign_default_todo(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<AssignTodoRequest>,
) -> Result<HttpResponse> {
    let session = app_state.sessions.resolve(None)?;
    assign_in_session(&session, &path.into_inner(), request.into_inner()).await
}

/// DELETE /api/todos/{todo_id}
pub async fn delete_default_todo(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let session = app_state.sessions.resolve(None)?;
    delete_in_session(&session, &path.into_inner()).await
}

async fn add_to_session(session: &TodoSession, text: &str) -> Result<HttpResponse> {
    let mut store = session.store.write().await;
    if let Some(item) = store.add(text) {
        info!("Session {}: added todo {}", session.id, item.id);
    }
    Ok(list_response(&store))
}

async fn toggle_in_session(session: &TodoSession, todo_id: &str) -> Result<HttpResponse> {
    let mut store = session.store.write().await;
    store.toggle_complete(todo_id);
    Ok(list_response(&store))
}

async fn assign_in_session(
    session: &TodoSession,
    todo_id: &str,
    request: AssignTodoRequest,
) -> Result<HttpResponse> {
    let mut store = session.store.write().await;
    store.assign(todo_id, request.assigned_to.as_deref());
    Ok(list_response(&store))
}

async fn delete_in_session(session: &TodoSession, todo_id: &str) -> Result<HttpResponse> {
    let mut store = session.store.write().await;
    store.delete(todo_id);
    Ok(list_response(&store))
}

fn list_response(store: &TodoStore) -> HttpResponse {
    HttpResponse::Ok().json(TodoListResponse {
        items: store.items().to_vec(),
    })
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/sessions")
            .route("", web::post().to(create_session))
            .route("/{session_id}", web::delete().to(delete_session))
            .route("/{session_id}/todos", web::get().to(list_todos))
            .route("/{session_id}/todos", web::post().to(add_todo))
            .route(
                "/{session_id}/todos/{todo_id}/toggle",
                web::post().to(toggle_todo),
            )
            .route(
                "/{session_id}/todos/{todo_id}/assignee",
                web::put().to(assign_todo),
            )
            .route("/{session_id}/todos/{todo_id}", web::delete().to(delete_todo)),
    );
    cfg.service(
        web::scope("/todos")
            .route("", web::get().to(list_default_todos))
            .route("", web::post().to(add_default_todo))
            .route("/{todo_id}/toggle", web::post().to(toggle_default_todo))
            .route("/{todo_id}/assignee", web::put().to(assign_default_todo))
            .route("/{todo_id}", web::delete().to(delete_default_todo)),
    );
}

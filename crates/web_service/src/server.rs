use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use log::{error, info};

use openai_adapter::{Config, OpenAIAdapter, OpenAIAdapterTrait};

use crate::controllers::{copilot_controller, health_controller, todo_controller};
use crate::services::session_manager::SessionManager;

const DEFAULT_WORKER_COUNT: usize = 10;

/// Shared state handed to every worker.
pub struct AppState {
    pub adapter: Arc<dyn OpenAIAdapterTrait>,
    pub sessions: SessionManager,
}

pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(copilot_controller::config)
            .configure(todo_controller::config)
            .configure(health_controller::config),
    );
}

pub async fn run(port: u16, config: Config, instructions: String) -> Result<(), String> {
    info!("Starting todo copilot service...");

    let adapter = OpenAIAdapter::new(config)
        .map_err(|e| format!("Failed to initialize model adapter: {e}"))?;
    let sessions = SessionManager::new(instructions)
        .map_err(|e| format!("Failed to initialize sessions: {e}"))?;

    let app_state = web::Data::new(AppState {
        adapter: Arc::new(adapter),
        sessions,
    });

    info!("Web service starting on http://127.0.0.1:{}", port);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(Cors::permissive())
            .configure(app_config)
    })
    .workers(DEFAULT_WORKER_COUNT)
    .bind(format!("127.0.0.1:{}", port))
    .map_err(|e| format!("Failed to bind to port {}: {}", port, e))?
    .run();

    if let Err(e) = server.await {
        error!("Web server error: {}", e);
        return Err(format!("Web server error: {e}"));
    }

    Ok(())
}

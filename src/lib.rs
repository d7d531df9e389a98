pub mod application;
pub mod domain;
pub mod host;
pub mod infrastructure;

use application::commands::AppState;
use host::stdio::run_stdio_bridge;
use infrastructure::error::InfraError;
use std::path::PathBuf;
use std::sync::Arc;

/// Loads the workspace under `workspace_root` and serves host commands on
/// stdin/stdout until the host disconnects or asks to shut down.
pub async fn run(workspace_root: PathBuf) -> Result<(), InfraError> {
    let app_state = Arc::new(AppState::new(workspace_root.clone())?);
    tracing::info!(
        workspace_root = %workspace_root.display(),
        remote_store = app_state.config().store_url.is_some(),
        "focusboard host starting"
    );

    run_stdio_bridge(app_state).await?;
    tracing::info!("focusboard host shut down cleanly");
    Ok(())
}

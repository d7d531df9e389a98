use focusboard::application::bootstrap::bootstrap_workspace;
use focusboard::infrastructure::logging::init_tracing;
use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let workspace_root = match std::env::args_os().nth(1) {
        Some(path) => PathBuf::from(path),
        None => match std::env::current_dir() {
            Ok(path) => path,
            Err(error) => {
                eprintln!("failed to resolve current directory: {error}");
                return ExitCode::FAILURE;
            }
        },
    };

    let bootstrap = match bootstrap_workspace(&workspace_root) {
        Ok(bootstrap) => bootstrap,
        Err(error) => {
            eprintln!("failed to prepare workspace {}: {error}", workspace_root.display());
            return ExitCode::FAILURE;
        }
    };
    let _log_guard = init_tracing(&bootstrap.logs_dir);

    match focusboard::run(bootstrap.workspace_root).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %error, "focusboard host exited with error");
            ExitCode::FAILURE
        }
    }
}

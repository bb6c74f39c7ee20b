pub mod canvas;
pub mod classifier;
pub mod config;
pub mod preprocess;
pub mod presentation;
pub mod session;
mod utils;

#[cfg(feature = "desktop")]
pub use desktop::run;

#[cfg(feature = "desktop")]
pub(crate) type AppSession = session::SessionController<
    classifier::GeminiStrategy,
    classifier::HeuristicStrategy,
>;

#[cfg(feature = "desktop")]
pub(crate) struct AppState {
    pub(crate) session: AppSession,
}

#[cfg(feature = "desktop")]
mod desktop {
    use std::sync::Arc;

    use tauri::Manager;

    use crate::{
        classifier::{ClassificationBoundary, GeminiStrategy, HeuristicStrategy},
        config::ClassifierConfig,
        session::{
            commands::{
                begin_stroke, clear_canvas, end_stroke, extend_stroke, get_session_state,
                reset_session,
            },
            events::TauriEvents,
            SessionController,
        },
        AppState,
    };

    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        // Initialize logging (reads RUST_LOG env var)
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .init();

        log::info!("digit-sketch starting up...");

        tauri::Builder::default()
            .setup(|app| {
                let result = (|| -> anyhow::Result<()> {
                    // Fail fast: without a key there is no remote classifier to try.
                    let config = Arc::new(ClassifierConfig::from_env()?);
                    log::info!("classifier config: {:?}", config);

                    let boundary = ClassificationBoundary::new(
                        GeminiStrategy::new(Arc::clone(&config))?,
                        HeuristicStrategy,
                    );
                    let events = Arc::new(TauriEvents::new(app.handle().clone()));
                    let session =
                        SessionController::new(boundary, events, config.processing_delay);

                    app.manage(AppState { session });
                    Ok(())
                })();

                result.map_err(|err| err.into())
            })
            .invoke_handler(tauri::generate_handler![
                begin_stroke,
                extend_stroke,
                end_stroke,
                clear_canvas,
                reset_session,
                get_session_state,
            ])
            .run(tauri::generate_context!())
            .expect("error while running tauri application");
    }
}

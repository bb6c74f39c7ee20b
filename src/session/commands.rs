use tauri::State;

use crate::{
    canvas::PointerSample,
    session::SessionSnapshot,
    AppSession, AppState,
};

fn controller_from_state(state: &State<'_, AppState>) -> AppSession {
    state.session.clone()
}

#[tauri::command]
pub async fn begin_stroke(state: State<'_, AppState>, sample: PointerSample) -> Result<(), String> {
    let controller = controller_from_state(&state);
    controller
        .begin_stroke(sample)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn extend_stroke(state: State<'_, AppState>, sample: PointerSample) -> Result<(), String> {
    let controller = controller_from_state(&state);
    controller
        .extend_stroke(sample)
        .await
        .map_err(|e| e.to_string())
}

/// Returns the request id of the classification it started, if any. The
/// outcome arrives later as a `classification-completed` event.
#[tauri::command]
pub async fn end_stroke(state: State<'_, AppState>) -> Result<Option<u64>, String> {
    let controller = controller_from_state(&state);
    Ok(controller
        .end_stroke()
        .await
        .map(|pending| pending.request_id))
}

#[tauri::command]
pub async fn clear_canvas(state: State<'_, AppState>) -> Result<(), String> {
    let controller = controller_from_state(&state);
    controller.clear().await;
    Ok(())
}

#[tauri::command]
pub async fn reset_session(state: State<'_, AppState>) -> Result<(), String> {
    let controller = controller_from_state(&state);
    controller.reset().await;
    Ok(())
}

#[tauri::command]
pub async fn get_session_state(state: State<'_, AppState>) -> Result<SessionSnapshot, String> {
    let controller = controller_from_state(&state);
    Ok(controller.snapshot().await)
}

//! Settings page for the backend's model credentials and extraction parameters.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};

use super::render;
use crate::controllers::settings::{self, SettingsForm};
use crate::state::SharedState;
use crate::store::Page;
use crate::views::settings::render_settings;

/// `GET /settings`
pub async fn settings_page(State(state): State<SharedState>) -> Html<String> {
    let console = &state.console;
    console.navigate(Page::Settings).await;
    let form = settings::current_form(console);
    render(console, |ui| render_settings(ui, &form))
}

/// `POST /settings`. A rejected form is shown again with the user's edits.
pub async fn settings_save(
    State(state): State<SharedState>,
    Form(form): Form<SettingsForm>,
) -> Response {
    let console = &state.console;
    if settings::save_config(console, &form).await {
        Redirect::to("/settings").into_response()
    } else {
        render(console, |ui| render_settings(ui, &form)).into_response()
    }
}

/// `POST /settings/reset`
pub async fn settings_reset(State(state): State<SharedState>) -> Response {
    let console = &state.console;
    settings::reset_config(console);
    let form = settings::current_form(console);
    render(console, |ui| render_settings(ui, &form)).into_response()
}

/// `POST /settings/test`
pub async fn settings_test(
    State(state): State<SharedState>,
    Form(form): Form<SettingsForm>,
) -> Redirect {
    settings::test_connection(&state.console, &form).await;
    Redirect::to("/settings")
}

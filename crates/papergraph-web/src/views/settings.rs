//! Settings page.

use papergraph_common::mask::is_masked;

use super::{escape, layout};
use crate::controllers::settings::SettingsForm;
use crate::store::{Page, UiState};

pub fn render_settings(state: &UiState, form: &SettingsForm) -> String {
    let (key_placeholder, key_title) = if is_masked(&form.api_key) {
        (
            "API key saved (shown masked)",
            "An API key is saved and shown masked. Enter the full key to replace it.",
        )
    } else {
        ("Enter your OpenAI API key", "")
    };

    let body = format!(
        r#"<div class="page-header">
        <h1 class="page-title">Settings</h1>
        <p class="text-muted">Model credentials and extraction parameters used by the backend</p>
    </div>
    <form id="settings-form" class="card settings-form" method="post" action="/settings">
        <h3 class="settings-section-title">OpenAI</h3>
        <div class="form-group">
            <label for="api_base">API base URL</label>
            <input class="form-control" id="api_base" name="api_base" type="text" value="{api_base}">
        </div>
        <div class="form-group">
            <label for="api_key">API key</label>
            <input class="form-control" id="api_key" name="api_key" type="password" value="{api_key}" placeholder="{key_placeholder}" title="{key_title}" autocomplete="off">
        </div>
        <div class="form-group">
            <label for="extract_model">Extraction model</label>
            <input class="form-control" id="extract_model" name="extract_model" type="text" value="{extract_model}">
        </div>
        <div class="form-group">
            <label for="qa_model">Q&amp;A model</label>
            <input class="form-control" id="qa_model" name="qa_model" type="text" value="{qa_model}">
        </div>
        <div class="form-group">
            <label for="temperature">Temperature</label>
            <input class="form-control" id="temperature" name="temperature" type="number" min="0" max="2" step="0.1" value="{temperature}">
        </div>

        <h3 class="settings-section-title">Extraction</h3>
        <div class="form-group">
            <label><input type="checkbox" name="deep_mode"{deep_mode}> Deep mode</label>
        </div>
        <div class="form-group">
            <label for="chunk_size">Chunk size</label>
            <input class="form-control" id="chunk_size" name="chunk_size" type="number" min="1" value="{chunk_size}">
        </div>
        <div class="form-group">
            <label for="chunk_overlap">Chunk overlap</label>
            <input class="form-control" id="chunk_overlap" name="chunk_overlap" type="number" min="0" value="{chunk_overlap}">
        </div>

        <div class="d-flex gap-3">
            <button class="btn btn-primary" type="submit">Save</button>
            <button class="btn btn-outline" type="submit" formaction="/settings/test">Test connection</button>
            <button class="btn btn-outline" type="submit" formaction="/settings/reset" formnovalidate onclick="return confirm('Reset all settings?')">Reset</button>
        </div>
    </form>"#,
        api_base = escape(&form.api_base),
        api_key = escape(&form.api_key),
        key_placeholder = key_placeholder,
        key_title = key_title,
        extract_model = escape(&form.extract_model),
        qa_model = escape(&form.qa_model),
        temperature = form.temperature,
        deep_mode = if form.deep_mode { " checked" } else { "" },
        chunk_size = form.chunk_size,
        chunk_overlap = form.chunk_overlap,
    );

    layout(state, Page::Settings, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masked_key_gets_hint() {
        let mut form = SettingsForm::default();
        form.api_key = "sk-a*******ijkl".into();
        form.deep_mode = true;
        let html = render_settings(&UiState::default(), &form);
        assert!(html.contains(r#"value="sk-a*******ijkl""#));
        assert!(html.contains("API key saved (shown masked)"));
        assert!(html.contains(r#"name="deep_mode" checked"#));
        assert!(html.contains(r#"value="gpt-4o-mini""#));
    }
}

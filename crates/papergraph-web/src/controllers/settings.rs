//! Backend settings: model credentials and extraction parameters.

use papergraph_common::mask::credential_for_update;
use papergraph_common::models::{BackendConfig, ConfigUpdate, OpenAiUpdate, SystemUpdate};
use serde::{Deserialize, Deserializer};
use tracing::info;

use super::report_failure;
use crate::console::Console;
use crate::events::ToastLevel;
use crate::store::Action;

pub const DEFAULT_EXTRACT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_QA_MODEL: &str = "gpt-4o";
pub const DEFAULT_TEMPERATURE: f64 = 0.1;
pub const DEFAULT_CHUNK_SIZE: u32 = 1200;
pub const DEFAULT_CHUNK_OVERLAP: u32 = 100;

/// The settings form as shown to and submitted by the browser.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub api_base: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub extract_model: String,
    #[serde(default)]
    pub qa_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default, deserialize_with = "checkbox")]
    pub deep_mode: bool,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: u32,
}

fn default_temperature() -> f64 { DEFAULT_TEMPERATURE }
fn default_chunk_size() -> u32 { DEFAULT_CHUNK_SIZE }
fn default_chunk_overlap() -> u32 { DEFAULT_CHUNK_OVERLAP }

/// HTML checkboxes are either absent or carry a value such as `on`.
fn checkbox<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.is_some_and(|v| !matches!(v.as_str(), "" | "false" | "off")))
}

impl Default for SettingsForm {
    fn default() -> Self {
        Self::from_config(&BackendConfig::default())
    }
}

impl SettingsForm {
    /// Populate the form, filling gaps with the defaults.
    pub fn from_config(config: &BackendConfig) -> Self {
        let openai = &config.openai;
        let system = &config.system;
        Self {
            api_base: openai.api_base.clone().unwrap_or_default(),
            api_key: openai.api_key.clone().unwrap_or_default(),
            extract_model: non_empty(openai.extract_model.as_deref(), DEFAULT_EXTRACT_MODEL),
            qa_model: non_empty(openai.qa_model.as_deref(), DEFAULT_QA_MODEL),
            temperature: openai.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            deep_mode: system.deep_mode.unwrap_or(false),
            chunk_size: system.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
            chunk_overlap: system.chunk_overlap.unwrap_or(DEFAULT_CHUNK_OVERLAP),
        }
    }

    /// Build the update payload. The key is left out while it still shows the
    /// masked value loaded from the backend.
    pub fn to_update(&self, original_api_key: &str) -> ConfigUpdate {
        ConfigUpdate {
            openai: OpenAiUpdate {
                api_base: self.api_base.trim().to_string(),
                api_key: credential_for_update(&self.api_key, original_api_key),
                extract_model: self.extract_model.trim().to_string(),
                qa_model: self.qa_model.trim().to_string(),
                temperature: self.temperature,
            },
            system: SystemUpdate {
                deep_mode: self.deep_mode,
                chunk_size: self.chunk_size,
                chunk_overlap: self.chunk_overlap,
            },
        }
    }
}

fn non_empty(value: Option<&str>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

/// The form as currently populated from the last loaded configuration.
pub fn current_form(console: &Console) -> SettingsForm {
    console
        .store
        .read(|s| s.settings.loaded.as_ref().map(SettingsForm::from_config))
        .unwrap_or_default()
}

pub async fn load_config(console: &Console) {
    match console.backend.get_config().await {
        Ok(config) => console.store.dispatch(Action::ConfigLoaded(config)),
        Err(e) => report_failure(&console.store, &e, "Failed to load settings", "Failed to load settings"),
    }
}

/// Send the form to the backend. Returns whether the backend accepted it.
pub async fn save_config(console: &Console, form: &SettingsForm) -> bool {
    let original = console.store.read(|s| s.settings.original_api_key.clone());
    let update = form.to_update(&original);
    info!(api_key_sent = update.openai.api_key.is_some(), "Saving settings");

    match console.backend.update_config(&update).await {
        Ok(ack) => {
            console.store.dispatch(Action::ConfigSaved(update));
            let message = ack.message.unwrap_or_else(|| "Settings saved".to_string());
            console.store.toast(ToastLevel::Success, message);
            // Pick up the newly masked key so an unchanged form is not resent.
            if let Ok(config) = console.backend.get_config().await {
                console.store.dispatch(Action::ConfigLoaded(config));
            }
            true
        }
        Err(e) => {
            report_failure(&console.store, &e, "Save failed", "Save request failed");
            false
        }
    }
}

/// Discard form edits: repopulate from the last loaded configuration.
pub fn reset_config(console: &Console) {
    if let Some(config) = console.store.read(|s| s.settings.loaded.clone()) {
        console.store.dispatch(Action::ConfigLoaded(config));
    }
    console.store.toast(ToastLevel::Info, "Settings reset");
}

/// Save the form, then ask the backend to try the saved credentials.
pub async fn test_connection(console: &Console, form: &SettingsForm) {
    if !save_config(console, form).await {
        return;
    }
    match console.backend.test_openai().await {
        Ok(ack) => {
            let message = ack.message.unwrap_or_else(|| "Connection test succeeded".to_string());
            console.store.toast(ToastLevel::Success, message);
        }
        Err(e) => report_failure(&console.store, &e, "Connection test failed", "Connection test failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use papergraph_common::models::OpenAiSettings;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_config_uses_defaults() {
        let form = SettingsForm::default();
        assert_eq!(form.extract_model, "gpt-4o-mini");
        assert_eq!(form.qa_model, "gpt-4o");
        assert_eq!(form.temperature, 0.1);
        assert!(!form.deep_mode);
        assert_eq!((form.chunk_size, form.chunk_overlap), (1200, 100));
    }

    #[test]
    fn loaded_values_win_over_defaults() {
        let config = BackendConfig {
            openai: OpenAiSettings {
                qa_model: Some("gpt-4.1".into()),
                temperature: Some(0.0),
                ..Default::default()
            },
            ..Default::default()
        };
        let form = SettingsForm::from_config(&config);
        assert_eq!(form.qa_model, "gpt-4.1");
        assert_eq!(form.temperature, 0.0);
        assert_eq!(form.extract_model, "gpt-4o-mini");
    }

    #[test]
    fn masked_key_left_out_of_update() {
        let mut form = SettingsForm::default();
        form.api_key = "sk-a*******ijkl".into();
        assert_eq!(form.to_update("sk-a*******ijkl").openai.api_key, None);

        form.api_key = "sk-brand-new".into();
        assert_eq!(form.to_update("sk-a*******ijkl").openai.api_key.as_deref(), Some("sk-brand-new"));
    }

    #[test]
    fn checkbox_values() {
        #[derive(Deserialize)]
        struct Probe {
            #[serde(default, deserialize_with = "checkbox")]
            on: bool,
        }
        let parse = |raw: &str| serde_json::from_str::<Probe>(raw).unwrap().on;
        assert!(parse(r#"{"on":"on"}"#));
        assert!(!parse(r#"{"on":"false"}"#));
        assert!(!parse("{}"));
    }
}

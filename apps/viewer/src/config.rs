use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub backend_url: String,
    pub user_name: String,
    pub model: String,
    pub left_model: String,
    pub right_model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: "ws://127.0.0.1:8765".into(),
            user_name: "defaultUserName".into(),
            model: "defaultSelectedModel".into(),
            left_model: "defaultLeftModel".into(),
            right_model: "defaultRightModel".into(),
        }
    }
}

/// Defaults, overridden by `viewer.toml` in the working directory,
/// overridden by environment variables. Command-line flags win over all
/// of these in `main`.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = std::fs::read_to_string("viewer.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("backend_url") {
                settings.backend_url = v.clone();
            }
            if let Some(v) = file_cfg.get("user_name") {
                settings.user_name = v.clone();
            }
            if let Some(v) = file_cfg.get("model") {
                settings.model = v.clone();
            }
            if let Some(v) = file_cfg.get("left_model") {
                settings.left_model = v.clone();
            }
            if let Some(v) = file_cfg.get("right_model") {
                settings.right_model = v.clone();
            }
        }
    }

    if let Ok(v) = std::env::var("VIEWER_BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Ok(v) = std::env::var("APP__BACKEND_URL") {
        settings.backend_url = v;
    }

    if let Ok(v) = std::env::var("VIEWER_USER_NAME") {
        settings.user_name = v;
    }
    if let Ok(v) = std::env::var("APP__USER_NAME") {
        settings.user_name = v;
    }

    if let Ok(v) = std::env::var("VIEWER_MODEL") {
        settings.model = v;
    }
    if let Ok(v) = std::env::var("VIEWER_LEFT_MODEL") {
        settings.left_model = v;
    }
    if let Ok(v) = std::env::var("VIEWER_RIGHT_MODEL") {
        settings.right_model = v;
    }

    settings
}

use std::{collections::HashMap, fs, str::FromStr};

use anyhow::{bail, Context};
use axum::http::HeaderValue;
use serde::Deserialize;
use shared::domain::{BoatState, DEFAULT_MAX_SPEED, DEFAULT_MIN_SPEED};
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub frontend_url: String,
    pub min_speed: f64,
    pub max_speed: f64,
    pub frame_relay_capacity: usize,
    pub outbox_capacity: usize,
    pub max_frame_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "0.0.0.0:5000".into(),
            frontend_url: "http://localhost:3000".into(),
            min_speed: DEFAULT_MIN_SPEED,
            max_speed: DEFAULT_MAX_SPEED,
            frame_relay_capacity: 64,
            outbox_capacity: 32,
            max_frame_bytes: 8 * 1024 * 1024,
        }
    }
}

impl Settings {
    pub fn initial_boat_state(&self) -> BoatState {
        BoatState::new(self.min_speed, self.max_speed)
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            apply_file_overrides(&mut settings, &file_cfg);
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file_overrides(settings: &mut Settings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("bind_addr") {
        settings.server_bind = v.clone();
    }
    if let Some(v) = file_cfg.get("frontend_url") {
        settings.frontend_url = v.clone();
    }
    set_parsed(&mut settings.min_speed, file_cfg.get("min_speed").cloned());
    set_parsed(&mut settings.max_speed, file_cfg.get("max_speed").cloned());
    set_parsed(
        &mut settings.frame_relay_capacity,
        file_cfg.get("frame_relay_capacity").cloned(),
    );
    set_parsed(
        &mut settings.outbox_capacity,
        file_cfg.get("outbox_capacity").cloned(),
    );
    set_parsed(
        &mut settings.max_frame_bytes,
        file_cfg.get("max_frame_bytes").cloned(),
    );
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(port) = var("PORT") {
        settings.server_bind = format!("0.0.0.0:{}", port.trim());
    }
    if let Some(v) = var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = var("FRONTEND_URL") {
        settings.frontend_url = v;
    }
    if let Some(v) = var("APP__FRONTEND_URL") {
        settings.frontend_url = v;
    }

    set_parsed(&mut settings.min_speed, var("APP__MIN_SPEED"));
    set_parsed(&mut settings.max_speed, var("APP__MAX_SPEED"));
    set_parsed(
        &mut settings.frame_relay_capacity,
        var("APP__FRAME_RELAY_CAPACITY"),
    );
    set_parsed(&mut settings.outbox_capacity, var("APP__OUTBOX_CAPACITY"));
    set_parsed(&mut settings.max_frame_bytes, var("APP__MAX_FRAME_BYTES"));
}

fn set_parsed<T: FromStr>(slot: &mut T, raw: Option<String>) {
    if let Some(parsed) = raw.and_then(|v| v.trim().parse::<T>().ok()) {
        *slot = parsed;
    }
}

/// Checks the values that cannot be fixed up silently.
pub fn validate_settings(settings: &Settings) -> anyhow::Result<()> {
    if !settings.min_speed.is_finite() || !settings.max_speed.is_finite() {
        bail!("speed limits must be finite numbers");
    }
    if settings.min_speed > settings.max_speed {
        bail!(
            "min_speed ({}) must not exceed max_speed ({})",
            settings.min_speed,
            settings.max_speed
        );
    }
    if settings.frame_relay_capacity == 0 || settings.outbox_capacity == 0 {
        bail!("channel capacities must be greater than zero");
    }
    Ok(())
}

/// Turns the configured frontend URL into the exact `Origin` header value
/// browsers will send: scheme, host and non-default port, no path.
pub fn allowed_origin(frontend_url: &str) -> anyhow::Result<HeaderValue> {
    let url = Url::parse(frontend_url.trim())
        .with_context(|| format!("frontend url '{frontend_url}' is not a valid URL"))?;
    if !url.has_host() {
        bail!("frontend url '{frontend_url}' has no host");
    }
    let origin = url.origin().ascii_serialization();
    HeaderValue::from_str(&origin)
        .with_context(|| format!("origin '{origin}' is not a valid header value"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

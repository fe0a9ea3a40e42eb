//! Configuration management
//!
//! Settings live in `settings.json` in the data directory:
//! ```json
//! {
//!   "app": { "listOrder": "newest", "categories": ["food", ...], "appName": "money-log" }
//! }
//! ```
//! Keys this crate does not manage are kept intact when saving.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::ports::ListOrder;

/// Default category vocabulary offered by the CLI
pub const DEFAULT_CATEGORIES: &[&str] = &["food", "transport", "shopping", "medical", "other", "income"];

/// Default name used in backup file names
pub const DEFAULT_APP_NAME: &str = "money-log";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    list_order: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    app_name: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Parse a list order setting (`newest` / `oldest`)
pub fn parse_list_order(value: &str) -> Option<ListOrder> {
    match value.trim().to_lowercase().as_str() {
        "newest" | "newest-first" | "desc" => Some(ListOrder::Newest),
        "oldest" | "oldest-first" | "asc" => Some(ListOrder::Oldest),
        _ => None,
    }
}

fn list_order_name(order: ListOrder) -> &'static str {
    match order {
        ListOrder::Newest => "newest",
        ListOrder::Oldest => "oldest",
    }
}

/// Money log configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    /// Default order for listing records
    pub list_order: ListOrder,
    /// Category vocabulary offered when adding records
    pub categories: Vec<String>,
    /// Prefix for backup file names
    pub app_name: String,
    /// Set when `list_order` came from MONEYLOG_LIST_ORDER; such a value is never saved
    list_order_from_env: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            list_order: ListOrder::Newest,
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            app_name: DEFAULT_APP_NAME.to_string(),
            list_order_from_env: false,
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// The list order can be overridden with the MONEYLOG_LIST_ORDER
    /// environment variable.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(data_dir)?;
        let env_order = std::env::var("MONEYLOG_LIST_ORDER").ok();
        Ok(Self::from_settings(raw, env_order.as_deref()))
    }

    fn from_settings(raw: SettingsFile, env_order: Option<&str>) -> Self {
        let defaults = Self::default();

        let env_order = env_order.and_then(parse_list_order);
        let list_order = env_order
            .or_else(|| raw.app.list_order.as_deref().and_then(parse_list_order))
            .unwrap_or(defaults.list_order);

        let categories = raw
            .app
            .categories
            .map(|cats| {
                cats.into_iter()
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|cats| !cats.is_empty())
            .unwrap_or(defaults.categories);

        let app_name = raw
            .app
            .app_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(defaults.app_name);

        Self {
            list_order,
            categories,
            app_name,
            list_order_from_env: env_order.is_some(),
        }
    }

    /// Save config to the data directory
    /// Preserves other settings that this crate doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let mut settings = read_settings(data_dir)?;

        if !self.list_order_from_env {
            settings.app.list_order = Some(list_order_name(self.list_order).to_string());
        }
        settings.app.categories = Some(self.categories.clone());
        settings.app.app_name = Some(self.app_name.clone());

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(data_dir.join("settings.json"), content)?;
        Ok(())
    }

    /// Whether a category belongs to the configured vocabulary
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Add a category to the vocabulary
    ///
    /// Returns false when it is already present.
    pub fn add_category(&mut self, category: &str) -> Result<bool> {
        let category = category.trim();
        if category.is_empty() {
            bail!("Category name must not be empty");
        }
        if self.has_category(category) {
            return Ok(false);
        }
        self.categories.push(category.to_string());
        Ok(true)
    }

    /// Remove a category from the vocabulary
    ///
    /// Existing records keep their category; only new input is restricted.
    pub fn remove_category(&mut self, category: &str) -> Result<()> {
        let category = category.trim();
        if !self.has_category(category) {
            bail!("Unknown category '{}'", category);
        }
        if self.categories.len() == 1 {
            bail!("Cannot remove the last category");
        }
        self.categories.retain(|c| c != category);
        Ok(())
    }

    /// Category used when the user gives none
    pub fn default_category(&self, income: bool) -> String {
        if income && self.has_category("income") {
            return "income".to_string();
        }
        self.categories
            .iter()
            .find(|c| c.as_str() != "income")
            .or_else(|| self.categories.first())
            .cloned()
            .unwrap_or_else(|| "other".to_string())
    }
}

/// A malformed settings file falls back to defaults rather than failing
fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
    let settings_path = data_dir.join("settings.json");
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)?;
    Ok(serde_json::from_str(&content).unwrap_or_default())
}

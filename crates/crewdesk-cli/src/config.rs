// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use crewdesk_app::{CompanyInfo, DEFAULT_SERVICE_TYPES, LeadStatus, ServiceCatalog, Settings};
use crewdesk_tui::UiOptions;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_VERSION: i64 = 1;
const APP_NAME: &str = "crewdesk";
const DEFAULT_PAGE_SIZE: usize = 10;
const DEFAULT_RECENT_LEADS_PAGE_SIZE: usize = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub import: Import,
    #[serde(default)]
    pub company: Company,
    #[serde(default)]
    pub services: Services,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            ui: Ui::default(),
            import: Import::default(),
            company: Company::default(),
            services: Services::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub show_dashboard: Option<bool>,
    pub page_size: Option<i64>,
    pub recent_leads_page_size: Option<i64>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            show_dashboard: Some(true),
            page_size: Some(DEFAULT_PAGE_SIZE as i64),
            recent_leads_page_size: Some(DEFAULT_RECENT_LEADS_PAGE_SIZE as i64),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Import {
    pub default_status: Option<String>,
}

/// Unset fields fall back to the built-in company profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Company {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Services {
    pub types: Option<Vec<String>>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("CREWDESK_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set CREWDESK_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and keep values under [ui], [import], [company], and [services]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Regenerate it with --print-example-config",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        for (key, value) in [
            ("ui.page_size", self.ui.page_size),
            ("ui.recent_leads_page_size", self.ui.recent_leads_page_size),
        ] {
            if let Some(size) = value
                && size <= 0
            {
                bail!(
                    "{key} in {} must be positive, got {size}",
                    path.display()
                );
            }
        }

        if let Some(status) = &self.import.default_status
            && LeadStatus::parse(status).is_none()
        {
            let known = LeadStatus::ALL.map(LeadStatus::as_str).join(", ");
            bail!(
                "import.default_status {status:?} in {} is not a lead status; use one of: {known}",
                path.display()
            );
        }

        if let Some(types) = &self.services.types
            && let Some(index) = types.iter().position(|name| name.trim().is_empty())
        {
            bail!(
                "services.types[{index}] in {} is empty -- remove it or give it a name",
                path.display()
            );
        }

        Ok(())
    }

    pub fn show_dashboard(&self) -> bool {
        self.ui.show_dashboard.unwrap_or(true)
    }

    pub fn ui_options(&self) -> UiOptions {
        let size = |value: Option<i64>, default: usize| {
            value
                .and_then(|size| usize::try_from(size).ok())
                .filter(|size| *size > 0)
                .unwrap_or(default)
        };
        UiOptions {
            page_size: size(self.ui.page_size, DEFAULT_PAGE_SIZE),
            recent_leads_page_size: size(
                self.ui.recent_leads_page_size,
                DEFAULT_RECENT_LEADS_PAGE_SIZE,
            ),
        }
    }

    pub fn default_status(&self) -> LeadStatus {
        self.import
            .default_status
            .as_deref()
            .and_then(LeadStatus::parse)
            .unwrap_or(LeadStatus::New)
    }

    pub fn settings(&self) -> Settings {
        let defaults = CompanyInfo::default();
        let company = &self.company;
        let pick = |value: &Option<String>, fallback: String| value.clone().unwrap_or(fallback);
        let services = match &self.services.types {
            Some(types) => ServiceCatalog::new(types),
            None => ServiceCatalog::default(),
        };
        Settings {
            company: CompanyInfo {
                name: pick(&company.name, defaults.name),
                phone: pick(&company.phone, defaults.phone),
                email: pick(&company.email, defaults.email),
                address: pick(&company.address, defaults.address),
            },
            services,
        }
    }

    pub fn example_config(path: &Path) -> String {
        let company = CompanyInfo::default();
        let services = DEFAULT_SERVICE_TYPES
            .iter()
            .map(|name| format!("  \"{name}\","))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "# crewdesk config\n# Place this file at: {}\n\nversion = 1\n\n[ui]\nshow_dashboard = true\npage_size = {DEFAULT_PAGE_SIZE}\nrecent_leads_page_size = {DEFAULT_RECENT_LEADS_PAGE_SIZE}\n\n[import]\n# One of: new, contacted, scheduled, completed, follow-up\ndefault_status = \"new\"\n\n[company]\nname = \"{}\"\nphone = \"{}\"\nemail = \"{}\"\naddress = \"{}\"\n\n[services]\ntypes = [\n{services}\n]\n",
            path.display(),
            company.name,
            company.phone,
            company.email,
            company.address,
        )
    }
}

// Run settings (padconv.toml)

use std::fs;
use std::path::{Path, PathBuf};

use padconv_io::{EntityRules, SourceEncoding, WriterKind};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const FILE_NAME: &str = "padconv.toml";

/// Reporting period selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, ConfigError> {
        if !(1..=12).contains(&month) {
            return Err(ConfigError::Invalid(format!("month {month} must be between 1 and 12")));
        }
        if !(1900..=9999).contains(&year) {
            return Err(ConfigError::Invalid(format!("year {year} must have four digits")));
        }
        Ok(Self { year, month })
    }

    /// Substitute `{year}` and `{month}` (zero-padded) in a path template.
    pub fn expand(&self, template: &str) -> String {
        template
            .replace("{year}", &self.year.to_string())
            .replace("{month}", &format!("{:02}", self.month))
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// One directory per originating branch, as path templates.
    pub sources: Vec<String>,
    pub encoding: SourceEncoding,
    /// Kinds to decode. Empty means every registered kind.
    pub kinds: Vec<String>,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            encoding: SourceEncoding::Utf8,
            kinds: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub dir: String,
    /// Writers run in this order.
    pub writers: Vec<WriterKind>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: "output/{year}-{month}".to_string(),
            writers: vec![WriterKind::Csv],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub dir: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: "cache".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaSettings {
    /// Extra `*.toml` schema files; same kind name replaces the built-in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub input: InputSettings,
    pub output: OutputSettings,
    pub cache: CacheSettings,
    pub entities: EntityRules,
    pub schemas: SchemaSettings,
    /// Directory relative paths resolve against (the settings file's directory).
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Settings {
    /// `./padconv.toml` when present, else the per-user config directory.
    pub fn default_path() -> PathBuf {
        let local = PathBuf::from(FILE_NAME);
        if local.exists() {
            return local;
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("padconv")
            .join(FILE_NAME)
    }

    /// Read, parse and validate a settings file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut settings = Self::from_toml(&contents, &path.display().to_string())?;
        settings.base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        log::debug!("settings loaded from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(input: &str, source: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(input).map_err(|e| ConfigError::Parse {
            source: source.to_string(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.sources.is_empty() {
            return Err(ConfigError::Invalid("input.sources must list at least one directory".into()));
        }

        let mut templates: Vec<(&str, &str)> = self
            .input
            .sources
            .iter()
            .map(|s| ("input.sources", s.as_str()))
            .collect();
        templates.push(("output.dir", self.output.dir.as_str()));
        templates.push(("cache.dir", self.cache.dir.as_str()));
        for (field, template) in templates {
            check_template(field, template)?;
        }

        let tax_id = &self.entities.legislative_tax_id;
        if tax_id.chars().count() != 14 || !tax_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::Invalid(format!(
                "entities.legislative_tax_id '{tax_id}' must be 14 digits"
            )));
        }

        if self.output.writers.is_empty() {
            log::warn!("output.writers is empty; tables will only reach the cache");
        }
        Ok(())
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            path
        } else {
            self.base_dir.join(path)
        }
    }

    /// Source directories for `period`, in configured order.
    pub fn sources(&self, period: Period) -> Vec<PathBuf> {
        self.input
            .sources
            .iter()
            .map(|t| self.resolve(&period.expand(t)))
            .collect()
    }

    pub fn output_dir(&self, period: Period) -> PathBuf {
        self.resolve(&period.expand(&self.output.dir))
    }

    pub fn cache_dir(&self, period: Period) -> PathBuf {
        self.resolve(&period.expand(&self.cache.dir))
    }

    pub fn schema_dir(&self) -> Option<PathBuf> {
        self.schemas.dir.as_deref().map(|d| self.resolve(d))
    }
}

/// Only `{year}` and `{month}` placeholders are understood.
fn check_template(field: &str, template: &str) -> Result<(), ConfigError> {
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| {
            ConfigError::Invalid(format!("{field}: unclosed placeholder in '{template}'"))
        })?;
        let name = &after[..close];
        if name != "year" && name != "month" {
            return Err(ConfigError::Invalid(format!(
                "{field}: unknown placeholder '{{{name}}}' in '{template}'"
            )));
        }
        rest = &after[close + 1..];
    }
    Ok(())
}

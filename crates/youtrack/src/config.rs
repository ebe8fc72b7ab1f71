//! Configuration loading with layered precedence.
//!
//! Settings are resolved from three layers, highest priority first:
//!
//! 1. Command-line flags (`--url`, `--token`, `--project`, `--config`)
//! 2. Environment variables (`YOUTRACK_URL`, `YOUTRACK_TOKEN`, ...)
//! 3. The YAML config file (`<config dir>/youtrack/config.yaml` by default)
//!
//! Empty strings count as unset at every layer, so `YOUTRACK_TOKEN=` does not
//! shadow a token stored in the config file.
//!
//! # Example
//!
//! ```no_run
//! use youtrack::config::{Overrides, Settings};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load(&Overrides::default()).await?;
//!     println!("Using {}", settings.base_url);
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Environment variable holding the server URL.
pub const ENV_URL: &str = "YOUTRACK_URL";

/// Environment variable holding the permanent token.
pub const ENV_TOKEN: &str = "YOUTRACK_TOKEN";

/// Environment variable holding the default project.
pub const ENV_PROJECT: &str = "YOUTRACK_PROJECT";

/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT: &str = "YOUTRACK_TIMEOUT";

/// Environment variable overriding the config file location.
pub const ENV_CONFIG: &str = "YOUTRACK_CONFIG";

/// Directory under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "youtrack";

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Request timeout used when no layer sets one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// On-disk configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigFile {
    /// Server URL, e.g. `https://example.youtrack.cloud`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Permanent token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Project used when a command does not name one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_project: Option<String>,

    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, or `Error::Config`
    /// if it is not valid YAML.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Save configuration to a file, creating parent directories.
    ///
    /// The file holds a credential, so on Unix it is written with mode 0600.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem operation fails.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        // `mode` only applies when the file is created.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        Ok(())
    }
}

/// Values supplied on the command line (the highest-priority layer).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--url`
    pub url: Option<String>,
    /// `--token`
    pub token: Option<String>,
    /// `--project`
    pub project: Option<String>,
    /// `--config`
    pub config: Option<PathBuf>,
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Command-line flag
    Flag,
    /// Environment variable
    Env,
    /// Config file
    File,
    /// Built-in default
    Default,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag => write!(f, "flag"),
            Self::Env => write!(f, "env"),
            Self::File => write!(f, "file"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// A value together with the layer that supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sourced<T> {
    /// The resolved value
    pub value: T,
    /// Layer it came from
    pub source: Source,
}

/// All layers merged, before required values are enforced.
///
/// `config show` prints this directly so that a half-configured setup can
/// still be inspected.
#[derive(Debug, Clone)]
pub struct Layered {
    /// Server URL, normalized
    pub url: Option<Sourced<String>>,
    /// Permanent token
    pub token: Option<Sourced<String>>,
    /// Default project
    pub project: Option<Sourced<String>>,
    /// Timeout in seconds
    pub timeout_secs: Sourced<u64>,
    /// Config file consulted
    pub config_path: PathBuf,
    /// Whether that file existed
    pub config_found: bool,
}

/// Fully resolved settings needed to talk to the server.
#[derive(Clone)]
pub struct Settings {
    /// Server root URL without trailing slash or `/api`
    pub base_url: String,
    /// Permanent token used as bearer credential
    pub token: String,
    /// Project used when a command does not name one
    pub default_project: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("base_url", &self.base_url)
            .field("token", &mask_token(&self.token))
            .field("default_project", &self.default_project)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Settings {
    /// Resolve settings from flags, the process environment and the config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when the URL or token is missing or invalid,
    /// or when an explicitly named config file cannot be read.
    pub async fn load(overrides: &Overrides) -> Result<Self> {
        Layered::load(overrides).await?.into_settings()
    }

    /// Resolve settings with an explicit environment lookup (for tests).
    ///
    /// # Errors
    ///
    /// Same as [`Settings::load`].
    pub async fn resolve<F>(overrides: &Overrides, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Layered::resolve(overrides, env).await?.into_settings()
    }
}

impl Layered {
    /// Merge all layers using the process environment.
    ///
    /// # Errors
    ///
    /// See [`Layered::resolve`].
    pub async fn load(overrides: &Overrides) -> Result<Self> {
        Self::resolve(overrides, |key| std::env::var(key).ok()).await
    }

    /// Merge all layers using the given environment lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named config file is missing or
    /// unreadable, if any layer holds an invalid URL, or if the timeout
    /// variable is not a positive integer.
    pub async fn resolve<F>(overrides: &Overrides, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| non_empty(env(key));
        let (config_path, explicit) = locate_config(overrides, &env)?;

        let (file, config_found) = match fs::try_exists(&config_path).await {
            Ok(true) => (ConfigFile::load(&config_path).await?, true),
            Ok(false) if explicit => {
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    config_path.display()
                )));
            }
            Ok(false) => (ConfigFile::default(), false),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %config_path.display(), found = config_found, "Config file");

        let url = pick(overrides.url.clone(), env(ENV_URL), file.url.clone())
            .map(|s| {
                Ok::<_, Error>(Sourced {
                    value: normalize_base_url(&s.value)?,
                    source: s.source,
                })
            })
            .transpose()?;
        let token = pick(overrides.token.clone(), env(ENV_TOKEN), file.token.clone());
        let project = pick(
            overrides.project.clone(),
            env(ENV_PROJECT),
            file.default_project.clone(),
        );

        let timeout_secs = match env(ENV_TIMEOUT) {
            Some(raw) => Sourced {
                value: parse_timeout(&raw)?,
                source: Source::Env,
            },
            None => match file.timeout_secs.filter(|t| *t > 0) {
                Some(value) => Sourced {
                    value,
                    source: Source::File,
                },
                None => Sourced {
                    value: DEFAULT_TIMEOUT_SECS,
                    source: Source::Default,
                },
            },
        };

        Ok(Self {
            url,
            token,
            project,
            timeout_secs,
            config_path,
            config_found,
        })
    }

    /// Enforce required values.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming every way to supply a missing value.
    pub fn into_settings(self) -> Result<Settings> {
        let base_url = self.url.map(|s| s.value).ok_or_else(|| {
            Error::Config(format!(
                "YouTrack URL is not set. Use --url, {ENV_URL}, or 'url' in {}",
                self.config_path.display()
            ))
        })?;
        let token = self.token.map(|s| s.value).ok_or_else(|| {
            Error::Config(format!(
                "YouTrack token is not set. Use --token, {ENV_TOKEN}, or 'token' in {}",
                self.config_path.display()
            ))
        })?;

        Ok(Settings {
            base_url,
            token,
            default_project: self.project.map(|s| s.value),
            timeout: Duration::from_secs(self.timeout_secs.value),
        })
    }
}

/// Default config file location: `<config dir>/youtrack/config.yaml`.
///
/// # Errors
///
/// Returns `Error::Config` if the platform has no config directory.
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or_else(|| Error::Config("cannot determine the user config directory".to_string()))
}

/// Config file selected by `--config`, then `YOUTRACK_CONFIG`, then the default.
///
/// # Errors
///
/// Returns `Error::Config` if the default location is needed but unknown.
pub fn config_file_path(overrides: &Overrides) -> Result<PathBuf> {
    locate_config(overrides, |key| non_empty(std::env::var(key).ok())).map(|(path, _)| path)
}

/// Returns the path and whether it was named explicitly.
fn locate_config<F>(overrides: &Overrides, env: F) -> Result<(PathBuf, bool)>
where
    F: Fn(&str) -> Option<String>,
{
    match (&overrides.config, env(ENV_CONFIG)) {
        (Some(path), _) => Ok((path.clone(), true)),
        (None, Some(path)) => Ok((PathBuf::from(path), true)),
        (None, None) => Ok((default_config_path()?, false)),
    }
}

/// Validate and normalize a server URL.
///
/// Accepts `http` and `https` only, and strips a trailing `/` and `/api` so
/// both `https://host` and `https://host/api/` address the same server.
///
/// # Errors
///
/// Returns `Error::Config` for unparsable URLs or other schemes.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let mut parsed = Url::parse(raw.trim())
        .map_err(|e| Error::Config(format!("invalid YouTrack URL '{raw}': {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "invalid YouTrack URL '{raw}': scheme must be http or https"
        )));
    }

    let mut segments: Vec<String> = parsed
        .path_segments()
        .map(|s| s.map(str::to_string).collect())
        .unwrap_or_default();
    if segments.last().is_some_and(String::is_empty) {
        segments.pop();
    }
    if segments.last().is_some_and(|s| s == "api") {
        segments.pop();
    }
    parsed.set_path(&segments.join("/"));
    parsed.set_query(None);
    parsed.set_fragment(None);

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

/// Hide all but the last four characters of a token.
pub fn mask_token(token: &str) -> String {
    let count = token.chars().count();
    if count <= 4 {
        return "****".to_string();
    }
    let tail: String = token.chars().skip(count - 4).collect();
    format!("****{tail}")
}

fn parse_timeout(raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(Error::Config(format!(
            "{ENV_TIMEOUT} must be a positive number of seconds, got '{raw}'"
        ))),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn pick(flag: Option<String>, env: Option<String>, file: Option<String>) -> Option<Sourced<String>> {
    let layers = [
        (non_empty(flag), Source::Flag),
        (env, Source::Env),
        (non_empty(file), Source::File),
    ];
    layers.into_iter().find_map(|(value, source)| {
        value.map(|v| Sourced {
            value: v.trim().to_string(),
            source,
        })
    })
}

//! Configuration management for wikimirror.
//!
//! Parses `wikimirror.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `confluence.base_url`
//! - `confluence.username`
//! - `confluence.password`
//! - `export.root_page_id`

mod expand;

use serde::Deserialize;
use wm_export::{
    DEFAULT_ATTACHMENT_PAGE_SIZE, DEFAULT_CHILD_PAGE_SIZE, DEFAULT_CHILDREN_TITLE,
    DEFAULT_INDEX_NAME, children_file_name,
};
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override Confluence base URL.
    pub base_url: Option<String>,
    /// Override Confluence username.
    pub username: Option<String>,
    /// Override Confluence password.
    pub password: Option<String>,
    /// Override TLS certificate verification.
    pub verify_ssl: Option<bool>,
    /// Override export root page.
    pub root_page_id: Option<String>,
    /// Override export output directory.
    pub output_dir: Option<PathBuf>,
    /// Override per-page content file name.
    pub index_name: Option<String>,
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override served directory.
    pub serve_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "wikimirror.toml";

/// Default output directory, relative to the config file.
const DEFAULT_OUTPUT_DIR: &str = "wiki";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Export configuration (paths are relative strings from TOML).
    export: ExportConfigRaw,
    /// Confluence configuration.
    pub confluence: Option<ConfluenceConfig>,

    /// Resolved export configuration (set after loading).
    #[serde(skip)]
    pub export_resolved: ExportConfig,
    /// Resolved directory served by `serve` (set after loading).
    #[serde(skip)]
    pub serve_dir: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Directory to serve (defaults to the export output directory).
    dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8000,
            dir: None,
        }
    }
}

/// Raw export configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ExportConfigRaw {
    root_page_id: Option<String>,
    output_dir: Option<String>,
    index_name: Option<String>,
    children_title: Option<String>,
    page_size: Option<usize>,
    attachment_page_size: Option<usize>,
    strict_attachments: Option<bool>,
}

/// Resolved export configuration with absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Page to export together with its descendants.
    pub root_page_id: Option<String>,
    /// Directory receiving the Markdown tree.
    pub output_dir: PathBuf,
    /// Content file name inside each page directory.
    pub index_name: String,
    /// Heading of the per-page child index.
    pub children_title: String,
    /// Child pages requested per listing call.
    pub page_size: usize,
    /// Attachments requested per listing call.
    pub attachment_page_size: usize,
    /// Abort on the first attachment failure.
    pub strict_attachments: bool,
}

impl ExportConfig {
    fn with_base(base: &Path) -> Self {
        Self {
            root_page_id: None,
            output_dir: base.join(DEFAULT_OUTPUT_DIR),
            index_name: DEFAULT_INDEX_NAME.to_owned(),
            children_title: DEFAULT_CHILDREN_TITLE.to_owned(),
            page_size: DEFAULT_CHILD_PAGE_SIZE,
            attachment_page_size: DEFAULT_ATTACHMENT_PAGE_SIZE,
            strict_attachments: false,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::with_base(Path::new("."))
    }
}

/// Confluence configuration.
///
/// Credentials are optional in the file so they can come from the command
/// line instead; [`Config::require_confluence`] checks the final values.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfluenceConfig {
    /// Confluence server base URL.
    pub base_url: String,
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Password or personal access token.
    #[serde(default)]
    pub password: String,
    /// Verify server TLS certificates.
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ConfluenceConfig {
    /// Create a config with default TLS and timeout settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: String::new(),
            password: String::new(),
            verify_ssl: default_verify_ssl(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Validate Confluence configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "confluence.base_url")?;
        require_http_url(&self.base_url, "confluence.base_url")?;
        require_non_empty(&self.username, "confluence.username")?;
        require_non_empty(&self.password, "confluence.password")?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "confluence.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_verify_ssl() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    60
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// IO error reading config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable expansion error.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Field name where the error occurred.
        field: String,
        /// Error message.
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `wikimirror.toml` in current directory and
    /// parents. If no config file is found, returns default configuration.
    ///
    /// CLI settings are applied after loading and validated together with
    /// the file values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if explicit config path doesn't exist.
    /// Returns `ConfigError::Io` if file cannot be read.
    /// Returns `ConfigError::Parse` if TOML is invalid.
    /// Returns `ConfigError::Validation` if the final values are invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(base_url) = &settings.base_url {
            self.confluence
                .get_or_insert_with(|| ConfluenceConfig::new(String::new()))
                .base_url
                .clone_from(base_url);
        }
        if let Some(confluence) = &mut self.confluence {
            if let Some(username) = &settings.username {
                confluence.username.clone_from(username);
            }
            if let Some(password) = &settings.password {
                confluence.password.clone_from(password);
            }
            if let Some(verify_ssl) = settings.verify_ssl {
                confluence.verify_ssl = verify_ssl;
            }
        }
        if let Some(root_page_id) = &settings.root_page_id {
            self.export_resolved.root_page_id = Some(root_page_id.clone());
        }
        if let Some(output_dir) = &settings.output_dir {
            // The served directory follows the output unless set explicitly.
            if self.server.dir.is_none() {
                self.serve_dir.clone_from(output_dir);
            }
            self.export_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(index_name) = &settings.index_name {
            self.export_resolved.index_name.clone_from(index_name);
        }
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(serve_dir) = &settings.serve_dir {
            self.serve_dir.clone_from(serve_dir);
        }
    }

    /// Get validated Confluence configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the `[confluence]` section is
    /// missing (and no base URL was given on the command line) or invalid.
    pub fn require_confluence(&self) -> Result<&ConfluenceConfig, ConfigError> {
        let conf = self.confluence.as_ref().ok_or_else(|| {
            ConfigError::Validation("[confluence] section or --url required".into())
        })?;
        conf.validate()?;
        Ok(conf)
    }

    /// Get the export root page ID.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if neither the config file nor the
    /// command line names a root page.
    pub fn require_root_page_id(&self) -> Result<&str, ConfigError> {
        match self.export_resolved.root_page_id.as_deref() {
            Some(id) if !id.trim().is_empty() => Ok(id.trim()),
            _ => Err(ConfigError::Validation(
                "export.root_page_id or --page-id required".into(),
            )),
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        let export_resolved = ExportConfig::with_base(base);
        Self {
            server: ServerConfig::default(),
            export: ExportConfigRaw::default(),
            confluence: None,
            serve_dir: export_resolved.output_dir.clone(),
            export_resolved,
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Confluence credentials are checked separately by
    /// [`Config::require_confluence`], since only `export` needs them.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_export()?;
        if let Some(confluence) = &self.confluence {
            require_http_url(&confluence.base_url, "confluence.base_url")?;
        }
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_export(&self) -> Result<(), ConfigError> {
        let export = &self.export_resolved;

        require_non_empty(&export.index_name, "export.index_name")?;
        if export.index_name.contains(['/', '\\'])
            || matches!(export.index_name.as_str(), "." | "..")
        {
            return Err(ConfigError::Validation(
                "export.index_name must be a plain file name".to_owned(),
            ));
        }
        if export.index_name == children_file_name(&export.index_name) {
            return Err(ConfigError::Validation(format!(
                "export.index_name '{}' is reserved for the child page index",
                export.index_name
            )));
        }
        if export.page_size == 0 {
            return Err(ConfigError::Validation(
                "export.page_size must be greater than 0".to_owned(),
            ));
        }
        if export.attachment_page_size == 0 {
            return Err(ConfigError::Validation(
                "export.attachment_page_size must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variables in config string fields.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        expand::expand_opt(&mut self.export.root_page_id, "export.root_page_id")?;

        if let Some(ref mut confluence) = self.confluence {
            confluence.base_url = expand::expand_env(&confluence.base_url, "confluence.base_url")?;
            confluence.username = expand::expand_env(&confluence.username, "confluence.username")?;
            confluence.password = expand::expand_env(&confluence.password, "confluence.password")?;
        }

        Ok(())
    }

    /// Resolve relative paths against the config file directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = ExportConfig::with_base(config_dir);
        let raw = &self.export;

        self.export_resolved = ExportConfig {
            root_page_id: raw.root_page_id.clone(),
            output_dir: raw
                .output_dir
                .as_deref()
                .map_or(defaults.output_dir, |dir| config_dir.join(dir)),
            index_name: raw.index_name.clone().unwrap_or(defaults.index_name),
            children_title: raw.children_title.clone().unwrap_or(defaults.children_title),
            page_size: raw.page_size.unwrap_or(defaults.page_size),
            attachment_page_size: raw
                .attachment_page_size
                .unwrap_or(defaults.attachment_page_size),
            strict_attachments: raw.strict_attachments.unwrap_or(defaults.strict_attachments),
        };

        self.serve_dir = match &self.server.dir {
            Some(dir) => config_dir.join(dir),
            None => self.export_resolved.output_dir.clone(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.export_resolved.output_dir, PathBuf::from("/test/wiki"));
        assert_eq!(config.export_resolved.index_name, "index.md");
        assert_eq!(config.export_resolved.children_title, "Subpages");
        assert_eq!(config.export_resolved.page_size, 50);
        assert_eq!(config.export_resolved.attachment_page_size, 100);
        assert!(!config.export_resolved.strict_attachments);
        assert_eq!(config.serve_dir, PathBuf::from("/test/wiki"));
        assert!(config.confluence.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = "";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_parse_server_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 9000
dir = "site"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.serve_dir, PathBuf::from("/project/site"));
    }

    #[test]
    fn test_parse_confluence_config() {
        let toml = r#"
[confluence]
base_url = "https://confluence.example.com"
username = "reader"
password = "secret"
verify_ssl = false
timeout_secs = 15
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let confluence = config.confluence.unwrap();
        assert_eq!(confluence.base_url, "https://confluence.example.com");
        assert_eq!(confluence.username, "reader");
        assert_eq!(confluence.password, "secret");
        assert!(!confluence.verify_ssl);
        assert_eq!(confluence.timeout_secs, 15);
    }

    #[test]
    fn test_parse_confluence_config_defaults() {
        let toml = r#"
[confluence]
base_url = "https://confluence.example.com"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let confluence = config.confluence.unwrap();
        assert!(confluence.verify_ssl);
        assert_eq!(confluence.timeout_secs, 60);
        assert!(confluence.username.is_empty());
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[export]
root_page_id = "12345"
output_dir = "out/docs"
index_name = "README.md"
children_title = "Contents"
page_size = 25
attachment_page_size = 10
strict_attachments = true
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.export_resolved,
            ExportConfig {
                root_page_id: Some("12345".to_owned()),
                output_dir: PathBuf::from("/project/out/docs"),
                index_name: "README.md".to_owned(),
                children_title: "Contents".to_owned(),
                page_size: 25,
                attachment_page_size: 10,
                strict_attachments: true,
            }
        );
        assert_eq!(config.serve_dir, PathBuf::from("/project/out/docs"));
    }

    #[test]
    fn test_resolve_paths_keeps_absolute_output_dir() {
        let toml = r#"
[export]
output_dir = "/srv/wiki"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.export_resolved.output_dir, PathBuf::from("/srv/wiki"));
    }

    #[test]
    fn test_apply_cli_settings_host() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            host: Some("0.0.0.0".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_port() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            port: Some(9000),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1"); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_url_creates_confluence_section() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            base_url: Some("https://wiki.example.com".to_owned()),
            username: Some("reader".to_owned()),
            password: Some("secret".to_owned()),
            verify_ssl: Some(false),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        let confluence = config.require_confluence().unwrap();
        assert_eq!(confluence.base_url, "https://wiki.example.com");
        assert_eq!(confluence.username, "reader");
        assert_eq!(confluence.password, "secret");
        assert!(!confluence.verify_ssl);
        assert_eq!(confluence.timeout_secs, 60);
    }

    #[test]
    fn test_apply_cli_settings_credentials_override_file() {
        let toml = r#"
[confluence]
base_url = "https://confluence.example.com"
username = "file-user"
password = "file-pass"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let overrides = CliSettings {
            password: Some("cli-pass".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        let confluence = config.confluence.unwrap();
        assert_eq!(confluence.base_url, "https://confluence.example.com");
        assert_eq!(confluence.username, "file-user");
        assert_eq!(confluence.password, "cli-pass");
    }

    #[test]
    fn test_apply_cli_settings_output_dir_moves_serve_dir() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            output_dir: Some(PathBuf::from("/tmp/mirror")),
            index_name: Some("README.md".to_owned()),
            root_page_id: Some("42".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.export_resolved.output_dir, PathBuf::from("/tmp/mirror"));
        assert_eq!(config.export_resolved.index_name, "README.md");
        assert_eq!(config.serve_dir, PathBuf::from("/tmp/mirror"));
        assert_eq!(config.require_root_page_id().unwrap(), "42");
    }

    #[test]
    fn test_apply_cli_settings_output_dir_keeps_explicit_serve_dir() {
        let toml = r#"
[server]
dir = "public"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));
        let overrides = CliSettings {
            output_dir: Some(PathBuf::from("/tmp/mirror")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.serve_dir, PathBuf::from("/project/public"));
    }

    #[test]
    fn test_apply_cli_settings_serve_dir() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            serve_dir: Some(PathBuf::from("/var/www/wiki")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.serve_dir, PathBuf::from("/var/www/wiki"));
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings::default();

        config.apply_cli_settings(&overrides);

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert!(config.confluence.is_none());
        assert!(config.export_resolved.root_page_id.is_none());
    }

    #[test]
    fn test_load_explicit_path_not_found() {
        let result = Config::load(Some(Path::new("/nonexistent/wikimirror.toml")), None);

        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_expand_env_vars_server_host() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("WM_TEST_HOST", "0.0.0.0");
        }
        let toml = r#"
[server]
host = "${WM_TEST_HOST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        unsafe {
            std::env::remove_var("WM_TEST_HOST");
        }
    }

    #[test]
    fn test_expand_env_vars_confluence() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("WM_TEST_CONFLUENCE_URL", "https://confluence.test.com");
            std::env::set_var("WM_TEST_PASSWORD", "my-secret");
        }
        let toml = r#"
[confluence]
base_url = "${WM_TEST_CONFLUENCE_URL}"
username = "${WM_TEST_USER_UNSET:-reader}"
password = "${WM_TEST_PASSWORD}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        let confluence = config.confluence.unwrap();
        assert_eq!(confluence.base_url, "https://confluence.test.com");
        assert_eq!(confluence.username, "reader");
        assert_eq!(confluence.password, "my-secret");
        unsafe {
            std::env::remove_var("WM_TEST_CONFLUENCE_URL");
            std::env::remove_var("WM_TEST_PASSWORD");
        }
    }

    #[test]
    fn test_expand_env_vars_root_page_id() {
        let toml = r#"
[export]
root_page_id = "${WM_TEST_ROOT_UNSET:-777}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.require_root_page_id().unwrap(), "777");
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("WM_MISSING_VAR_CONFIG_TEST");
        }
        let toml = r#"
[confluence]
base_url = "${WM_MISSING_VAR_CONFIG_TEST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let result = config.expand_env_vars();

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("WM_MISSING_VAR_CONFIG_TEST"));
        assert!(err.to_string().contains("confluence.base_url"));
    }

    #[test]
    fn test_expand_env_vars_literal_unchanged() {
        let toml = r#"
[server]
host = "127.0.0.1"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
    }

    // Validation tests

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    /// Create a valid Confluence config for testing.
    fn valid_confluence_config() -> ConfluenceConfig {
        ConfluenceConfig {
            base_url: "https://confluence.example.com".to_owned(),
            username: "reader".to_owned(),
            password: "secret".to_owned(),
            verify_ssl: true,
            timeout_secs: 60,
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_server_host_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.host = String::new();
        assert_validation_error(&config, &["server.host", "empty"]);
    }

    #[test]
    fn test_validate_server_port_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.port = 0;
        assert_validation_error(&config, &["server.port", "0"]);
    }

    #[test]
    fn test_validate_index_name_with_separator() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.export_resolved.index_name = "pages/index.md".to_owned();
        assert_validation_error(&config, &["export.index_name"]);
    }

    #[test]
    fn test_validate_index_name_clashes_with_child_index() {
        for name in ["children.md", "children.txt"] {
            let mut config = Config::default_with_base(Path::new("/test"));
            config.export_resolved.index_name = name.to_owned();
            assert_validation_error(&config, &["export.index_name", "reserved"]);
        }

        let mut config = Config::default_with_base(Path::new("/test"));
        config.export_resolved.index_name = "children".to_owned();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_index_name_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.export_resolved.index_name = String::new();
        assert_validation_error(&config, &["export.index_name", "empty"]);
    }

    #[test]
    fn test_validate_page_sizes_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.export_resolved.page_size = 0;
        assert_validation_error(&config, &["export.page_size"]);

        let mut config = Config::default_with_base(Path::new("/test"));
        config.export_resolved.attachment_page_size = 0;
        assert_validation_error(&config, &["export.attachment_page_size"]);
    }

    #[test]
    fn test_validate_confluence_url_scheme() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.confluence = Some(ConfluenceConfig {
            base_url: "ftp://confluence.example.com".to_owned(),
            ..valid_confluence_config()
        });
        assert_validation_error(&config, &["confluence.base_url", "http"]);
    }

    #[test]
    fn test_validate_passes_with_confluence_section_without_credentials() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.confluence = Some(ConfluenceConfig::new("https://confluence.example.com"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_confluence_config_validate_valid() {
        assert!(valid_confluence_config().validate().is_ok());
    }

    #[test]
    fn test_confluence_config_validate_empty_password() {
        let config = ConfluenceConfig {
            password: String::new(),
            ..valid_confluence_config()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("confluence.password"));
    }

    #[test]
    fn test_confluence_config_validate_zero_timeout() {
        let config = ConfluenceConfig {
            timeout_secs: 0,
            ..valid_confluence_config()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("confluence.timeout_secs"));
    }

    #[test]
    fn test_require_confluence_missing_section() {
        let config = Config::default_with_base(Path::new("/test"));
        let err = config.require_confluence().unwrap_err();
        assert!(err.to_string().contains("[confluence]"));
    }

    #[test]
    fn test_require_root_page_id_missing() {
        let config = Config::default_with_base(Path::new("/test"));
        let err = config.require_root_page_id().unwrap_err();
        assert!(err.to_string().contains("root_page_id"));
    }

    #[test]
    fn test_load_explicit_file_resolves_relative_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[export]
root_page_id = "42"
output_dir = "mirror"

[server]
dir = "public"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
        assert_eq!(config.export_resolved.output_dir, dir.path().join("mirror"));
        assert_eq!(config.serve_dir, dir.path().join("public"));
        assert_eq!(config.require_root_page_id().unwrap(), "42");
    }

    #[test]
    fn test_load_explicit_file_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}

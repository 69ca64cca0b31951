use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Location of the Claude Desktop file being edited.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ClaudeConfig {
    /// Overrides the platform default. `~/` is expanded against the home directory.
    pub config_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PresetsConfig {
    /// Optional JSON catalog replacing the bundled presets.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecurityConfig {
    pub enable_hsts: Option<bool>,
    pub hsts_max_age: Option<u64>,
    pub hsts_include_subdomains: Option<bool>,
    pub csp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub claude: ClaudeConfig,
    #[serde(default)]
    pub presets: PresetsConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    pub security: Option<SecurityConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        let defaults: &str = include_str!("../config/default.toml");
        match ::config::Config::builder()
            .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(app_cfg) => app_cfg,
                Err(e) => {
                    eprintln!("FATAL: Failed to deserialize default config: {}", e);
                    panic!("Failed to deserialize default config: {}", e);
                }
            },
            Err(e) => {
                eprintln!("FATAL: Failed to parse default config: {}", e);
                panic!("Failed to parse default config: {}", e);
            }
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        // Mirror defaults from config/default.toml
        Self { max_body_bytes: 1024 * 1024 }
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let defaults: &str = include_str!("../config/default.toml");
    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
        // Optional local file: mcp-config-manager.toml (in CWD)
        .add_source(::config::File::with_name("mcp-config-manager").required(false));

    if let Ok(custom_path) = std::env::var("MCPCM_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(::config::Environment::with_prefix("MCPCM").separator("__"));

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

const MAX_BODY_LIMIT: usize = 50 * 1024 * 1024;

pub fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }
    if cfg.server.host.trim().is_empty() {
        return Err(anyhow::anyhow!("server.host must not be empty"));
    }

    if cfg.limits.max_body_bytes == 0 || cfg.limits.max_body_bytes > MAX_BODY_LIMIT {
        return Err(anyhow::anyhow!("limits.max_body_bytes must be in 1..={}", MAX_BODY_LIMIT));
    }

    Ok(())
}

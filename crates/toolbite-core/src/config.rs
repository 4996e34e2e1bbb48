//! Configuration loaded from the environment
//!
//! `Config::from_env` reads a `.env` file when present and falls back to
//! defaults for everything except malformed values.

use anyhow::Result;
use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MAX_IMAGE_UPLOAD_MB: usize = 15;
const DEFAULT_RASTER_DENSITY: u32 = 100;
const DEFAULT_RASTER_WIDTH: u32 = 2048;
const DEFAULT_RASTER_HEIGHT: u32 = 2896;

/// PDF rasterizer implementation, chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterizerBackend {
    Pdftoppm,
    Pdfium,
}

impl FromStr for RasterizerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdftoppm" | "poppler" => Ok(RasterizerBackend::Pdftoppm),
            "pdfium" => Ok(RasterizerBackend::Pdfium),
            _ => Err(anyhow::anyhow!("Invalid rasterizer backend: {}", s)),
        }
    }
}

impl Display for RasterizerBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RasterizerBackend::Pdftoppm => write!(f, "pdftoppm"),
            RasterizerBackend::Pdfium => write!(f, "pdfium"),
        }
    }
}

/// Paths and settings of the external engines.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub rembg_path: String,
    pub rembg_model: Option<String>,
    pub pandoc_path: String,
    pub chromium_path: String,
    pub rasterizer: RasterizerBackend,
    pub pdftoppm_path: String,
    pub pdfium_library_path: Option<PathBuf>,
    pub raster_density: u32,
    pub raster_width: u32,
    pub raster_height: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rembg_path: "rembg".to_string(),
            rembg_model: None,
            pandoc_path: "pandoc".to_string(),
            chromium_path: "chromium".to_string(),
            rasterizer: RasterizerBackend::Pdftoppm,
            pdftoppm_path: "pdftoppm".to_string(),
            pdfium_library_path: None,
            raster_density: DEFAULT_RASTER_DENSITY,
            raster_width: DEFAULT_RASTER_WIDTH,
            raster_height: DEFAULT_RASTER_HEIGHT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// Base directory of the ephemeral store.
    pub temp_dir: PathBuf,
    /// Cap for operations that process the upload in memory.
    pub max_image_upload_bytes: usize,
    pub engines: EngineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            temp_dir: env::temp_dir().join("toolbite"),
            max_image_upload_bytes: DEFAULT_MAX_IMAGE_UPLOAD_MB * 1024 * 1024,
            engines: EngineConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let rasterizer = env::var("RASTERIZER")
            .ok()
            .map(|s| s.parse::<RasterizerBackend>())
            .transpose()?
            .unwrap_or(RasterizerBackend::Pdftoppm);

        let engines = EngineConfig {
            rembg_path: env::var("REMBG_PATH").unwrap_or_else(|_| "rembg".to_string()),
            rembg_model: env::var("REMBG_MODEL").ok().filter(|s| !s.trim().is_empty()),
            pandoc_path: env::var("PANDOC_PATH").unwrap_or_else(|_| "pandoc".to_string()),
            chromium_path: env::var("CHROMIUM_PATH").unwrap_or_else(|_| "chromium".to_string()),
            rasterizer,
            pdftoppm_path: env::var("PDFTOPPM_PATH").unwrap_or_else(|_| "pdftoppm".to_string()),
            pdfium_library_path: env::var("PDFIUM_LIBRARY_PATH").ok().map(PathBuf::from),
            raster_density: env::var("RASTER_DENSITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_RASTER_DENSITY),
            raster_width: env::var("RASTER_WIDTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_RASTER_WIDTH),
            raster_height: env::var("RASTER_HEIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_RASTER_HEIGHT),
        };

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            temp_dir: env::var("TOOLBITE_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir().join("toolbite")),
            max_image_upload_bytes: upload_cap_bytes(
                &env::var("MAX_IMAGE_UPLOAD_MB")
                    .unwrap_or_else(|_| DEFAULT_MAX_IMAGE_UPLOAD_MB.to_string()),
            )?,
            engines,
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS must not contain '*' in production"
            ));
        }

        if self.max_image_upload_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_IMAGE_UPLOAD_MB must be greater than 0"));
        }

        if self.temp_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("TOOLBITE_TEMP_DIR must not be empty"));
        }

        let engines = &self.engines;
        if engines.raster_density == 0 || engines.raster_width == 0 || engines.raster_height == 0
        {
            return Err(anyhow::anyhow!(
                "RASTER_DENSITY, RASTER_WIDTH and RASTER_HEIGHT must be greater than 0"
            ));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.to_lowercase().as_str(), "production" | "prod")
    }
}

/// Parse a megabyte count into bytes, rejecting values that overflow `usize`.
fn upload_cap_bytes(megabytes: &str) -> Result<usize> {
    megabytes
        .trim()
        .parse::<usize>()
        .map_err(|_| anyhow::anyhow!("MAX_IMAGE_UPLOAD_MB must be a valid number"))?
        .checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_IMAGE_UPLOAD_MB is too large: {}", megabytes))
}

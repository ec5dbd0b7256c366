// src/config.rs
use crate::domain::errors::{AppError, AppResult};
use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Toolkit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory layout
    pub data: DataConfig,

    /// Market data configuration
    pub market: MarketConfig,

    /// Advisor API configuration
    pub advisor: AdvisorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Where the flat-file tables live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Per-date stock snapshot CSVs
    pub stock_dir: PathBuf,

    /// Per-date portfolio CSVs
    pub portfolio_dir: PathBuf,

    /// Stored advisor reviews (Weekdays/ and Weekends/ subdirectories)
    pub reviews_dir: PathBuf,

    /// Prompt template files
    pub prompt_dir: PathBuf,
}

/// Market data configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Quote vendor name (e.g., "nse", "yahoo")
    pub vendor: String,

    /// Concurrent per-symbol fetches
    pub fetch_concurrency: usize,

    /// Optional JSON file replacing the built-in symbol universe
    pub universe_file: Option<PathBuf>,
}

/// Advisor API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// OpenAI-compatible endpoint base URL
    pub base_url: String,

    /// API key; only required when actually sending prompts
    pub api_key: Option<String>,

    /// Model name
    pub model: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,

    /// Log to file
    pub to_file: bool,

    /// Log file path
    pub file_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let data = DataConfig {
            stock_dir: env::var("STOCK_DIR")
                .unwrap_or_else(|_| "Stock Files".to_string())
                .into(),
            portfolio_dir: env::var("PORTFOLIO_DIR")
                .unwrap_or_else(|_| "Portfolio Files".to_string())
                .into(),
            reviews_dir: env::var("REVIEWS_DIR")
                .unwrap_or_else(|_| "Advisor Reviews".to_string())
                .into(),
            prompt_dir: env::var("PROMPT_DIR").unwrap_or_else(|_| ".".to_string()).into(),
        };

        let market = MarketConfig {
            vendor: env::var("MARKET_VENDOR").unwrap_or_else(|_| "nse".to_string()),
            fetch_concurrency: env::var("FETCH_CONCURRENCY")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
            universe_file: env::var("UNIVERSE_FILE").ok().map(PathBuf::from),
        };

        let advisor = AdvisorConfig {
            base_url: env::var("ADVISOR_BASE_URL")
                .unwrap_or_else(|_| "https://api.x.ai/v1".to_string()),
            api_key: env::var("API_KEY").ok(),
            model: env::var("ADVISOR_MODEL").unwrap_or_else(|_| "grok-4".to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            to_file: env::var("LOG_TO_FILE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            file_path: env::var("LOG_FILE_PATH").ok(),
        };

        Ok(Config {
            data,
            market,
            advisor,
            logging,
        })
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> AppResult<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| AppError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> AppResult<()> {
        let mut builder = env_logger::Builder::new();

        // Set log level
        let log_level = match self.logging.level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        };

        builder.filter_level(log_level);

        // Configure output
        if self.logging.to_file {
            if let Some(file_path) = &self.logging.file_path {
                let file = File::create(file_path)
                    .map_err(|e| AppError::Config(format!("Failed to create log file: {}", e)))?;

                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
        }

        // Initialize the logger
        builder.init();

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                stock_dir: "Stock Files".into(),
                portfolio_dir: "Portfolio Files".into(),
                reviews_dir: "Advisor Reviews".into(),
                prompt_dir: ".".into(),
            },
            market: MarketConfig {
                vendor: "nse".to_string(),
                fetch_concurrency: 4,
                universe_file: None,
            },
            advisor: AdvisorConfig {
                base_url: "https://api.x.ai/v1".to_string(),
                api_key: None,
                model: "grok-4".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                to_file: false,
                file_path: None,
            },
        }
    }
}

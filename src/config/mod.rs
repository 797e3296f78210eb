pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::time::Duration;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "follow-audit")]
#[command(about = "Find who does not follow you back, from an exported social-graph archive")]
pub struct CliConfig {
    #[arg(long, help = "Following list from the export (JSON or HTML)")]
    pub following: Option<String>,

    #[arg(long, help = "Followers list from the export (JSON or HTML)")]
    pub followers: Option<String>,

    #[arg(long, help = "Declared type of the following file (e.g. json, text/html)")]
    pub following_type: Option<String>,

    #[arg(long, help = "Declared type of the followers file (e.g. json, text/html)")]
    pub followers_type: Option<String>,

    #[arg(long, conflicts_with_all = ["following", "followers"], help = "Whole export as a ZIP archive")]
    pub zip: Option<String>,

    #[arg(long, help = "Directory for temporary files handed to the backend")]
    pub upload_dir: Option<String>,

    #[arg(long, help = "Alternate comparison backend executable")]
    pub backend: Option<String>,

    #[arg(long, help = "Kill the backend after this many seconds")]
    pub backend_timeout_secs: Option<u64>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "json")]
    pub output_formats: Vec<String>,

    #[arg(long, help = "Bundle every report into this ZIP file")]
    pub compress: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log per-phase CPU and memory usage")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn following_path(&self) -> Option<&str> {
        self.following.as_deref()
    }

    fn followers_path(&self) -> Option<&str> {
        self.followers.as_deref()
    }

    fn archive_path(&self) -> Option<&str> {
        self.zip.as_deref()
    }

    fn following_content_type(&self) -> Option<&str> {
        self.following_type.as_deref()
    }

    fn followers_content_type(&self) -> Option<&str> {
        self.followers_type.as_deref()
    }

    fn upload_dir(&self) -> Option<&str> {
        self.upload_dir.as_deref()
    }

    fn backend_executable(&self) -> Option<&str> {
        self.backend.as_deref()
    }

    fn backend_timeout(&self) -> Option<Duration> {
        self.backend_timeout_secs.map(Duration::from_secs)
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn compressed_output(&self) -> Option<&str> {
        self.compress.as_deref()
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_input_selection(
            self.following.as_deref(),
            self.followers.as_deref(),
            self.zip.as_deref(),
        )?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_output_formats("output_formats", &self.output_formats)?;

        if let Some(content_type) = &self.following_type {
            validation::validate_content_type("following_type", content_type)?;
        }
        if let Some(content_type) = &self.followers_type {
            validation::validate_content_type("followers_type", content_type)?;
        }
        if let Some(dir) = &self.upload_dir {
            validation::validate_directory("upload_dir", dir)?;
        }
        if let Some(backend) = &self.backend {
            validation::validate_executable("backend", backend)?;
        }
        if let Some(secs) = self.backend_timeout_secs {
            validation::validate_range("backend_timeout_secs", secs, 1, 3600)?;
        }
        if let Some(name) = &self.compress {
            validation::validate_file_extensions("compress", std::slice::from_ref(name), &["zip"])?;
        }

        tracing::debug!("✅ CLI configuration validation passed");
        Ok(())
    }
}

use crate::core::ConfigProvider;
use crate::utils::error::{AuditError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub audit: AuditInfo,
    pub input: InputConfig,
    pub backend: Option<BackendConfig>,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    pub following: Option<String>,
    pub followers: Option<String>,
    pub following_type: Option<String>,
    pub followers_type: Option<String>,
    pub archive: Option<String>,
    pub upload_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub executable: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AuditError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| AuditError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${EXPORT_DIR})；未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("audit.name", &self.audit.name)?;

        validation::validate_input_selection(
            self.input.following.as_deref(),
            self.input.followers.as_deref(),
            self.input.archive.as_deref(),
        )?;
        if let Some(content_type) = &self.input.following_type {
            validation::validate_content_type("input.following_type", content_type)?;
        }
        if let Some(content_type) = &self.input.followers_type {
            validation::validate_content_type("input.followers_type", content_type)?;
        }
        if let Some(dir) = &self.input.upload_dir {
            validation::validate_directory("input.upload_dir", dir)?;
        }

        if let Some(backend) = &self.backend {
            validation::validate_executable("backend.executable", &backend.executable)?;
            if let Some(secs) = backend.timeout_seconds {
                validation::validate_range("backend.timeout_seconds", secs, 1, 3600)?;
            }
        }

        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_output_formats("output.formats", &self.output.formats)?;

        if let Some(compression) = self.output.compression.as_ref().filter(|c| c.enabled) {
            let filename =
                validation::validate_required_field("output.compression.filename", &compression.filename)?;
            validation::validate_file_extensions(
                "output.compression.filename",
                std::slice::from_ref(filename),
                &["zip"],
            )?;
        }

        if let Some(format) = self.monitoring.as_ref().and_then(|m| m.log_format.as_deref()) {
            if !matches!(format, "compact" | "json") {
                return Err(AuditError::InvalidConfigValueError {
                    field: "monitoring.log_format".to_string(),
                    value: format.to_string(),
                    reason: "Valid formats: compact, json".to_string(),
                });
            }
        }

        Ok(())
    }

    /// 取得稽核名稱
    pub fn audit_name(&self) -> &str {
        &self.audit.name
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    /// 是否以 JSON 格式輸出日誌
    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .is_some_and(|format| format == "json")
    }
}

impl ConfigProvider for TomlConfig {
    fn following_path(&self) -> Option<&str> {
        self.input.following.as_deref()
    }

    fn followers_path(&self) -> Option<&str> {
        self.input.followers.as_deref()
    }

    fn archive_path(&self) -> Option<&str> {
        self.input.archive.as_deref()
    }

    fn following_content_type(&self) -> Option<&str> {
        self.input.following_type.as_deref()
    }

    fn followers_content_type(&self) -> Option<&str> {
        self.input.followers_type.as_deref()
    }

    fn upload_dir(&self) -> Option<&str> {
        self.input.upload_dir.as_deref()
    }

    fn backend_executable(&self) -> Option<&str> {
        self.backend.as_ref().map(|b| b.executable.as_str())
    }

    fn backend_timeout(&self) -> Option<Duration> {
        self.backend
            .as_ref()
            .and_then(|b| b.timeout_seconds)
            .map(Duration::from_secs)
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }

    fn compressed_output(&self) -> Option<&str> {
        self.output
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .and_then(|c| c.filename.as_deref())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

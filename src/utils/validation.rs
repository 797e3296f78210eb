use crate::core::report::SUPPORTED_FORMATS;
use crate::utils::error::{AuditError, Result};
use std::collections::HashSet;
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_directory(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;

    if !Path::new(path).is_dir() {
        return Err(AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Directory does not exist".to_string(),
        });
    }
    Ok(())
}

/// 後端執行檔必須存在且可執行；由宿主在啟動時檢查，核心不重複檢查
pub fn validate_executable(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;

    let metadata = std::fs::metadata(path).map_err(|e| AuditError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: path.to_string(),
        reason: format!("Executable not found: {}", e),
    })?;

    if !metadata.is_file() {
        return Err(AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Not a regular file".to_string(),
        });
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(AuditError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: path.to_string(),
                reason: "File is not executable".to_string(),
            });
        }
    }

    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        if let Some(extension) = Path::new(file).extension().and_then(|ext| ext.to_str()) {
            if !allowed_set.contains(extension.to_lowercase().as_str()) {
                return Err(AuditError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
        } else {
            return Err(AuditError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: file.clone(),
                reason: "File has no extension or invalid filename".to_string(),
            });
        }
    }

    Ok(())
}

pub fn validate_output_formats(field_name: &str, formats: &[String]) -> Result<()> {
    if formats.is_empty() {
        return Err(AuditError::ConfigValidationError {
            field: field_name.to_string(),
            message: "At least one output format is required".to_string(),
        });
    }

    for format in formats {
        if !SUPPORTED_FORMATS.contains(&format.as_str()) {
            return Err(AuditError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    SUPPORTED_FORMATS.join(", ")
                ),
            });
        }
    }
    Ok(())
}

/// 宣告的內容類型必須能判斷出 JSON 或 HTML
pub fn validate_content_type(field_name: &str, content_type: &str) -> Result<()> {
    let lowered = content_type.to_lowercase();
    if !lowered.contains("json") && !lowered.contains("html") {
        return Err(AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: content_type.to_string(),
            reason: "Content type must name JSON or HTML (e.g. application/json, text/html)"
                .to_string(),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| AuditError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 輸入必須是「一個壓縮檔」或「兩個檔案」其中之一
pub fn validate_input_selection(
    following: Option<&str>,
    followers: Option<&str>,
    archive: Option<&str>,
) -> Result<()> {
    match (archive, following, followers) {
        (Some(archive), None, None) => validate_non_empty_string("zip", archive),
        (Some(_), _, _) => Err(AuditError::ConfigValidationError {
            field: "zip".to_string(),
            message: "Provide either a ZIP export or the following/followers files, not both"
                .to_string(),
        }),
        (None, Some(following), Some(followers)) => {
            validate_non_empty_string("following", following)?;
            validate_non_empty_string("followers", followers)
        }
        (None, None, _) => Err(AuditError::MissingConfigError {
            field: "following".to_string(),
        }),
        (None, _, None) => Err(AuditError::MissingConfigError {
            field: "followers".to_string(),
        }),
    }
}

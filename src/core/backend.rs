use crate::core::audit::{Member, MemberPair};
use crate::domain::model::{DiffResult, RelationshipRecord};
use crate::utils::error::{AuditError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// 之後的行改為歸入 notFollowedByYou
pub const SWITCH_LINE: &str = "People who follow you but you don't follow back:";
pub const NOT_FOLLOWING_BACK_SUFFIX: &str = "does not follow you back.";
pub const NOT_FOLLOWED_BY_YOU_SUFFIX: &str = "is not followed by you.";

/// 解析後端的標準輸出。
///
/// 切換行之前的結果歸入 `not_following_back`，之後歸入 `not_followed_by_you`；
/// 以兩種結尾之一收尾的行貢獻第一個以空白分隔的字作為帳號。後端不提供時間戳。
pub fn parse_backend_output(stdout: &str) -> DiffResult {
    let mut result = DiffResult::default();
    let mut switched = false;

    for line in stdout.lines() {
        if line == SWITCH_LINE {
            switched = true;
            continue;
        }
        if !(line.ends_with(NOT_FOLLOWING_BACK_SUFFIX) || line.ends_with(NOT_FOLLOWED_BY_YOU_SUFFIX)) {
            continue;
        }
        let Some(username) = line.split_whitespace().next() else {
            continue;
        };

        let target = if switched {
            &mut result.not_followed_by_you
        } else {
            &mut result.not_following_back
        };
        target.push(RelationshipRecord::new(username, None));
    }

    result
}

/// 行程外的比對後端，以 `<executable> <following> <followers>` 呼叫，結果從標準輸出逐行讀取
#[derive(Debug, Clone)]
pub struct ExternalBackend {
    executable: PathBuf,
    timeout: Option<Duration>,
    upload_dir: Option<PathBuf>,
}

impl ExternalBackend {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            timeout: None,
            upload_dir: None,
        }
    }

    /// 逾時後子行程會被終止；預設不設逾時
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_upload_dir(mut self, upload_dir: Option<PathBuf>) -> Self {
        self.upload_dir = upload_dir;
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// 寫出兩個暫存檔並呼叫後端一次，不重試。暫存目錄在任何結束路徑上都會被移除。
    pub async fn run(&self, members: &MemberPair) -> Result<DiffResult> {
        let workdir = match &self.upload_dir {
            Some(dir) => tempfile::Builder::new()
                .prefix("follow-audit-")
                .tempdir_in(dir)?,
            None => tempfile::Builder::new().prefix("follow-audit-").tempdir()?,
        };

        let following_path = write_member(workdir.path(), "following", &members.following).await?;
        let followers_path = write_member(workdir.path(), "followers", &members.followers).await?;

        tracing::info!(
            "🔧 Executing backend: {} {} {}",
            self.executable.display(),
            following_path.display(),
            followers_path.display()
        );

        let mut command = Command::new(&self.executable);
        command
            .arg(&following_path)
            .arg(&followers_path)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let pending = command.output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, pending).await.map_err(|_| {
                AuditError::BackendError {
                    message: format!("backend did not finish within {limit:?}"),
                    exit_code: None,
                    stderr: String::new(),
                }
            })?,
            None => pending.await,
        }
        .map_err(|e| AuditError::BackendError {
            message: format!("failed to start {}: {e}", self.executable.display()),
            exit_code: None,
            stderr: String::new(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            tracing::error!("Backend stdout: {}", stdout);
            tracing::error!("Backend stderr: {}", stderr);
            return Err(AuditError::BackendError {
                message: format!("backend exited with {}", output.status),
                exit_code: output.status.code(),
                stderr,
            });
        }

        tracing::debug!("Backend stdout: {}", stdout);
        Ok(parse_backend_output(&stdout))
    }
}

async fn write_member(dir: &Path, stem: &str, member: &Member) -> Result<PathBuf> {
    let path = dir.join(format!("{stem}{}", member.format.extension()));
    tokio::fs::write(&path, &member.bytes).await?;
    Ok(path)
}

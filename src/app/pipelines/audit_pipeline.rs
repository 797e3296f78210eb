use crate::core::assemble::ResultAssembler;
use crate::core::audit::{audit_export, materialize_members};
use crate::core::backend::ExternalBackend;
use crate::core::report;
use crate::core::{ConfigProvider, DiffResult, ExportInput, Pipeline, Storage};
use crate::domain::model::UploadedPart;
use crate::utils::error::{AuditError, Result};
use std::path::{Path, PathBuf};

pub struct AuditPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) backend: Option<ExternalBackend>,
}

impl<S: Storage, C: ConfigProvider> AuditPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let backend = config.backend_executable().map(|executable| {
            ExternalBackend::new(executable)
                .with_timeout(config.backend_timeout())
                .with_upload_dir(config.upload_dir().map(PathBuf::from))
        });

        Self {
            storage,
            config,
            backend,
        }
    }

    async fn read_part(&self, path: &str, content_type: Option<&str>) -> Result<UploadedPart> {
        let bytes = self.storage.read_file(path).await.map_err(|e| match e {
            AuditError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
                AuditError::input(format!("Input file not found: {}", path))
            }
            other => other,
        })?;

        let file_name = Path::new(path)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string());

        tracing::debug!("Read {} ({} bytes)", path, bytes.len());
        let part = UploadedPart::new(file_name, bytes);
        Ok(match content_type {
            Some(content_type) => part.with_content_type(content_type),
            None => part,
        })
    }

    fn output_file(&self, name: &str) -> String {
        format!("{}/{}", self.config.output_path(), name)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for AuditPipeline<S, C> {
    async fn extract(&self) -> Result<ExportInput> {
        match (
            self.config.archive_path(),
            self.config.following_path(),
            self.config.followers_path(),
        ) {
            (Some(archive), None, None) => Ok(ExportInput::Archive(self.read_part(archive, None).await?)),
            (Some(_), _, _) => Err(AuditError::input(
                "Provide either a ZIP export or the following and followers files, not both.",
            )),
            (None, Some(following), Some(followers)) => Ok(ExportInput::Loose {
                following: self
                    .read_part(following, self.config.following_content_type())
                    .await?,
                followers: self
                    .read_part(followers, self.config.followers_content_type())
                    .await?,
            }),
            (None, None, _) => Err(AuditError::missing_input("following")),
            (None, _, None) => Err(AuditError::missing_input("followers")),
        }
    }

    async fn transform(&self, input: ExportInput) -> Result<DiffResult> {
        match &self.backend {
            Some(backend) => {
                tracing::debug!("Using backend {}", backend.executable().display());
                let members = materialize_members(&input)?;
                backend.run(&members).await
            }
            None => audit_export(&input),
        }
    }

    async fn load(&self, result: DiffResult) -> Result<String> {
        let response = ResultAssembler::assemble(result);
        let files = report::render(&response, self.config.output_formats())?;

        // 壓縮時只輸出單一 ZIP
        if let Some(archive_name) = self.config.compressed_output() {
            tracing::debug!("Creating ZIP file with {} reports", files.len());
            let zip_data = report::bundle(&files)?;
            let path = self.output_file(archive_name);
            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(&path, &zip_data).await?;
            return Ok(path);
        }

        let mut written = Vec::with_capacity(files.len());
        for file in &files {
            let path = self.output_file(&file.name);
            self.storage.write_file(&path, &file.bytes).await?;
            written.push(path);
        }
        Ok(written.join(", "))
    }
}

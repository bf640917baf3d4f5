//! Filesystem report sink

use async_trait::async_trait;
use gauntlet_config::ReportFormat;
use gauntlet_core::StressTestReport;
use std::path::PathBuf;
use std::time::Instant;
use tokio::fs;

use crate::{
    errors::DeliveryError,
    sink::{DeliveryResult, ReportSink},
    sinks::encode_report,
    template::TemplateEngine,
};

/// Writes each report to a templated path
#[derive(Debug)]
pub struct FilesystemSink {
    path_template: String,
    format: ReportFormat,
    create_dirs: bool,
    overwrite: bool,
    template_engine: TemplateEngine,
}

impl FilesystemSink {
    pub fn new(
        path_template: impl Into<String>,
        format: ReportFormat,
        create_dirs: bool,
        overwrite: bool,
        template_engine: TemplateEngine,
    ) -> Result<Self, DeliveryError> {
        let path_template = path_template.into();
        if path_template.trim().is_empty() {
            return Err(DeliveryError::InvalidSink(
                "filesystem path cannot be empty".to_string(),
            ));
        }
        template_engine.validate(&path_template)?;

        Ok(Self {
            path_template,
            format,
            create_dirs,
            overwrite,
            template_engine,
        })
    }

    fn resolve_path(&self, report: &StressTestReport) -> Result<String, DeliveryError> {
        let rendered = self.template_engine.render(
            &self.path_template,
            &TemplateEngine::report_variables(report),
        )?;

        if rendered.contains('\0') {
            return Err(DeliveryError::Filesystem {
                path: rendered,
                operation: "validate".to_string(),
                error: "Path contains null bytes".to_string(),
            });
        }

        Ok(rendered)
    }
}

#[async_trait]
impl ReportSink for FilesystemSink {
    async fn deliver(&self, report: &StressTestReport) -> Result<DeliveryResult, DeliveryError> {
        let start_time = Instant::now();

        let rendered_path = self.resolve_path(report)?;
        let path = PathBuf::from(&rendered_path);

        if path.exists() && !self.overwrite {
            return Err(DeliveryError::FileExists {
                path: rendered_path,
            });
        }

        if self.create_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| DeliveryError::Filesystem {
                        path: parent.to_string_lossy().to_string(),
                        operation: "create_dirs".to_string(),
                        error: e.to_string(),
                    })?;
            }
        }

        let data = encode_report(report, self.format)?;
        let size_bytes = data.len() as u64;

        fs::write(&path, &data)
            .await
            .map_err(|e| DeliveryError::Filesystem {
                path: rendered_path.clone(),
                operation: "write".to_string(),
                error: e.to_string(),
            })?;

        Ok(
            DeliveryResult::new(self.sink_type(), start_time.elapsed(), size_bytes)
                .with_location(rendered_path),
        )
    }

    fn sink_type(&self) -> &'static str {
        "filesystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::test_support::sample_report;

    fn sink(template: String, format: ReportFormat, overwrite: bool) -> FilesystemSink {
        FilesystemSink::new(template, format, true, overwrite, TemplateEngine::new()).unwrap()
    }

    #[tokio::test]
    async fn test_writes_report_to_templated_path() {
        let dir = tempfile::tempdir().unwrap();
        let template = format!("{}/runs/{{{{date}}}}/{{{{run_id}}}}.json", dir.path().display());
        let report = sample_report();

        let result = sink(template, ReportFormat::Json, false)
            .deliver(&report)
            .await
            .unwrap();

        let expected = dir
            .path()
            .join("runs")
            .join("2024-01-06")
            .join(format!("{}.json", report.run_id));
        assert_eq!(result.location.as_deref(), Some(expected.to_str().unwrap()));

        let written: StressTestReport =
            serde_json::from_slice(&std::fs::read(&expected).unwrap()).unwrap();
        assert_eq!(written, report);
    }

    #[tokio::test]
    async fn test_yaml_format() {
        let dir = tempfile::tempdir().unwrap();
        let template = format!("{}/report.yaml", dir.path().display());
        let report = sample_report();

        sink(template, ReportFormat::Yaml, false)
            .deliver(&report)
            .await
            .unwrap();

        let text = std::fs::read_to_string(dir.path().join("report.yaml")).unwrap();
        assert!(text.contains("overall_success_rate: 0.75"));
    }

    #[tokio::test]
    async fn test_existing_file_respects_overwrite_flag() {
        let dir = tempfile::tempdir().unwrap();
        let template = format!("{}/report.json", dir.path().display());
        std::fs::write(dir.path().join("report.json"), b"{}").unwrap();

        let report = sample_report();
        let err = sink(template.clone(), ReportFormat::JsonCompact, false)
            .deliver(&report)
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::FileExists { .. }));

        sink(template, ReportFormat::JsonCompact, true)
            .deliver(&report)
            .await
            .unwrap();
        let text = std::fs::read_to_string(dir.path().join("report.json")).unwrap();
        assert!(text.contains(&report.run_id.to_string()));
    }

    #[test]
    fn test_rejects_invalid_templates() {
        let engine = TemplateEngine::new();
        assert!(FilesystemSink::new("", ReportFormat::Json, true, false, engine.clone()).is_err());
        assert!(FilesystemSink::new("{{run_id", ReportFormat::Json, true, false, engine).is_err());
    }
}

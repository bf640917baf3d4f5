//! Template engine for dynamic report paths

use crate::errors::DeliveryError;
use gauntlet_core::StressTestReport;
use handlebars::Handlebars;
use serde_json::Value;
use std::collections::HashMap;

/// Handlebars wrapper that errors on missing variables
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        Self { handlebars }
    }

    /// Render a template with the given variables
    pub fn render(
        &self,
        template: &str,
        variables: &HashMap<String, String>,
    ) -> Result<String, DeliveryError> {
        let json_vars: Value = variables
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect::<serde_json::Map<_, _>>()
            .into();

        self.handlebars
            .render_template(template, &json_vars)
            .map_err(|e| DeliveryError::TemplateRender {
                template: template.to_string(),
                error: e.to_string(),
            })
    }

    /// Check template syntax without rendering
    pub fn validate(&self, template: &str) -> Result<(), DeliveryError> {
        handlebars::Template::compile(template)
            .map(|_| ())
            .map_err(|e| DeliveryError::TemplateRender {
                template: template.to_string(),
                error: format!("Invalid template syntax: {}", e),
            })
    }

    /// Variables available to report path templates
    pub fn report_variables(report: &StressTestReport) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("run_id".to_string(), report.run_id.to_string());
        vars.insert(
            "timestamp".to_string(),
            report.started_at.format("%Y%m%d_%H%M%S").to_string(),
        );
        vars.insert(
            "date".to_string(),
            report.started_at.format("%Y-%m-%d").to_string(),
        );
        vars
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_rendering() {
        let engine = TemplateEngine::new();
        let mut vars = HashMap::new();
        vars.insert("run_id".to_string(), "abc".to_string());
        vars.insert("timestamp".to_string(), "20240106_143000".to_string());

        let result = engine
            .render("reports/{{timestamp}}/{{run_id}}.json", &vars)
            .unwrap();

        assert_eq!(result, "reports/20240106_143000/abc.json");
    }

    #[test]
    fn test_missing_variable() {
        let engine = TemplateEngine::new();
        let template = "reports/{{missing_var}}.json";

        match engine.render(template, &HashMap::new()) {
            Err(DeliveryError::TemplateRender { template: t, .. }) => assert_eq!(t, template),
            other => panic!("Expected TemplateRender error, got {:?}", other),
        }
    }

    #[test]
    fn test_template_validation() {
        let engine = TemplateEngine::new();
        assert!(engine.validate("{{run_id}}/{{date}}").is_ok());
        assert!(engine.validate("no variables").is_ok());
        assert!(engine.validate("{{unmatched").is_err());
    }
}

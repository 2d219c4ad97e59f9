use tera::Tera;

use super::resolver::CanonicalVariables;
use super::GenerateError;

/// Thin wrapper around Tera. Templates are loaded from a directory at
/// startup and addressed as `<vendor_id>_base.j2`; a missing template or a
/// variable referenced by the template but absent from the canonical set
/// both surface as render errors.
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Load every `*.j2` template under the given directory
    pub fn from_dir(templates_dir: &str) -> anyhow::Result<Self> {
        let glob = format!("{}/**/*.j2", templates_dir.trim_end_matches('/'));
        let tera = Tera::new(&glob)
            .map_err(|e| anyhow::anyhow!("Failed to load templates from {}: {}", templates_dir, e))?;
        Ok(Self { tera })
    }

    /// Build a renderer from in-memory templates (name, content) pairs
    pub fn from_raw(templates: &[(&str, &str)]) -> anyhow::Result<Self> {
        let mut tera = Tera::default();
        for (name, content) in templates {
            tera.add_raw_template(name, content)
                .map_err(|e| anyhow::anyhow!("Invalid template {}: {}", name, e))?;
        }
        Ok(Self { tera })
    }

    /// Canonical template name for a vendor
    pub fn template_name(vendor_id: &str) -> String {
        format!("{}_base.j2", vendor_id)
    }

    pub fn render(
        &self,
        template_name: &str,
        vars: &CanonicalVariables,
    ) -> Result<String, GenerateError> {
        if self.tera.get_template(template_name).is_err() {
            return Err(GenerateError::Render(format!(
                "template not found: {}",
                template_name
            )));
        }

        let context = tera::Context::from_serialize(vars)
            .map_err(|e| GenerateError::Render(format!("invalid template variables: {}", e)))?;

        self.tera
            .render(template_name, &context)
            .map_err(|e| GenerateError::Render(render_error_message(&e)))
    }
}

/// Flatten a Tera error chain into one message; the root cause (e.g. which
/// variable was missing) lives in the error source, not the top-level text.
fn render_error_message(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    message
}

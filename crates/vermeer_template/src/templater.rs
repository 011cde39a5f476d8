//! `minijinja` implementation of [`PayloadTemplater`].

use std::path::Path;

use minijinja::{Environment, Value, context};
use tracing::{debug, instrument};
use vermeer_core::{GenerationParams, Payload};
use vermeer_error::{TemplateError, TemplateErrorKind};
use vermeer_interface::PayloadTemplater;

use crate::TemplateConfig;

/// Name of the request-body template.
pub const GENERATION_TEMPLATE: &str = "generation";
/// Name of the help template.
pub const HELP_TEMPLATE: &str = "help";

const DEFAULT_GENERATION: &str = include_str!("../resources/generation.json.j2");
const DEFAULT_HELP: &str = include_str!("../resources/help.md.j2");

/// Renders payloads and help text from Jinja templates.
///
/// Parameters are exposed to the generation template as top-level
/// variables, so `{{ steps | default(20) | tojson }}` picks up `steps: 30`
/// from a command.
///
/// # Example
///
/// ```
/// use vermeer_core::GenerationParams;
/// use vermeer_interface::PayloadTemplater;
/// use vermeer_template::MiniJinjaTemplater;
///
/// let templater = MiniJinjaTemplater::new().unwrap();
/// let params = GenerationParams::from_message("prompt: a cat steps: 30");
/// let payload = templater.render_payload(&params).unwrap();
/// assert_eq!(payload.prompt(), "a cat");
/// assert_eq!(payload.get("steps"), Some(&serde_json::json!(30)));
/// ```
#[derive(Debug)]
pub struct MiniJinjaTemplater {
    env: Environment<'static>,
}

impl MiniJinjaTemplater {
    /// Templater using the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in template fails to compile.
    pub fn new() -> Result<Self, TemplateError> {
        Self::with_sources(DEFAULT_GENERATION.to_string(), DEFAULT_HELP.to_string())
    }

    /// Templater using the given template sources.
    ///
    /// # Errors
    ///
    /// Returns an error if either source fails to compile.
    pub fn with_sources(generation: String, help: String) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.add_template_owned(GENERATION_TEMPLATE, generation)
            .map_err(|e| load_error(GENERATION_TEMPLATE, e))?;
        env.add_template_owned(HELP_TEMPLATE, help)
            .map_err(|e| load_error(HELP_TEMPLATE, e))?;
        Ok(Self { env })
    }

    /// Templater using override files where configured, built-ins otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if an override file cannot be read or compiled.
    #[instrument(skip_all)]
    pub fn from_config(config: &TemplateConfig) -> Result<Self, TemplateError> {
        let generation = match config.generation() {
            Some(path) => read_template(GENERATION_TEMPLATE, path)?,
            None => DEFAULT_GENERATION.to_string(),
        };
        let help = match config.help() {
            Some(path) => read_template(HELP_TEMPLATE, path)?,
            None => DEFAULT_HELP.to_string(),
        };
        Self::with_sources(generation, help)
    }

    fn render(&self, name: &str, ctx: Value) -> Result<String, TemplateError> {
        let template = self.env.get_template(name).map_err(|e| load_error(name, e))?;
        template.render(ctx).map_err(|e| {
            TemplateError::new(TemplateErrorKind::Render {
                name: name.to_string(),
                message: e.to_string(),
            })
        })
    }
}

impl PayloadTemplater for MiniJinjaTemplater {
    #[instrument(skip(self), fields(param_count = params.len()))]
    fn render_payload(&self, params: &GenerationParams) -> Result<Payload, TemplateError> {
        let rendered = self.render(GENERATION_TEMPLATE, Value::from_serialize(params))?;
        debug!(json = %rendered, "Produced json");

        let value: serde_json::Value = serde_json::from_str(&rendered).map_err(|e| {
            TemplateError::new(TemplateErrorKind::InvalidPayload(format!(
                "{}: {}",
                e, rendered
            )))
        })?;
        Payload::from_value(value)
            .map_err(|e| TemplateError::new(TemplateErrorKind::InvalidPayload(e.to_string())))
    }

    fn render_help(&self) -> Result<String, TemplateError> {
        let help = self.render(HELP_TEMPLATE, context! {})?;
        debug!(len = help.len(), "Rendered help");
        Ok(help)
    }
}

fn read_template(name: &str, path: &Path) -> Result<String, TemplateError> {
    debug!(template = name, path = %path.display(), "Loading template override");
    std::fs::read_to_string(path).map_err(|e| {
        TemplateError::new(TemplateErrorKind::Load {
            name: name.to_string(),
            message: format!("{}: {}", path.display(), e),
        })
    })
}

#[track_caller]
fn load_error(name: &str, err: minijinja::Error) -> TemplateError {
    TemplateError::new(TemplateErrorKind::Load {
        name: name.to_string(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_params_render_defaults() {
        let templater = MiniJinjaTemplater::new().unwrap();
        let payload = templater.render_payload(&GenerationParams::new()).unwrap();

        assert_eq!(payload.get("prompt"), Some(&json!("")));
        assert_eq!(payload.get("steps"), Some(&json!(20)));
        assert_eq!(payload.get("batch_count"), Some(&json!(1)));
        assert_eq!(payload.get("seed"), Some(&json!(-1)));
    }

    #[test]
    fn test_params_override_defaults_with_types() {
        let templater = MiniJinjaTemplater::new().unwrap();
        let params = GenerationParams::from_message(
            "prompt: a cat batch_count: 3 guidance_scale: 5.5 sampler: Euler a",
        );
        let payload = templater.render_payload(&params).unwrap();

        assert_eq!(payload.prompt(), "a cat");
        assert_eq!(payload.get("batch_count"), Some(&json!(3)));
        assert_eq!(payload.get("guidance_scale"), Some(&json!(5.5)));
        assert_eq!(payload.get("sampler"), Some(&json!("Euler a")));
    }

    #[test]
    fn test_prompt_special_characters_stay_valid_json() {
        let templater = MiniJinjaTemplater::new().unwrap();
        let params = GenerationParams::new().with_prompt("say \"hi\" <b> & \\ done");
        let payload = templater.render_payload(&params).unwrap();
        assert_eq!(payload.prompt(), "say \"hi\" <b> & \\ done");
    }

    #[test]
    fn test_non_object_output_rejected() {
        let templater =
            MiniJinjaTemplater::with_sources("[1, 2]".to_string(), String::new()).unwrap();
        let err = templater.render_payload(&GenerationParams::new()).unwrap_err();
        assert!(matches!(err.kind, TemplateErrorKind::InvalidPayload(_)));
    }

    #[test]
    fn test_invalid_json_output_rejected() {
        let templater =
            MiniJinjaTemplater::with_sources("{\"prompt\": {{ prompt }}}".to_string(), String::new())
                .unwrap();
        let params = GenerationParams::new().with_prompt("unquoted words");
        let err = templater.render_payload(&params).unwrap_err();
        assert!(matches!(err.kind, TemplateErrorKind::InvalidPayload(_)));
    }

    #[test]
    fn test_syntax_error_is_load_error() {
        let err = MiniJinjaTemplater::with_sources("{{ prompt ".to_string(), String::new())
            .unwrap_err();
        match err.kind {
            TemplateErrorKind::Load { name, .. } => assert_eq!(name, GENERATION_TEMPLATE),
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_help_mentions_commands() {
        let help = MiniJinjaTemplater::new().unwrap().render_help().unwrap();
        assert!(help.contains("/gen"));
        assert!(help.contains("/gen\\_long"));
        assert!(help.contains("batch_count"));
    }
}

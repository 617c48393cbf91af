//! Prompt templates for FlightLens.
//!
//! Prompts can be customized by placing a `rag.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Which template a question is answered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Plain documentation lookup.
    Rag,
    /// Weather interpretation with a current METAR.
    Weather,
    /// Step-by-step emergency procedure.
    Emergency,
    /// Recommendation combining weather, aircraft state and procedures.
    Decision,
}

/// Prompts for RAG response generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub system: String,
    pub user: String,
    pub weather: String,
    pub emergency: String,
    pub decision: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are FlightLens, an AI cockpit assistant for pilots.

Your role is to provide accurate, safety-critical information from aviation manuals.

RULES:
1. Answer ONLY using information from the provided context
2. Cite specific sources (document name, section, page) when possible
3. If information is not in the context, say "I cannot confirm this from the official documentation"
4. For emergency procedures, be precise and step-by-step
5. Keep responses concise for cockpit use (2-4 sentences unless procedure requires more)"#.to_string(),

            user: r#"Context:
{{context}}

Question:
{{question}}

Answer:"#.to_string(),

            weather: r#"You are FlightLens, assisting with weather interpretation.

Current METAR data:
{{metar}}

Flight context (if available):
{{telemetry}}

Relevant documentation:
{{context}}

Pilot question:
{{question}}

Provide a clear, actionable response considering both weather and flight state:"#.to_string(),

            emergency: r#"EMERGENCY PROCEDURE REQUEST

You are FlightLens providing emergency guidance.

Context from POH/AFM:
{{context}}

Emergency situation:
{{question}}

Provide step-by-step procedure. Be precise and complete:"#.to_string(),

            decision: r#"FlightLens Decision Support

Current situation:
- Weather: {{metar}}
- Aircraft state: {{telemetry}}
- Pilot question: {{question}}

Relevant procedures:
{{context}}

Provide clear recommendation with reasoning:"#.to_string(),
        }
    }
}

impl RagPrompts {
    /// User template for a prompt kind.
    pub fn template(&self, kind: PromptKind) -> &str {
        match kind {
            PromptKind::Rag => &self.user,
            PromptKind::Weather => &self.weather,
            PromptKind::Emergency => &self.emergency,
            PromptKind::Decision => &self.decision,
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.rag.system.is_empty());
        assert!(prompts.rag.template(PromptKind::Weather).contains("{{metar}}"));
        assert!(prompts.rag.template(PromptKind::Decision).contains("{{telemetry}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Wind at {{station}} is {{wind}}.";
        let mut vars = HashMap::new();
        vars.insert("station".to_string(), "KDFW".to_string());
        vars.insert("wind".to_string(), "18010KT".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Wind at KDFW is 18010KT.");
    }

    #[test]
    fn test_provided_vars_override_custom() {
        let mut prompts = Prompts::default();
        prompts.variables.insert("aircraft".to_string(), "C172".to_string());
        prompts.variables.insert("question".to_string(), "ignored".to_string());

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Vy?".to_string());

        let out = prompts.render_with_custom("{{aircraft}}: {{question}}", &vars);
        assert_eq!(out, "C172: Vy?");
    }

    #[test]
    fn test_load_custom_rag_prompts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("rag.toml"), "user = \"Q: {{question}}\"\n").unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.rag.user, "Q: {{question}}");
        // Unspecified fields keep their defaults
        assert!(prompts.rag.emergency.contains("EMERGENCY"));
    }
}

//! Platform and model selection made in the first wizard step

use serde::{Deserialize, Serialize};

/// Origin platform, versions and model chosen by the user.
///
/// Persisted in the `plataforma` slot; only the platform step writes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSelection {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub origin_version: String,
    #[serde(default)]
    pub target_version: String,
    /// Human readable model label (e.g. "OpenAI - GPT-4o")
    #[serde(default)]
    pub model_display: String,
    /// Model identifier (e.g. "gpt-4o")
    #[serde(default)]
    pub model: String,
}

impl PlatformSelection {
    /// Whether a platform has been confirmed
    pub fn is_selected(&self) -> bool {
        !self.origin.is_empty()
    }

    /// Origin platform name used in prompts and reports
    pub fn origin_or_default(&self) -> &str {
        if self.origin.is_empty() {
            DEFAULT_ORIGIN
        } else {
            &self.origin
        }
    }
}

/// Platform assumed when nothing has been selected yet
pub const DEFAULT_ORIGIN: &str = "MicroStrategy";

/// Destination platform of every migration
pub const TARGET_PLATFORM: &str = "Power BI";

/// Supported origin platforms with their known versions
pub const ORIGIN_PLATFORMS: &[(&str, &[&str])] = &[
    ("MicroStrategy", &["2021", "2020", "2019", "2018 ou anterior"]),
    ("Tableau", &["2023.3", "2022.4", "2021.2", "Versão anterior"]),
    ("QlikView", &["12.6", "12.5", "12.2", "Versão anterior"]),
    (
        "Excel",
        &[
            "Microsoft 365",
            "Excel 2019",
            "Excel 2016",
            "Excel 2013 ou anterior",
        ],
    ),
    ("Outro", &["Versão desconhecida", "Sem versão definida"]),
];

/// Power BI editions offered as migration targets
pub const TARGET_VERSIONS: &[&str] = &[
    "Power BI Desktop (jun/2024)",
    "Power BI Desktop (dez/2023)",
    "Power BI Pro",
    "Power BI Service",
];

/// Selectable language models as (display name, model id)
pub const MODEL_CATALOG: &[(&str, &str)] = &[
    ("OpenAI - GPT-4o", "gpt-4o"),
    ("OpenAI - GPT-4", "gpt-4"),
    ("OpenAI - GPT-3.5-turbo", "gpt-3.5-turbo"),
    ("Anthropic - Claude 3 Opus", "claude-3-opus"),
    ("Anthropic - Claude 3 Sonnet", "claude-3-sonnet"),
    ("Google - Gemini 1.5 Pro", "gemini-1.5-pro"),
    ("Google - Gemini 1.0 Pro", "gemini-1.0-pro"),
    ("Meta - LLaMA 3 (70B)", "llama3-70b"),
    ("Meta - LLaMA 3 (8B)", "llama3-8b"),
    ("Mistral - Mixtral 8x7B", "mixtral-8x7b"),
    ("Mistral - Mistral 7B Instruct", "mistral-7b-instruct"),
    ("Cohere - Command R+", "command-r-plus"),
    ("AWS Bedrock - Titan", "bedrock-titan"),
    ("Azure OpenAI - GPT-4", "gpt-4-azure"),
    ("Outro modelo externo", "custom"),
];

const UNKNOWN_VERSIONS: &[&str] = &["Versão desconhecida"];

/// Versions known for an origin platform
pub fn versions_for(origin: &str) -> &'static [&'static str] {
    ORIGIN_PLATFORMS
        .iter()
        .find(|(name, _)| *name == origin)
        .map(|(_, versions)| *versions)
        .unwrap_or(UNKNOWN_VERSIONS)
}

/// Model id for a display name from the catalog
pub fn model_id_for(display: &str) -> Option<&'static str> {
    MODEL_CATALOG
        .iter()
        .find(|(name, _)| *name == display)
        .map(|(_, id)| *id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_for_known_platform() {
        assert_eq!(versions_for("Tableau")[0], "2023.3");
        assert_eq!(versions_for("MicroStrategy").len(), 4);
    }

    #[test]
    fn test_versions_for_unknown_platform() {
        assert_eq!(versions_for("Looker"), &["Versão desconhecida"]);
    }

    #[test]
    fn test_model_id_lookup() {
        assert_eq!(model_id_for("OpenAI - GPT-4o"), Some("gpt-4o"));
        // The display label and the id key must agree for every entry
        assert_eq!(model_id_for("Mistral - Mixtral 8x7B"), Some("mixtral-8x7b"));
        assert_eq!(model_id_for("Unknown"), None);
    }

    #[test]
    fn test_default_selection_is_empty() {
        let selection = PlatformSelection::default();
        assert!(!selection.is_selected());
        assert_eq!(selection.origin_or_default(), "MicroStrategy");
    }
}

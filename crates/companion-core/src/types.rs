use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CompanionError;

// ---------------------------------------------------------------------------
// ArtifactKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Specification,
    Design,
    Code,
    TestCases,
    Pipeline,
    Documentation,
}

impl ArtifactKind {
    pub fn all() -> &'static [ArtifactKind] {
        &[
            ArtifactKind::Specification,
            ArtifactKind::Design,
            ArtifactKind::Code,
            ArtifactKind::TestCases,
            ArtifactKind::Pipeline,
            ArtifactKind::Documentation,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Specification => "specification",
            ArtifactKind::Design => "design",
            ArtifactKind::Code => "code",
            ArtifactKind::TestCases => "test_cases",
            ArtifactKind::Pipeline => "pipeline",
            ArtifactKind::Documentation => "documentation",
        }
    }

    /// Table holding rows of this kind. Always a static identifier, safe to
    /// interpolate into SQL.
    pub fn table(self) -> &'static str {
        match self {
            ArtifactKind::Specification => "specifications",
            ArtifactKind::Design => "designs",
            ArtifactKind::Code => "generated_code",
            ArtifactKind::TestCases => "test_cases",
            ArtifactKind::Pipeline => "ci_cd_pipelines",
            ArtifactKind::Documentation => "documentation",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArtifactKind {
    type Err = CompanionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "specification" | "spec" => Ok(ArtifactKind::Specification),
            "design" => Ok(ArtifactKind::Design),
            "code" => Ok(ArtifactKind::Code),
            "test_cases" | "tests" => Ok(ArtifactKind::TestCases),
            "pipeline" => Ok(ArtifactKind::Pipeline),
            "documentation" | "docs" => Ok(ArtifactKind::Documentation),
            _ => Err(CompanionError::UnknownArtifactKind(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ProviderKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Anthropic,
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderKind {
    pub fn all() -> &'static [ProviderKind] {
        &[ProviderKind::Anthropic, ProviderKind::OpenAi]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
        }
    }

    pub fn other(self) -> ProviderKind {
        match self {
            ProviderKind::Anthropic => ProviderKind::OpenAi,
            ProviderKind::OpenAi => ProviderKind::Anthropic,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = CompanionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "openai" | "open_ai" | "gpt" => Ok(ProviderKind::OpenAi),
            _ => Err(CompanionError::UnknownProvider(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// DiagramType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramType {
    Flowchart,
    Sequence,
    Class,
    Er,
    State,
    Gantt,
    Unknown,
}

impl DiagramType {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagramType::Flowchart => "flowchart",
            DiagramType::Sequence => "sequence",
            DiagramType::Class => "class",
            DiagramType::Er => "er",
            DiagramType::State => "state",
            DiagramType::Gantt => "gantt",
            DiagramType::Unknown => "unknown",
        }
    }

    /// Mermaid header keyword used when asking a model for this diagram.
    pub fn keyword(self) -> &'static str {
        match self {
            DiagramType::Flowchart | DiagramType::Unknown => "flowchart TD",
            DiagramType::Sequence => "sequenceDiagram",
            DiagramType::Class => "classDiagram",
            DiagramType::Er => "erDiagram",
            DiagramType::State => "stateDiagram-v2",
            DiagramType::Gantt => "gantt",
        }
    }
}

impl fmt::Display for DiagramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DiagramType {
    type Err = CompanionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flowchart" | "graph" | "architecture" | "component" => Ok(DiagramType::Flowchart),
            "sequence" | "sequencediagram" => Ok(DiagramType::Sequence),
            "class" | "classdiagram" => Ok(DiagramType::Class),
            "er" | "erdiagram" | "entity_relationship" => Ok(DiagramType::Er),
            "state" | "statediagram" => Ok(DiagramType::State),
            "gantt" => Ok(DiagramType::Gantt),
            _ => Err(CompanionError::InvalidInput(format!(
                "unsupported diagram type '{s}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// PipelinePlatform
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePlatform {
    GithubActions,
    GitlabCi,
    Jenkins,
    AzurePipelines,
}

impl PipelinePlatform {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelinePlatform::GithubActions => "github_actions",
            PipelinePlatform::GitlabCi => "gitlab_ci",
            PipelinePlatform::Jenkins => "jenkins",
            PipelinePlatform::AzurePipelines => "azure_pipelines",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PipelinePlatform::GithubActions => "GitHub Actions",
            PipelinePlatform::GitlabCi => "GitLab CI",
            PipelinePlatform::Jenkins => "Jenkins",
            PipelinePlatform::AzurePipelines => "Azure Pipelines",
        }
    }

    /// Conventional location of the pipeline definition in a repository.
    pub fn config_path(self) -> &'static str {
        match self {
            PipelinePlatform::GithubActions => ".github/workflows/ci.yml",
            PipelinePlatform::GitlabCi => ".gitlab-ci.yml",
            PipelinePlatform::Jenkins => "Jenkinsfile",
            PipelinePlatform::AzurePipelines => "azure-pipelines.yml",
        }
    }

    /// Fence language for the generated definition.
    pub fn syntax(self) -> &'static str {
        match self {
            PipelinePlatform::Jenkins => "groovy",
            _ => "yaml",
        }
    }
}

impl fmt::Display for PipelinePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PipelinePlatform {
    type Err = CompanionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match norm.as_str() {
            "github_actions" | "github" => Ok(PipelinePlatform::GithubActions),
            "gitlab_ci" | "gitlab" => Ok(PipelinePlatform::GitlabCi),
            "jenkins" => Ok(PipelinePlatform::Jenkins),
            "azure_pipelines" | "azure" | "azure_devops" => Ok(PipelinePlatform::AzurePipelines),
            _ => Err(CompanionError::UnknownPlatform(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// DocType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    Readme,
    Api,
    UserGuide,
    Architecture,
}

impl DocType {
    pub fn as_str(self) -> &'static str {
        match self {
            DocType::Readme => "readme",
            DocType::Api => "api",
            DocType::UserGuide => "user_guide",
            DocType::Architecture => "architecture",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            DocType::Readme => "README",
            DocType::Api => "API reference",
            DocType::UserGuide => "User guide",
            DocType::Architecture => "Architecture overview",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocType {
    type Err = CompanionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match norm.as_str() {
            "readme" => Ok(DocType::Readme),
            "api" | "api_reference" => Ok(DocType::Api),
            "user_guide" | "guide" => Ok(DocType::UserGuide),
            "architecture" => Ok(DocType::Architecture),
            _ => Err(CompanionError::UnknownDocType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_kind_aliases_parse() {
        assert_eq!("spec".parse::<ArtifactKind>().unwrap(), ArtifactKind::Specification);
        assert_eq!("tests".parse::<ArtifactKind>().unwrap(), ArtifactKind::TestCases);
        assert_eq!("docs".parse::<ArtifactKind>().unwrap(), ArtifactKind::Documentation);
        assert!("blueprint".parse::<ArtifactKind>().is_err());
    }

    #[test]
    fn artifact_kind_tables_are_distinct() {
        let mut tables: Vec<_> = ArtifactKind::all().iter().map(|k| k.table()).collect();
        tables.sort();
        tables.dedup();
        assert_eq!(tables.len(), ArtifactKind::all().len());
    }

    #[test]
    fn artifact_kind_serde_snake_case() {
        let json = serde_json::to_string(&ArtifactKind::TestCases).unwrap();
        assert_eq!(json, "\"test_cases\"");
    }

    #[test]
    fn provider_other_flips() {
        assert_eq!(ProviderKind::Anthropic.other(), ProviderKind::OpenAi);
        assert_eq!(ProviderKind::OpenAi.other(), ProviderKind::Anthropic);
    }

    #[test]
    fn provider_parse_is_case_insensitive() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(" Claude ".parse::<ProviderKind>().unwrap(), ProviderKind::Anthropic);
        assert!("gemini".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn provider_serde_uses_openai_spelling() {
        let json = serde_json::to_string(&ProviderKind::OpenAi).unwrap();
        assert_eq!(json, "\"openai\"");
        let parsed: ProviderKind = serde_json::from_str("\"anthropic\"").unwrap();
        assert_eq!(parsed, ProviderKind::Anthropic);
    }

    #[test]
    fn platform_parse_accepts_dashes() {
        assert_eq!(
            "github-actions".parse::<PipelinePlatform>().unwrap(),
            PipelinePlatform::GithubActions
        );
        assert_eq!(PipelinePlatform::Jenkins.config_path(), "Jenkinsfile");
        assert_eq!(PipelinePlatform::Jenkins.syntax(), "groovy");
    }

    #[test]
    fn doc_type_parse() {
        assert_eq!("User Guide".parse::<DocType>().unwrap(), DocType::UserGuide);
        assert!("novel".parse::<DocType>().is_err());
    }

    #[test]
    fn diagram_type_keywords() {
        assert_eq!(DiagramType::Class.keyword(), "classDiagram");
        assert_eq!("ER".parse::<DiagramType>().unwrap(), DiagramType::Er);
    }
}

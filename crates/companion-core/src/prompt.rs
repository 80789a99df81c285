//! Prompt templates, one builder per artifact kind.
//!
//! Builders are pure: the same input always renders the same text. Optional
//! inputs that are empty are left out of the prompt entirely.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::error::{CompanionError, Result};
use crate::types::{DiagramType, DocType, PipelinePlatform};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecificationInput {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesignInput {
    pub specification: String,
    #[serde(default)]
    pub diagram_types: Vec<DiagramType>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeInput {
    #[serde(default)]
    pub specification: Option<String>,
    #[serde(default)]
    pub design: Option<String>,
    pub language: String,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestInput {
    pub code: String,
    pub file_name: String,
    pub language: String,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineInput {
    pub platform: PipelinePlatform,
    pub language: String,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub deploy_target: Option<String>,
    #[serde(default)]
    pub stages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentationInput {
    pub doc_type: DocType,
    pub project_name: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str> {
    let t = value.trim();
    if t.is_empty() {
        return Err(CompanionError::MissingField(field));
    }
    Ok(t)
}

fn section(out: &mut String, heading: &str, body: &str) {
    let _ = write!(out, "\n\n## {heading}\n{}", body.trim());
}

const DEFAULT_STAGES: &[&str] = &["build", "test", "lint", "deploy"];

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn specification(input: &SpecificationInput) -> Result<Prompt> {
    let title = require(&input.title, "title")?;
    let description = require(&input.description, "description")?;

    let mut user = format!(
        "Write a software requirements specification for \"{title}\".\n\n## Overview\n{description}"
    );

    let reqs: Vec<&str> = input
        .requirements
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .collect();
    if !reqs.is_empty() {
        let list = reqs
            .iter()
            .map(|r| format!("- {r}"))
            .collect::<Vec<_>>()
            .join("\n");
        section(&mut user, "Stated requirements", &list);
    }
    if let Some(audience) = present(&input.audience) {
        section(&mut user, "Audience", audience);
    }

    user.push_str(
        "\n\nStructure the document with these Markdown sections: Introduction, \
         Functional Requirements (numbered FR-1, FR-2, ...), Non-Functional Requirements, \
         User Stories with acceptance criteria, Data Requirements, Assumptions, and Out of Scope.",
    );

    Ok(Prompt {
        system: "You are a senior business analyst. You write precise, testable software \
                 specifications in Markdown."
            .to_string(),
        user,
    })
}

pub fn design(input: &DesignInput) -> Result<Prompt> {
    let spec = require(&input.specification, "specification")?;

    let diagrams: Vec<DiagramType> = if input.diagram_types.is_empty() {
        vec![DiagramType::Flowchart, DiagramType::Sequence, DiagramType::Class]
    } else {
        input.diagram_types.clone()
    };

    let mut user = String::from("Produce a software architecture design for the specification below.");
    section(&mut user, "Specification", spec);
    if let Some(notes) = present(&input.notes) {
        section(&mut user, "Design constraints", notes);
    }

    let list = diagrams
        .iter()
        .map(|d| format!("- {} (start the block with `{}`)", d, d.keyword()))
        .collect::<Vec<_>>()
        .join("\n");
    section(&mut user, "Required diagrams", &list);

    user.push_str(
        "\n\nWrite the design in Markdown with sections: Architecture Overview, Components, \
         Data Model, API Design, and Deployment. Put every diagram in its own ```mermaid fenced \
         block. Quote any node label that contains punctuation, close every subgraph with `end`, \
         and put class members inside braces.",
    );

    Ok(Prompt {
        system: "You are a software architect. You explain designs clearly and express \
                 structure as valid Mermaid diagrams."
            .to_string(),
        user,
    })
}

pub fn code(input: &CodeInput) -> Result<Prompt> {
    let language = require(&input.language, "language")?;
    let spec = present(&input.specification);
    let design = present(&input.design);
    let reqs = present(&input.requirements);
    if spec.is_none() && design.is_none() && reqs.is_none() {
        return Err(CompanionError::InvalidInput(
            "code generation needs a specification, a design or requirements".to_string(),
        ));
    }

    let target = match present(&input.framework) {
        Some(fw) => format!("{language} using {fw}"),
        None => language.to_string(),
    };
    let mut user = format!("Implement the following in {target}.");
    if let Some(spec) = spec {
        section(&mut user, "Specification", spec);
    }
    if let Some(design) = design {
        section(&mut user, "Design", design);
    }
    if let Some(reqs) = reqs {
        section(&mut user, "Additional requirements", reqs);
    }
    user.push_str(
        "\n\nReturn production-quality code in a single fenced code block tagged with the \
         language. Include error handling and brief comments on non-obvious logic. Do not add \
         explanations outside the code block.",
    );

    Ok(Prompt {
        system: format!("You are an expert {language} engineer. You write idiomatic, tested code."),
        user,
    })
}

pub fn test_cases(input: &TestInput) -> Result<Prompt> {
    let code = require(&input.code, "code")?;
    let file_name = require(&input.file_name, "fileName")?;
    let language = require(&input.language, "language")?;

    let framework = present(&input.framework)
        .map(str::to_string)
        .unwrap_or_else(|| format!("the standard {language} test framework"));

    let mut user = format!(
        "Write unit tests for `{file_name}` using {framework}.\n\n```{}\n{code}\n```",
        language.to_ascii_lowercase()
    );
    if let Some(reqs) = present(&input.requirements) {
        section(&mut user, "Behaviour to cover", reqs);
    }
    user.push_str(
        "\n\nCover normal cases, edge cases and error paths. Return only the test file in a \
         single fenced code block.",
    );

    Ok(Prompt {
        system: "You are a QA engineer who writes thorough, deterministic automated tests."
            .to_string(),
        user,
    })
}

pub fn pipeline(input: &PipelineInput) -> Result<Prompt> {
    let language = require(&input.language, "language")?;
    let platform = input.platform;

    let stages: Vec<&str> = if input.stages.is_empty() {
        DEFAULT_STAGES.to_vec()
    } else {
        input.stages.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect()
    };

    let mut user = format!(
        "Write a {} pipeline definition (`{}`) for a {language} project",
        platform.display_name(),
        platform.config_path()
    );
    if let Some(fw) = present(&input.framework) {
        let _ = write!(user, " built with {fw}");
    }
    user.push('.');
    section(&mut user, "Stages", &stages.join(", "));
    if let Some(target) = present(&input.deploy_target) {
        section(&mut user, "Deployment target", target);
    }
    let _ = write!(
        user,
        "\n\nUse dependency caching, fail fast on test failures, and keep secrets in the \
         platform's secret store. Return only the file in a single ```{} fenced block.",
        platform.syntax()
    );

    Ok(Prompt {
        system: "You are a DevOps engineer. You write minimal, correct CI/CD configuration."
            .to_string(),
        user,
    })
}

pub fn documentation(input: &DocumentationInput) -> Result<Prompt> {
    let project = require(&input.project_name, "projectName")?;
    let doc_type = input.doc_type;

    let mut user = format!("Write the {} for the project \"{project}\".", doc_type.title());
    if let Some(source) = present(&input.source) {
        section(&mut user, "Source material", source);
    }
    if let Some(audience) = present(&input.audience) {
        section(&mut user, "Audience", audience);
    }

    let outline = match doc_type {
        DocType::Readme => "Overview, Features, Installation, Usage, Configuration, Contributing, License",
        DocType::Api => "Overview, Authentication, Endpoints (method, path, request, response, errors), Examples",
        DocType::UserGuide => "Getting Started, Core Workflows, Troubleshooting, FAQ",
        DocType::Architecture => "Context, Components, Data Flow, Deployment, Decisions",
    };
    section(&mut user, "Outline", outline);
    if doc_type == DocType::Architecture {
        user.push_str("\n\nInclude at least one ```mermaid diagram of the component structure.");
    }
    user.push_str("\n\nRespond in Markdown only.");

    Ok(Prompt {
        system: "You are a technical writer. You produce clear, well-structured Markdown \
                 documentation."
            .to_string(),
        user,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

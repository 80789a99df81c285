//! Prompt → completion → post-process → persist, once per artifact kind.
//!
//! Request types double as the JSON bodies of the generate routes, so field
//! names are camelCase and every field is optional at the serde level; the
//! prompt builders report what is actually missing.

use std::sync::Arc;

use companion_core::config::Config;
use companion_core::extract;
use companion_core::mermaid::{self, Repaired};
use companion_core::prompt::{self, Prompt};
use companion_core::record::{lenient_uuid, NewArtifact, StoredArtifact};
use companion_core::types::{ArtifactKind, DiagramType, DocType, PipelinePlatform, ProviderKind};
use companion_core::CompanionError;
use companion_llm::{Completion, CompletionRequest, FallbackClient};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::ArtifactStore;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpecificationRequest {
    pub title: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub audience: Option<String>,
    pub project_id: Option<String>,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesignRequest {
    pub specification_id: Option<String>,
    pub specification: Option<String>,
    pub diagram_types: Vec<DiagramType>,
    pub notes: Option<String>,
    pub project_id: Option<String>,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CodeRequest {
    pub specification_id: Option<String>,
    pub design_id: Option<String>,
    pub specification: Option<String>,
    pub design: Option<String>,
    pub language: String,
    pub framework: Option<String>,
    pub requirements: Option<String>,
    pub project_id: Option<String>,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestRequest {
    pub code: String,
    pub file_name: String,
    pub language: String,
    pub framework: Option<String>,
    pub requirements: Option<String>,
    pub project_id: Option<String>,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineRequest {
    pub platform: String,
    pub language: String,
    pub framework: Option<String>,
    pub deploy_target: Option<String>,
    pub stages: Vec<String>,
    pub project_id: Option<String>,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentationRequest {
    pub doc_type: String,
    pub project_name: String,
    pub source: Option<String>,
    pub specification_id: Option<String>,
    pub audience: Option<String>,
    pub project_id: Option<String>,
    pub provider: Option<String>,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// One generated artifact. `id` is `None` when persistence failed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Generated {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub kind: ArtifactKind,
    pub content: String,
    pub provider: ProviderKind,
    pub model: String,
    /// Kind-specific fields: `fileName`, `path`, `diagrams`.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct Generator {
    llm: FallbackClient,
    store: Arc<dyn ArtifactStore>,
    config: Arc<Config>,
}

impl Generator {
    pub fn new(llm: FallbackClient, store: Arc<dyn ArtifactStore>, config: Arc<Config>) -> Self {
        Self { llm, store, config }
    }

    pub fn llm(&self) -> &FallbackClient {
        &self.llm
    }

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    pub async fn specification(&self, req: SpecificationRequest) -> anyhow::Result<Generated> {
        let provider = parse_provider(req.provider.as_deref())?;
        let prompt = prompt::specification(&prompt::SpecificationInput {
            title: req.title.clone(),
            description: req.description,
            requirements: req.requirements,
            audience: req.audience,
        })?;

        let done = self.complete(prompt, provider).await?;
        let content = extract::strip_code_fences(&done.text);

        let record = NewArtifact::new(
            ArtifactKind::Specification,
            req.title.trim(),
            &content,
            done.provider.as_str(),
            &done.model,
        )
        .with_project(lenient_uuid("projectId", req.project_id.as_deref()));

        Ok(self.finish(record, done, content, Default::default()).await)
    }

    pub async fn design(&self, req: DesignRequest) -> anyhow::Result<Generated> {
        let provider = parse_provider(req.provider.as_deref())?;
        let spec_id = lenient_uuid("specificationId", req.specification_id.as_deref());
        let stored = self.fetch_required(ArtifactKind::Specification, spec_id).await?;

        let (title, specification) = match (&stored, req.specification) {
            (Some(row), _) => (format!("Design: {}", row.title), row.content.clone()),
            (None, inline) => ("System design".to_string(), inline.unwrap_or_default()),
        };

        let prompt = prompt::design(&prompt::DesignInput {
            specification,
            diagram_types: req.diagram_types.clone(),
            notes: req.notes,
        })?;

        let done = self.complete(prompt, provider).await?;
        let diagrams: Vec<Repaired> = mermaid::extract_all(&done.text)
            .iter()
            .map(|d| mermaid::repair(d))
            .collect();
        let content = mermaid::repair_markdown(done.text.trim());

        let mut extra = serde_json::Map::new();
        extra.insert("diagrams".into(), serde_json::to_value(&diagrams)?);

        let record = NewArtifact::new(
            ArtifactKind::Design,
            title,
            &content,
            done.provider.as_str(),
            &done.model,
        )
        .with_project(lenient_uuid("projectId", req.project_id.as_deref()))
        .with_specification(spec_id)
        .with_metadata(serde_json::json!({
            "diagramTypes": req.diagram_types,
            "diagramCount": diagrams.len(),
        }));

        Ok(self.finish(record, done, content, extra).await)
    }

    pub async fn code(&self, req: CodeRequest) -> anyhow::Result<Generated> {
        let provider = parse_provider(req.provider.as_deref())?;
        let spec_id = lenient_uuid("specificationId", req.specification_id.as_deref());
        let design_id = lenient_uuid("designId", req.design_id.as_deref());

        let (spec, design) = tokio::join!(
            self.fetch_required(ArtifactKind::Specification, spec_id),
            self.fetch_required(ArtifactKind::Design, design_id),
        );
        let specification = spec?.map(|r| r.content).or(req.specification);
        let design = design?.map(|r| r.content).or(req.design);

        let prompt = prompt::code(&prompt::CodeInput {
            specification,
            design,
            language: req.language.clone(),
            framework: req.framework.clone(),
            requirements: req.requirements,
        })?;

        let done = self.complete(prompt, provider).await?;
        let content = extract::first_block_for(&done.text, &req.language);
        let file_name = extract::suggest_file_name(ArtifactKind::Code, &req.language, None);

        let mut extra = serde_json::Map::new();
        extra.insert("fileName".into(), file_name.clone().into());

        let record = NewArtifact::new(
            ArtifactKind::Code,
            format!("{} code", req.language.trim()),
            &content,
            done.provider.as_str(),
            &done.model,
        )
        .with_project(lenient_uuid("projectId", req.project_id.as_deref()))
        .with_specification(spec_id)
        .with_design(design_id)
        .with_metadata(serde_json::json!({
            "language": req.language.trim(),
            "framework": req.framework,
            "fileName": file_name,
        }));

        Ok(self.finish(record, done, content, extra).await)
    }

    pub async fn test_cases(&self, req: TestRequest) -> anyhow::Result<Generated> {
        let provider = parse_provider(req.provider.as_deref())?;
        let prompt = prompt::test_cases(&prompt::TestInput {
            code: req.code,
            file_name: req.file_name.clone(),
            language: req.language.clone(),
            framework: req.framework.clone(),
            requirements: req.requirements,
        })?;

        let done = self.complete(prompt, provider).await?;
        let content = extract::first_block_for(&done.text, &req.language);
        let file_name = extract::suggest_file_name(
            ArtifactKind::TestCases,
            &req.language,
            Some(req.file_name.trim()),
        );

        let mut extra = serde_json::Map::new();
        extra.insert("fileName".into(), file_name.clone().into());

        let record = NewArtifact::new(
            ArtifactKind::TestCases,
            format!("Tests for {}", req.file_name.trim()),
            &content,
            done.provider.as_str(),
            &done.model,
        )
        .with_project(lenient_uuid("projectId", req.project_id.as_deref()))
        .with_metadata(serde_json::json!({
            "language": req.language.trim(),
            "framework": req.framework,
            "sourceFile": req.file_name.trim(),
            "fileName": file_name,
        }));

        Ok(self.finish(record, done, content, extra).await)
    }

    pub async fn pipeline(&self, req: PipelineRequest) -> anyhow::Result<Generated> {
        let provider = parse_provider(req.provider.as_deref())?;
        if req.platform.trim().is_empty() {
            return Err(CompanionError::MissingField("platform").into());
        }
        let platform: PipelinePlatform = req.platform.parse()?;

        let prompt = prompt::pipeline(&prompt::PipelineInput {
            platform,
            language: req.language.clone(),
            framework: req.framework,
            deploy_target: req.deploy_target,
            stages: req.stages,
        })?;

        let done = self.complete(prompt, provider).await?;
        let content = extract::first_block_for(&done.text, platform.syntax());

        let mut extra = serde_json::Map::new();
        extra.insert("path".into(), platform.config_path().into());

        let record = NewArtifact::new(
            ArtifactKind::Pipeline,
            format!("{} pipeline", platform.display_name()),
            &content,
            done.provider.as_str(),
            &done.model,
        )
        .with_project(lenient_uuid("projectId", req.project_id.as_deref()))
        .with_metadata(serde_json::json!({
            "platform": platform,
            "language": req.language.trim(),
            "path": platform.config_path(),
        }));

        Ok(self.finish(record, done, content, extra).await)
    }

    pub async fn documentation(&self, req: DocumentationRequest) -> anyhow::Result<Generated> {
        let provider = parse_provider(req.provider.as_deref())?;
        if req.doc_type.trim().is_empty() {
            return Err(CompanionError::MissingField("docType").into());
        }
        let doc_type: DocType = req.doc_type.parse()?;

        let spec_id = lenient_uuid("specificationId", req.specification_id.as_deref());
        let source = match present(req.source) {
            Some(s) => Some(s),
            None => self
                .fetch_required(ArtifactKind::Specification, spec_id)
                .await?
                .map(|r| r.content),
        };

        let prompt = prompt::documentation(&prompt::DocumentationInput {
            doc_type,
            project_name: req.project_name.clone(),
            source,
            audience: req.audience,
        })?;

        let done = self.complete(prompt, provider).await?;
        let mut content = extract::strip_code_fences(&done.text);
        if doc_type == DocType::Architecture {
            content = mermaid::repair_markdown(&content);
        }

        let record = NewArtifact::new(
            ArtifactKind::Documentation,
            format!("{}: {}", req.project_name.trim(), doc_type.title()),
            &content,
            done.provider.as_str(),
            &done.model,
        )
        .with_project(lenient_uuid("projectId", req.project_id.as_deref()))
        .with_specification(spec_id)
        .with_metadata(serde_json::json!({ "docType": doc_type }));

        Ok(self.finish(record, done, content, Default::default()).await)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn complete(
        &self,
        prompt: Prompt,
        provider: Option<ProviderKind>,
    ) -> Result<Completion, companion_llm::LlmError> {
        let llm = &self.config.llm;
        let request = CompletionRequest::from_prompt(prompt, llm.max_tokens, llm.temperature);
        self.llm.complete(&request, provider).await
    }

    /// Load a referenced row. No id means `None`; an id with no row is a
    /// not-found error.
    async fn fetch_required(
        &self,
        kind: ArtifactKind,
        id: Option<Uuid>,
    ) -> anyhow::Result<Option<StoredArtifact>> {
        let Some(id) = id else {
            return Ok(None);
        };
        match self.store.fetch(kind, id).await? {
            Some(row) => Ok(Some(row)),
            None => Err(CompanionError::ArtifactNotFound {
                kind: kind.to_string(),
                id: id.to_string(),
            }
            .into()),
        }
    }

    /// Persist best-effort and assemble the result.
    async fn finish(
        &self,
        record: NewArtifact,
        done: Completion,
        content: String,
        extra: serde_json::Map<String, serde_json::Value>,
    ) -> Generated {
        let kind = record.kind;
        let id = match self.store.insert(record).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(%kind, error = %e, "failed to save artifact (non-critical)");
                None
            }
        };
        tracing::info!(
            %kind,
            provider = %done.provider,
            tokens = done.usage.total_tokens(),
            saved = id.is_some(),
            "artifact generated"
        );
        Generated {
            id,
            kind,
            content,
            provider: done.provider,
            model: done.model,
            extra,
        }
    }
}

fn parse_provider(raw: Option<&str>) -> Result<Option<ProviderKind>, CompanionError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse().map(Some),
        None => Ok(None),
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

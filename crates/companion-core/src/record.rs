use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ArtifactKind;

/// A generated artifact ready to be written to its table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArtifact {
    pub kind: ArtifactKind,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub specification_id: Option<Uuid>,
    #[serde(default)]
    pub design_id: Option<Uuid>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub provider: String,
    pub model: String,
}

impl NewArtifact {
    pub fn new(
        kind: ArtifactKind,
        title: impl Into<String>,
        content: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            content: content.into(),
            project_id: None,
            specification_id: None,
            design_id: None,
            metadata: serde_json::Value::Object(Default::default()),
            provider: provider.into(),
            model: model.into(),
        }
    }

    pub fn with_project(mut self, project_id: Option<Uuid>) -> Self {
        self.project_id = project_id;
        self
    }

    pub fn with_specification(mut self, specification_id: Option<Uuid>) -> Self {
        self.specification_id = specification_id;
        self
    }

    pub fn with_design(mut self, design_id: Option<Uuid>) -> Self {
        self.design_id = design_id;
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attach an id and timestamp, producing the stored shape.
    pub fn into_stored(self, id: Uuid, created_at: DateTime<Utc>) -> StoredArtifact {
        StoredArtifact {
            id,
            kind: self.kind,
            title: self.title,
            content: self.content,
            project_id: self.project_id,
            specification_id: self.specification_id,
            design_id: self.design_id,
            metadata: self.metadata,
            provider: self.provider,
            model: self.model,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredArtifact {
    pub id: Uuid,
    pub kind: ArtifactKind,
    pub title: String,
    pub content: String,
    pub project_id: Option<Uuid>,
    pub specification_id: Option<Uuid>,
    pub design_id: Option<Uuid>,
    pub metadata: serde_json::Value,
    pub provider: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

/// Parse an optional foreign-key string.
///
/// Blank or malformed values map to `None` so the column is written as NULL
/// instead of failing the whole request.
pub fn lenient_uuid(field: &str, raw: Option<&str>) -> Option<Uuid> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match Uuid::parse_str(raw) {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::warn!(field, value = raw, "ignoring malformed uuid: {e}");
            None
        }
    }
}

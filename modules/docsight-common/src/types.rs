use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Uploads
// =============================================================================

/// Where the bytes of an upload live. Paths are read lazily by the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileBody {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// A file chosen for analysis. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    name: String,
    media_type: String,
    size: u64,
    body: FileBody,
}

impl UploadedFile {
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: bytes.len() as u64,
            body: FileBody::Bytes(bytes),
        }
    }

    /// `size` is the declared length; the encoder fails if the file on disk
    /// yields a different number of bytes.
    pub fn from_path(
        name: impl Into<String>,
        media_type: impl Into<String>,
        path: impl Into<PathBuf>,
        size: u64,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size,
            body: FileBody::Path(path.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn body(&self) -> &FileBody {
        &self.body
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.body {
            FileBody::Path(p) => Some(p),
            FileBody::Bytes(_) => None,
        }
    }
}

/// Base64 content (no data-URL prefix) paired with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    pub content: String,
    pub media_type: String,
}

// =============================================================================
// Service results
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub translated_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechResult {
    pub audio_url: String,
}

/// What one pipeline run produces before it is turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub extraction: ExtractionResult,
    pub explanation: String,
}

// =============================================================================
// Analysis record
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
    Unclear,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Risk {
    pub id: String,
    pub level: RiskLevel,
    pub title: String,
    pub description: String,
    pub impact: String,
    pub suggestion: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyTerm {
    pub term: String,
    pub explanation: String,
    pub importance: Importance,
    pub related_clauses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clause {
    pub id: String,
    pub title: String,
    pub content: String,
    pub risk_level: RiskLevel,
    pub explanation: String,
    pub alternatives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceCheck {
    pub regulation: String,
    pub status: ComplianceStatus,
    pub details: String,
}

/// Which summary variant to surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryMode {
    #[default]
    Simple,
    Detailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub simple: String,
    pub detailed: String,
}

impl Summary {
    pub fn get(&self, mode: SummaryMode) -> &str {
        match mode {
            SummaryMode::Simple => &self.simple,
            SummaryMode::Detailed => &self.detailed,
        }
    }
}

/// Result of one successful analysis. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: String,
    pub file_name: String,
    pub upload_date: DateTime<Utc>,
    pub summary: Summary,
    pub risks: Vec<Risk>,
    pub key_terms: Vec<KeyTerm>,
    pub risk_score: f64,
    pub document_type: String,
    pub clauses: Vec<Clause>,
    pub recommendations: Vec<String>,
    pub legal_compliance: Vec<ComplianceCheck>,
}

impl AnalysisRecord {
    /// Risk, term and compliance fields are left empty; only the summary is
    /// populated from the run.
    pub fn assemble(file: &UploadedFile, analysis: &DocumentAnalysis, at: DateTime<Utc>) -> Self {
        Self {
            id: format!("{}{}", file.name(), at.timestamp_millis()),
            file_name: file.name().to_string(),
            upload_date: at,
            summary: Summary {
                simple: analysis.extraction.text.clone(),
                detailed: analysis.explanation.clone(),
            },
            risks: Vec::new(),
            key_terms: Vec::new(),
            risk_score: 0.0,
            document_type: file.media_type().to_string(),
            clauses: Vec::new(),
            recommendations: Vec::new(),
            legal_compliance: Vec::new(),
        }
    }
}

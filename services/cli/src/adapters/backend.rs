//! services/cli/src/adapters/backend.rs
//!
//! HTTP adapter for the interview backend. One client implements every
//! backend-facing port; raw payloads are parsed into loose records here and
//! validated into domain types before they leave this module.

use std::time::Duration;

use async_trait::async_trait;
use jobprep_core::domain::{
    CvAnalysis, Flashcard, FlashcardRequest, FlashcardSet, InterviewSummary, Job,
    LearningRoadmap, Message,
};
use jobprep_core::ports::{
    ConversationService, CvAnalysisService, FlashcardService, JobMatchingService, PortError,
    PortResult,
};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

const MATCH_JOBS_ENDPOINT: &str = "/api/match-jobs";
const EXTRACT_PDF_ENDPOINT: &str = "/api/extract-pdf";
const CONVERSATION_ENDPOINT: &str = "/api/conversation";
const FLASHCARDS_ENDPOINT: &str = "/api/generate-flashcards";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn post_json<T, R>(&self, endpoint: &str, payload: &T) -> PortResult<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(endpoint);
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        read_json(response).await
    }
}

/// Decodes a success body, or turns an error status into a port error.
async fn read_json<R: DeserializeOwned>(response: reqwest::Response) -> PortResult<R> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| PortError::Transport(e.to_string()))?;

    if !status.is_success() {
        let detail = serde_json::from_str::<ErrorRecord>(&body)
            .ok()
            .and_then(|record| record.error)
            .unwrap_or(body);
        warn!("Backend returned {}: {}", status, detail);
        return Err(PortError::Unexpected(format!("HTTP {}: {}", status, detail)));
    }

    serde_json::from_str(&body).map_err(|e| PortError::InvalidResponse(e.to_string()))
}

//=========================================================================================
// "Loose" Wire Records
//=========================================================================================

#[derive(Deserialize)]
struct ErrorRecord {
    error: Option<String>,
}

#[derive(Serialize)]
struct MatchJobsRequest<'a> {
    profile_text: &'a str,
    job_keyword: &'a str,
}

#[derive(Deserialize)]
struct MatchJobsResponse {
    #[serde(default)]
    matches: Option<Vec<JobRecord>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct JobRecord {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    salary_range: Option<String>,
    #[serde(default)]
    employment_type: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    required_skills: Option<Vec<String>>,
}
impl JobRecord {
    fn to_domain(self) -> PortResult<Job> {
        let id = id_to_string(&self.id)
            .ok_or_else(|| PortError::InvalidResponse("job without an id".to_string()))?;
        Ok(Job {
            id,
            title: self.title.unwrap_or_default(),
            company: self.company.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            salary_range: self.salary_range.unwrap_or_default(),
            employment_type: self.employment_type.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            required_skills: self.required_skills.unwrap_or_default(),
        })
    }
}

#[derive(Serialize)]
struct ConversationRequest<'a> {
    job: &'a Job,
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct MessageRecord {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    message: String,
    #[serde(rename = "isUser", default)]
    is_user: bool,
    #[serde(rename = "endSummary", default)]
    end_summary: Option<Value>,
}
impl MessageRecord {
    fn to_domain(self) -> PortResult<Message> {
        let end_summary = match self.end_summary {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) if map.is_empty() => None,
            Some(value @ Value::Object(_)) => {
                let record: SummaryRecord = serde_json::from_value(value)
                    .map_err(|e| PortError::InvalidResponse(format!("endSummary: {e}")))?;
                Some(record.to_domain())
            }
            Some(other) => {
                return Err(PortError::InvalidResponse(format!(
                    "endSummary must be an object, got {other}"
                )))
            }
        };
        Ok(Message {
            id: id_to_string(&self.id).unwrap_or_else(|| Uuid::new_v4().to_string()),
            text: self.message,
            is_user: self.is_user,
            end_summary,
        })
    }
}

#[derive(Deserialize)]
struct SummaryRecord {
    passed: bool,
    rating: f64,
    #[serde(default)]
    improvements: Vec<String>,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    learning_roadmap: Option<Value>,
    #[serde(default)]
    flashcard_set: Option<Value>,
}
impl SummaryRecord {
    /// Only `passed` and `rating` are load-bearing; a malformed roadmap or
    /// embedded set is dropped instead of failing the whole summary.
    fn to_domain(self) -> InterviewSummary {
        InterviewSummary {
            passed: self.passed,
            rating: self.rating.round().clamp(0.0, 100.0) as u8,
            improvements: self.improvements,
            summary: self.summary,
            learning_roadmap: optional_part::<LearningRoadmap>(
                "learning_roadmap",
                self.learning_roadmap,
            ),
            flashcard_set: optional_part::<FlashcardSetRecord>(
                "flashcard_set",
                self.flashcard_set,
            )
            .map(FlashcardSetRecord::to_domain),
        }
    }
}

fn optional_part<T: DeserializeOwned>(field: &str, value: Option<Value>) -> Option<T> {
    match value {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value(value) {
            Ok(part) => Some(part),
            Err(e) => {
                warn!("Dropping malformed {} from endSummary: {}", field, e);
                None
            }
        },
    }
}

#[derive(Deserialize)]
struct FlashcardSetRecord {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    cards: Vec<CardRecord>,
}
impl FlashcardSetRecord {
    fn to_domain(self) -> FlashcardSet {
        let cards = self
            .cards
            .into_iter()
            .enumerate()
            .map(|(i, card)| Flashcard {
                id: id_to_string(&card.id).unwrap_or_else(|| format!("card-{i}")),
                front: card.front,
                back: card.back,
            })
            .collect();
        FlashcardSet {
            id: id_to_string(&self.id).unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: self.title,
            description: self.description,
            cards,
        }
    }
}

#[derive(Deserialize)]
struct CardRecord {
    #[serde(default)]
    id: Value,
    front: String,
    back: String,
}

#[derive(Deserialize)]
struct ExtractPdfResponse {
    #[serde(default)]
    analysis: Option<AnalysisRecord>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct AnalysisRecord {
    #[serde(default)]
    user_summary: Option<String>,
}

/// Ids arrive as strings or numbers.
fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

//=========================================================================================
// Port Implementations
//=========================================================================================

#[async_trait]
impl ConversationService for BackendClient {
    async fn next_message(&self, job: &Job, transcript: &[Message]) -> PortResult<Message> {
        let request = ConversationRequest {
            job,
            messages: transcript,
        };
        let record: MessageRecord = self.post_json(CONVERSATION_ENDPOINT, &request).await?;
        let message = record.to_domain()?;
        if message.is_terminal() {
            info!("Interview for job {} ended by the backend", job.id);
        }
        Ok(message)
    }
}

#[async_trait]
impl JobMatchingService for BackendClient {
    async fn match_jobs(&self, profile_text: &str, job_keyword: &str) -> PortResult<Vec<Job>> {
        let request = MatchJobsRequest {
            profile_text,
            job_keyword,
        };
        let response: MatchJobsResponse = self.post_json(MATCH_JOBS_ENDPOINT, &request).await?;
        if let Some(error) = response.error {
            return Err(PortError::Unexpected(error));
        }
        let jobs = response
            .matches
            .unwrap_or_default()
            .into_iter()
            .map(JobRecord::to_domain)
            .collect::<PortResult<Vec<_>>>()?;
        info!("Matched {} jobs for '{}'", jobs.len(), job_keyword);
        Ok(jobs)
    }
}

#[async_trait]
impl CvAnalysisService for BackendClient {
    async fn analyze_cv(
        &self,
        file_name: &str,
        pdf: &[u8],
        job_keyword: &str,
    ) -> PortResult<CvAnalysis> {
        let part = Part::bytes(pdf.to_vec())
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let form = Form::new()
            .part("pdf_file", part)
            .text("job_keyword", job_keyword.to_string());

        let url = self.url(EXTRACT_PDF_ENDPOINT);
        info!("Uploading CV {} for extraction", file_name);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        let extracted: ExtractPdfResponse = read_json(response).await?;

        if let Some(error) = extracted.error {
            return Err(PortError::Unexpected(format!("PDF extraction error: {error}")));
        }
        Ok(CvAnalysis {
            user_summary: extracted.analysis.and_then(|a| a.user_summary),
            text: extracted.text.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl FlashcardService for BackendClient {
    async fn generate_flashcards(&self, request: &FlashcardRequest) -> PortResult<FlashcardSet> {
        let record: FlashcardSetRecord = self.post_json(FLASHCARDS_ENDPOINT, request).await?;
        Ok(record.to_domain())
    }
}

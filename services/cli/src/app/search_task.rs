//! services/cli/src/app/search_task.rs
//!
//! Job search: validate the form, build a profile (from the CV when one is
//! attached), match jobs, and remember the search.

use chrono::Utc;
use jobprep_core::domain::Job;
use jobprep_core::search::{JobSearchForm, SearchEntry, SearchHistory, SearchPlan};
use tracing::{error, info, warn};

use crate::app::state::AppState;
use crate::error::ClientError;

/// Runs one search. An invalid form returns its field errors without any
/// network call.
pub async fn search_jobs(
    state: &AppState,
    form: JobSearchForm,
    history: &mut SearchHistory,
) -> Result<Vec<Job>, ClientError> {
    let plan = form.validate()?;
    let used_cv = plan.uses_cv();
    let position = plan.job_keyword().to_string();

    let (profile_text, job_keyword) = match plan {
        SearchPlan::Profile {
            profile_text,
            job_keyword,
        } => (profile_text, job_keyword),
        SearchPlan::Cv {
            upload,
            job_keyword,
        } => {
            info!("Extracting profile from {}", upload.file_name);
            let analysis = state
                .cv_analyzer
                .analyze_cv(&upload.file_name, &upload.bytes, &job_keyword)
                .await
                .map_err(|e| {
                    error!("CV extraction failed: {:?}", e);
                    ClientError::from(e)
                })?;
            (analysis.profile_text(), job_keyword)
        }
    };

    let jobs = state
        .matcher
        .match_jobs(&profile_text, &job_keyword)
        .await
        .map_err(|e| {
            error!("Job matching failed: {:?}", e);
            ClientError::from(e)
        })?;

    for job in &jobs {
        if let Err(e) = state.db.upsert_job(job).await {
            warn!("Failed to store job {}: {}", job.id, e);
        }
    }

    history.add(SearchEntry {
        position,
        used_cv,
        result_count: jobs.len(),
        searched_at: Utc::now(),
    });
    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::{app_state, job, FakeBackend, FakeDb};
    use jobprep_core::domain::CvAnalysis;
    use jobprep_core::search::CvUpload;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    #[tokio::test]
    async fn empty_form_reports_both_fields_without_calls() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(FakeBackend::default());
        let state = app_state(dir.path(), Arc::new(FakeDb::default()), backend.clone());
        let mut history = SearchHistory::default();

        let err = search_jobs(&state, JobSearchForm::default(), &mut history)
            .await
            .unwrap_err();
        match err {
            ClientError::SearchForm(errors) => {
                assert_eq!(
                    errors.position.as_deref(),
                    Some("Position field cannot be empty")
                );
                assert_eq!(
                    errors.experience.as_deref(),
                    Some("Experience field cannot be empty")
                );
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(backend.match_calls.lock().unwrap().is_empty());
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn experience_is_the_profile_and_jobs_are_stored() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(FakeDb::default());
        let backend = Arc::new(FakeBackend::default());
        *backend.matches.lock().unwrap() = vec![job()];
        let state = app_state(dir.path(), db.clone(), backend.clone());
        let mut history = SearchHistory::default();

        let form = JobSearchForm {
            position: "Backend".into(),
            experience: "6 years of Rust".into(),
            cv: None,
        };
        let jobs = search_jobs(&state, form, &mut history).await.unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(
            backend.match_calls.lock().unwrap()[0],
            ("6 years of Rust".to_string(), "Backend".to_string())
        );
        assert!(db.job("job-7").is_some());
        let entry = history.entries().next().unwrap();
        assert_eq!((entry.position.as_str(), entry.used_cv, entry.result_count), ("Backend", false, 1));
    }

    #[tokio::test]
    async fn cv_summary_becomes_the_profile() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(FakeBackend::default());
        *backend.cv.lock().unwrap() = Some(CvAnalysis {
            user_summary: Some("Seasoned data engineer".into()),
            text: "raw".into(),
        });
        let state = app_state(dir.path(), Arc::new(FakeDb::default()), backend.clone());
        let mut history = SearchHistory::default();

        let form = JobSearchForm {
            position: String::new(),
            experience: String::new(),
            cv: Some(CvUpload {
                file_name: "cv.pdf".into(),
                bytes: b"%PDF-1.7".to_vec(),
            }),
        };
        search_jobs(&state, form, &mut history).await.unwrap();

        assert_eq!(backend.cv_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            backend.match_calls.lock().unwrap()[0].0,
            "Seasoned data engineer"
        );
        assert!(history.entries().next().unwrap().used_cv);
    }

    #[tokio::test]
    async fn non_pdf_cv_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(FakeBackend::default());
        let state = app_state(dir.path(), Arc::new(FakeDb::default()), backend.clone());

        let form = JobSearchForm {
            position: "Dev".into(),
            experience: String::new(),
            cv: Some(CvUpload {
                file_name: "cv.docx".into(),
                bytes: b"PK".to_vec(),
            }),
        };
        let err = search_jobs(&state, form, &mut SearchHistory::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Please upload a PDF file only");
        assert_eq!(backend.cv_calls.load(Ordering::SeqCst), 0);
    }
}

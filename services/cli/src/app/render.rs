//! services/cli/src/app/render.rs
//!
//! Plain-text views. Every function returns the text so the tasks decide where
//! it goes.

use std::fmt::Write;

use jobprep_core::domain::{InterviewSummary, Job, LearningRoadmap, Message, SavedInterview};
use jobprep_core::progress::{ProgressReport, Trend};
use jobprep_core::review::{ConfidenceTally, FlashcardReview};
use jobprep_core::save::SaveStatus;
use jobprep_core::search::SearchHistory;
use jobprep_core::summary::{badge, bar_fill, RatingBand};

const BAR_WIDTH: usize = 20;
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn rating_bar(rating: u8) -> String {
    let filled = bar_fill(rating, BAR_WIDTH);
    format!(
        "[{}{}] {}/100 ({})",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        rating,
        RatingBand::from_rating(rating).label()
    )
}

pub fn message(message: &Message) -> String {
    let speaker = if message.is_user { "You" } else { "Interviewer" };
    format!("{speaker}: {}", message.text)
}

pub fn transcript(messages: &[Message]) -> String {
    messages.iter().map(message).collect::<Vec<_>>().join("\n")
}

pub fn summary(summary: &InterviewSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Interview Summary: {} ===", badge(summary.passed));
    let _ = writeln!(out, "Rating: {}", rating_bar(summary.rating));
    if !summary.summary.is_empty() {
        let _ = writeln!(out, "\n{}", summary.summary);
    }
    if !summary.improvements.is_empty() {
        let _ = writeln!(out, "\nAreas to improve:");
        for item in &summary.improvements {
            let _ = writeln!(out, "  - {item}");
        }
    }
    if let Some(roadmap) = &summary.learning_roadmap {
        out.push('\n');
        out.push_str(&self::roadmap(roadmap));
    }
    out
}

pub fn roadmap(roadmap: &LearningRoadmap) -> String {
    let mut out = String::from("Learning roadmap\n");
    if !roadmap.key_areas.is_empty() {
        let _ = writeln!(out, "  Focus on: {}", roadmap.key_areas.join(", "));
    }
    for resource in &roadmap.resources {
        let _ = writeln!(
            out,
            "  * {} [{} / {}]: {}",
            resource.title, resource.kind, resource.difficulty, resource.description
        );
        if let Some(url) = &resource.url {
            let _ = writeln!(out, "    {url}");
        }
    }
    if !roadmap.suggested_timeline.is_empty() {
        let _ = writeln!(out, "  Timeline: {}", roadmap.suggested_timeline);
    }
    out
}

pub fn save_status(status: &SaveStatus) -> Option<String> {
    match status {
        SaveStatus::Idle => None,
        SaveStatus::InFlight(_) => Some("Saving...".to_string()),
        SaveStatus::Saved { interview_id } => Some(format!("Saved as {interview_id}")),
        SaveStatus::Failed { error } => Some(format!("Failed to save interview: {error}")),
    }
}

pub fn job_list(jobs: &[Job]) -> String {
    if jobs.is_empty() {
        return "No matching jobs found.".to_string();
    }
    let mut out = String::new();
    for (i, job) in jobs.iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {} at {} [{}]", i + 1, job.title, job.company, job.id);
        let details: Vec<&str> = [&job.location, &job.employment_type, &job.salary_range]
            .into_iter()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .collect();
        if !details.is_empty() {
            let _ = writeln!(out, "    {}", details.join(" | "));
        }
        if !job.required_skills.is_empty() {
            let _ = writeln!(out, "    Skills: {}", job.required_skills.join(", "));
        }
    }
    out
}

pub fn interview_list(interviews: &[SavedInterview]) -> String {
    if interviews.is_empty() {
        return "No saved interviews yet.".to_string();
    }
    let mut out = String::new();
    for interview in interviews {
        let _ = writeln!(
            out,
            "{}  {} at {}  {}  {}/100  {}",
            interview.date.format(DATE_FORMAT),
            interview.job_title,
            interview.company,
            badge(interview.summary.passed),
            interview.summary.rating,
            interview.id
        );
    }
    out
}

pub fn search_history(history: &SearchHistory) -> String {
    if history.is_empty() {
        return "No recent searches.".to_string();
    }
    let mut out = String::new();
    for entry in history.entries() {
        let source = if entry.used_cv { "CV" } else { "profile" };
        let _ = writeln!(
            out,
            "{}  {} ({}, {} results)",
            entry.searched_at.format(DATE_FORMAT),
            if entry.position.is_empty() { "(any position)" } else { entry.position.as_str() },
            source,
            entry.result_count
        );
    }
    out
}

pub fn card(review: &FlashcardReview) -> String {
    let Some(card) = review.current() else {
        return tally(&review.tally());
    };
    let (position, total) = review.position();
    let mut out = format!("[{position}/{total}] {}\n", card.front);
    if review.is_flipped() {
        let _ = writeln!(out, "  -> {}", card.back);
    }
    out
}

pub fn tally(tally: &ConfidenceTally) -> String {
    format!(
        "Review complete: {} high, {} medium, {} low, {} skipped (of {})",
        tally.high, tally.medium, tally.low, tally.skipped, tally.total
    )
}

pub fn progress(report: &ProgressReport) -> String {
    let Some(pass_rate) = report.pass_rate() else {
        return "No interviews yet. Finish one to start tracking your progress.".to_string();
    };
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Sessions: {}  Passed: {}  Pass rate: {:.0}%",
        report.sessions(),
        report.passed,
        pass_rate
    );
    if let (Some(best), Some(latest)) = (report.best, report.latest) {
        let _ = writeln!(out, "Best: {best}/100  Latest: {latest}/100");
    }
    out.push('\n');

    let trends = report.segments();
    for (i, point) in report.points.iter().enumerate() {
        let arrow = match i.checked_sub(1).and_then(|j| trends.get(j)) {
            Some(Trend::Up) => "^",
            Some(Trend::Down) => "v",
            None => " ",
        };
        let _ = writeln!(
            out,
            "#{:<3} {}  {:>3}  avg {:>5.1} {}",
            point.session,
            point.date.format("%Y-%m-%d"),
            point.score,
            point.average,
            arrow
        );
    }
    out
}

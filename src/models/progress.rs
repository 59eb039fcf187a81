// src/models/progress.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// DTO for marking a chapter complete.
#[derive(Debug, Deserialize)]
pub struct MarkChapterCompleteRequest {
    pub student_id: i64,
    pub course_id: i64,
    pub chapter_id: i64,
}

/// Completion gate verdict consumed by certificate issuance.
///
/// `completed_at` stays null for a course without chapters, since no chapter
/// mark ever stamps it; certificates then date from `enrolled_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Eligibility {
    pub eligible: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub enrolled_at: Option<DateTime<Utc>>,
    pub completed_chapters: i64,
    pub total_chapters: i64,
}

// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Weekly insight reports
//!
//! A report always carries deterministic statistics computed locally. The
//! narrative part (summary, patterns, recommendations) comes from the
//! text-generation service when it answers with a valid response, and from a
//! template built on the statistics otherwise. Enrichment failures are logged
//! and absorbed; [`WeeklyInsightGenerator::generate`] cannot fail.

use super::difficulty::classify;
use super::enrichment::{
    parse_insight_response, AiInsights, ChallengeSummary, EnrichmentError, EnrichmentRequest,
    NoteExcerpt, TextGenerationClient,
};
use crate::config::environment::EnrichmentConfig;
use crate::constants::insights::{
    DEFAULT_EXCERPT_CHARS, DEFAULT_MAX_NOTES, PATTERNS_MAX, PATTERNS_MIN, RECOMMENDATIONS_MAX,
    RECOMMENDATIONS_MIN,
};
use crate::logging::AppLogger;
use crate::models::{ChallengeRecord, ReflectionNote};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;
use uuid::Uuid;

/// Tone of a behavioral pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    Positive,
    Negative,
    Neutral,
}

/// A behavioral pattern noticed over the week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightPattern {
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
    pub title: String,
    pub description: String,
}

/// A suggestion for the coming week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
}

/// Deterministic weekly statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightStats {
    pub total_reflections: usize,
    pub total_challenges: usize,
    pub completed_challenges: usize,
    /// Whole percent, 0 when there were no challenges
    pub completion_rate: u32,
    pub total_points_earned: i64,
}

impl InsightStats {
    pub fn compute(notes: &[ReflectionNote], challenges: &[ChallengeRecord]) -> Self {
        let completed: Vec<&ChallengeRecord> = challenges.iter().filter(|c| c.completed).collect();

        let completion_rate = if challenges.is_empty() {
            0
        } else {
            (completed.len() as f64 * 100.0 / challenges.len() as f64).round() as u32
        };

        Self {
            total_reflections: notes.len(),
            total_challenges: challenges.len(),
            completed_challenges: completed.len(),
            completion_rate,
            total_points_earned: completed
                .iter()
                .fold(0i64, |total, c| total.saturating_add(c.points)),
        }
    }
}

/// Weekly report returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyInsightReport {
    pub summary: String,
    pub patterns: Vec<InsightPattern>,
    pub recommendations: Vec<Recommendation>,
    pub stats: InsightStats,
    /// Whether the narrative came from the text-generation service
    pub enriched: bool,
    pub generated_at: DateTime<Utc>,
}

impl WeeklyInsightReport {
    fn enriched(insights: AiInsights, stats: InsightStats) -> Self {
        Self {
            summary: insights.summary,
            patterns: insights.patterns,
            recommendations: insights.recommendations,
            stats,
            enriched: true,
            generated_at: Utc::now(),
        }
    }

    fn fallback(stats: InsightStats) -> Self {
        Self {
            summary: fallback_summary(&stats),
            patterns: Vec::new(),
            recommendations: Vec::new(),
            stats,
            enriched: false,
            generated_at: Utc::now(),
        }
    }
}

/// Prompt size limits
#[derive(Debug, Clone)]
pub struct InsightGeneratorConfig {
    /// Characters kept from each reflection
    pub excerpt_chars: usize,
    /// Most recent reflections included in the prompt
    pub max_notes: usize,
}

impl Default for InsightGeneratorConfig {
    fn default() -> Self {
        Self {
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
            max_notes: DEFAULT_MAX_NOTES,
        }
    }
}

impl From<&EnrichmentConfig> for InsightGeneratorConfig {
    fn from(config: &EnrichmentConfig) -> Self {
        Self {
            excerpt_chars: config.excerpt_chars,
            max_notes: config.max_notes,
        }
    }
}

/// Builds weekly reports from a week of reflections and challenges
pub struct WeeklyInsightGenerator {
    client: Option<Arc<dyn TextGenerationClient>>,
    config: InsightGeneratorConfig,
}

impl WeeklyInsightGenerator {
    /// Create a generator backed by a text-generation client
    pub fn new(client: Arc<dyn TextGenerationClient>) -> Self {
        Self {
            client: Some(client),
            config: InsightGeneratorConfig::default(),
        }
    }

    /// Create a generator that only produces deterministic reports
    pub fn without_enrichment() -> Self {
        Self {
            client: None,
            config: InsightGeneratorConfig::default(),
        }
    }

    pub fn with_config(
        client: Option<Arc<dyn TextGenerationClient>>,
        config: InsightGeneratorConfig,
    ) -> Self {
        Self { client, config }
    }

    /// Whether a text-generation client is attached
    pub fn has_enrichment(&self) -> bool {
        self.client.is_some()
    }

    /// Generate the weekly report. Always returns a report with correct stats.
    pub async fn generate(
        &self,
        notes: &[ReflectionNote],
        challenges: &[ChallengeRecord],
    ) -> WeeklyInsightReport {
        let request_id = Uuid::new_v4();
        let stats = InsightStats::compute(notes, challenges);
        let start = Instant::now();

        let report = match self.enrich(notes, challenges, &stats).await {
            Ok(insights) => {
                AppLogger::log_enrichment_outcome(
                    &request_id,
                    self.service_name(),
                    true,
                    start.elapsed().as_millis() as u64,
                    None,
                );
                WeeklyInsightReport::enriched(insights, stats)
            }
            Err(e) => {
                warn!(
                    request.id = %request_id,
                    error = %e,
                    "Weekly insight enrichment failed, using deterministic summary"
                );
                AppLogger::log_enrichment_outcome(
                    &request_id,
                    self.service_name(),
                    false,
                    start.elapsed().as_millis() as u64,
                    Some(e.reason()),
                );
                WeeklyInsightReport::fallback(stats)
            }
        };

        AppLogger::log_report_generated(&request_id, &report.stats, report.enriched);
        report
    }

    async fn enrich(
        &self,
        notes: &[ReflectionNote],
        challenges: &[ChallengeRecord],
        stats: &InsightStats,
    ) -> Result<AiInsights, EnrichmentError> {
        let client = self.client.as_ref().ok_or(EnrichmentError::NotConfigured)?;
        let request = self.build_request(notes, challenges, stats);
        let body = client.generate(&request).await?;
        parse_insight_response(&body)
    }

    fn service_name(&self) -> &str {
        self.client
            .as_ref()
            .map(|client| client.service_name())
            .unwrap_or("none")
    }

    /// Request body for the text-generation service
    pub fn build_request(
        &self,
        notes: &[ReflectionNote],
        challenges: &[ChallengeRecord],
        stats: &InsightStats,
    ) -> EnrichmentRequest {
        let mut recent: Vec<&ReflectionNote> = notes.iter().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(self.config.max_notes);

        let notes: Vec<NoteExcerpt> = recent
            .into_iter()
            .map(|note| NoteExcerpt {
                title: note.title.clone(),
                excerpt: excerpt(&note.content, self.config.excerpt_chars),
                created_at: note.created_at,
            })
            .collect();

        let challenges: Vec<ChallengeSummary> = challenges
            .iter()
            .map(|challenge| ChallengeSummary {
                title: challenge.title.clone(),
                points: challenge.points,
                completed: challenge.completed,
                difficulty: classify(challenge.points),
            })
            .collect();

        EnrichmentRequest {
            prompt: build_prompt(&notes, &challenges, stats),
            notes,
            challenges,
        }
    }
}

/// Natural-language prompt asking for the structured weekly insight object
fn build_prompt(
    notes: &[NoteExcerpt],
    challenges: &[ChallengeSummary],
    stats: &InsightStats,
) -> String {
    let mut prompt = String::from(
        "You are a supportive personal-growth coach reviewing one week of a user's journal.\n\n",
    );

    if notes.is_empty() {
        prompt.push_str("The user wrote no reflections this week.\n");
    } else {
        prompt.push_str(&format!("Reflections ({}):\n", stats.total_reflections));
        for note in notes {
            prompt.push_str(&format!(
                "- {} \"{}\": {}\n",
                note.created_at.format("%a %b %-d"),
                note.title,
                note.excerpt
            ));
        }
    }

    prompt.push_str(&format!(
        "\nChallenges: {} of {} completed ({}%), {} points earned.\n",
        stats.completed_challenges,
        stats.total_challenges,
        stats.completion_rate,
        stats.total_points_earned
    ));
    for challenge in challenges {
        prompt.push_str(&format!(
            "- [{}] {} ({} points, {})\n",
            if challenge.completed { "x" } else { " " },
            challenge.title,
            challenge.points,
            challenge.difficulty.label()
        ));
    }

    prompt.push_str(&format!(
        "\nRespond with only a JSON object of the form \
         {{\"summary\": string, \"patterns\": [{{\"type\": \"positive\" | \"negative\" | \"neutral\", \
         \"title\": string, \"description\": string}}], \"recommendations\": [{{\"title\": string, \
         \"description\": string}}]}} with {}-{} patterns and {}-{} recommendations.",
        PATTERNS_MIN, PATTERNS_MAX, RECOMMENDATIONS_MIN, RECOMMENDATIONS_MAX
    ));

    prompt
}

/// First `max_chars` characters of a reflection, with an ellipsis when cut
fn excerpt(content: &str, max_chars: usize) -> String {
    let content = content.trim();
    if content.chars().count() <= max_chars {
        return content.to_string();
    }

    let mut cut: String = content.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

/// Summary used when the text-generation service is unavailable
fn fallback_summary(stats: &InsightStats) -> String {
    if stats.total_reflections == 0 && stats.total_challenges == 0 {
        return "No reflections or challenges were logged this week. \
                A short reflection is a good way to begin the next one."
            .to_string();
    }

    format!(
        "This week you wrote {} reflection{} and completed {} of {} challenge{} \
         ({}% completion), earning {} point{}.",
        stats.total_reflections,
        plural(stats.total_reflections as i64),
        stats.completed_challenges,
        stats.total_challenges,
        plural(stats.total_challenges as i64),
        stats.completion_rate,
        stats.total_points_earned,
        plural(stats.total_points_earned)
    )
}

fn plural(count: i64) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct FixedResponse(&'static str);

    #[async_trait]
    impl TextGenerationClient for FixedResponse {
        async fn generate(&self, _request: &EnrichmentRequest) -> Result<String, EnrichmentError> {
            Ok(self.0.to_string())
        }

        fn service_name(&self) -> &str {
            "fixed"
        }
    }

    struct Unreachable;

    #[async_trait]
    impl TextGenerationClient for Unreachable {
        async fn generate(&self, _request: &EnrichmentRequest) -> Result<String, EnrichmentError> {
            Err(EnrichmentError::Status {
                status: 503,
                body: "upstream unavailable".to_string(),
            })
        }

        fn service_name(&self) -> &str {
            "unreachable"
        }
    }

    fn note(day: u32, content: &str) -> ReflectionNote {
        ReflectionNote {
            title: format!("Day {}", day),
            content: content.to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 10, day, 20, 0, 0).unwrap(),
        }
    }

    fn challenge(points: i64, completed: bool) -> ChallengeRecord {
        ChallengeRecord {
            title: format!("{} point challenge", points),
            points,
            completed,
            created_at: Utc.with_ymd_and_hms(2026, 10, 12, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_stats_computation() {
        let notes = vec![note(12, "a"), note(13, "b")];
        let challenges = vec![challenge(20, true), challenge(30, true), challenge(40, false)];

        let stats = InsightStats::compute(&notes, &challenges);

        assert_eq!(stats.total_reflections, 2);
        assert_eq!(stats.total_challenges, 3);
        assert_eq!(stats.completed_challenges, 2);
        assert_eq!(stats.completion_rate, 67);
        assert_eq!(stats.total_points_earned, 50);
    }

    #[test]
    fn test_zero_challenges_completion_rate_is_zero() {
        let stats = InsightStats::compute(&[note(12, "a")], &[]);

        assert_eq!(stats.completion_rate, 0);
        assert_eq!(stats.total_points_earned, 0);
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        assert_eq!(excerpt("  short  ", 10), "short");
        assert_eq!(excerpt("ééééé", 3), "ééé...");
    }

    #[test]
    fn test_fallback_summary_mentions_stats() {
        let stats = InsightStats::compute(&[note(12, "a")], &[challenge(30, true)]);
        let summary = fallback_summary(&stats);

        assert!(summary.contains("1 reflection "));
        assert!(summary.contains("1 of 1 challenge "));
        assert!(summary.contains("100% completion"));
        assert!(summary.contains("30 points"));
    }

    #[test]
    fn test_build_request_limits_notes() {
        let generator = WeeklyInsightGenerator::with_config(
            None,
            InsightGeneratorConfig {
                excerpt_chars: 5,
                max_notes: 2,
            },
        );
        let notes = vec![
            note(12, "oldest entry"),
            note(14, "newest entry"),
            note(13, "middle entry"),
        ];
        let challenges = vec![challenge(40, false)];
        let stats = InsightStats::compute(&notes, &challenges);

        let request = generator.build_request(&notes, &challenges, &stats);

        assert_eq!(request.notes.len(), 2);
        assert_eq!(request.notes[0].excerpt, "newes...");
        assert_eq!(request.notes[1].title, "Day 13");
        assert_eq!(request.challenges[0].difficulty, crate::progress::Difficulty::Hard);
        assert!(request.prompt.contains("Reflections (3)"));
        assert!(request.prompt.contains("2-4 patterns"));
    }

    #[tokio::test]
    async fn test_generate_with_valid_enrichment() {
        let generator = WeeklyInsightGenerator::new(Arc::new(FixedResponse(
            r#"{"summary": "Steady week.", "patterns": [{"type": "neutral", "title": "t", "description": "d"}], "recommendations": []}"#,
        )));

        let report = generator
            .generate(&[note(12, "a")], &[challenge(30, true)])
            .await;

        assert!(report.enriched);
        assert_eq!(report.summary, "Steady week.");
        assert_eq!(report.patterns.len(), 1);
        assert_eq!(report.stats.total_points_earned, 30);
    }

    #[tokio::test]
    async fn test_generate_falls_back_on_service_failure() {
        let generator = WeeklyInsightGenerator::new(Arc::new(Unreachable));

        let report = generator
            .generate(&[note(12, "a")], &[challenge(30, true), challenge(20, false)])
            .await;

        assert!(!report.enriched);
        assert!(!report.summary.is_empty());
        assert!(report.patterns.is_empty());
        assert!(report.recommendations.is_empty());
        assert_eq!(report.stats.completion_rate, 50);
    }

    #[tokio::test]
    async fn test_generate_falls_back_on_malformed_response() {
        let generator = WeeklyInsightGenerator::new(Arc::new(FixedResponse(
            r#"{"summary": "", "patterns": [], "recommendations": []}"#,
        )));

        let report = generator.generate(&[], &[]).await;

        assert!(!report.enriched);
        assert_eq!(report.stats.completion_rate, 0);
        assert!(report.summary.contains("No reflections"));
    }

    #[tokio::test]
    async fn test_generate_without_enrichment() {
        let generator = WeeklyInsightGenerator::without_enrichment();
        assert!(!generator.has_enrichment());

        let report = generator.generate(&[note(12, "a")], &[]).await;
        assert!(!report.enriched);
        assert_eq!(report.stats.total_reflections, 1);
    }
}

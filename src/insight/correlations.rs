//! Two-cohort correlation hypotheses
//!
//! Each hypothesis splits qualifying days on a fixed threshold, compares the
//! cohort means of a target rating, and reports a relative percentage delta.
//! An insight is emitted only when both cohorts carry at least
//! [`MIN_COHORT_DAYS`] days and the delta clears [`MIN_IMPROVEMENT_PCT`].
//! Confidence values are fixed per-hypothesis labels, not computed
//! statistics.

use crate::insight::DailyAggregate;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

/// Minimum qualifying days per cohort before a comparison means anything
pub const MIN_COHORT_DAYS: usize = 5;
/// Minimum relative improvement worth surfacing, in percent
pub const MIN_IMPROVEMENT_PCT: f64 = 5.0;

const GOOD_SLEEP_HOURS: f64 = 7.0;
const ACTIVE_DAY_MINUTES: i64 = 30;
const QUALITY_SLEEP_SCORE: i64 = 80;

/// A gated, descriptive mean comparison between two day cohorts
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationInsight {
    #[serde(rename = "type")]
    pub insight_type: &'static str,
    pub description: String,
    pub confidence: f64,
    pub sample_size: usize,
    pub details: serde_json::Value,
}

/// Run every hypothesis against the aggregated days
pub fn correlation_insights(days: &BTreeMap<NaiveDate, DailyAggregate>) -> Vec<CorrelationInsight> {
    [sleep_energy(days), activity_mood(days), sleep_focus(days)]
        .into_iter()
        .flatten()
        .collect()
}

#[derive(Default)]
struct Cohorts {
    matching: Vec<i64>,
    rest: Vec<i64>,
}

struct Comparison {
    improvement: f64,
    avg_matching: f64,
    avg_rest: f64,
    sample_size: usize,
}

impl Cohorts {
    fn push(&mut self, matches: bool, value: i64) {
        if matches {
            self.matching.push(value);
        } else {
            self.rest.push(value);
        }
    }

    /// Apply the sample-size and improvement gates
    ///
    /// A zero rest-cohort mean would make the relative delta undefined, so
    /// that degenerate case yields no insight.
    fn compare(&self) -> Option<Comparison> {
        if self.matching.len() < MIN_COHORT_DAYS || self.rest.len() < MIN_COHORT_DAYS {
            return None;
        }

        let avg_matching = mean(&self.matching);
        let avg_rest = mean(&self.rest);
        if avg_rest == 0.0 {
            return None;
        }

        let improvement = ((avg_matching - avg_rest) / avg_rest) * 100.0;
        if improvement < MIN_IMPROVEMENT_PCT {
            return None;
        }

        Some(Comparison {
            improvement,
            avg_matching,
            avg_rest,
            sample_size: self.matching.len() + self.rest.len(),
        })
    }
}

fn mean(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<i64>() as f64 / values.len() as f64
}

fn sleep_energy(days: &BTreeMap<NaiveDate, DailyAggregate>) -> Option<CorrelationInsight> {
    let mut cohorts = Cohorts::default();
    for day in days.values() {
        let (Some(feeling), Some(sleep)) = (&day.feeling, &day.sleep) else {
            continue;
        };
        let hours = sleep.duration_minutes as f64 / 60.0;
        cohorts.push(hours >= GOOD_SLEEP_HOURS, feeling.energy);
    }

    let c = cohorts.compare()?;
    Some(CorrelationInsight {
        insight_type: "sleep_energy",
        description: format!(
            "Your energy is {:.0}% higher when you sleep 7+ hours",
            c.improvement
        ),
        confidence: 0.85,
        sample_size: c.sample_size,
        details: json!({
            "condition": "sleep >= 7 hours",
            "avg_energy_with": c.avg_matching,
            "avg_energy_without": c.avg_rest,
            "improvement_percent": c.improvement,
        }),
    })
}

fn activity_mood(days: &BTreeMap<NaiveDate, DailyAggregate>) -> Option<CorrelationInsight> {
    let mut cohorts = Cohorts::default();
    for day in days.values() {
        let (Some(feeling), Some(activity)) = (&day.feeling, &day.activity) else {
            continue;
        };
        cohorts.push(activity.duration_minutes >= ACTIVE_DAY_MINUTES, feeling.mood);
    }

    let c = cohorts.compare()?;
    Some(CorrelationInsight {
        insight_type: "activity_mood",
        description: format!(
            "Your mood improves by {:.0}% on active days (30+ min)",
            c.improvement
        ),
        confidence: 0.78,
        sample_size: c.sample_size,
        details: json!({
            "condition": "activity >= 30 minutes",
            "avg_mood_with": c.avg_matching,
            "avg_mood_without": c.avg_rest,
            "improvement_percent": c.improvement,
        }),
    })
}

fn sleep_focus(days: &BTreeMap<NaiveDate, DailyAggregate>) -> Option<CorrelationInsight> {
    let mut cohorts = Cohorts::default();
    for day in days.values() {
        let (Some(feeling), Some(sleep)) = (&day.feeling, &day.sleep) else {
            continue;
        };
        cohorts.push(sleep.sleep_score >= QUALITY_SLEEP_SCORE, feeling.focus);
    }

    let c = cohorts.compare()?;
    Some(CorrelationInsight {
        insight_type: "sleep_focus",
        description: format!(
            "Your focus is {:.0}% better after quality sleep (score 80+)",
            c.improvement
        ),
        confidence: 0.82,
        sample_size: c.sample_size,
        details: json!({
            "condition": "sleep_score >= 80",
            "avg_focus_with": c.avg_matching,
            "avg_focus_without": c.avg_rest,
            "improvement_percent": c.improvement,
        }),
    })
}

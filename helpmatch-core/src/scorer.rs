//! Deterministic multi-factor relevance scoring.
//!
//! [`DeterministicScorer`] combines four independently capped contributions:
//!
//! | Factor        | Rule                                               | Cap |
//! |---------------|----------------------------------------------------|-----|
//! | Skill overlap | `min(matched / required, 1) * 40`, 0 if no skills   | 40  |
//! | Distance      | `<= 5 km` 25, `<= 10 km` 18, `<= 20 km` 10          | 25  |
//! | Deadline      | `<= 1 day` 20, `<= 3 days` 15, `<= 7 days` 8        | 20  |
//! | Priority      | High 15, Medium 10, Low 5                          | 15  |
//!
//! The sum is rounded to the nearest integer. Tier boundaries belong to the
//! more generous tier.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::{CandidateTask, Priority, Requester, distance_km};

const SKILL_WEIGHT: f64 = 40.0;
const DISTANCE_TIERS_KM: [(f64, f64); 3] = [(5.0, 25.0), (10.0, 18.0), (20.0, 10.0)];
const DEADLINE_TIERS_DAYS: [(f64, f64); 3] = [(1.0, 20.0), (3.0, 15.0), (7.0, 8.0)];
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Rule-based scorer producing integers in `0..=100`.
///
/// The scorer holds no state; every input, including the reference instant
/// used for urgency, is passed explicitly to [`DeterministicScorer::score_at`].
///
/// # Examples
/// ```
/// use std::collections::BTreeSet;
/// use chrono::{Duration, Utc};
/// use helpmatch_core::{DeterministicScorer, Priority};
///
/// let now = Utc::now();
/// let volunteer: BTreeSet<String> = ["first aid", "driving"].map(String::from).into();
/// let task: BTreeSet<String> = ["first aid", "cooking"].map(String::from).into();
///
/// let score = DeterministicScorer.score_at(
///     now,
///     &volunteer,
///     &task,
///     3.0,
///     now + Duration::hours(12),
///     Priority::High,
/// );
/// assert_eq!(score, 80);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeterministicScorer;

impl DeterministicScorer {
    /// Score against the current wall-clock time.
    #[must_use]
    pub fn score(
        self,
        volunteer_skills: &BTreeSet<String>,
        task_skills: &BTreeSet<String>,
        distance_km: f64,
        deadline: DateTime<Utc>,
        priority: Priority,
    ) -> u8 {
        self.score_at(
            Utc::now(),
            volunteer_skills,
            task_skills,
            distance_km,
            deadline,
            priority,
        )
    }

    /// Score relative to the reference instant `now`.
    ///
    /// Non-finite distances are treated as unknown and earn no distance
    /// points. Deadlines in the past fall in the most urgent tier.
    #[expect(
        clippy::float_arithmetic,
        reason = "the relevance formula sums fractional contributions"
    )]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "the rounded total is clamped to 0..=100 before narrowing"
    )]
    #[must_use]
    pub fn score_at(
        self,
        now: DateTime<Utc>,
        volunteer_skills: &BTreeSet<String>,
        task_skills: &BTreeSet<String>,
        distance_km: f64,
        deadline: DateTime<Utc>,
        priority: Priority,
    ) -> u8 {
        let total = skill_points(volunteer_skills, task_skills)
            + distance_points(distance_km)
            + deadline_points(now, deadline)
            + priority_points(priority);
        total.round().clamp(0.0, 100.0) as u8
    }

    /// Score a task for a requester at the instant `now`.
    ///
    /// Distance is measured between the two locations when both are known;
    /// otherwise it is treated as unknown.
    #[must_use]
    pub fn score_task(self, requester: &Requester, task: &CandidateTask, now: DateTime<Utc>) -> u8 {
        let distance = match (requester.location, task.location) {
            (Some(from), Some(to)) => distance_km(from, to),
            _ => f64::INFINITY,
        };
        self.score_at(
            now,
            &requester.skills,
            &task.required_skills,
            distance,
            task.deadline,
            task.priority,
        )
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "skill overlap is a ratio of small set sizes"
)]
fn skill_points(volunteer: &BTreeSet<String>, task: &BTreeSet<String>) -> f64 {
    if task.is_empty() {
        return 0.0;
    }
    let matched = task.intersection(volunteer).count() as f64;
    (matched / task.len() as f64).min(1.0) * SKILL_WEIGHT
}

fn tier_points(value: f64, tiers: &[(f64, f64)]) -> f64 {
    tiers
        .iter()
        .find(|(limit, _)| value <= *limit)
        .map_or(0.0, |(_, points)| *points)
}

fn distance_points(km: f64) -> f64 {
    if !km.is_finite() {
        return 0.0;
    }
    tier_points(km, &DISTANCE_TIERS_KM)
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "deadline urgency is measured in fractional days"
)]
fn deadline_points(now: DateTime<Utc>, deadline: DateTime<Utc>) -> f64 {
    let days = (deadline - now).num_milliseconds() as f64 / MILLIS_PER_DAY;
    tier_points(days, &DEADLINE_TIERS_DAYS)
}

const fn priority_points(priority: Priority) -> f64 {
    match priority {
        Priority::High => 15.0,
        Priority::Medium => 10.0,
        Priority::Low => 5.0,
    }
}

#[cfg(test)]
#[expect(
    clippy::float_arithmetic,
    reason = "tests compare floating point contributions"
)]
mod tests {
    use super::*;
    use crate::{RequesterId, lat_lon};
    use chrono::{Duration, TimeZone};
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn skills(labels: &[&str]) -> BTreeSet<String> {
        labels.iter().map(|label| (*label).to_owned()).collect()
    }

    #[rstest]
    fn worked_example_scores_eighty(now: DateTime<Utc>) {
        let score = DeterministicScorer.score_at(
            now,
            &skills(&["first aid", "driving"]),
            &skills(&["first aid", "cooking"]),
            3.0,
            now + Duration::hours(12),
            Priority::High,
        );
        assert_eq!(score, 80);
    }

    #[rstest]
    fn empty_task_skills_contribute_nothing() {
        assert!(skill_points(&skills(&["cooking"]), &BTreeSet::new()).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(&["a", "b"], &["a", "b"], 40.0)]
    #[case(&["a"], &["a", "b", "c", "d"], 10.0)]
    #[case(&[], &["a"], 0.0)]
    #[case(&["A"], &["a"], 0.0)]
    fn skill_overlap(#[case] volunteer: &[&str], #[case] task: &[&str], #[case] expected: f64) {
        let points = skill_points(&skills(volunteer), &skills(task));
        assert!((points - expected).abs() < 1e-9, "got {points}");
    }

    #[rstest]
    #[case(-2.0, 25.0)]
    #[case(5.0, 25.0)]
    #[case(5.01, 18.0)]
    #[case(10.0, 18.0)]
    #[case(20.0, 10.0)]
    #[case(20.5, 0.0)]
    #[case(f64::INFINITY, 0.0)]
    #[case(f64::NAN, 0.0)]
    fn distance_tiers(#[case] km: f64, #[case] expected: f64) {
        assert!((distance_points(km) - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(Duration::days(-3), 20.0)]
    #[case(Duration::days(1), 20.0)]
    #[case(Duration::days(1) + Duration::seconds(1), 15.0)]
    #[case(Duration::days(3), 15.0)]
    #[case(Duration::days(7), 8.0)]
    #[case(Duration::days(8), 0.0)]
    fn deadline_tiers(now: DateTime<Utc>, #[case] offset: Duration, #[case] expected: f64) {
        assert!((deadline_points(now, now + offset) - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(Priority::High, 15.0)]
    #[case(Priority::Medium, 10.0)]
    #[case(Priority::Low, 5.0)]
    fn priority_contributions(#[case] priority: Priority, #[case] expected: f64) {
        assert!((priority_points(priority) - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    fn best_case_reaches_one_hundred(now: DateTime<Utc>) {
        let all = skills(&["a", "b"]);
        let score = DeterministicScorer.score_at(now, &all, &all, 0.0, now, Priority::High);
        assert_eq!(score, 100);
    }

    #[rstest]
    fn worst_case_keeps_priority_floor(now: DateTime<Utc>) {
        let score = DeterministicScorer.score_at(
            now,
            &BTreeSet::new(),
            &skills(&["a"]),
            f64::INFINITY,
            now + Duration::days(30),
            Priority::Low,
        );
        assert_eq!(score, 5);
    }

    #[rstest]
    fn score_task_uses_haversine_distance(now: DateTime<Utc>) {
        let id = RequesterId::new("vol").expect("valid id");
        let requester = Requester::new(id)
            .with_skills(["cooking"])
            .with_location(lat_lon(51.5074, -0.1278));
        let nearby = CandidateTask::new("t", "Cook", "", now + Duration::days(2))
            .with_skills(["cooking"])
            .with_location(lat_lon(51.5155, -0.1420));

        // 40 skills + 25 distance + 15 deadline + 10 priority
        assert_eq!(DeterministicScorer.score_task(&requester, &nearby, now), 90);
    }

    #[rstest]
    fn score_task_treats_missing_location_as_unknown(now: DateTime<Utc>) {
        let id = RequesterId::new("vol").expect("valid id");
        let requester = Requester::new(id).with_location(lat_lon(0.0, 0.0));
        let task = CandidateTask::new("t", "Anywhere", "", now + Duration::days(10));

        assert_eq!(DeterministicScorer.score_task(&requester, &task, now), 10);
    }
}

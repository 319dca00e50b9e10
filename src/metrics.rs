use crate::models::{
    AcademicRecord, Announcement, AttendanceRecord, AttendanceStatus, Sdg, SdgInitiative,
    SdgMetric, UserRole,
};

/// Returns `None` when there are no records; zero records is a distinct
/// "no data" state, not a 0% rate.
pub fn attendance_rate(records: &[AttendanceRecord]) -> Option<u32> {
    if records.is_empty() {
        return None;
    }
    let present = records
        .iter()
        .filter(|record| record.status == AttendanceStatus::Present)
        .count();
    Some((100.0 * present as f64 / records.len() as f64).round() as u32)
}

/// Unclamped: exceeds 100 when a metric overshoots its target. A
/// target_value of zero or below resolves to 0 instead of dividing.
pub fn metric_progress(metric: &SdgMetric) -> u32 {
    if metric.target_value <= 0.0 {
        return 0;
    }
    (100.0 * metric.current_value / metric.target_value).round() as u32
}

fn metric_percentage(metric: &SdgMetric) -> f64 {
    if metric.target_value <= 0.0 {
        return 0.0;
    }
    100.0 * metric.current_value / metric.target_value
}

/// Overall progress as shown on the dashboard progress card: the mean of the
/// raw per-metric percentages, without clamping.
pub fn initiative_progress(initiative: &SdgInitiative) -> Option<u32> {
    if initiative.metrics.is_empty() {
        return None;
    }
    let total: f64 = initiative.metrics.iter().map(metric_percentage).sum();
    Some((total / initiative.metrics.len() as f64).round() as u32)
}

/// Overall progress as shown on the initiatives list: each metric is capped
/// at 100% before averaging, so the result never exceeds 100.
///
/// This intentionally disagrees with [`initiative_progress`]; the two views
/// have always computed the figure differently and callers rely on each.
pub fn initiative_progress_clamped(initiative: &SdgInitiative) -> Option<u32> {
    if initiative.metrics.is_empty() {
        return None;
    }
    let total: f64 = initiative
        .metrics
        .iter()
        .map(|metric| metric_percentage(metric).min(100.0))
        .sum();
    Some((total / initiative.metrics.len() as f64).round() as u32)
}

/// Groups records per student, students in first-seen order, records in
/// insertion order.
pub fn group_academic_records_by_student(
    records: &[AcademicRecord],
) -> Vec<(String, Vec<AcademicRecord>)> {
    let mut index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    let mut groups: Vec<(String, Vec<AcademicRecord>)> = Vec::new();

    for record in records {
        match index.get(&record.student_id) {
            Some(&slot) => groups[slot].1.push(record.clone()),
            None => {
                index.insert(record.student_id.clone(), groups.len());
                groups.push((record.student_id.clone(), vec![record.clone()]));
            }
        }
    }

    groups
}

pub fn average_score(records: &[AcademicRecord]) -> Option<u32> {
    if records.is_empty() {
        return None;
    }
    let total: f64 = records.iter().map(|record| record.score).sum();
    Some((total / records.len() as f64).round() as u32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceBand {
    Excellent,
    Good,
    Satisfactory,
    NeedsImprovement,
}

impl PerformanceBand {
    pub fn label(&self) -> &'static str {
        match self {
            PerformanceBand::Excellent => "Excellent",
            PerformanceBand::Good => "Good",
            PerformanceBand::Satisfactory => "Satisfactory",
            PerformanceBand::NeedsImprovement => "Needs Improvement",
        }
    }
}

pub fn performance_band(average: u32) -> PerformanceBand {
    match average {
        90.. => PerformanceBand::Excellent,
        80..=89 => PerformanceBand::Good,
        70..=79 => PerformanceBand::Satisfactory,
        _ => PerformanceBand::NeedsImprovement,
    }
}

/// Announcements visible to a role, most recent first. The sort is stable so
/// announcements sharing a timestamp keep their original relative order, and
/// filtering an already-filtered list is a no-op.
pub fn announcements_for_role(announcements: &[Announcement], role: UserRole) -> Vec<Announcement> {
    let mut visible: Vec<Announcement> = announcements
        .iter()
        .filter(|announcement| announcement.audience.contains(&role))
        .cloned()
        .collect();
    visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    visible
}

pub fn resolve_sdg_title(sdg_id: u32, catalog: &[Sdg]) -> String {
    catalog
        .iter()
        .find(|sdg| sdg.id == sdg_id)
        .map(|sdg| sdg.title.clone())
        .unwrap_or_else(|| "Unknown SDG".to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillLevel {
    Basic,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    pub fn label(&self) -> &'static str {
        match self {
            SkillLevel::Basic => "Basic",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Advanced => "Advanced",
        }
    }
}

pub fn skill_level(level: u32) -> SkillLevel {
    match level {
        0..=32 => SkillLevel::Basic,
        33..=65 => SkillLevel::Intermediate,
        _ => SkillLevel::Advanced,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Strong,
    Good,
    Possible,
}

impl MatchTier {
    pub fn label(&self) -> &'static str {
        match self {
            MatchTier::Strong => "Strong match",
            MatchTier::Good => "Good match",
            MatchTier::Possible => "Possible match",
        }
    }
}

pub fn match_tier(percentage: u32) -> MatchTier {
    match percentage {
        90.. => MatchTier::Strong,
        80..=89 => MatchTier::Good,
        _ => MatchTier::Possible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn attendance(id: &str, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            id: id.to_string(),
            student_id: "student1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            status,
            notes: None,
        }
    }

    fn academic(id: &str, student_id: &str, score: f64) -> AcademicRecord {
        AcademicRecord {
            id: id.to_string(),
            student_id: student_id.to_string(),
            subject: "Mathematics".to_string(),
            term: "Term 1".to_string(),
            year: "2024".to_string(),
            score,
            max_score: 100.0,
            grade: "B".to_string(),
            comments: None,
        }
    }

    fn metric(id: &str, current: f64, target: f64) -> SdgMetric {
        SdgMetric {
            id: id.to_string(),
            name: "Children enrolled".to_string(),
            current_value: current,
            target_value: target,
            unit: "children".to_string(),
            last_updated: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        }
    }

    fn initiative(metrics: Vec<SdgMetric>) -> SdgInitiative {
        SdgInitiative {
            id: "sdgi1".to_string(),
            sdg_id: 4,
            title: "Community Education Program".to_string(),
            description: "Weekend classes".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            end_date: None,
            metrics,
            status: crate::models::InitiativeStatus::InProgress,
        }
    }

    fn announcement(id: &str, created_at: &str, audience: Vec<UserRole>) -> Announcement {
        Announcement {
            id: id.to_string(),
            title: "School Closure".to_string(),
            content: "Closed May 15th.".to_string(),
            author_id: "admin1".to_string(),
            created_at: created_at.parse().unwrap(),
            priority: crate::models::Priority::Medium,
            audience,
        }
    }

    #[test]
    fn attendance_rate_rounds_present_share() {
        let records = vec![
            attendance("att1", AttendanceStatus::Present),
            attendance("att2", AttendanceStatus::Absent),
            attendance("att3", AttendanceStatus::Present),
        ];
        assert_eq!(attendance_rate(&records), Some(67));
    }

    #[test]
    fn attendance_rate_is_none_not_zero_when_empty() {
        assert_eq!(attendance_rate(&[]), None);
    }

    #[test]
    fn attendance_rate_stays_within_percent_bounds() {
        let all_present = vec![attendance("att1", AttendanceStatus::Present)];
        let none_present = vec![attendance("att2", AttendanceStatus::Late)];
        assert_eq!(attendance_rate(&all_present), Some(100));
        assert_eq!(attendance_rate(&none_present), Some(0));
    }

    #[test]
    fn metric_progress_is_unclamped() {
        assert_eq!(metric_progress(&metric("m1", 150.0, 100.0)), 150);
    }

    #[test]
    fn metric_progress_guards_zero_target() {
        assert_eq!(metric_progress(&metric("m1", 50.0, 0.0)), 0);
    }

    #[test]
    fn overall_progress_averages_unclamped_percentages() {
        let initiative = initiative(vec![metric("m1", 45.0, 100.0), metric("m2", 5.0, 10.0)]);
        assert_eq!(initiative_progress(&initiative), Some(48));
    }

    #[test]
    fn overall_progress_variants_diverge_on_overshoot() {
        let initiative = initiative(vec![metric("m1", 200.0, 100.0), metric("m2", 0.0, 10.0)]);
        assert_eq!(initiative_progress(&initiative), Some(100));
        assert_eq!(initiative_progress_clamped(&initiative), Some(50));
    }

    #[test]
    fn clamped_progress_never_exceeds_100() {
        let initiative = initiative(vec![metric("m1", 500.0, 100.0), metric("m2", 300.0, 10.0)]);
        assert_eq!(initiative_progress_clamped(&initiative), Some(100));
    }

    #[test]
    fn progress_is_none_without_metrics() {
        let initiative = initiative(vec![]);
        assert_eq!(initiative_progress(&initiative), None);
        assert_eq!(initiative_progress_clamped(&initiative), None);
    }

    #[test]
    fn grouping_keeps_first_seen_student_order() {
        let records = vec![
            academic("acad1", "student2", 78.0),
            academic("acad2", "student1", 85.0),
            academic("acad3", "student2", 80.0),
        ];
        let groups = group_academic_records_by_student(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "student2");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[0].1[0].id, "acad1");
        assert_eq!(groups[0].1[1].id, "acad3");
        assert_eq!(groups[1].0, "student1");
    }

    #[test]
    fn average_of_85_and_92_lands_in_good_band() {
        let records = vec![
            academic("acad1", "student1", 85.0),
            academic("acad2", "student1", 92.0),
        ];
        let average = average_score(&records).unwrap();
        assert_eq!(average, 89);
        assert_eq!(performance_band(average), PerformanceBand::Good);
    }

    #[test]
    fn average_score_is_none_when_empty() {
        assert_eq!(average_score(&[]), None);
    }

    #[test]
    fn performance_bands_are_boundary_exact() {
        assert_eq!(performance_band(90), PerformanceBand::Excellent);
        assert_eq!(performance_band(89), PerformanceBand::Good);
        assert_eq!(performance_band(80), PerformanceBand::Good);
        assert_eq!(performance_band(79), PerformanceBand::Satisfactory);
        assert_eq!(performance_band(70), PerformanceBand::Satisfactory);
        assert_eq!(performance_band(69), PerformanceBand::NeedsImprovement);
    }

    #[test]
    fn announcements_filter_by_audience_and_sort_newest_first() {
        let announcements = vec![
            announcement("ann1", "2024-04-27T11:15:00", vec![UserRole::Admin, UserRole::Teacher]),
            announcement("ann2", "2024-05-01T09:00:00", vec![UserRole::Teacher]),
            announcement("ann3", "2024-04-28T15:30:00", vec![UserRole::Student]),
        ];
        let visible = announcements_for_role(&announcements, UserRole::Teacher);
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].id, "ann2");
        assert_eq!(visible[1].id, "ann1");
    }

    #[test]
    fn announcement_filtering_is_idempotent_and_stable_on_ties() {
        let announcements = vec![
            announcement("ann1", "2024-05-01T09:00:00", vec![UserRole::Parent]),
            announcement("ann2", "2024-05-01T09:00:00", vec![UserRole::Parent]),
            announcement("ann3", "2024-04-30T08:00:00", vec![UserRole::Parent]),
        ];
        let once = announcements_for_role(&announcements, UserRole::Parent);
        assert_eq!(once[0].id, "ann1");
        assert_eq!(once[1].id, "ann2");
        let twice = announcements_for_role(&once, UserRole::Parent);
        let once_ids: Vec<&str> = once.iter().map(|a| a.id.as_str()).collect();
        let twice_ids: Vec<&str> = twice.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(once_ids, twice_ids);
    }

    #[test]
    fn missing_sdg_resolves_to_sentinel() {
        let catalog = vec![Sdg {
            id: 4,
            title: "Quality Education".to_string(),
            description: "Ensure inclusive and equitable quality education".to_string(),
            icon: "4".to_string(),
        }];
        assert_eq!(resolve_sdg_title(4, &catalog), "Quality Education");
        assert_eq!(resolve_sdg_title(17, &catalog), "Unknown SDG");
        assert_eq!(resolve_sdg_title(17, &[]), "Unknown SDG");
    }

    #[test]
    fn skill_levels_are_boundary_exact() {
        assert_eq!(skill_level(32), SkillLevel::Basic);
        assert_eq!(skill_level(33), SkillLevel::Intermediate);
        assert_eq!(skill_level(65), SkillLevel::Intermediate);
        assert_eq!(skill_level(66), SkillLevel::Advanced);
    }

    #[test]
    fn match_tiers_follow_percentage_thresholds() {
        assert_eq!(match_tier(95), MatchTier::Strong);
        assert_eq!(match_tier(90), MatchTier::Strong);
        assert_eq!(match_tier(85), MatchTier::Good);
        assert_eq!(match_tier(79), MatchTier::Possible);
    }
}

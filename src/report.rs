use std::fmt::Write;

use crate::metrics;
use crate::session::{sections_for_role, Session};
use crate::store::SchoolStore;

pub fn build_dashboard_report(session: &Session, store: &SchoolStore) -> String {
    let mut output = String::new();
    let user = &session.user;

    let _ = writeln!(output, "# School Dashboard");
    let _ = writeln!(output, "Welcome, {} ({})", user.name, user.role.label());
    let _ = writeln!(output);

    let _ = writeln!(output, "## At a Glance");
    let _ = writeln!(output, "- Students: {}", store.students.len());
    match metrics::attendance_rate(&store.attendance) {
        Some(rate) => {
            let _ = writeln!(output, "- Attendance rate: {rate}%");
        }
        None => {
            let _ = writeln!(output, "- Attendance rate: no data");
        }
    }
    let _ = writeln!(output, "- SDG initiatives: {}", store.initiatives.len());

    let _ = writeln!(output);
    let _ = writeln!(output, "## Announcements");
    let announcements = metrics::announcements_for_role(&store.announcements, user.role);
    if announcements.is_empty() {
        let _ = writeln!(output, "No announcements yet.");
    } else {
        for announcement in announcements.iter().take(3) {
            let _ = writeln!(
                output,
                "- [{}] {} ({})",
                announcement.priority.label(),
                announcement.title,
                announcement.created_at.format("%Y-%m-%d %H:%M")
            );
            let _ = writeln!(output, "  {}", announcement.content);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## SDG Progress");
    if store.initiatives.is_empty() {
        let _ = writeln!(output, "No initiatives tracked.");
    } else {
        for initiative in store.initiatives.iter() {
            let sdg_title = metrics::resolve_sdg_title(initiative.sdg_id, &store.sdgs);
            match metrics::initiative_progress(initiative) {
                Some(progress) => {
                    let _ = writeln!(
                        output,
                        "- SDG {} ({}): {} at {}%",
                        initiative.sdg_id, sdg_title, initiative.title, progress
                    );
                }
                None => {
                    let _ = writeln!(
                        output,
                        "- SDG {} ({}): {} has no metrics yet",
                        initiative.sdg_id, sdg_title, initiative.title
                    );
                }
            }
            for metric in initiative.metrics.iter() {
                let _ = writeln!(
                    output,
                    "  - {}: {} / {} {}",
                    metric.name, metric.current_value, metric.target_value, metric.unit
                );
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Student Performance");
    let groups = metrics::group_academic_records_by_student(&store.academic);
    if groups.is_empty() {
        let _ = writeln!(output, "No academic records yet.");
    } else {
        for (student_id, records) in groups.iter() {
            let Some(student) = store.student(student_id) else {
                continue;
            };
            if let Some(average) = metrics::average_score(records) {
                let _ = writeln!(
                    output,
                    "- {} (class {}): average {}% ({})",
                    student.name,
                    student.class_name,
                    average,
                    metrics::performance_band(average).label()
                );
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Your Sections");
    for section in sections_for_role(user.role) {
        let _ = writeln!(output, "- {}", section.title());
    }

    output
}

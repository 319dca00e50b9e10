use std::path::Path;

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::models::{
    AcademicRecord, Announcement, AttendanceRecord, AttendanceStatus, CareerMatch, LessonPlan,
    Mentor, Message, ParentProfile, Priority, Sdg, SdgInitiative, SdgMetric, SkillAssessment,
    SkillRating, StudentProfile, TeacherProfile, User, UserRole,
};

/// In-memory owner of every record collection. Loaded once, handed to the
/// aggregation functions by reference, never mutated by them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SchoolStore {
    pub users: Vec<User>,
    pub students: Vec<StudentProfile>,
    pub teachers: Vec<TeacherProfile>,
    pub parents: Vec<ParentProfile>,
    pub attendance: Vec<AttendanceRecord>,
    pub academic: Vec<AcademicRecord>,
    pub announcements: Vec<Announcement>,
    pub messages: Vec<Message>,
    pub sdgs: Vec<Sdg>,
    pub initiatives: Vec<SdgInitiative>,
    pub career_matches: Vec<CareerMatch>,
    pub skill_assessments: Vec<SkillAssessment>,
    pub mentors: Vec<Mentor>,
    pub lesson_plans: Vec<LessonPlan>,
}

impl SchoolStore {
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture {}", path.display()))?;
        let store: SchoolStore = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse fixture {}", path.display()))?;
        Ok(store)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|user| user.email == email)
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn student(&self, id: &str) -> Option<&StudentProfile> {
        self.students.iter().find(|student| student.id == id)
    }

    pub fn parent(&self, id: &str) -> Option<&ParentProfile> {
        self.parents.iter().find(|parent| parent.id == id)
    }

    /// Imports attendance rows from CSV. Rows naming an unknown student or a
    /// record id already present are skipped rather than treated as fatal.
    pub fn import_attendance_csv(&mut self, csv_path: &Path) -> anyhow::Result<usize> {
        #[derive(Deserialize)]
        struct CsvRow {
            id: String,
            student_id: String,
            date: NaiveDate,
            status: AttendanceStatus,
            notes: Option<String>,
        }

        let mut reader = csv::Reader::from_path(csv_path)
            .with_context(|| format!("failed to open {}", csv_path.display()))?;
        let mut inserted = 0usize;

        for result in reader.deserialize::<CsvRow>() {
            let row = result?;
            if self.student(&row.student_id).is_none() {
                tracing::warn!(student_id = %row.student_id, "skipping row for unknown student");
                continue;
            }
            if self.attendance.iter().any(|record| record.id == row.id) {
                continue;
            }
            self.attendance.push(AttendanceRecord {
                id: row.id,
                student_id: row.student_id,
                date: row.date,
                status: row.status,
                notes: row.notes,
            });
            inserted += 1;
        }

        Ok(inserted)
    }

    /// Demo dataset used when no fixture file is supplied.
    pub fn seed() -> Self {
        let users = vec![
            user("admin1", "Admin User", "admin@school.edu", UserRole::Admin),
            user("teacher1", "Ms. Johnson", "johnson@school.edu", UserRole::Teacher),
            user("teacher2", "Mr. Williams", "williams@school.edu", UserRole::Teacher),
            user("student1", "Alex Student", "alex@school.edu", UserRole::Student),
            user("student2", "Jamie Miller", "jamie@school.edu", UserRole::Student),
            user("student3", "Taylor Jones", "taylor@school.edu", UserRole::Student),
            user("parent1", "Parent Smith", "smith@email.com", UserRole::Parent),
            user("parent2", "Parent Miller", "miller@email.com", UserRole::Parent),
            user("parent3", "Parent Jones", "jones@email.com", UserRole::Parent),
        ];

        let students = vec![
            StudentProfile {
                id: "student1".to_string(),
                name: "Alex Student".to_string(),
                email: "alex@school.edu".to_string(),
                grade: "10".to_string(),
                class_name: "10A".to_string(),
                parent_id: Some("parent1".to_string()),
                enrollment_date: date(2023, 1, 15),
            },
            StudentProfile {
                id: "student2".to_string(),
                name: "Jamie Miller".to_string(),
                email: "jamie@school.edu".to_string(),
                grade: "10".to_string(),
                class_name: "10A".to_string(),
                parent_id: Some("parent2".to_string()),
                enrollment_date: date(2023, 1, 10),
            },
            StudentProfile {
                id: "student3".to_string(),
                name: "Taylor Jones".to_string(),
                email: "taylor@school.edu".to_string(),
                grade: "11".to_string(),
                class_name: "11B".to_string(),
                parent_id: Some("parent3".to_string()),
                enrollment_date: date(2022, 8, 20),
            },
        ];

        let teachers = vec![
            TeacherProfile {
                id: "teacher1".to_string(),
                name: "Ms. Johnson".to_string(),
                email: "johnson@school.edu".to_string(),
                subjects: vec!["Mathematics".to_string(), "Physics".to_string()],
                classes: vec!["10A".to_string(), "11B".to_string(), "12A".to_string()],
                join_date: date(2020, 8, 15),
            },
            TeacherProfile {
                id: "teacher2".to_string(),
                name: "Mr. Williams".to_string(),
                email: "williams@school.edu".to_string(),
                subjects: vec!["English".to_string(), "Literature".to_string()],
                classes: vec!["10A".to_string(), "10B".to_string(), "11A".to_string()],
                join_date: date(2019, 7, 10),
            },
        ];

        let parents = vec![
            ParentProfile {
                id: "parent1".to_string(),
                name: "Parent Smith".to_string(),
                email: "smith@email.com".to_string(),
                student_ids: vec!["student1".to_string()],
            },
            ParentProfile {
                id: "parent2".to_string(),
                name: "Parent Miller".to_string(),
                email: "miller@email.com".to_string(),
                student_ids: vec!["student2".to_string()],
            },
            ParentProfile {
                id: "parent3".to_string(),
                name: "Parent Jones".to_string(),
                email: "jones@email.com".to_string(),
                student_ids: vec!["student3".to_string()],
            },
        ];

        let attendance = vec![
            attendance_record("att1", "student1", date(2024, 5, 1), AttendanceStatus::Present, None),
            attendance_record(
                "att2",
                "student2",
                date(2024, 5, 1),
                AttendanceStatus::Absent,
                Some("Family emergency"),
            ),
            attendance_record(
                "att3",
                "student3",
                date(2024, 5, 1),
                AttendanceStatus::Late,
                Some("Bus delay - arrived 15 minutes late"),
            ),
            attendance_record("att4", "student1", date(2024, 4, 30), AttendanceStatus::Present, None),
            attendance_record("att5", "student2", date(2024, 4, 30), AttendanceStatus::Present, None),
            attendance_record("att6", "student3", date(2024, 4, 30), AttendanceStatus::Present, None),
        ];

        let academic = vec![
            academic_record(
                "acad1",
                "student1",
                "Mathematics",
                85.0,
                "B+",
                Some("Good understanding of algebra concepts"),
            ),
            academic_record(
                "acad2",
                "student1",
                "English",
                92.0,
                "A",
                Some("Excellent writing skills"),
            ),
            academic_record(
                "acad3",
                "student2",
                "Mathematics",
                78.0,
                "C+",
                Some("Needs more practice with equations"),
            ),
            academic_record(
                "acad4",
                "student3",
                "Physics",
                95.0,
                "A+",
                Some("Outstanding grasp of concepts"),
            ),
        ];

        let announcements = vec![
            Announcement {
                id: "ann1".to_string(),
                title: "School Closure - Teacher Training Day".to_string(),
                content: "The school will be closed on May 15th for a teacher professional development day."
                    .to_string(),
                author_id: "admin1".to_string(),
                created_at: datetime(2024, 5, 1, 9, 0),
                priority: Priority::High,
                audience: vec![
                    UserRole::Admin,
                    UserRole::Teacher,
                    UserRole::Student,
                    UserRole::Parent,
                ],
            },
            Announcement {
                id: "ann2".to_string(),
                title: "Math Competition Results".to_string(),
                content: "Congratulations to all participants in the regional math competition. Our school secured 2nd place overall!"
                    .to_string(),
                author_id: "teacher1".to_string(),
                created_at: datetime(2024, 4, 28, 15, 30),
                priority: Priority::Medium,
                audience: vec![
                    UserRole::Admin,
                    UserRole::Teacher,
                    UserRole::Student,
                    UserRole::Parent,
                ],
            },
            Announcement {
                id: "ann3".to_string(),
                title: "Curriculum Meeting for Teachers".to_string(),
                content: "All teachers are required to attend the curriculum planning meeting on Friday at 3:00 PM."
                    .to_string(),
                author_id: "admin1".to_string(),
                created_at: datetime(2024, 4, 27, 11, 15),
                priority: Priority::Medium,
                audience: vec![UserRole::Admin, UserRole::Teacher],
            },
        ];

        let messages = vec![
            Message {
                id: "msg1".to_string(),
                sender_id: "teacher1".to_string(),
                recipient_id: "parent1".to_string(),
                content: "Alex has been doing great in math class this week!".to_string(),
                sent_at: datetime(2024, 4, 30, 14, 22),
                read_at: Some(datetime(2024, 4, 30, 18, 45)),
            },
            Message {
                id: "msg2".to_string(),
                sender_id: "parent1".to_string(),
                recipient_id: "teacher1".to_string(),
                content: "Thank you for letting me know. We've been practicing at home as well."
                    .to_string(),
                sent_at: datetime(2024, 4, 30, 19, 5),
                read_at: Some(datetime(2024, 5, 1, 8, 30)),
            },
            Message {
                id: "msg3".to_string(),
                sender_id: "admin1".to_string(),
                recipient_id: "teacher2".to_string(),
                content: "Can we discuss the new literature curriculum tomorrow?".to_string(),
                sent_at: datetime(2024, 5, 1, 10, 15),
                read_at: None,
            },
        ];

        let sdgs = vec![
            sdg(1, "No Poverty", "End poverty in all its forms everywhere"),
            sdg(2, "Zero Hunger", "End hunger, achieve food security and improved nutrition"),
            sdg(
                3,
                "Good Health and Well-being",
                "Ensure healthy lives and promote well-being for all at all ages",
            ),
            sdg(4, "Quality Education", "Ensure inclusive and equitable quality education"),
            sdg(
                5,
                "Gender Equality",
                "Achieve gender equality and empower all women and girls",
            ),
            sdg(
                6,
                "Clean Water and Sanitation",
                "Ensure availability and sustainable management of water and sanitation",
            ),
        ];

        let initiatives = vec![
            SdgInitiative {
                id: "sdgi1".to_string(),
                sdg_id: 4,
                title: "Community Education Program".to_string(),
                description: "Weekend classes for out-of-school children in the community"
                    .to_string(),
                start_date: date(2024, 2, 1),
                end_date: None,
                metrics: vec![
                    metric("metric1", "Children enrolled", 45.0, 100.0, "children", date(2024, 5, 1)),
                    metric("metric2", "Volunteer teachers", 5.0, 10.0, "teachers", date(2024, 4, 20)),
                ],
                status: crate::models::InitiativeStatus::InProgress,
            },
            SdgInitiative {
                id: "sdgi2".to_string(),
                sdg_id: 6,
                title: "Rainwater Harvesting System".to_string(),
                description:
                    "Installing rainwater collection systems to provide clean water for the school"
                        .to_string(),
                start_date: date(2024, 3, 15),
                end_date: None,
                metrics: vec![
                    metric("metric3", "Water collected", 2500.0, 10000.0, "liters", date(2024, 4, 30)),
                    metric("metric4", "Systems installed", 2.0, 5.0, "systems", date(2024, 4, 15)),
                ],
                status: crate::models::InitiativeStatus::InProgress,
            },
            SdgInitiative {
                id: "sdgi3".to_string(),
                sdg_id: 2,
                title: "School Garden Project".to_string(),
                description:
                    "Growing vegetables to supplement school meals and teach sustainable farming"
                        .to_string(),
                start_date: date(2024, 1, 10),
                end_date: None,
                metrics: vec![
                    metric("metric5", "Food produced", 120.0, 500.0, "kg", date(2024, 4, 25)),
                    metric("metric6", "Students involved", 35.0, 50.0, "students", date(2024, 3, 30)),
                ],
                status: crate::models::InitiativeStatus::InProgress,
            },
        ];

        let career_matches = vec![
            CareerMatch {
                title: "Software Engineer".to_string(),
                description: "Design and build software systems across industries".to_string(),
                match_percentage: 94,
                salary: "$85,000 - $140,000".to_string(),
                skills: vec![
                    skill("Programming", 90),
                    skill("Problem Solving", 92),
                    skill("Communication", 60),
                ],
            },
            CareerMatch {
                title: "Data Analyst".to_string(),
                description: "Turn raw data into insight for decision makers".to_string(),
                match_percentage: 87,
                salary: "$60,000 - $95,000".to_string(),
                skills: vec![
                    skill("Statistics", 70),
                    skill("Spreadsheets", 85),
                    skill("Presentation", 45),
                ],
            },
            CareerMatch {
                title: "Environmental Scientist".to_string(),
                description: "Study the environment and develop sustainability programs"
                    .to_string(),
                match_percentage: 76,
                salary: "$50,000 - $80,000".to_string(),
                skills: vec![
                    skill("Field Research", 55),
                    skill("Lab Work", 30),
                    skill("Report Writing", 68),
                ],
            },
        ];

        let skill_assessments = vec![
            SkillAssessment {
                title: "Analytical Thinking".to_string(),
                description: "Logic puzzles and pattern recognition".to_string(),
                duration_minutes: 25,
                completed: true,
            },
            SkillAssessment {
                title: "Communication".to_string(),
                description: "Written and verbal expression exercises".to_string(),
                duration_minutes: 20,
                completed: false,
            },
            SkillAssessment {
                title: "Technical Aptitude".to_string(),
                description: "Hands-on problem solving tasks".to_string(),
                duration_minutes: 30,
                completed: false,
            },
        ];

        let mentors = vec![
            Mentor {
                name: "Grace Kamau".to_string(),
                role: "Senior Engineer".to_string(),
                company: "Savannah Tech".to_string(),
                expertise: vec!["Software".to_string(), "Mentoring".to_string()],
                bio: "Builds infrastructure for mobile banking across East Africa".to_string(),
            },
            Mentor {
                name: "David Ochieng".to_string(),
                role: "Agronomist".to_string(),
                company: "GreenFields Co-op".to_string(),
                expertise: vec!["Agriculture".to_string(), "Sustainability".to_string()],
                bio: "Works with smallholder farms on climate-resilient crops".to_string(),
            },
        ];

        SchoolStore {
            users,
            students,
            teachers,
            parents,
            attendance,
            academic,
            announcements,
            messages,
            sdgs,
            initiatives,
            career_matches,
            skill_assessments,
            mentors,
            lesson_plans: Vec::new(),
        }
    }
}

fn user(id: &str, name: &str, email: &str, role: UserRole) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role,
        avatar: None,
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid seed date")
}

fn datetime(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    date(year, month, day)
        .and_hms_opt(hour, minute, 0)
        .expect("valid seed time")
}

fn attendance_record(
    id: &str,
    student_id: &str,
    date: NaiveDate,
    status: AttendanceStatus,
    notes: Option<&str>,
) -> AttendanceRecord {
    AttendanceRecord {
        id: id.to_string(),
        student_id: student_id.to_string(),
        date,
        status,
        notes: notes.map(str::to_string),
    }
}

fn academic_record(
    id: &str,
    student_id: &str,
    subject: &str,
    score: f64,
    grade: &str,
    comments: Option<&str>,
) -> AcademicRecord {
    AcademicRecord {
        id: id.to_string(),
        student_id: student_id.to_string(),
        subject: subject.to_string(),
        term: "Term 1".to_string(),
        year: "2024".to_string(),
        score,
        max_score: 100.0,
        grade: grade.to_string(),
        comments: comments.map(str::to_string),
    }
}

fn sdg(id: u32, title: &str, description: &str) -> Sdg {
    Sdg {
        id,
        title: title.to_string(),
        description: description.to_string(),
        icon: format!("{id}"),
    }
}

fn metric(
    id: &str,
    name: &str,
    current_value: f64,
    target_value: f64,
    unit: &str,
    last_updated: NaiveDate,
) -> SdgMetric {
    SdgMetric {
        id: id.to_string(),
        name: name.to_string(),
        current_value,
        target_value,
        unit: unit.to_string(),
        last_updated,
    }
}

fn skill(name: &str, level: u32) -> SkillRating {
    SkillRating {
        name: name.to_string(),
        level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn seed_collections_are_populated() {
        let store = SchoolStore::seed();
        assert_eq!(store.students.len(), 3);
        assert_eq!(store.attendance.len(), 6);
        assert_eq!(store.academic.len(), 4);
        assert_eq!(store.announcements.len(), 3);
        assert_eq!(store.sdgs.len(), 6);
        assert_eq!(store.initiatives.len(), 3);
        assert!(store.initiatives.iter().all(|i| !i.metrics.is_empty()));
        assert!(store.announcements.iter().all(|a| !a.audience.is_empty()));
    }

    #[test]
    fn lookups_return_none_for_dangling_ids() {
        let store = SchoolStore::seed();
        assert!(store.user_by_email("johnson@school.edu").is_some());
        assert!(store.user_by_email("nobody@school.edu").is_none());
        assert!(store.student("student1").is_some());
        assert!(store.student("student99").is_none());
    }

    #[test]
    fn csv_import_skips_unknown_students_and_duplicates() {
        let mut store = SchoolStore::seed();
        let dir = std::env::temp_dir();
        let path = dir.join("opulage-attendance-import-test.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "id,student_id,date,status,notes").unwrap();
        writeln!(file, "att7,student1,2024-05-02,present,").unwrap();
        writeln!(file, "att8,student99,2024-05-02,absent,unknown kid").unwrap();
        writeln!(file, "att1,student1,2024-05-01,present,already there").unwrap();
        drop(file);

        let inserted = store.import_attendance_csv(&path).unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(store.attendance.len(), 7);
        std::fs::remove_file(&path).ok();
    }
}

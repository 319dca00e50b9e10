use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{ArgGroup, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod comms;
mod lessons;
mod metrics;
mod models;
mod report;
mod session;
mod store;

use comms::{Channel, Notifier};
use lessons::LessonPlanner;
use models::UserRole;
use session::AuthService;
use store::SchoolStore;

#[derive(Parser)]
#[command(name = "school-dashboard")]
#[command(about = "Role-based school management dashboard for Opulage schools", long_about = None)]
struct Cli {
    /// Load collections from a JSON fixture instead of the built-in demo data
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the role-scoped dashboard for a user
    #[command(group(
        ArgGroup::new("viewer")
            .args(["email", "role"])
            .required(true)
            .multiple(false)
    ))]
    Dashboard {
        #[arg(long)]
        email: Option<String>,
        /// Use the demo account for a role instead of an email
        #[arg(long)]
        role: Option<UserRole>,
    },
    /// List enrolled students and teaching staff
    Students,
    /// Show the attendance sheet for a day
    Attendance {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        class: Option<String>,
    },
    /// Show per-student academic performance
    Academic,
    /// Show SDG initiatives and their progress
    Sdg,
    /// Show announcements visible to a role
    Announcements {
        #[arg(long)]
        role: UserRole,
    },
    /// Show conversation summaries for a user
    Messages {
        #[arg(long)]
        email: String,
    },
    /// Show career matches and skill assessments
    Careers,
    /// Import attendance records from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Send a simulated WhatsApp or SMS message
    Send {
        #[arg(long)]
        channel: Channel,
        #[arg(long)]
        to: String,
        #[arg(long)]
        message: String,
    },
    /// Generate a mock AI lesson plan
    LessonPlan {
        #[arg(long)]
        prompt: String,
        /// Reference links to cite in the plan (http/https only)
        #[arg(long)]
        link: Vec<String>,
    },
    /// Write the dashboard report for a user to a markdown file
    Report {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();
    let mut store = match &cli.fixture {
        Some(path) => SchoolStore::from_json_file(path)?,
        None => SchoolStore::seed(),
    };

    match cli.command {
        Commands::Dashboard { email, role } => {
            let email = email
                .or_else(|| role.map(|r| session::demo_email(r).to_string()))
                .context("either --email or --role is required")?;
            let session = AuthService::default()
                .login(&store, &email, "demo")
                .await
                .context("login failed")?;
            print!("{}", report::build_dashboard_report(&session, &store));
        }
        Commands::Students => {
            print_roster(&store);
        }
        Commands::Attendance { date, class } => {
            print_attendance_sheet(&store, date, class.as_deref());
        }
        Commands::Academic => {
            print_academic_overview(&store);
        }
        Commands::Sdg => {
            print_initiatives(&store);
        }
        Commands::Announcements { role } => {
            let visible = metrics::announcements_for_role(&store.announcements, role);
            if visible.is_empty() {
                println!("No announcements for {}.", role.label());
                return Ok(());
            }
            for announcement in visible {
                let author = store
                    .user(&announcement.author_id)
                    .map(|u| u.name.clone())
                    .unwrap_or_else(|| "Unknown author".to_string());
                println!(
                    "[{}] {} - {} ({})",
                    announcement.priority.label(),
                    announcement.created_at.format("%Y-%m-%d %H:%M"),
                    announcement.title,
                    author
                );
                println!("    {}", announcement.content);
            }
        }
        Commands::Messages { email } => {
            let viewer = store
                .user_by_email(&email)
                .with_context(|| format!("no account found for {email}"))?;
            let summaries =
                comms::conversation_summaries(&store.messages, &store.users, &viewer.id);
            for summary in summaries {
                match summary.last_message {
                    Some(message) => {
                        let marker = if summary.unread { "*" } else { " " };
                        let prefix = if message.sender_id == viewer.id {
                            "You: "
                        } else {
                            ""
                        };
                        println!(
                            "{marker} {} ({}): {prefix}{}",
                            summary.contact_name,
                            message.sent_at.format("%Y-%m-%d %H:%M"),
                            message.content
                        );
                    }
                    None => println!("  {} (no messages)", summary.contact_name),
                }
            }
        }
        Commands::Careers => {
            print_career_guidance(&store);
        }
        Commands::Import { csv } => {
            let inserted = store.import_attendance_csv(&csv)?;
            println!("Inserted {inserted} attendance records from {}.", csv.display());
            match metrics::attendance_rate(&store.attendance) {
                Some(rate) => println!("Attendance rate is now {rate}%."),
                None => println!("No attendance data yet."),
            }
        }
        Commands::Send {
            channel,
            to,
            message,
        } => {
            let receipt = Notifier::default()
                .send(channel, &to, &message)
                .await
                .context("message was not sent")?;
            println!(
                "{} message {} delivered to {to} at {}.",
                receipt.channel.label(),
                receipt.id,
                receipt.sent_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
        Commands::LessonPlan { prompt, link } => {
            for url in &link {
                anyhow::ensure!(
                    lessons::validate_reference_link(url),
                    "invalid reference link {url}: must start with http:// or https://"
                );
            }
            if !store.lesson_plans.is_empty() {
                println!("Saved plans:");
                for saved in store.lesson_plans.iter() {
                    println!("- {} ({})", saved.title, saved.subject);
                }
                println!();
            }
            let plan = LessonPlanner::default()
                .generate(&prompt)
                .await
                .context("plan generation failed")?;
            println!("# {}", plan.title);
            println!("Subject: {} | Grade level: {}", plan.subject, plan.grade_level);
            println!("\nObjectives:");
            for objective in &plan.objectives {
                println!("- {objective}");
            }
            println!("\nActivities:");
            for activity in &plan.activities {
                println!("- {activity}");
            }
            println!("\nResources:");
            for resource in plan.resources.iter().chain(link.iter()) {
                println!("- {resource}");
            }
        }
        Commands::Report { email, out } => {
            let session = AuthService::default()
                .login(&store, &email, "demo")
                .await
                .context("login failed")?;
            let report = report::build_dashboard_report(&session, &store);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn print_roster(store: &SchoolStore) {
    println!("Students:");
    for student in store.students.iter() {
        let parent_name = student
            .parent_id
            .as_deref()
            .and_then(|id| store.parent(id))
            .map(|parent| parent.name.clone())
            .unwrap_or_else(|| "no parent on file".to_string());
        println!(
            "- {} (grade {}, class {}, enrolled {}) - {}",
            student.name, student.grade, student.class_name, student.enrollment_date, parent_name
        );
    }

    println!("\nTeachers:");
    for teacher in store.teachers.iter() {
        println!(
            "- {} ({}; classes {}; joined {})",
            teacher.name,
            teacher.subjects.join(", "),
            teacher.classes.join(", "),
            teacher.join_date
        );
    }
}

fn print_attendance_sheet(store: &SchoolStore, date: NaiveDate, class: Option<&str>) {
    let records: Vec<_> = store
        .attendance
        .iter()
        .filter(|record| record.date == date)
        .collect();

    if records.is_empty() {
        println!("No attendance records found for {date}.");
        return;
    }

    println!("Attendance for {date}:");
    for record in records {
        let Some(student) = store.student(&record.student_id) else {
            continue;
        };
        if let Some(class) = class {
            if student.class_name != class {
                continue;
            }
        }
        println!(
            "- {} ({}): {}{}",
            student.name,
            student.class_name,
            record.status.label(),
            record
                .notes
                .as_deref()
                .map(|notes| format!(" - {notes}"))
                .unwrap_or_default()
        );
    }
}

fn print_academic_overview(store: &SchoolStore) {
    let groups = metrics::group_academic_records_by_student(&store.academic);
    if groups.is_empty() {
        println!("No academic records yet.");
        return;
    }

    for (student_id, records) in groups {
        let Some(student) = store.student(&student_id) else {
            continue;
        };
        let Some(average) = metrics::average_score(&records) else {
            continue;
        };
        println!(
            "{} (grade {}, class {}): average {}% ({})",
            student.name,
            student.grade,
            student.class_name,
            average,
            metrics::performance_band(average).label()
        );
        for record in records {
            println!(
                "  - {} {} {}: {} ({}/{})",
                record.subject, record.term, record.year, record.grade, record.score,
                record.max_score
            );
        }
    }
}

fn print_initiatives(store: &SchoolStore) {
    if store.initiatives.is_empty() {
        println!("No initiatives tracked.");
        return;
    }

    for initiative in store.initiatives.iter() {
        let sdg_title = metrics::resolve_sdg_title(initiative.sdg_id, &store.sdgs);
        match metrics::initiative_progress_clamped(initiative) {
            Some(progress) => println!(
                "SDG {} ({}): {} [{}] - overall {}%",
                initiative.sdg_id,
                sdg_title,
                initiative.title,
                initiative.status.label(),
                progress
            ),
            None => println!(
                "SDG {} ({}): {} [{}] - no metrics yet",
                initiative.sdg_id,
                sdg_title,
                initiative.title,
                initiative.status.label()
            ),
        }
        for metric in initiative.metrics.iter() {
            println!(
                "  - {}: {} / {} {} ({}%)",
                metric.name,
                metric.current_value,
                metric.target_value,
                metric.unit,
                metrics::metric_progress(metric)
            );
        }
    }
}

fn print_career_guidance(store: &SchoolStore) {
    println!("Career matches:");
    for career in store.career_matches.iter() {
        println!(
            "- {} ({}%, {}) - {}",
            career.title,
            career.match_percentage,
            metrics::match_tier(career.match_percentage).label(),
            career.salary
        );
        for skill in career.skills.iter() {
            println!(
                "  - {}: {} ({})",
                skill.name,
                skill.level,
                metrics::skill_level(skill.level).label()
            );
        }
    }

    println!("\nSkill assessments:");
    for assessment in store.skill_assessments.iter() {
        let state = if assessment.completed {
            "completed"
        } else {
            "available"
        };
        println!(
            "- {} ({} min, {state}): {}",
            assessment.title, assessment.duration_minutes, assessment.description
        );
    }

    println!("\nMentors:");
    for mentor in store.mentors.iter() {
        println!(
            "- {} - {} at {} ({})",
            mentor.name,
            mentor.role,
            mentor.company,
            mentor.expertise.join(", ")
        );
    }
}

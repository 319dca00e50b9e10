use std::time::Duration;

use tracing::info;

use crate::models::{User, UserRole};
use crate::store::SchoolStore;

/// The current viewer. Passed by reference into aggregation call sites;
/// there is no process-wide session state.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no account found for {0}")]
    UnknownUser(String),
    #[error("email must not be empty")]
    EmptyEmail,
}

/// Demo login: any password is accepted, the email just has to resolve to a
/// known user. The delay models the identity-provider round trip.
pub struct AuthService {
    delay: Duration,
}

impl Default for AuthService {
    fn default() -> Self {
        AuthService::with_delay(Duration::from_millis(1000))
    }
}

impl AuthService {
    pub fn with_delay(delay: Duration) -> Self {
        AuthService { delay }
    }

    pub async fn login(
        &self,
        store: &SchoolStore,
        email: &str,
        _password: &str,
    ) -> Result<Session, AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::EmptyEmail);
        }

        tokio::time::sleep(self.delay).await;

        let user = store
            .user_by_email(email)
            .ok_or_else(|| AuthError::UnknownUser(email.to_string()))?;
        info!(user = %user.name, role = user.role.label(), "session opened");

        Ok(Session { user: user.clone() })
    }
}

pub fn demo_email(role: UserRole) -> &'static str {
    match role {
        UserRole::Admin => "admin@school.edu",
        UserRole::Teacher => "johnson@school.edu",
        UserRole::Student => "alex@school.edu",
        UserRole::Parent => "smith@email.com",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Dashboard,
    Students,
    Attendance,
    Academic,
    Sdg,
    Messages,
    Careers,
    Lessons,
    Settings,
}

impl Section {
    pub fn title(&self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Students => "Students",
            Section::Attendance => "Attendance",
            Section::Academic => "Academic",
            Section::Sdg => "SDG Initiatives",
            Section::Messages => "Messages",
            Section::Careers => "Career Guidance",
            Section::Lessons => "Lesson Planning",
            Section::Settings => "Settings",
        }
    }
}

const ALL_ROLES: &[UserRole] = &[
    UserRole::Admin,
    UserRole::Teacher,
    UserRole::Student,
    UserRole::Parent,
];
const STAFF: &[UserRole] = &[UserRole::Admin, UserRole::Teacher];
const FAMILIES: &[UserRole] = &[UserRole::Student, UserRole::Parent];

/// Single source of truth for which role sees which section.
const NAV_TABLE: &[(Section, &[UserRole])] = &[
    (Section::Dashboard, ALL_ROLES),
    (Section::Students, STAFF),
    (Section::Attendance, STAFF),
    (Section::Academic, ALL_ROLES),
    (Section::Sdg, ALL_ROLES),
    (Section::Messages, ALL_ROLES),
    (Section::Careers, FAMILIES),
    (Section::Lessons, STAFF),
    (Section::Settings, ALL_ROLES),
];

pub fn sections_for_role(role: UserRole) -> Vec<Section> {
    NAV_TABLE
        .iter()
        .filter(|(_, roles)| roles.contains(&role))
        .map(|(section, _)| *section)
        .collect()
}

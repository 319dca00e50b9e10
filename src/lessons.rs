use std::time::Duration;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::models::LessonPlan;

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("prompt must describe the lesson to create")]
    EmptyPrompt,
}

/// Mock of the AI planning backend: generation is a timed template
/// substitution.
pub struct LessonPlanner {
    delay: Duration,
}

impl Default for LessonPlanner {
    fn default() -> Self {
        LessonPlanner::with_delay(Duration::from_millis(3000))
    }
}

impl LessonPlanner {
    pub fn with_delay(delay: Duration) -> Self {
        LessonPlanner { delay }
    }

    pub async fn generate(&self, prompt: &str) -> Result<LessonPlan, PlanError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(PlanError::EmptyPrompt);
        }

        tokio::time::sleep(self.delay).await;

        let title = prompt
            .split('.')
            .next()
            .filter(|first| !first.trim().is_empty())
            .unwrap_or("New Lesson Plan")
            .trim()
            .to_string();

        let plan = LessonPlan {
            id: Uuid::new_v4(),
            title,
            subject: "General".to_string(),
            grade_level: "Mixed".to_string(),
            objectives: vec![
                "Understand the core concept described in the prompt".to_string(),
                "Apply it in a guided classroom exercise".to_string(),
            ],
            activities: vec![
                "Warm-up discussion (10 min)".to_string(),
                "Guided practice in small groups (25 min)".to_string(),
                "Recap and exit questions (10 min)".to_string(),
            ],
            resources: vec!["Whiteboard".to_string(), "Printed worksheets".to_string()],
            created_at: Utc::now().naive_utc(),
        };
        info!(title = %plan.title, "lesson plan generated");
        Ok(plan)
    }
}

pub fn validate_reference_link(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner() -> LessonPlanner {
        LessonPlanner::with_delay(Duration::from_millis(0))
    }

    #[tokio::test]
    async fn title_comes_from_the_first_sentence() {
        let plan = planner()
            .generate("Introduce fractions with pizza slices. Cover halves and quarters.")
            .await
            .unwrap();
        assert_eq!(plan.title, "Introduce fractions with pizza slices");
        assert!(!plan.objectives.is_empty());
        assert!(!plan.activities.is_empty());
    }

    #[tokio::test]
    async fn blank_prompts_are_rejected() {
        assert!(matches!(
            planner().generate("   ").await,
            Err(PlanError::EmptyPrompt)
        ));
    }

    #[test]
    fn reference_links_must_be_http() {
        assert!(validate_reference_link("https://un.org/sdgs"));
        assert!(validate_reference_link("http://example.com"));
        assert!(!validate_reference_link("ftp://example.com"));
        assert!(!validate_reference_link("un.org"));
    }
}

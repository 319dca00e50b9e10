use std::time::Duration;

use chrono::{NaiveDateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::models::{Message, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    WhatsApp,
    Sms,
}

impl Channel {
    pub fn label(&self) -> &'static str {
        match self {
            Channel::WhatsApp => "WhatsApp",
            Channel::Sms => "SMS",
        }
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "whatsapp" => Ok(Channel::WhatsApp),
            "sms" => Ok(Channel::Sms),
            other => Err(format!("unknown channel: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    pub id: Uuid,
    pub channel: Channel,
    pub sent_at: NaiveDateTime,
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("phone number must not be empty")]
    MissingPhone,
    #[error("message body must not be empty")]
    MissingBody,
}

/// Stand-in for the WhatsApp/SMS gateway. Nothing leaves the process; the
/// delay models the provider round trip.
pub struct Notifier {
    delay: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Notifier::with_delay(Duration::from_millis(800))
    }
}

impl Notifier {
    pub fn with_delay(delay: Duration) -> Self {
        Notifier { delay }
    }

    pub async fn send(
        &self,
        channel: Channel,
        phone: &str,
        body: &str,
    ) -> Result<DeliveryReceipt, SendError> {
        if phone.trim().is_empty() {
            return Err(SendError::MissingPhone);
        }
        if body.trim().is_empty() {
            return Err(SendError::MissingBody);
        }

        tokio::time::sleep(self.delay).await;

        let receipt = DeliveryReceipt {
            id: Uuid::new_v4(),
            channel,
            sent_at: Utc::now().naive_utc(),
        };
        info!(channel = channel.label(), to = phone, "message dispatched");
        Ok(receipt)
    }
}

#[derive(Debug, Clone)]
pub struct ConversationSummary {
    pub contact_id: String,
    pub contact_name: String,
    pub last_message: Option<Message>,
    pub unread: bool,
}

/// One entry per contact (every user except the viewer) with the latest
/// message in either direction and an unread flag. Contacts with traffic come
/// first, newest activity on top; silent contacts trail in store order.
pub fn conversation_summaries(
    messages: &[Message],
    users: &[User],
    viewer_id: &str,
) -> Vec<ConversationSummary> {
    let mut summaries: Vec<ConversationSummary> = users
        .iter()
        .filter(|user| user.id != viewer_id)
        .map(|contact| {
            let last_message = messages
                .iter()
                .filter(|msg| {
                    (msg.sender_id == contact.id && msg.recipient_id == viewer_id)
                        || (msg.sender_id == viewer_id && msg.recipient_id == contact.id)
                })
                .max_by_key(|msg| msg.sent_at)
                .cloned();
            let unread = last_message
                .as_ref()
                .map(|msg| msg.sender_id == contact.id && msg.read_at.is_none())
                .unwrap_or(false);

            ConversationSummary {
                contact_id: contact.id.clone(),
                contact_name: contact.name.clone(),
                last_message,
                unread,
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        let a_at = a.last_message.as_ref().map(|msg| msg.sent_at);
        let b_at = b.last_message.as_ref().map(|msg| msg.sent_at);
        b_at.cmp(&a_at)
    });
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use crate::store::SchoolStore;

    fn notifier() -> Notifier {
        Notifier::with_delay(Duration::from_millis(0))
    }

    #[tokio::test]
    async fn send_returns_a_receipt() {
        let receipt = notifier()
            .send(Channel::WhatsApp, "+254712345678", "PTA meeting at 5pm")
            .await
            .unwrap();
        assert_eq!(receipt.channel, Channel::WhatsApp);
    }

    #[tokio::test]
    async fn send_rejects_blank_phone_and_body() {
        assert!(matches!(
            notifier().send(Channel::Sms, " ", "hello").await,
            Err(SendError::MissingPhone)
        ));
        assert!(matches!(
            notifier().send(Channel::Sms, "+254712345678", "").await,
            Err(SendError::MissingBody)
        ));
    }

    #[test]
    fn summaries_surface_latest_message_and_unread_flag() {
        let store = SchoolStore::seed();
        let summaries = conversation_summaries(&store.messages, &store.users, "teacher1");

        let parent = summaries
            .iter()
            .find(|s| s.contact_id == "parent1")
            .unwrap();
        let last = parent.last_message.as_ref().unwrap();
        assert_eq!(last.id, "msg2");
        // msg2 is from parent1 but was read, so nothing is pending.
        assert!(!parent.unread);
    }

    #[test]
    fn unread_is_set_when_latest_inbound_message_is_unread() {
        let store = SchoolStore::seed();
        let summaries = conversation_summaries(&store.messages, &store.users, "teacher2");
        let admin = summaries.iter().find(|s| s.contact_id == "admin1").unwrap();
        assert!(admin.unread);
    }

    #[test]
    fn contacts_with_traffic_sort_before_silent_ones() {
        let store = SchoolStore::seed();
        let summaries = conversation_summaries(&store.messages, &store.users, "teacher1");
        assert!(summaries
            .iter()
            .all(|s| s.contact_id != "teacher1"));
        assert_eq!(summaries[0].contact_id, "parent1");
        assert!(summaries[0].last_message.is_some());
        assert!(summaries.last().unwrap().last_message.is_none());
    }

    #[test]
    fn viewer_is_excluded_from_contacts() {
        let store = SchoolStore::seed();
        let viewer = store
            .users
            .iter()
            .find(|u| u.role == UserRole::Admin)
            .unwrap();
        let summaries = conversation_summaries(&store.messages, &store.users, &viewer.id);
        assert_eq!(summaries.len(), store.users.len() - 1);
    }
}

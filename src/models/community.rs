//! Community message board model.

use serde::{Deserialize, Serialize};

/// A post on the community board.
///
/// `likes` always equals `liked_by.len()`; change likes only through [`CommunityMessage::toggle_like`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityMessage {
    pub id: String,
    pub author: String,
    pub initials: String,
    /// Creation time, epoch milliseconds
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub message: String,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub liked_by: Vec<String>,
    /// Display only; nothing increments it.
    #[serde(default)]
    pub replies: u32,
}

impl CommunityMessage {
    /// A fresh post whose id is its creation time.
    pub fn new(author: &str, initials: &str, message: &str, timestamp: i64) -> Self {
        Self {
            id: timestamp.to_string(),
            author: author.to_string(),
            initials: initials.to_string(),
            timestamp,
            time: Some("Just now".to_string()),
            message: message.to_string(),
            likes: 0,
            liked_by: Vec::new(),
            replies: 0,
        }
    }

    /// Flip `user_id`'s like. Returns true when the user now likes the message.
    pub fn toggle_like(&mut self, user_id: &str) -> bool {
        let liked = match self.liked_by.iter().position(|id| id == user_id) {
            Some(index) => {
                self.liked_by.remove(index);
                false
            }
            None => {
                self.liked_by.push(user_id.to_string());
                true
            }
        };
        self.likes = self.liked_by.len() as u32;
        liked
    }
}

/// The three posts a new board starts with.
pub fn seed_messages(now_ms: i64) -> Vec<CommunityMessage> {
    const HOUR_MS: i64 = 60 * 60 * 1000;

    let seed = |id: &str, author: &str, initials: &str, age_ms: i64, message: &str, likes: &[&str]| {
        CommunityMessage {
            id: id.to_string(),
            author: author.to_string(),
            initials: initials.to_string(),
            timestamp: now_ms - age_ms,
            time: None,
            message: message.to_string(),
            likes: likes.len() as u32,
            liked_by: likes.iter().map(|s| s.to_string()).collect(),
            replies: 0,
        }
    };

    vec![
        seed(
            "1",
            "Sarah Johnson",
            "SJ",
            2 * HOUR_MS,
            "Just finished the fractions unit! The visual examples really helped me understand equivalent fractions.",
            &["seed-user-1", "seed-user-2"],
        ),
        seed(
            "2",
            "Michael Chen",
            "MC",
            5 * HOUR_MS,
            "Does anyone have tips for remembering the parts of a plant cell? The quiz is tomorrow.",
            &["seed-user-3"],
        ),
        seed(
            "3",
            "Amina Diallo",
            "AD",
            24 * HOUR_MS,
            "Our class is starting the solar system lessons next week. Excited to share what we learn here!",
            &[],
        ),
    ]
}

/// The identity new posts and likes are attributed to on this device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityUser {
    pub id: String,
    pub name: String,
    pub initials: String,
}

/// Request body for creating a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    pub author: String,
    pub initials: String,
    pub message: String,
}

/// Request body for toggling a like.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeRequest {
    pub user_id: String,
}

/// "Just now", "N min ago", "N hour(s) ago" or "N day(s) ago".
pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let seconds = (now_ms - timestamp_ms).max(0) / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    let plural = |n: i64| if n == 1 { "" } else { "s" };

    if seconds < 60 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{} min ago", minutes)
    } else if hours < 24 {
        format!("{} hour{} ago", hours, plural(hours))
    } else {
        format!("{} day{} ago", days, plural(days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut message = CommunityMessage::new("Ana", "A", "hello", 1_000);
        let before = message.clone();

        assert!(message.toggle_like("B"));
        assert_eq!(message.likes, 1);
        assert_eq!(message.liked_by, vec!["B".to_string()]);

        assert!(!message.toggle_like("B"));
        assert_eq!(message, before);
    }

    #[test]
    fn test_likes_match_liked_by_after_each_toggle() {
        let mut message = seed_messages(10_000_000).remove(0);
        for user in ["x", "seed-user-1", "y", "x", "seed-user-2", "y"] {
            message.toggle_like(user);
            assert_eq!(message.likes as usize, message.liked_by.len());
        }
        assert!(message.liked_by.is_empty());
    }

    #[test]
    fn test_toggle_repairs_drifted_count() {
        let mut message = CommunityMessage::new("Ana", "A", "hello", 1_000);
        message.likes = 7;
        message.toggle_like("B");
        assert_eq!(message.likes, 1);
    }

    #[test]
    fn test_seeds_are_consistent() {
        let seeds = seed_messages(100 * 60 * 60 * 1000);
        assert_eq!(seeds.len(), 3);
        assert!(seeds.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
        assert!(seeds.iter().all(|m| m.likes as usize == m.liked_by.len()));
    }

    #[test]
    fn test_format_relative_time() {
        let now = 10 * 24 * 60 * 60 * 1000;
        let ago = |ms: i64| format_relative_time(now - ms, now);

        assert_eq!(ago(0), "Just now");
        assert_eq!(ago(59_000), "Just now");
        assert_eq!(ago(60_000), "1 min ago");
        assert_eq!(ago(59 * 60_000), "59 min ago");
        assert_eq!(ago(60 * 60_000), "1 hour ago");
        assert_eq!(ago(5 * 60 * 60_000), "5 hours ago");
        assert_eq!(ago(24 * 60 * 60_000), "1 day ago");
        assert_eq!(ago(3 * 24 * 60 * 60_000), "3 days ago");
    }

    #[test]
    fn test_new_message_wire_shape() {
        let value = serde_json::to_value(CommunityMessage::new("Ana", "A", "hi", 1_700_000_000_000)).unwrap();
        assert_eq!(value["id"], "1700000000000");
        assert_eq!(value["time"], "Just now");
        assert_eq!(value["likes"], 0);
        assert_eq!(value["likedBy"], serde_json::json!([]));
        assert_eq!(value["replies"], 0);
    }
}

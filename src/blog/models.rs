// Blog records

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Time-ordered record id: 15-digit millisecond timestamp, 32 hex digits of
/// a random uuid, then `000`.
pub fn next_id() -> String {
    format!("{:015}{}000", now_millis(), Uuid::new_v4().simple())
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}

/// Seconds since the epoch, fractional
pub fn now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub passwd: String,
    pub admin: bool,
    pub name: String,
    pub image: String,
    pub created_at: f64,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: next_id(),
            email: email.into(),
            passwd: String::new(),
            admin: false,
            name: name.into(),
            image: "about:blank".to_string(),
            created_at: now(),
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_passwd(mut self, passwd: impl Into<String>) -> Self {
        self.passwd = passwd.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blog {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_image: String,
    pub name: String,
    pub summary: String,
    pub content: String,
    pub created_at: f64,
}

impl Blog {
    pub fn new(
        author: &User,
        name: impl Into<String>,
        summary: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: next_id(),
            user_id: author.id.clone(),
            user_name: author.name.clone(),
            user_image: author.image.clone(),
            name: name.into(),
            summary: summary.into(),
            content: content.into(),
            created_at: now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub blog_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_image: String,
    pub content: String,
    pub created_at: f64,
}

impl Comment {
    pub fn new(blog: &Blog, author: &User, content: impl Into<String>) -> Self {
        Self {
            id: next_id(),
            blog_id: blog.id.clone(),
            user_id: author.id.clone(),
            user_name: author.name.clone(),
            user_image: author.image.clone(),
            content: content.into(),
            created_at: now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id_shape() {
        let id = next_id();
        assert_eq!(id.len(), 50);
        assert!(id.ends_with("000"));
        assert!(id[..15].chars().all(|c| c.is_ascii_digit()));
        assert!(id[15..47].chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(next_id(), id);
    }

    #[test]
    fn test_passwd_not_serialized() {
        let user = User::new("Test", "test@example.com").with_passwd("1234567890");
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("passwd").is_none());
        assert_eq!(value["image"], "about:blank");
        assert_eq!(value["admin"], false);
    }

    #[test]
    fn test_blog_and_comment_carry_author() {
        let author = User::new("Test", "test@example.com").with_image("/a.png");
        let blog = Blog::new(&author, "Title", "Summary", "Body");
        let comment = Comment::new(&blog, &author, "Nice");

        assert_eq!(blog.user_id, author.id);
        assert_eq!(blog.user_image, "/a.png");
        assert_eq!(comment.blog_id, blog.id);
        assert_eq!(comment.user_name, "Test");
    }
}

use serde::{Deserialize, Serialize};

/// A post as stored and returned by the posts API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub body: String,
}

/// Request body for creating or updating a post.
///
/// Every field is optional: on update, absent fields keep their stored value;
/// on create they fall back to the zero value. An `Id` in the body is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PostInput {
    pub user_id: Option<i64>,
    pub title: Option<String>,
    pub body: Option<String>,
}

impl PostInput {
    /// Build a new post with the given id.
    pub fn into_post(self, id: i64) -> Post {
        Post {
            id,
            user_id: self.user_id.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
        }
    }

    /// Overwrite the fields present in this input. The id is left unchanged.
    pub fn apply_to(self, post: &mut Post) {
        if let Some(user_id) = self.user_id {
            post.user_id = user_id;
        }
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(body) = self.body {
            post.body = body;
        }
    }
}

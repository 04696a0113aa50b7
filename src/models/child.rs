use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Child {
    pub id: i32,
    pub username: String,
    pub age: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildProfile {
    pub id: String,
    pub username: String,
    pub age: Option<i32>,
}

impl From<Child> for ChildProfile {
    fn from(c: Child) -> Self {
        Self {
            id: c.id.to_string(),
            username: c.username,
            age: c.age,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateChildRequest {
    pub username: String,
    pub age: Option<i32>,
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A physician offered by the booking form's doctor select.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: String,
}

impl Doctor {
    pub fn new(name: &str, avatar_url: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            avatar_url: avatar_url.to_string(),
        }
    }
}

use serde::{Deserialize, Serialize};

/// A bookable room. Owned by the persistence layer; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
}

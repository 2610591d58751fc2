use serde::{Deserialize, Serialize};

/// A tag row. Names are unique and compared exactly (case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// A tag with the number of links currently attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagUsage {
    pub id: i64,
    pub name: String,
    pub count: i64,
}

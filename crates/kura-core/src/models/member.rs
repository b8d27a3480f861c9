use serde::{Deserialize, Serialize};

/// A member of the party as listed on the site. Members carry no id; their
/// position in the list is their identity in the admin console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub role: String,
    pub location: String,
}

impl Member {
    pub fn new(name: impl Into<String>, role: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            location: location.into(),
        }
    }

    /// Placeholder entry the admin console inserts before it is edited.
    pub fn placeholder() -> Self {
        Self::new("Nouveau Membre", "Rôle", "Ville")
    }
}

/// Partial update for a member. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub location: Option<String>,
}

impl MemberPatch {
    pub fn apply(&self, member: &Member) -> Member {
        Member {
            name: self.name.clone().unwrap_or_else(|| member.name.clone()),
            role: self.role.clone().unwrap_or_else(|| member.role.clone()),
            location: self.location.clone().unwrap_or_else(|| member.location.clone()),
        }
    }
}

use serde::{Deserialize, Serialize};

/// The logins whose issues are excluded from community volume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Roster {
    /// Team member logins
    #[serde(default)]
    pub members: Vec<String>,

    /// Bot account logins
    #[serde(default)]
    pub bots: Vec<String>,
}

impl Roster {
    #[must_use]
    pub fn is_member(&self, login: &str) -> bool {
        self.members.iter().any(|m| m == login)
    }

    #[must_use]
    pub fn is_bot(&self, login: &str) -> bool {
        self.bots.iter().any(|b| b == login)
    }

    /// Logins listed both as a member and as a bot. Such logins are subtracted twice when
    /// computing inbound volume from counts, so the strategies can only agree when this is empty.
    #[must_use]
    pub fn overlap(&self) -> Vec<&str> {
        self.members.iter().filter(|m| self.is_bot(m)).map(String::as_str).collect()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A registered fighter's profile and record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub display_name: String,
    #[serde(
        rename = "photoURL",
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub photo_url: Option<String>,
    pub age: u8,
    #[serde(default)]
    pub bio: String,
    pub fight_style: String,
    pub experience: Experience,
    /// Kilograms
    pub weight: u16,
    /// Centimetres
    pub height: u16,
    pub location: String,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

/// Older documents store a blank `photoURL` when no photo was uploaded.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|url| !url.trim().is_empty()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Experience {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Professional,
}

/// One-directional like/dislike decision. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Swipe {
    pub id: String,
    pub swiper_id: String,
    pub swiped_user_id: String,
    pub liked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    Pending,
    /// Defined by the data model but nothing produces it yet.
    Accepted,
    Scheduled,
    Completed,
}

/// Outcome of a completed fight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FightResult {
    pub winner_id: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<u8>,
}

/// Mutual-like pairing between two profiles.
///
/// `user1` and `user2` are snapshots taken when the match was created and are
/// never refreshed from the live profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub user1_id: String,
    pub user2_id: String,
    pub user1: Profile,
    pub user2: Profile,
    pub created_at: DateTime<Utc>,
    pub status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fight_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<FightResult>,
}

impl Match {
    /// The embedded snapshot of whoever is not `profile_id`
    pub fn opponent(&self, profile_id: &str) -> &Profile {
        if self.user1_id == profile_id {
            &self.user2
        } else {
            &self.user1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "email": format!("{}@gym.test", id),
            "displayName": format!("Fighter {}", id),
            "photoURL": "",
            "age": 27,
            "bio": "",
            "fightStyle": "Muay Thai",
            "experience": "Intermediate",
            "weight": 72,
            "height": 178,
            "location": "Istanbul",
            "wins": 3,
            "losses": 1,
            "createdAt": "2025-01-10T10:00:00Z",
            "lastActive": "2025-01-12T08:30:00Z"
        })
    }

    #[test]
    fn test_profile_blank_photo_reads_as_none() {
        let profile: Profile = serde_json::from_value(profile_json("a")).unwrap();
        assert_eq!(profile.photo_url, None);
        assert_eq!(profile.experience, Experience::Intermediate);
        assert_eq!(profile.display_name, "Fighter a");
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let mut profile: Profile = serde_json::from_value(profile_json("a")).unwrap();
        profile.photo_url = Some("https://cdn.test/a.jpg".to_string());

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["photoURL"], "https://cdn.test/a.jpg");
        assert_eq!(value["fightStyle"], "Muay Thai");
        assert!(value.get("lastActive").is_some());
    }

    #[test]
    fn test_match_status_lowercase() {
        assert_eq!(serde_json::to_value(MatchStatus::Scheduled).unwrap(), "scheduled");
        let status: MatchStatus = serde_json::from_value(json!("accepted")).unwrap();
        assert_eq!(status, MatchStatus::Accepted);
        assert_eq!(MatchStatus::default(), MatchStatus::Pending);
    }

    #[test]
    fn test_match_opponent() {
        let m: Match = serde_json::from_value(json!({
            "id": "m1",
            "user1Id": "a",
            "user2Id": "b",
            "user1": profile_json("a"),
            "user2": profile_json("b"),
            "createdAt": "2025-02-01T12:00:00Z",
            "status": "pending"
        }))
        .unwrap();

        assert_eq!(m.opponent("a").id, "b");
        assert_eq!(m.opponent("b").id, "a");
        assert!(m.fight_date.is_none());
        assert!(m.result.is_none());
    }
}

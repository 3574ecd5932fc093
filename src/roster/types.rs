use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Highest selectable game number
pub const MAX_GAME: u8 = 5;

/// Sentinel for "no game open for registration"
pub const NO_ACTIVE_GAME: u8 = 0;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 6;

/// Registration settings embedded in the roster document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub registrations_closed: bool,
    pub active_game: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            registrations_closed: false,
            active_game: 1,
        }
    }
}

impl Settings {
    pub fn has_active_game(&self) -> bool {
        self.active_game != NO_ACTIVE_GAME
    }
}

/// A person signed up for a game.
///
/// `phone`, `game` and `turn_number` are always set for records created by
/// this service. Documents written by older deployments may lack them, so they
/// deserialize leniently and never take part in duplicate or turn checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registrant {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_number: Option<u32>,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
}

impl Registrant {
    /// Generate a registrant id: base-36 epoch millis plus a random base-36 suffix.
    ///
    /// Uniqueness is best-effort; two ids minted in the same millisecond
    /// collide only if their suffixes match.
    pub fn generate_id(now: DateTime<Utc>) -> String {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        let mut rng = rand::rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| BASE36_DIGITS[rng.random_range(0..BASE36_DIGITS.len())] as char)
            .collect();
        format!("{}{}", to_base36(millis), suffix)
    }

    pub fn is_in_game(&self, game: u8) -> bool {
        self.game == Some(game)
    }
}

/// The single persisted aggregate: settings plus every registrant in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterDocument {
    pub settings: Settings,
    pub students: Vec<Registrant>,
}

impl RosterDocument {
    pub fn registrants_in_game(&self, game: u8) -> impl Iterator<Item = &Registrant> {
        self.students.iter().filter(move |s| s.is_in_game(game))
    }

    pub fn next_turn_number(&self, game: u8) -> u32 {
        let taken = self.registrants_in_game(game).count();
        u32::try_from(taken).unwrap_or(u32::MAX - 1) + 1
    }

    pub fn has_registration(&self, phone: &str, game: u8) -> bool {
        self.registrants_in_game(game).any(|s| s.phone == phone)
    }

    pub fn find(&self, id: &str) -> Option<&Registrant> {
        self.students.iter().find(|s| s.id == id)
    }

    /// Registrants ordered by creation time; ties keep insertion order.
    pub fn sorted_registrants(&self) -> Vec<Registrant> {
        let mut sorted = self.students.clone();
        sorted.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        sorted
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize] as char);
        value /= 36;
    }
    digits.iter().rev().collect()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// ISO-8601 timestamps with millisecond precision and a `Z` suffix.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

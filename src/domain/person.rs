use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PersonId = Uuid;

/// Palette used when a friend is added without an explicit color.
pub const COLOR_PALETTE: &[&str] = &[
    "#8B5CF6", "#06B6D4", "#10B981", "#F59E0B", "#EF4444", "#84CC16", "#F97316", "#EC4899",
    "#6366F1", "#059669", "#DC2626", "#7C3AED", "#0891B2", "#BE185D", "#0D9488", "#6D28D9",
];

/// A friend the tracker's owner pays on behalf of.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub initials: String,
    pub color: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Person {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let id = Uuid::new_v4();
        let initials = derive_initials(&name);
        // Stable palette pick keyed off the random id
        let color = COLOR_PALETTE[id.as_bytes()[0] as usize % COLOR_PALETTE.len()].to_string();
        Self {
            id,
            name,
            initials,
            color,
            avatar: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

/// Derive display initials from a name: first letter of the first two words,
/// uppercased. "Ravi Kumar" -> "RK", "amit" -> "A".
pub fn derive_initials(name: &str) -> String {
    name.split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(|c| c.to_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_initials() {
        assert_eq!(derive_initials("Ravi Kumar"), "RK");
        assert_eq!(derive_initials("amit"), "A");
        assert_eq!(derive_initials("Sana Ali Khan"), "SA");
        assert_eq!(derive_initials(""), "");
    }

    #[test]
    fn test_new_person_gets_palette_color() {
        let person = Person::new("Ravi Kumar");
        assert!(COLOR_PALETTE.contains(&person.color.as_str()));
        assert_eq!(person.initials, "RK");
        assert!(person.avatar.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let person = Person::new("Amit")
            .with_color("#123456")
            .with_avatar("avatar-3");
        assert_eq!(person.color, "#123456");
        assert_eq!(person.avatar.as_deref(), Some("avatar-3"));
    }
}

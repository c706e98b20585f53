//! The administrator roster.

use serde::Serialize;

/// Identifier of an administrator record.
pub type AdminId = u8;

/// Gender shown on an administrator's file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Female.
    Female,
    /// Male.
    Male,
}

/// A hireable town administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Administrator {
    /// Roster id, also the index into [`admins`].
    pub id: AdminId,
    /// Full name.
    pub name: &'static str,
    /// Age in years.
    pub age: u8,
    /// Gender.
    pub gender: Gender,
    /// Money deducted from the town every round.
    pub salary: i32,
    /// Short biography.
    pub biography: &'static str,
}

static ADMINS: [Administrator; 4] = [
    Administrator {
        id: 0,
        name: "Edmund Gray",
        age: 54,
        gender: Gender::Male,
        salary: 2,
        biography: "Former quartermaster of the river garrison. Counts every coin twice.",
    },
    Administrator {
        id: 1,
        name: "Marta Kowal",
        age: 38,
        gender: Gender::Female,
        salary: 3,
        biography: "Ran a trading post through two border wars and kept it open.",
    },
    Administrator {
        id: 2,
        name: "Ilse Brandt",
        age: 61,
        gender: Gender::Female,
        salary: 1,
        biography: "Retired magistrate. Cheap, patient and very hard to impress.",
    },
    Administrator {
        id: 3,
        name: "Tomas Reyes",
        age: 29,
        gender: Gender::Male,
        salary: 4,
        biography: "Young surveyor with expensive tastes and a talent for quarries.",
    },
];

/// The full administrator roster, ordered by id.
#[must_use]
pub fn admins() -> &'static [Administrator] {
    &ADMINS
}

/// Look up an administrator by id.
#[must_use]
pub fn admin(id: AdminId) -> Option<&'static Administrator> {
    ADMINS.get(usize::from(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_match_positions() {
        for (index, record) in admins().iter().enumerate() {
            assert_eq!(usize::from(record.id), index);
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(admin(0).map(|a| a.name), Some("Edmund Gray"));
        assert!(admin(4).is_none());
    }
}

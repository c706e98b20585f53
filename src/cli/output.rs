//! Output formatting utilities for CLI.

use serde::Serialize;
use townhall::registry::Administrator;

/// JSON-serializable town listing entry.
#[derive(Debug, Serialize)]
pub(super) struct JsonTown {
    /// Town name.
    pub(super) name: String,
    /// Save file.
    pub(super) path: String,
    /// Whether a backup from an earlier save exists.
    pub(super) has_backup: bool,
}

/// Format the administrator roster as a table.
pub(super) fn format_admins(admins: &[Administrator]) -> String {
    let mut output = String::from("ID  NAME          AGE  SALARY  BIOGRAPHY\n");
    for admin in admins {
        output.push_str(&format!(
            "{:<3} {:<13} {:>3}  {:>6}  {}\n",
            admin.id, admin.name, admin.age, admin.salary, admin.biography
        ));
    }
    output
}

/// Format town names, one per line.
pub(super) fn format_towns(towns: &[JsonTown]) -> String {
    if towns.is_empty() {
        return String::from("no towns yet; found one with 'townhall hire-admin ADMIN_ID NAME'\n");
    }
    let mut output = String::new();
    for town in towns {
        output.push_str(&town.name);
        if town.has_backup {
            output.push_str(" (backup)");
        }
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use townhall::registry::admins;

    #[test]
    fn test_admin_table_has_a_row_per_admin() {
        let text = format_admins(admins());
        assert_eq!(text.lines().count(), admins().len() + 1);
        assert!(text.contains("Edmund Gray"));
    }

    #[test]
    fn test_empty_town_list_hint() {
        assert!(format_towns(&[]).contains("hire-admin"));
    }
}

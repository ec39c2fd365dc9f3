/*!
 * # Role-based section visibility
 *
 * Maps each [`Role`] to the dashboard sections it may open. The workflow
 * layer does not enforce these checks itself; callers gate their actions
 * with the helpers below.
 */

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use super::Role;

/// Top-level dashboard sections, in menu order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Section {
    Dashboard,
    Assets,
    Stock,
    Rooms,
    Repairs,
    Alerts,
    Purchases,
    Library,
    Admin,
}

lazy_static! {
    static ref SECTIONS: HashMap<Role, HashSet<Section>> = {
        let staff: HashSet<Section> = [
            Section::Dashboard,
            Section::Assets,
            Section::Rooms,
            Section::Alerts,
            Section::Library,
        ]
        .into_iter()
        .collect();

        let mut manager = staff.clone();
        manager.extend([Section::Stock, Section::Repairs, Section::Purchases]);

        let admin: HashSet<Section> = Section::iter().collect();

        let mut sections = HashMap::new();
        sections.insert(Role::Staff, staff);
        sections.insert(Role::Manager, manager);
        sections.insert(Role::Admin, admin);
        sections
    };
}

pub fn can_view(role: Role, section: Section) -> bool {
    SECTIONS
        .get(&role)
        .map(|allowed| allowed.contains(&section))
        .unwrap_or(false)
}

/// Sections visible to `role`, in menu order.
pub fn visible_sections(role: Role) -> Vec<Section> {
    Section::iter().filter(|s| can_view(role, *s)).collect()
}

/// Whether `role` may approve or reject account access requests.
pub fn can_approve(role: Role) -> bool {
    can_view(role, Section::Admin)
}

/// Whether `role` may approve or reject purchase requests.
pub fn can_approve_purchases(role: Role) -> bool {
    can_view(role, Section::Purchases)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_sees_the_shared_sections_only() {
        assert_eq!(
            visible_sections(Role::Staff),
            vec![
                Section::Dashboard,
                Section::Assets,
                Section::Rooms,
                Section::Alerts,
                Section::Library,
            ]
        );
    }

    #[test]
    fn manager_adds_operations() {
        let sections = visible_sections(Role::Manager);
        assert!(sections.contains(&Section::Stock));
        assert!(sections.contains(&Section::Purchases));
        assert!(sections.contains(&Section::Repairs));
        assert!(!sections.contains(&Section::Admin));
    }

    #[test]
    fn admin_sees_everything() {
        assert_eq!(visible_sections(Role::Admin).len(), Section::iter().count());
    }

    #[test]
    fn approval_rights() {
        assert!(can_approve(Role::Admin));
        assert!(!can_approve(Role::Manager));
        assert!(can_approve_purchases(Role::Manager));
        assert!(!can_approve_purchases(Role::Staff));
    }
}

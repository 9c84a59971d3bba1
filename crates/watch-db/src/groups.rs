//! User-defined groups of watched entities.
//!
//! Groups hold entity ids only; they never own the entity. Removing an
//! entity from the watch list must also go through
//! [`Groups::remove_entity_everywhere`].

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::EntityId;

static RE_HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6})$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupError {
    #[error("group not found: {0}")]
    NotFound(String),

    #[error("group name must not be empty")]
    EmptyName,

    #[error("invalid color (expected #rgb or #rrggbb): {0}")]
    InvalidColor(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub streamers: BTreeSet<EntityId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Groups {
    groups: Vec<Group>,
}

impl Groups {
    pub fn all(&self) -> &[Group] {
        &self.groups
    }

    pub fn get(&self, group_id: &str) -> Result<&Group, GroupError> {
        self.groups
            .iter()
            .find(|g| g.id == group_id)
            .ok_or_else(|| GroupError::NotFound(group_id.to_string()))
    }

    fn get_mut(&mut self, group_id: &str) -> Result<&mut Group, GroupError> {
        self.groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or_else(|| GroupError::NotFound(group_id.to_string()))
    }

    pub fn create(&mut self, id: String, name: &str, color: &str) -> Result<&Group, GroupError> {
        let name = validate_name(name)?;
        validate_color(color)?;
        self.groups.push(Group {
            id,
            name,
            color: color.to_string(),
            streamers: BTreeSet::new(),
        });
        Ok(&self.groups[self.groups.len() - 1])
    }

    pub fn rename(&mut self, group_id: &str, name: &str) -> Result<(), GroupError> {
        let name = validate_name(name)?;
        self.get_mut(group_id)?.name = name;
        Ok(())
    }

    pub fn recolor(&mut self, group_id: &str, color: &str) -> Result<(), GroupError> {
        validate_color(color)?;
        self.get_mut(group_id)?.color = color.to_string();
        Ok(())
    }

    pub fn delete(&mut self, group_id: &str) -> Result<Group, GroupError> {
        let pos = self
            .groups
            .iter()
            .position(|g| g.id == group_id)
            .ok_or_else(|| GroupError::NotFound(group_id.to_string()))?;
        Ok(self.groups.remove(pos))
    }

    /// Returns false when the entity was already a member.
    pub fn add_member(&mut self, group_id: &str, entity: EntityId) -> Result<bool, GroupError> {
        Ok(self.get_mut(group_id)?.streamers.insert(entity))
    }

    /// Returns false when the entity was not a member.
    pub fn remove_member(&mut self, group_id: &str, entity: &EntityId) -> Result<bool, GroupError> {
        Ok(self.get_mut(group_id)?.streamers.remove(entity))
    }

    /// Drop `entity` from every group. Returns how many groups changed.
    pub fn remove_entity_everywhere(&mut self, entity: &EntityId) -> usize {
        self.groups
            .iter_mut()
            .map(|g| g.streamers.remove(entity))
            .filter(|removed| *removed)
            .count()
    }

    pub fn groups_of<'a>(&'a self, entity: &'a EntityId) -> impl Iterator<Item = &'a Group> + 'a {
        self.groups.iter().filter(move |g| g.streamers.contains(entity))
    }
}

fn validate_name(name: &str) -> Result<String, GroupError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GroupError::EmptyName);
    }
    Ok(name.to_string())
}

fn validate_color(color: &str) -> Result<(), GroupError> {
    if RE_HEX_COLOR.is_match(color) {
        Ok(())
    } else {
        Err(GroupError::InvalidColor(color.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> EntityId {
        s.parse().unwrap()
    }

    fn two_groups() -> Groups {
        let mut groups = Groups::default();
        groups.create("g1".into(), "Friends", "#ff0000").unwrap();
        groups.create("g2".into(), "Late night", "#00f").unwrap();
        groups.add_member("g1", id("s:a")).unwrap();
        groups.add_member("g1", id("s:b")).unwrap();
        groups.add_member("g2", id("s:a")).unwrap();
        groups.add_member("g2", id("c:c")).unwrap();
        groups
    }

    #[test]
    fn remove_entity_clears_every_membership() {
        let mut groups = two_groups();
        assert_eq!(groups.remove_entity_everywhere(&id("s:a")), 2);

        let g1 = groups.get("g1").unwrap();
        let g2 = groups.get("g2").unwrap();
        assert_eq!(g1.streamers.iter().collect::<Vec<_>>(), vec![&id("s:b")]);
        assert_eq!(g2.streamers.iter().collect::<Vec<_>>(), vec![&id("c:c")]);
        assert_eq!(groups.remove_entity_everywhere(&id("s:a")), 0);
    }

    #[test]
    fn membership_is_a_set() {
        let mut groups = two_groups();
        assert!(!groups.add_member("g1", id("s:a")).unwrap());
        assert!(groups.remove_member("g1", &id("s:a")).unwrap());
        assert!(!groups.remove_member("g1", &id("s:a")).unwrap());
        assert_eq!(groups.groups_of(&id("s:a")).count(), 1);
    }

    #[test]
    fn validates_name_color_and_ids() {
        let mut groups = Groups::default();
        assert_eq!(
            groups.create("g".into(), "  ", "#fff").unwrap_err(),
            GroupError::EmptyName
        );
        assert!(matches!(
            groups.create("g".into(), "ok", "red"),
            Err(GroupError::InvalidColor(_))
        ));
        assert!(matches!(
            groups.rename("missing", "x"),
            Err(GroupError::NotFound(_))
        ));

        groups.create("g".into(), " Main ", "#abcdef").unwrap();
        assert_eq!(groups.get("g").unwrap().name, "Main");
        groups.recolor("g", "#123").unwrap();
        assert_eq!(groups.delete("g").unwrap().color, "#123");
        assert!(groups.all().is_empty());
    }
}

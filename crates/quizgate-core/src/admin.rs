//! Admin whitelist and role resolution.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::WhitelistError;
use crate::model::{UserIdentity, UserProfile, UserRole};

/// Root admin present in every whitelist unless configured otherwise.
pub const DEFAULT_ROOT_ADMIN: &str = "tobita@kiryo.ac.jp";

/// Set of admin emails that always contains the root identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminWhitelist {
    root: String,
    members: BTreeSet<String>,
}

impl AdminWhitelist {
    pub fn new(root: &str) -> Self {
        let root = normalize(root);
        let members = BTreeSet::from([root.clone()]);
        Self { root, members }
    }

    /// Rebuild from stored members, re-inserting the root if it went missing.
    pub fn from_members<I, S>(root: &str, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new(root);
        for m in members {
            let m = normalize(m.as_ref());
            if !m.is_empty() {
                list.members.insert(m);
            }
        }
        list
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn members(&self) -> &BTreeSet<String> {
        &self.members
    }

    pub fn contains(&self, email: &str) -> bool {
        self.members.contains(&normalize(email))
    }

    /// Add an admin. Returns `false` if they were already present.
    pub fn add(&mut self, email: &str) -> Result<bool, WhitelistError> {
        let email = normalize(email);
        if !email.contains('@') {
            return Err(WhitelistError::InvalidEmail(email));
        }
        Ok(self.members.insert(email))
    }

    /// Remove an admin. Returns `false` if they were not present.
    pub fn remove(&mut self, email: &str) -> Result<bool, WhitelistError> {
        let email = normalize(email);
        if email == self.root {
            return Err(WhitelistError::ProtectedMember(email));
        }
        Ok(self.members.remove(&email))
    }

    pub fn role_of(&self, email: &str) -> UserRole {
        if self.contains(email) {
            UserRole::Admin
        } else {
            UserRole::Learner
        }
    }

    /// Attach a role to a signed-in identity.
    pub fn resolve(&self, identity: UserIdentity) -> UserProfile {
        let role = self.role_of(&identity.email);
        UserProfile { identity, role }
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_always_present() {
        let list = AdminWhitelist::from_members(DEFAULT_ROOT_ADMIN, ["a@x.com"]);
        assert!(list.contains(DEFAULT_ROOT_ADMIN));
        assert_eq!(list.members().len(), 2);
    }

    #[test]
    fn root_cannot_be_removed() {
        let mut list = AdminWhitelist::new(DEFAULT_ROOT_ADMIN);
        let err = list.remove("Tobita@Kiryo.ac.jp").unwrap_err();
        assert!(matches!(err, WhitelistError::ProtectedMember(_)));
        assert!(list.contains(DEFAULT_ROOT_ADMIN));
    }

    #[test]
    fn add_and_remove() {
        let mut list = AdminWhitelist::new(DEFAULT_ROOT_ADMIN);
        assert!(list.add(" Sora@Example.com ").unwrap());
        assert!(!list.add("sora@example.com").unwrap());
        assert!(list.remove("sora@example.com").unwrap());
        assert!(!list.remove("sora@example.com").unwrap());
    }

    #[test]
    fn add_rejects_non_email() {
        let mut list = AdminWhitelist::new(DEFAULT_ROOT_ADMIN);
        assert_eq!(
            list.add("not-an-email"),
            Err(WhitelistError::InvalidEmail("not-an-email".into()))
        );
    }

    #[test]
    fn resolves_roles() {
        let mut list = AdminWhitelist::new(DEFAULT_ROOT_ADMIN);
        list.add("sora@example.com").unwrap();

        let admin = list.resolve(UserIdentity::new("sora@example.com", None));
        assert_eq!(admin.role, UserRole::Admin);
        let learner = list.resolve(UserIdentity::new("kai@example.com", None));
        assert_eq!(learner.role, UserRole::Learner);
    }
}

//! Data set metadata for human-readable names
//!
//! `DataSetMetadata` provides bidirectional mappings between the names used
//! in the builder DSL and the ids assigned to entities.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{AccountId, CategoryId, CurrencyId, PayeeId, SecurityId, TagId};

/// Metadata entry for any named entity
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct EntityMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// One kind of named entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(bound(deserialize = "Id: Deserialize<'de> + std::hash::Hash + Eq"))]
pub struct NameTable<Id: std::hash::Hash + Eq> {
    pub entries: HashMap<Id, EntityMetadata>,
    #[serde(default)]
    pub names: HashMap<String, Id>,
}

impl<Id: std::hash::Hash + Eq> Default for NameTable<Id> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            names: HashMap::new(),
        }
    }
}

impl<Id: Copy + std::hash::Hash + Eq> NameTable<Id> {
    /// Returns false when the name is already taken
    pub fn register(&mut self, id: Id, name: String, description: Option<String>) -> bool {
        if self.names.contains_key(&name) {
            return false;
        }
        self.names.insert(name.clone(), id);
        self.entries.insert(
            id,
            EntityMetadata {
                name: Some(name),
                description,
            },
        );
        true
    }

    #[must_use]
    pub fn id(&self, name: &str) -> Option<Id> {
        self.names.get(name).copied()
    }

    #[must_use]
    pub fn name(&self, id: Id) -> Option<&str> {
        self.entries.get(&id).and_then(|m| m.name.as_deref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Names and descriptions of every entity in a built data set
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DataSetMetadata {
    pub currencies: NameTable<CurrencyId>,
    pub payees: NameTable<PayeeId>,
    pub categories: NameTable<CategoryId>,
    pub tags: NameTable<TagId>,
    pub accounts: NameTable<AccountId>,
    pub securities: NameTable<SecurityId>,
}

impl DataSetMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn account_id(&self, name: &str) -> Option<AccountId> {
        self.accounts.id(name)
    }

    #[must_use]
    pub fn security_id(&self, name: &str) -> Option<SecurityId> {
        self.securities.id(name)
    }

    #[must_use]
    pub fn payee_id(&self, name: &str) -> Option<PayeeId> {
        self.payees.id(name)
    }

    #[must_use]
    pub fn category_id(&self, name: &str) -> Option<CategoryId> {
        self.categories.id(name)
    }

    #[must_use]
    pub fn tag_id(&self, name: &str) -> Option<TagId> {
        self.tags.id(name)
    }

    #[must_use]
    pub fn currency_id(&self, code: &str) -> Option<CurrencyId> {
        self.currencies.id(code)
    }

    #[must_use]
    pub fn account_name(&self, id: AccountId) -> Option<&str> {
        self.accounts.name(id)
    }

    #[must_use]
    pub fn security_name(&self, id: SecurityId) -> Option<&str> {
        self.securities.name(id)
    }

    #[must_use]
    pub fn payee_name(&self, id: PayeeId) -> Option<&str> {
        self.payees.name(id)
    }

    #[must_use]
    pub fn category_name(&self, id: CategoryId) -> Option<&str> {
        self.categories.name(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_resolve_both_ways() {
        let mut metadata = DataSetMetadata::new();
        assert!(metadata.accounts.register(AccountId(3), "Current".into(), None));
        assert!(!metadata.accounts.register(AccountId(4), "Current".into(), None));
        assert_eq!(metadata.account_id("Current"), Some(AccountId(3)));
        assert_eq!(metadata.account_name(AccountId(3)), Some("Current"));
        assert_eq!(metadata.account_name(AccountId(4)), None);
        assert_eq!(metadata.accounts.len(), 1);
    }

    #[test]
    fn test_name_index_is_optional_when_loading() {
        let json = r#"{"entries": {"7": {"name": "Barclays", "description": null}}}"#;
        let table: NameTable<PayeeId> = serde_json::from_str(json).unwrap();
        assert!(table.names.is_empty());
        assert_eq!(table.entries[&PayeeId(7)].name.as_deref(), Some("Barclays"));
    }
}

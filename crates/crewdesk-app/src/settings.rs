// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::DEFAULT_SERVICE_TYPES;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

impl Default for CompanyInfo {
    fn default() -> Self {
        Self {
            name: "Legendary Contractors".to_owned(),
            phone: "(555) 123-4567".to_owned(),
            email: "info@legendarycontractors.com".to_owned(),
            address: "123 Builder Ave, Construction City, ST 12345".to_owned(),
        }
    }
}

/// Ordered service-type names offered by the lead and schedule dialogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCatalog {
    types: Vec<String>,
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_TYPES)
    }
}

impl ServiceCatalog {
    /// Goes through `add`, so blanks and duplicates are dropped.
    pub fn new(types: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        let mut catalog = Self { types: Vec::new() };
        for name in types {
            catalog.add(name.as_ref());
        }
        catalog
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// Returns false when the trimmed name is empty or already listed
    /// (case-insensitive).
    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty()
            || self
                .types
                .iter()
                .any(|existing| existing.eq_ignore_ascii_case(name))
        {
            return false;
        }
        self.types.push(name.to_owned());
        true
    }

    /// Out-of-range indexes are ignored.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.types.len()).then(|| self.types.remove(index))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Settings {
    pub company: CompanyInfo,
    pub services: ServiceCatalog,
}

#[cfg(test)]
mod tests {
    use super::ServiceCatalog;
    use crate::DEFAULT_SERVICE_TYPES;

    #[test]
    fn default_catalog_lists_builtin_types() {
        assert_eq!(ServiceCatalog::default().types().len(), DEFAULT_SERVICE_TYPES.len());
    }

    #[test]
    fn add_trims_and_ignores_empty_and_duplicates() {
        let mut catalog = ServiceCatalog::new(["Decks"]);
        assert!(catalog.add("  Fencing "));
        assert!(!catalog.add("   "));
        assert!(!catalog.add("decks"));
        assert_eq!(catalog.types(), ["Decks", "Fencing"]);
    }

    #[test]
    fn remove_ignores_out_of_range() {
        let mut catalog = ServiceCatalog::new(["Decks", "Fencing"]);
        assert_eq!(catalog.remove(5), None);
        assert_eq!(catalog.remove(0).as_deref(), Some("Decks"));
        assert_eq!(catalog.types(), ["Fencing"]);
    }
}

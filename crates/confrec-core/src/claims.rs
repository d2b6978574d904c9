//! Cross-package target claims
//!
//! A claim records that a package owns a target object, keyed as
//! `object_type:target` (see [`claim_key`](crate::model::claim_key)). Apply
//! refuses to touch an object another package has claimed. The check is a
//! validation step, not a lock; callers serialize applies.

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::Result;

/// Registry of which package owns which target objects
pub trait TargetClaims {
    /// Every claim held by a package other than `package`, as key → owner
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the backend cannot be read.
    fn claims_of_others(&self, package: &str) -> Result<BTreeMap<String, String>>;

    /// Replace all of `package`'s claims with `keys`
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the backend rejects the write.
    fn replace_claims(&mut self, package: &str, keys: &BTreeSet<String>) -> Result<()>;

    /// Drop every claim held by `package`
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the backend rejects the write.
    fn release(&mut self, package: &str) -> Result<()>;
}

/// Map-backed claims registry
#[derive(Debug, Clone, Default)]
pub struct InMemoryTargetClaims {
    by_package: BTreeMap<String, BTreeSet<String>>,
}

impl InMemoryTargetClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims currently held by `package`
    pub fn claims_of(&self, package: &str) -> BTreeSet<String> {
        self.by_package.get(package).cloned().unwrap_or_default()
    }
}

impl TargetClaims for InMemoryTargetClaims {
    fn claims_of_others(&self, package: &str) -> Result<BTreeMap<String, String>> {
        Ok(self
            .by_package
            .iter()
            .filter(|(owner, _)| owner.as_str() != package)
            .flat_map(|(owner, keys)| keys.iter().map(move |k| (k.clone(), owner.clone())))
            .collect())
    }

    fn replace_claims(&mut self, package: &str, keys: &BTreeSet<String>) -> Result<()> {
        if keys.is_empty() {
            self.by_package.remove(package);
        } else {
            self.by_package.insert(package.to_string(), keys.clone());
        }
        Ok(())
    }

    fn release(&mut self, package: &str) -> Result<()> {
        self.by_package.remove(package);
        Ok(())
    }
}

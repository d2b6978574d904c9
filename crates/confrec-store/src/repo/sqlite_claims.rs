//! SQLite target claims registry

#![allow(clippy::result_large_err)]

use std::collections::{BTreeMap, BTreeSet};

use confrec_core::claims::TargetClaims;
use confrec_core::errors::Result as CoreResult;
use rusqlite::Connection;

use crate::errors::storage_error;

/// Claims registry in the `target_claims` table
///
/// `claim_key` is the primary key, so a target can have one owner at most.
pub struct SqliteTargetClaims {
    conn: Connection,
}

impl SqliteTargetClaims {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Claims currently held by `package`
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the query fails.
    pub fn claims_of(&self, package: &str) -> CoreResult<BTreeSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT claim_key FROM target_claims WHERE package = ?1")
            .map_err(|e| storage_error("claims_of", e))?;
        let keys = stmt
            .query_map([package], |row| row.get::<_, String>(0))
            .map_err(|e| storage_error("claims_of", e))?
            .collect::<std::result::Result<BTreeSet<_>, _>>()
            .map_err(|e| storage_error("claims_of", e))?;
        Ok(keys)
    }
}

impl TargetClaims for SqliteTargetClaims {
    fn claims_of_others(&self, package: &str) -> CoreResult<BTreeMap<String, String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT claim_key, package FROM target_claims WHERE package <> ?1")
            .map_err(|e| storage_error("claims_of_others", e))?;
        let claims = stmt
            .query_map([package], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| storage_error("claims_of_others", e))?
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()
            .map_err(|e| storage_error("claims_of_others", e))?;
        Ok(claims)
    }

    fn replace_claims(&mut self, package: &str, keys: &BTreeSet<String>) -> CoreResult<()> {
        let now = chrono::Utc::now().timestamp();
        let tx = self
            .conn
            .transaction()
            .map_err(|e| storage_error("replace_claims", e))?;
        tx.execute("DELETE FROM target_claims WHERE package = ?1", [package])
            .map_err(|e| storage_error("replace_claims", e))?;
        for key in keys {
            tx.execute(
                "INSERT INTO target_claims (claim_key, package, claimed_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![key, package, now],
            )
            .map_err(|e| storage_error("replace_claims", e))?;
        }
        tx.commit().map_err(|e| storage_error("replace_claims", e))?;
        Ok(())
    }

    fn release(&mut self, package: &str) -> CoreResult<()> {
        self.conn
            .execute("DELETE FROM target_claims WHERE package = ?1", [package])
            .map_err(|e| storage_error("release_claims", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_status_db_in_memory;

    fn keys(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_replace_release_and_others() {
        let mut claims = SqliteTargetClaims::new(open_status_db_in_memory().unwrap());
        claims.replace_claims("a", &keys(&["site:home", "site:blog"])).unwrap();
        claims.replace_claims("b", &keys(&["page:index"])).unwrap();
        claims.replace_claims("a", &keys(&["site:home"])).unwrap();

        assert_eq!(claims.claims_of("a").unwrap(), keys(&["site:home"]));
        let others = claims.claims_of_others("b").unwrap();
        assert_eq!(others.get("site:home"), Some(&"a".to_string()));
        assert_eq!(others.len(), 1);

        claims.release("a").unwrap();
        assert!(claims.claims_of_others("b").unwrap().is_empty());
    }

    #[test]
    fn test_second_owner_is_rejected_by_schema() {
        let mut claims = SqliteTargetClaims::new(open_status_db_in_memory().unwrap());
        claims.replace_claims("a", &keys(&["site:home"])).unwrap();
        assert!(claims.replace_claims("b", &keys(&["site:home"])).is_err());
        assert!(claims.claims_of("b").unwrap().is_empty());
    }
}

// index.rs: set of token keys built from the reference log
use std::collections::HashSet;

use crate::error::InvalidFormat;
use crate::tokenizer::{tokenize, TokenKey};

/// Distinct token keys of every line added so far. Insert-only; each
/// instance owns its own set.
#[derive(Debug, Default, Clone)]
pub struct ReferenceIndex {
    keys: HashSet<TokenKey>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_line(&mut self, line: &str) -> Result<(), InvalidFormat> {
        let key = tokenize(line)?;
        self.insert_key(key);
        Ok(())
    }

    pub fn line_exists(&self, line: &str) -> Result<bool, InvalidFormat> {
        let key = tokenize(line)?;
        Ok(self.contains_key(&key))
    }

    /// Tokenize every line before inserting any of them, so a malformed line
    /// leaves the index untouched. Returns the number of new keys.
    pub fn add_lines<'a, I>(&mut self, lines: I) -> Result<usize, InvalidFormat>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keys = lines.into_iter().map(tokenize).collect::<Result<Vec<_>, _>>()?;
        Ok(self.extend_keys(keys))
    }

    /// Returns the number of keys that were not present yet.
    pub fn extend_keys<I: IntoIterator<Item = TokenKey>>(&mut self, keys: I) -> usize {
        let mut added = 0usize;
        for key in keys {
            if self.keys.insert(key) {
                added += 1;
            }
        }
        added
    }

    /// Returns true when `key` was not present yet.
    pub fn insert_key(&mut self, key: TokenKey) -> bool {
        self.keys.insert(key)
    }

    pub fn contains_key(&self, key: &TokenKey) -> bool {
        self.keys.contains(key)
    }

    /// Number of distinct keys, not lines.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::ReferenceIndex;

    const NTPD: &str =
        "Aug  31 19:35:34 ubuntu ntpd[7383]: 64.246.132.14 interface 172.16.208.165 -> (none)";

    #[test]
    fn test_membership_and_cardinality() {
        let mut idx = ReferenceIndex::new();
        assert!(idx.is_empty());
        assert!(!idx.line_exists(NTPD).unwrap());
        idx.add_line(NTPD).unwrap();
        assert_eq!(idx.len(), 1);
        assert!(idx.line_exists(NTPD).unwrap());
        idx.add_line(NTPD).unwrap();
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn test_lines_differing_only_in_numbers_share_a_key() {
        let mut idx = ReferenceIndex::new();
        idx.add_line("Sep 10 07:55:18 host used 5 MB").unwrap();
        idx.add_line("Sep 11 08:00:00 host used 9000 MB").unwrap();
        assert_eq!(idx.len(), 1);
        idx.add_line("Sep 11 08:00:00 host freed 9000 MB").unwrap();
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn test_instances_do_not_share_state() {
        let mut a = ReferenceIndex::new();
        let b = ReferenceIndex::new();
        a.add_line(NTPD).unwrap();
        assert!(a.line_exists(NTPD).unwrap());
        assert!(!b.line_exists(NTPD).unwrap());
        assert!(b.is_empty());
    }

    #[test]
    fn test_add_lines_counts_new_keys() {
        let mut idx = ReferenceIndex::new();
        let added = idx
            .add_lines([NTPD, "Sep 10 07:55:18 host used 5 MB", "Sep 10 07:55:19 host used 6 MB"])
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(idx.add_lines([NTPD]).unwrap(), 0);
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn test_add_lines_is_all_or_nothing() {
        let mut idx = ReferenceIndex::new();
        idx.add_line(NTPD).unwrap();
        let err = idx.add_lines(["Sep 10 07:55:18 fresh line", "not a date at all", "Sep 10 07:55:18 another"]);
        assert!(err.is_err());
        assert_eq!(idx.len(), 1, "no key from the failed batch may be inserted");
        assert!(!idx.line_exists("Sep 10 07:55:18 fresh line").unwrap());
    }

    #[test]
    fn test_malformed_lines_are_rejected_without_mutation() {
        let mut idx = ReferenceIndex::new();
        assert!(idx.add_line("not a date at all").is_err());
        assert!(idx.line_exists("not a date at all").is_err());
        assert!(idx.is_empty());
    }
}

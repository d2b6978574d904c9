/// SQL-LIKE name pattern
///
/// `%` matches any run of characters (including none), `_` matches exactly
/// one character. Matching is case-sensitive and has no escape character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePattern {
    raw: String,
}

impl NamePattern {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Pattern matching every name
    pub fn any() -> Self {
        Self::new("%")
    }

    /// The pattern text, as handed to a LIKE clause
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the pattern has no wildcards
    pub fn is_exact(&self) -> bool {
        !self.raw.contains(['%', '_'])
    }

    pub fn matches(&self, name: &str) -> bool {
        let pattern: Vec<char> = self.raw.chars().collect();
        let name: Vec<char> = name.chars().collect();

        // matched[j]: pattern prefix so far matches name[..j]
        let mut matched = vec![false; name.len() + 1];
        matched[0] = true;

        for p in &pattern {
            let mut next = vec![false; name.len() + 1];
            match p {
                '%' => {
                    let mut reachable = false;
                    for j in 0..=name.len() {
                        reachable |= matched[j];
                        next[j] = reachable;
                    }
                }
                '_' => {
                    for j in 1..=name.len() {
                        next[j] = matched[j - 1];
                    }
                }
                c => {
                    for j in 1..=name.len() {
                        next[j] = matched[j - 1] && name[j - 1] == *c;
                    }
                }
            }
            matched = next;
        }

        matched[name.len()]
    }
}

impl From<&str> for NamePattern {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl std::fmt::Display for NamePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

//! Public key normalization
//!
//! Raw uncompressed elliptic-curve points carry a `04` prefix byte that
//! some enrollment tools strip. A captured key is therefore looked up in
//! both forms: as given first, then the complementary form.

/// SEC1 tag byte for an uncompressed curve point, hex encoded.
pub const UNCOMPRESSED_POINT_PREFIX: &str = "04";

/// Uppercase a hex string and strip every whitespace character.
pub fn normalize_hex(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// True for a non-empty string of hex digits.
pub fn is_hex(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// Ordered registry lookup keys for one observed public key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyCandidates {
    keys: Vec<String>,
}

impl KeyCandidates {
    /// Build candidates from a raw observed key. Empty when the key is blank
    /// or not hex.
    pub fn from_observed(raw: &str) -> Self {
        let key = normalize_hex(raw);
        if !is_hex(&key) {
            return Self::default();
        }

        let complement = match key.strip_prefix(UNCOMPRESSED_POINT_PREFIX) {
            Some(bare) => bare.to_string(),
            None => format!("{UNCOMPRESSED_POINT_PREFIX}{key}"),
        };

        let keys = std::iter::once(key)
            .chain(std::iter::once(complement))
            .filter(|k| !k.is_empty())
            .collect();

        Self { keys }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Both forms of a key denote the same identity.
    pub fn contains(&self, key: &str) -> bool {
        let key = normalize_hex(key);
        self.keys.iter().any(|k| *k == key)
    }
}

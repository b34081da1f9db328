use std::fmt;
use uuid::Uuid;

/// Unique value attached to each payment creation so the gateway treats
/// transport-level retries of the same forwarded request as a single
/// operation. Generated fresh per creation call, never reused across
/// distinct submissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(Uuid);

impl IdempotencyKey {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn sequential_keys_are_pairwise_distinct() {
        let keys: HashSet<String> = (0..200)
            .map(|_| IdempotencyKey::generate().to_string())
            .collect();
        assert_eq!(keys.len(), 200);
    }

    #[test]
    fn key_renders_as_a_uuid() {
        let key = IdempotencyKey::generate();
        let parsed = Uuid::parse_str(&key.to_string()).expect("key should render as a uuid");
        assert_eq!(&parsed, key.as_uuid());
    }
}

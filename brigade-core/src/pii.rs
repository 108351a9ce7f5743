use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wrapper for credential material (password hashes, raw tokens) that blanks
/// the value in `Debug`/`Display` output so request logging can never capture
/// it. Serialization passes the inner value through; response types simply
/// never include a `Masked` field.
#[derive(Clone, Deserialize)]
pub struct Masked<T>(pub T);

impl<T> Masked<T> {
    pub fn into_inner(self) -> T {
        self.0
    }

    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T> From<T> for Masked<T> {
    fn from(value: T) -> Self {
        Masked(value)
    }
}

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_never_shows_the_value() {
        let hash: Masked<String> = "argon2-material".to_string().into();
        assert_eq!(format!("{:?}", hash), "********");
        assert_eq!(format!("{}", hash), "********");
        assert_eq!(hash.expose(), "argon2-material");
    }
}

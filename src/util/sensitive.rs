use serde::{Deserialize, Serialize};

/// Wrapper over any value that should not be printed out in logs
/// or to the console.
///
/// It serializes transparently; only `Debug` output is redacted.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl Sensitive<String> {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T> std::ops::Deref for Sensitive<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> From<T> for Sensitive<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> std::fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Sensitive(<redacted>)")
    }
}

impl validator::ValidateLength<u64> for Sensitive<String> {
    fn length(&self) -> Option<u64> {
        Some(self.0.chars().count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let secret = Sensitive::new("hunter2".to_string());
        assert_eq!(format!("{secret:?}"), "Sensitive(<redacted>)");
    }

    #[test]
    fn serializes_transparently() {
        let secret = Sensitive::new("hunter2".to_string());
        assert_eq!(
            serde_json::to_string(&secret).unwrap(),
            r#""hunter2""#
        );
    }
}

// src/bundle/payload.rs

use std::borrow::Cow;
use std::fmt;

use blake3::Hasher;

/// Immutable bytes of a bundled file.
///
/// Embedded payloads borrow the `'static` data compiled into the binary;
/// payloads loaded from a build directory own their bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Payload(Cow<'static, [u8]>);

impl Payload {
    pub const fn from_static(bytes: &'static [u8]) -> Self {
        Self(Cow::Borrowed(bytes))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// blake3 hex digest of the payload.
    pub fn digest(&self) -> String {
        digest_bytes(&self.0)
    }
}

pub(crate) fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    hasher.finalize().to_hex().to_string()
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Cow::Owned(bytes))
    }
}

impl From<&'static [u8]> for Payload {
    fn from(bytes: &'static [u8]) -> Self {
        Self::from_static(bytes)
    }
}

impl From<&'static str> for Payload {
    fn from(s: &'static str) -> Self {
        Self::from_static(s.as_bytes())
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("len", &self.len())
            .field("embedded", &matches!(self.0, Cow::Borrowed(_)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_depends_only_on_content() {
        let a = Payload::from_static(b"tor");
        let b = Payload::from(b"tor".to_vec());
        assert_eq!(a, b);
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), Payload::from("tor2").digest());
        assert_eq!(a.digest().len(), 64);
    }
}

//! Request fingerprints used as response cache keys

use std::fmt;

use sha2::{Digest, Sha256};

/// A 32-byte digest identifying a kernel release plus os-release payload.
///
/// Only ever compared; the contents are never decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive the cache key for a request.
    ///
    /// The kernel release and every payload line (comments and blank lines
    /// included, untrimmed, in order, without line terminators) are hashed,
    /// and the resulting digest is hashed a second time. Keys must stay
    /// byte-compatible with previously issued ones.
    pub fn derive(kernel_release: &str, payload: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(kernel_release.as_bytes());
        for line in payload_lines(payload) {
            hasher.update(line);
        }
        let inner = hasher.finalize();

        Self(Sha256::digest(inner).into())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Split a payload into lines the way a line scanner does: `\n` separated,
/// one trailing `\r` dropped, and no empty line after a final newline.
pub fn payload_lines(payload: &[u8]) -> impl Iterator<Item = &[u8]> {
    let body = payload.strip_suffix(b"\n").unwrap_or(payload);
    let mut lines = body.split(|b| *b == b'\n');
    if payload.is_empty() {
        // `split` on an empty slice still yields one empty item
        lines.next();
    }
    lines.map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const OS_RELEASE: &str = "NAME=\"Rocky Linux\"\n\
                              VERSION=\"8.8 (Green Obsidian)\"\n\
                              ID=\"rocky\"\n\
                              VERSION_ID=\"8.8\"\n";

    #[test]
    fn derive_is_deterministic() {
        let a = Fingerprint::derive("4.18.0-477.el8.x86_64", OS_RELEASE.as_bytes());
        let b = Fingerprint::derive("4.18.0-477.el8.x86_64", OS_RELEASE.as_bytes());

        assert_eq!(a, b);
    }

    #[test]
    fn derive_double_hashes_concatenated_input() {
        let inner = Sha256::digest(b"5.14.0ID=rhelVERSION_ID=9");
        let expected = Fingerprint::from_bytes(Sha256::digest(inner).into());

        assert_eq!(
            Fingerprint::derive("5.14.0", b"ID=rhel\nVERSION_ID=9\n"),
            expected
        );
    }

    #[test]
    fn derive_changes_when_lines_are_permuted() {
        let original = "NAME=\"Rocky Linux\"\nID=\"rocky\"\nVERSION_ID=\"8.8\"\n";
        let permuted = "ID=\"rocky\"\nNAME=\"Rocky Linux\"\nVERSION_ID=\"8.8\"\n";

        assert_ne!(
            Fingerprint::derive("4.18.0-477.el8.x86_64", original.as_bytes()),
            Fingerprint::derive("4.18.0-477.el8.x86_64", permuted.as_bytes())
        );
    }

    #[test]
    fn derive_includes_comment_lines() {
        let plain = "ID=rhel\nVERSION_ID=9\n";
        let commented = "# generated\nID=rhel\nVERSION_ID=9\n";

        assert_ne!(
            Fingerprint::derive("5.14.0", plain.as_bytes()),
            Fingerprint::derive("5.14.0", commented.as_bytes())
        );
    }

    #[test]
    fn derive_includes_kernel_release() {
        assert_ne!(
            Fingerprint::derive("5.14.0-70", OS_RELEASE.as_bytes()),
            Fingerprint::derive("5.14.0-71", OS_RELEASE.as_bytes())
        );
    }

    #[test]
    fn derive_ignores_line_terminator_style() {
        assert_eq!(
            Fingerprint::derive("5.14.0", b"ID=rhel\r\nVERSION_ID=9\r\n"),
            Fingerprint::derive("5.14.0", b"ID=rhel\nVERSION_ID=9")
        );
    }

    #[test]
    fn display_renders_lowercase_hex() {
        let rendered = Fingerprint::from_bytes([0xab; 32]).to_string();

        assert_eq!(rendered.len(), 64);
        assert!(rendered.chars().all(|c| c == 'a' || c == 'b'));
    }

    #[rstest]
    #[case(b"", vec![])]
    #[case(b"a", vec![&b"a"[..]])]
    #[case(b"a\n", vec![&b"a"[..]])]
    #[case(b"a\n\n", vec![&b"a"[..], &b""[..]])]
    #[case(b"\n", vec![&b""[..]])]
    #[case(b"a\r\nb", vec![&b"a"[..], &b"b"[..]])]
    #[case(b"  # c \n", vec![&b"  # c "[..]])]
    fn payload_lines_splits_like_a_line_scanner(
        #[case] payload: &[u8],
        #[case] expected: Vec<&[u8]>,
    ) {
        assert_eq!(payload_lines(payload).collect::<Vec<_>>(), expected);
    }
}

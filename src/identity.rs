use crate::constants::PLACEHOLDER_LINKS;
use sha2::{Digest, Sha256};

/// Prefix marking keys built from the composite of several fields
pub const COMPOSITE_KEY_PREFIX: &str = "cmp-";

/// Whether `link` can identify a notice on its own
pub fn is_usable_link(link: &str) -> bool {
    let link = link.trim();
    !PLACEHOLDER_LINKS.iter().any(|p| p.eq_ignore_ascii_case(link))
}

/// Deduplication key for a notice.
///
/// The origin link when it is a real reference, otherwise the composite key,
/// so that notices sharing a missing-link sentinel are not collapsed.
pub fn identity_key(link: &str, description: &str, value: f64, organization: &str) -> String {
    if is_usable_link(link) {
        link.trim().to_string()
    } else {
        composite_key(link, description, value, organization)
    }
}

/// Secondary identity used to spot repeated rows in audit mode.
///
/// The value is rendered with two decimals, the precision it is persisted
/// with, so the key is the same before and after a save/load cycle.
pub fn composite_key(link: &str, description: &str, value: f64, organization: &str) -> String {
    let mut s = String::new();
    s.push_str(link.trim());
    s.push('|');
    s.push_str(description.trim());
    s.push('|');
    s.push_str(&format!("{:.2}", value));
    s.push('|');
    s.push_str(organization.trim());

    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    let out = hasher.finalize();
    format!("{}{}", COMPOSITE_KEY_PREFIX, hex::encode(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_links_are_their_own_key() {
        let key = identity_key(" https://compras.example/edital/1 ", "x", 1.0, "org");
        assert_eq!(key, "https://compras.example/edital/1");
    }

    #[test]
    fn placeholder_links_fall_back_to_composite() {
        for link in ["", "N/A", "n/a", "null", "None", "-"] {
            let key = identity_key(link, "Aquisição de papel", 10.0, "Prefeitura");
            assert!(key.starts_with(COMPOSITE_KEY_PREFIX), "{link:?} -> {key}");
        }
    }

    #[test]
    fn composite_distinguishes_notices_sharing_a_sentinel() {
        let a = identity_key("N/A", "Aquisição de papel", 10.0, "Prefeitura");
        let b = identity_key("N/A", "Aquisição de toner", 10.0, "Prefeitura");
        let c = identity_key("N/A", "Aquisição de papel", 10.0, "Câmara");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn composite_is_stable_at_persisted_precision() {
        let a = composite_key("N/A", "d", 1234.5, "o");
        let b = composite_key("N/A", "d", 1234.50000001, "o");
        assert_eq!(a, b);
        assert_eq!(a, composite_key("N/A", "d", 1234.5, "o"));
    }
}

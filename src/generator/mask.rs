/// Fallback prefix length when a mask cannot be parsed.
/// Callers needing strict validation must check the mask before calling.
const DEFAULT_CIDR: &str = "24";

/// Convert a subnet mask expression to a CIDR prefix length string.
///
/// Expressions containing a `/` are treated as already-CIDR input and the
/// substring after the last `/` is returned verbatim. Dotted-quad masks are
/// converted by counting set bits across all four octets; a discontiguous
/// mask like `255.0.255.0` therefore still yields a numeric answer ("16")
/// rather than an error. Any parse failure falls back to "24".
pub fn mask_to_cidr(mask: &str) -> String {
    if let Some(idx) = mask.rfind('/') {
        return mask[idx + 1..].to_string();
    }

    let octets: Vec<&str> = mask.split('.').collect();
    if octets.len() != 4 {
        return DEFAULT_CIDR.to_string();
    }

    let mut bits = 0u32;
    for octet in octets {
        match octet.trim().parse::<u8>() {
            Ok(value) => bits += value.count_ones(),
            Err(_) => return DEFAULT_CIDR.to_string(),
        }
    }

    bits.to_string()
}

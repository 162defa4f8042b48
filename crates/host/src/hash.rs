//! Jenkins one-at-a-time hash as used for model and event names

/// Hash `value` case-insensitively
pub fn joaat(value: &str) -> u32 {
    let mut hash: u32 = 0;
    for byte in value.bytes() {
        hash = hash.wrapping_add(byte.to_ascii_lowercase() as u32);
        hash = hash.wrapping_add(hash << 10);
        hash ^= hash >> 6;
    }
    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash.wrapping_add(hash << 15)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_hashes() {
        assert_eq!(joaat(""), 0);
        assert_eq!(joaat("adder"), 0xB779_A091);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(joaat("ADDER"), joaat("adder"));
        assert_ne!(joaat("adder"), joaat("zentorno"));
    }
}

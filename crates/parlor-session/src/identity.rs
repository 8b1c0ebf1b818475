//! Provisional identity minting: display names and avatar URLs.

/// The pool provisional display names are drawn from.
pub const RANDOM_NAMES: [&str; 16] = [
    "Roy Green",
    "Tracy Brooks",
    "Dale Clarke",
    "Rosa Griffin",
    "Phil Owen",
    "Linda Lucas",
    "Logan Kaur",
    "Brittany Delaney",
    "Alex Chen",
    "Jordan Taylor",
    "Casey Morgan",
    "Riley Anderson",
    "Quinn Parker",
    "Avery Martinez",
    "Drew Wilson",
    "Cameron Lee",
];

/// Picks a provisional name for a player who didn't supply one.
pub fn random_name() -> String {
    use rand::Rng;
    let i = rand::rng().random_range(0..RANDOM_NAMES.len());
    RANDOM_NAMES[i].to_string()
}

const AVATAR_COLORS: [&str; 6] =
    ["0D8ABC", "F59E0B", "10B981", "EF4444", "8B5CF6", "EC4899"];

/// Builds an avatar URL for a name. The background color is derived from
/// the name's first character so a rename with the same initial keeps the
/// same color.
pub fn avatar_url(name: &str) -> String {
    let first = name.chars().next().map(|c| c as u32).unwrap_or(0);
    let color = AVATAR_COLORS[(first as usize) % AVATAR_COLORS.len()];
    format!(
        "https://ui-avatars.com/api/?name={}&background={color}&color=fff&size=128",
        percent_encode(name)
    )
}

/// Minimal query-component percent-encoding (unreserved chars pass through).
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_name_comes_from_pool() {
        for _ in 0..20 {
            let name = random_name();
            assert!(RANDOM_NAMES.contains(&name.as_str()));
        }
    }

    #[test]
    fn test_avatar_url_encodes_spaces() {
        let url = avatar_url("Roy Green");
        assert!(url.contains("name=Roy%20Green"), "got {url}");
    }

    #[test]
    fn test_avatar_url_color_is_stable_for_a_name() {
        assert_eq!(avatar_url("Alice"), avatar_url("Alice"));
    }

    #[test]
    fn test_avatar_url_handles_empty_name() {
        let url = avatar_url("");
        assert!(url.contains("background=0D8ABC"));
    }
}

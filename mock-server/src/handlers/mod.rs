pub mod auth;
pub mod books;
pub mod borrows;
pub mod system;
pub mod users;

fn default_current() -> u32 {
    1
}

fn default_size() -> u32 {
    10
}

/// Case-insensitive substring match; an absent filter matches everything.
fn matches(haystack: &str, needle: Option<&str>) -> bool {
    match needle.filter(|n| !n.is_empty()) {
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

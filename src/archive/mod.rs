pub mod wad;

use ::errors::Result;
use ::map::Map;

/// Anything levels can be loaded from.  Levels are identified by their lump name, e.g. `E1M1` or
/// `MAP07`.
pub trait LevelSource {
    /// Every level in the source, in storage order.
    fn level_names(&self) -> Vec<String>;

    /// Loads one level.  Fails with `UnknownLevel` if there's no level by that name.
    fn load_level(&self, name: &str) -> Result<Map>;

    /// Level names matching a shell-style pattern, where `?` matches one character and `*` any
    /// run of characters.  Case-insensitive, like lump names.  `all` is a synonym for `*`.
    fn find_levels(&self, pattern: &str) -> Vec<String> {
        let pattern = if pattern.eq_ignore_ascii_case("all") { "*" } else { pattern };
        self.level_names()
            .into_iter()
            .filter(|name| wildcard_match(pattern, name))
            .collect()
    }
}

/// Matches `name` against a `*`/`?` wildcard pattern, ignoring ASCII case.
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().map(|c| c.to_ascii_uppercase()).collect();
    let name: Vec<char> = name.chars().map(|c| c.to_ascii_uppercase()).collect();

    // Classic greedy matcher: remember the last star and how much of the name it has eaten, and
    // backtrack to it on a mismatch
    let (mut p, mut n) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while n < name.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == name[n]) {
            p += 1;
            n += 1;
        }
        else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, n));
            p += 1;
        }
        else if let Some((star_p, star_n)) = star {
            p = star_p + 1;
            n = star_n + 1;
            star = Some((star_p, star_n + 1));
        }
        else {
            return false;
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcards() {
        assert!(wildcard_match("E?M4", "E1M4"));
        assert!(wildcard_match("E?M4", "e3m4"));
        assert!(!wildcard_match("E?M4", "E1M5"));
        assert!(wildcard_match("MAP*", "MAP01"));
        assert!(wildcard_match("MAP*", "MAP"));
        assert!(!wildcard_match("MAP*", "E1M1"));
        assert!(wildcard_match("*", "ANYTHING"));
        assert!(wildcard_match("*1", "MAP11"));
        assert!(wildcard_match("E*M*", "E2M9"));
        assert!(!wildcard_match("MAP01", "MAP011"));
    }
}

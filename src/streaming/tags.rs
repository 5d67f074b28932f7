use regex::Regex;
use std::collections::HashSet;

lazy_static::lazy_static! {
    /// `#` followed by CJK ideographs, ASCII letters, digits or underscores
    static ref HASHTAG: Regex =
        Regex::new(r"#[\x{4e00}-\x{9fa5}a-zA-Z0-9_]+").expect("hashtag pattern compiles");

    /// A line starting with a `-` or `*` bullet marker
    static ref BULLET_LINE: Regex =
        Regex::new(r"(?m)^[ \t]*[-*][ \t]*(.+)$").expect("bullet pattern compiles");
}

/// Extract tags from the text of the tags section.
///
/// Hashtag tokens come first (without the `#`), then bullet-line values.
/// The combined list keeps first-seen order, drops exact duplicates and
/// empty values.
pub fn extract_tags(section: &str) -> Vec<String> {
    let hashtags = HASHTAG
        .find_iter(section)
        .map(|m| m.as_str().trim_start_matches('#'));

    let bullets = BULLET_LINE
        .captures_iter(section)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim());

    let mut seen = HashSet::new();
    hashtags
        .chain(bullets)
        .filter(|tag| !tag.is_empty() && seen.insert(*tag))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashtags_then_bullets_deduplicated() {
        assert_eq!(extract_tags("#a #b\n- c\n* a"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_no_tags() {
        assert!(extract_tags("just some words\nand another line").is_empty());
        assert!(extract_tags("").is_empty());
    }

    #[test]
    fn test_cjk_hashtags() {
        assert_eq!(
            extract_tags("#护肤 #年度爱用物 #skincare_2024"),
            vec!["护肤", "年度爱用物", "skincare_2024"]
        );
    }

    #[test]
    fn test_hashtag_stops_at_punctuation() {
        assert_eq!(extract_tags("#好物分享，#平价"), vec!["好物分享", "平价"]);
    }

    #[test]
    fn test_dedup_is_case_sensitive() {
        assert_eq!(extract_tags("#Vlog #vlog #Vlog"), vec!["Vlog", "vlog"]);
    }

    #[test]
    fn test_bullet_values_trimmed() {
        assert_eq!(
            extract_tags("-   通勤穿搭  \n  * 显瘦\r\n-\n- "),
            vec!["通勤穿搭", "显瘦"]
        );
    }

    #[test]
    fn test_lone_hash_is_not_a_tag() {
        assert!(extract_tags("# \n#").is_empty());
    }
}

//! Human-readable URL identifiers for postings and blog posts.
//!
//! Output is always `[a-z0-9-]+`. Posting slugs end with the first eight
//! characters of the posting id, which is what keeps them unique across
//! postings that share a title.

pub const TITLE_MAX: usize = 80;
pub const COMPANY_MAX: usize = 50;
pub const LOCATION_MAX: usize = 40;
pub const SLUG_MAX: usize = 200;

/// Lowercases, drops everything outside `[a-z0-9\s-]`, collapses whitespace and
/// hyphen runs into one hyphen and trims hyphens from both ends.
pub fn clean(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(ch);
        } else if ch.is_whitespace() || ch == '-' {
            pending_hyphen = true;
        }
    }
    out
}

/// Cuts `slug` to at most `max` bytes on a hyphen boundary. A single word
/// longer than `max` is hard-cut.
pub fn truncate_at_boundary(slug: &str, max: usize) -> &str {
    if slug.len() <= max {
        return slug;
    }
    if slug.as_bytes()[max] == b'-' {
        return &slug[..max];
    }
    match slug[..max].rfind('-') {
        Some(pos) if pos > 0 => &slug[..pos],
        _ => &slug[..max],
    }
}

/// Cleaned and title-length-bounded slug for free text (blog titles).
pub fn slugify(text: &str) -> String {
    truncate_at_boundary(&clean(text), TITLE_MAX).to_string()
}

fn id_suffix(id: &str) -> String {
    clean(&id.chars().take(8).collect::<String>())
}

/// Base slug for a posting: `{title}[-job-at-{company}][-in-{location}]-{id[:8]}`.
///
/// Pure function of its inputs. Collisions are handled by the resolver, not here.
pub fn posting_slug(title: &str, company: Option<&str>, location: Option<&str>, id: &str) -> String {
    let suffix = id_suffix(id);
    let title = clean(title);
    if title.is_empty() {
        return format!("job-{}", suffix);
    }

    let mut body = truncate_at_boundary(&title, TITLE_MAX).to_string();
    let company = clean(company.unwrap_or_default());
    if !company.is_empty() {
        body.push_str("-job-at-");
        body.push_str(truncate_at_boundary(&company, COMPANY_MAX));
    }
    let location = clean(location.unwrap_or_default());
    if !location.is_empty() {
        body.push_str("-in-");
        body.push_str(truncate_at_boundary(&location, LOCATION_MAX));
    }

    if suffix.is_empty() {
        return truncate_at_boundary(&body, SLUG_MAX).to_string();
    }

    let full_len = body.len() + 1 + suffix.len();
    if full_len > SLUG_MAX {
        let budget = SLUG_MAX - suffix.len() - 1;
        body = truncate_at_boundary(&body, budget).to_string();
    }
    format!("{}-{}", body, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_slug_shaped(s: &str) -> bool {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }

    #[test]
    fn builds_full_slug_from_all_parts() {
        let slug = posting_slug(
            "Senior Nurse!",
            Some("Acme Health"),
            Some("Austin, TX"),
            "abcd1234-5678-90ab-cdef-1234567890ab",
        );
        assert_eq!(slug, "senior-nurse-job-at-acme-health-in-austin-tx-abcd1234");
    }

    #[test]
    fn omits_empty_company_and_location_segments() {
        let id = "0f0f0f0f-aaaa";
        assert_eq!(posting_slug("ICU Nurse", None, None, id), "icu-nurse-0f0f0f0f");
        assert_eq!(
            posting_slug("ICU Nurse", Some("  !!  "), Some("Dallas"), id),
            "icu-nurse-in-dallas-0f0f0f0f"
        );
    }

    #[test]
    fn falls_back_when_title_cleans_to_nothing() {
        assert_eq!(
            posting_slug("!!! ???", Some("Acme"), None, "deadbeef-0000"),
            "job-deadbeef"
        );
    }

    #[test]
    fn clean_collapses_separators() {
        assert_eq!(clean("  Home -- Health   Aide "), "home-health-aide");
        assert_eq!(clean("Café RN/LPN"), "caf-rnlpn");
        assert_eq!(clean("---"), "");
    }

    #[test]
    fn truncation_never_splits_words() {
        let title = "registered nurse ".repeat(10);
        let slug = posting_slug(&title, None, None, "12345678");
        let body = slug.trim_end_matches("-12345678");
        let cleaned = clean(&title);
        assert!(body.len() <= TITLE_MAX);
        assert!(cleaned.starts_with(body));
        assert_eq!(cleaned.as_bytes()[body.len()], b'-');
        assert!(slug.ends_with("-12345678"));
    }

    #[test]
    fn truncation_keeps_exact_boundary() {
        assert_eq!(truncate_at_boundary("abc-def", 3), "abc");
        assert_eq!(truncate_at_boundary("abc-def", 5), "abc");
        assert_eq!(truncate_at_boundary("abcdef", 3), "abc");
        assert_eq!(truncate_at_boundary("abc", 10), "abc");
    }

    #[test]
    fn every_slug_is_url_safe_and_anchored_by_id() {
        let cases = [
            ("Travel ICU RN - Nights (13 wks)", Some("St. Mary's"), Some("São Paulo")),
            ("Pharmacist", Some(""), None),
            ("Ünïcödé Tëch", None, Some("New York, NY")),
            (
                "Medical Billing and Coding Specialist Level II Remote Hybrid Flexible",
                Some("Very Long Regional Healthcare Network Holdings Incorporated Group"),
                Some("Minneapolis Saint Paul Bloomington Metropolitan Area"),
            ),
        ];
        for (title, company, location) in cases {
            let slug = posting_slug(title, company, location, "a1b2c3d4-ffff");
            assert!(is_slug_shaped(&slug), "{slug}");
            assert!(slug.ends_with("a1b2c3d4"), "{slug}");
            assert!(slug.len() <= SLUG_MAX);
            assert!(!slug.contains("--"));
        }
    }

    #[test]
    fn is_deterministic() {
        let a = posting_slug("Dental Hygienist", Some("Smile Co"), Some("Reno"), "99990000");
        let b = posting_slug("Dental Hygienist", Some("Smile Co"), Some("Reno"), "99990000");
        assert_eq!(a, b);
    }
}

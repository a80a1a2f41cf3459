use std::collections::HashMap;

use axum::body::Bytes;
use lab_portal::{
    pagination::{PageLimits, Pagination, coerce},
    repository::postgres::contains_pattern,
    slug::{is_valid_slug, resolve, slugify},
    uploads::{Accept, ReceivedFile, UploadPolicy, extension, name_prefix, object_key, random_suffix},
};

const MEMBERS: PageLimits = PageLimits::new(6, 50);

#[cfg(test)]
mod pagination_tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        let p = Pagination::resolve(None, None, MEMBERS);
        assert_eq!(p, Pagination { page: 1, per_page: 6 });
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 6);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let p = Pagination::resolve(Some("abc"), Some(""), MEMBERS);
        assert_eq!(p, Pagination { page: 1, per_page: 6 });

        let p = Pagination::resolve(Some("NaN"), Some("inf"), MEMBERS);
        assert_eq!(p, Pagination { page: 1, per_page: 6 });
    }

    #[test]
    fn test_bounds_are_clamped() {
        let p = Pagination::resolve(Some("-4"), Some("1000"), MEMBERS);
        assert_eq!(p, Pagination { page: 1, per_page: 50 });

        let p = Pagination::resolve(Some("3"), Some("0"), MEMBERS);
        assert_eq!(p, Pagination { page: 3, per_page: 1 });
        assert_eq!(p.offset(), 2);
    }

    #[test]
    fn test_fractions_are_floored() {
        let p = Pagination::resolve(Some("2.9"), Some("7.5"), MEMBERS);
        assert_eq!(p, Pagination { page: 2, per_page: 7 });
        assert_eq!(coerce(Some(" 12 ")), Some(12));
    }

    #[test]
    fn test_total_pages() {
        let p = Pagination::resolve(None, Some("5"), MEMBERS);
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(5), 1);
        assert_eq!(p.total_pages(11), 3);
    }
}

#[cfg(test)]
mod slug_tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_runs() {
        assert_eq!(slugify("Hello,  World!"), "hello-world");
        assert_eq!(slugify("  --Deep Learning for Rice-2023--"), "deep-learning-for-rice-2023");
        assert_eq!(slugify("Universitas Indonesia (UI)"), "universitas-indonesia-ui");
    }

    #[test]
    fn test_slugify_can_be_empty() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_resolve_prefers_supplied() {
        assert_eq!(resolve(Some("my-news"), "Ignored Title"), "my-news");
        assert_eq!(resolve(Some("   "), "Lab Opens"), "lab-opens");
        assert_eq!(resolve(None, "Lab Opens"), "lab-opens");
    }

    #[test]
    fn test_valid_slug() {
        assert!(is_valid_slug("jane-doe"));
        assert!(is_valid_slug("a1b"));
        assert!(!is_valid_slug("ab"));
        assert!(!is_valid_slug("Jane"));
        assert!(!is_valid_slug("jane_doe"));
    }
}

#[cfg(test)]
mod upload_naming_tests {
    use super::*;

    fn file(name: Option<&str>, content_type: &str, fields: &[(&str, &str)]) -> ReceivedFile {
        ReceivedFile {
            file_name: name.map(str::to_string),
            content_type: content_type.to_string(),
            bytes: Bytes::from_static(b"data"),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn test_avatar_key_uses_slug_field() {
        let f = file(Some("Me.PNG"), "image/png", &[("slug", "Jane Doe")]);
        let key = object_key(&UploadPolicy::AVATAR, &f, 1_700_000_000_000, "a1b2c3d4");
        assert_eq!(key, "avatars/jane-doe-1700000000000-a1b2c3d4.png");
    }

    #[test]
    fn test_avatar_key_falls_back_to_member() {
        let f = file(Some("me.jpg"), "image/jpeg", &[]);
        let key = object_key(&UploadPolicy::AVATAR, &f, 1, "ffffffff");
        assert_eq!(key, "avatars/member-1-ffffffff.jpg");
    }

    #[test]
    fn test_journal_pdf_key_uses_original_name() {
        let f = file(Some("My Paper (final).pdf"), "application/pdf", &[]);
        let key = object_key(&UploadPolicy::JOURNAL_PDF, &f, 42, "0badc0de");
        assert_eq!(key, "journals/pdf/my-paper-final-42-0badc0de.pdf");
    }

    #[test]
    fn test_project_key_is_fixed_prefix() {
        let f = file(Some("cover.webp"), "image/webp", &[("name", "ignored")]);
        let key = object_key(&UploadPolicy::PROJECT_IMAGE, &f, 7, "12345678");
        assert_eq!(key, "projects/project-7-12345678.webp");
    }

    #[test]
    fn test_collaboration_key_uses_name_field() {
        let f = file(None, "image/svg+xml", &[("name", "Acme Corp")]);
        let key = object_key(&UploadPolicy::COLLABORATION_LOGO, &f, 9, "abcdef01");
        assert_eq!(key, "collaborations/acme-corp-9-abcdef01.svg");
    }

    #[test]
    fn test_extension_sources() {
        assert_eq!(extension(Some("photo.JPEG"), "image/jpeg"), ".jpeg");
        assert_eq!(extension(Some("noext"), "image/png"), ".png");
        assert_eq!(extension(None, "application/octet-stream"), "");
    }

    #[test]
    fn test_extension_must_match_declared_type() {
        assert_eq!(extension(Some("evil.html"), "image/png"), ".png");
        assert_eq!(extension(Some("logo.svg"), "image/png"), ".png");
        assert_eq!(extension(Some("scan.jpg"), "application/pdf"), ".pdf");
        assert_eq!(extension(Some("scan.tif"), "image/tiff"), ".tif");
        assert_eq!(extension(Some("page.htm"), "text/html"), "");
    }

    #[test]
    fn test_name_prefix_charset() {
        assert_eq!(name_prefix("  Jane Doe!  "), "jane-doe");
        assert_eq!(name_prefix("a_b-c"), "a_b-c");
    }

    #[test]
    fn test_random_suffix_is_eight_hex() {
        let suffix = random_suffix();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(random_suffix(), random_suffix());
    }

    #[test]
    fn test_accept_lists() {
        assert!(UploadPolicy::AVATAR.accept.allows("image/svg+xml"));
        assert!(!UploadPolicy::NEWS_IMAGE.accept.allows("image/svg+xml"));
        assert!(UploadPolicy::PROJECT_IMAGE.accept.allows("image/avif"));
        assert!(!UploadPolicy::JOURNAL_PDF.accept.allows("image/png"));
        assert!(matches!(UploadPolicy::PROJECT_IMAGE.accept, Accept::AnyImage));
    }
}

#[cfg(test)]
mod search_pattern_tests {
    use super::*;

    #[test]
    fn test_plain_query_is_wrapped() {
        assert_eq!(contains_pattern("robot"), "%robot%");
    }

    #[test]
    fn test_wildcards_are_escaped() {
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\dir"), "%c:\\\\dir%");
    }
}

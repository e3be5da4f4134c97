//! Stored filename generation and validation.

use std::path::{Component, Path};

use super::error::StorageError;

/// Length of the random disambiguator used on name collisions.
const SUFFIX_LEN: usize = 8;

/// Reduce a client-supplied filename to its final path component.
///
/// Browsers and CLI tools may send full paths (`C:\Users\me\a.txt`,
/// `../../a.txt`); only the part after the last separator is kept, byte for
/// byte, including surrounding whitespace.
///
/// # Errors
///
/// Returns `InvalidName` when nothing usable is left.
pub fn original_basename(raw: &str) -> Result<&str, StorageError> {
    let basename = raw.rsplit(['/', '\\']).next().unwrap_or("");

    if basename.is_empty() || basename == "." || basename == ".." || basename.contains('\0') {
        return Err(StorageError::invalid_name(raw));
    }

    Ok(basename)
}

/// `<millis>-<original>`
#[must_use]
pub fn stored_name(millis: i64, original: &str) -> String {
    format!("{millis}-{original}")
}

/// `<millis>-<suffix>-<original>`
#[must_use]
pub fn suffixed_name(millis: i64, suffix: &str, original: &str) -> String {
    format!("{millis}-{suffix}-{original}")
}

pub(crate) fn random_suffix() -> String {
    let mut suffix = uuid::Uuid::new_v4().simple().to_string();
    suffix.truncate(SUFFIX_LEN);
    suffix
}

/// Check that a name taken from a request path denotes a file directly
/// inside the uploads directory.
///
/// # Errors
///
/// Returns `InvalidName` for empty names, `.`/`..`, anything containing a
/// separator or NUL byte, and anything the platform parses as more than one
/// normal component.
pub fn validate_stored_name(name: &str) -> Result<&str, StorageError> {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return Err(StorageError::invalid_name(name));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(StorageError::invalid_name(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("hello.txt", "hello.txt")]
    #[case("dir/hello.txt", "hello.txt")]
    #[case("../../etc/passwd", "passwd")]
    #[case("C:\\Users\\me\\report.pdf", "report.pdf")]
    #[case("  spaced name.txt ", "  spaced name.txt ")]
    #[case(" a.txt", " a.txt")]
    fn test_original_basename(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(original_basename(raw).expect("valid name"), expected);
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("..")]
    #[case("dir/")]
    #[case("a/..")]
    #[case("nul\0byte")]
    fn test_original_basename_rejects(#[case] raw: &str) {
        assert!(matches!(
            original_basename(raw),
            Err(StorageError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_stored_name_format() {
        assert_eq!(stored_name(1_718_000_000_000, "hello.txt"), "1718000000000-hello.txt");
        assert_eq!(
            suffixed_name(1_718_000_000_000, "3fa85f64", "hello.txt"),
            "1718000000000-3fa85f64-hello.txt"
        );
    }

    #[test]
    fn test_random_suffix_shape() {
        let suffix = random_suffix();
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[rstest]
    #[case("1718000000000-hello.txt")]
    #[case("..hidden")]
    #[case("name with spaces")]
    fn test_validate_stored_name_accepts(#[case] name: &str) {
        assert_eq!(validate_stored_name(name).expect("valid"), name);
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("..")]
    #[case("../secret")]
    #[case("a/b")]
    #[case("/etc/passwd")]
    #[case("..\\secret")]
    #[case("nul\0byte")]
    fn test_validate_stored_name_rejects(#[case] name: &str) {
        assert!(matches!(
            validate_stored_name(name),
            Err(StorageError::InvalidName { .. })
        ));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // Whatever the client sends, the kept name is a single component.
        #[test]
        fn prop_basename_is_single_component(raw in ".*") {
            if let Ok(basename) = original_basename(&raw) {
                prop_assert!(validate_stored_name(basename).is_ok());
            }
        }

        #[test]
        fn prop_stored_name_round_trips_through_validation(
            millis in 0i64..4_102_444_800_000,
            original in "[a-zA-Z0-9 _.-]{1,40}",
        ) {
            prop_assume!(original_basename(&original).is_ok());
            let basename = original_basename(&original).expect("checked above");
            let name = stored_name(millis, basename);
            prop_assert!(validate_stored_name(&name).is_ok());
            let expected_prefix = format!("{millis}-");
            prop_assert!(name.starts_with(&expected_prefix));
        }

        #[test]
        fn prop_names_with_separators_are_rejected(
            head in "[a-z]{0,8}",
            sep in prop::sample::select(vec!['/', '\\']),
            tail in "[a-z]{0,8}",
        ) {
            let name = format!("{head}{sep}{tail}");
            prop_assert!(validate_stored_name(&name).is_err());
        }
    }
}

//! Metafield value types and sheet-alias resolution.

/// Shopify metafield type storing a single file id.
pub const FILE_REFERENCE: &str = "file_reference";

/// Shopify metafield type storing an ordered JSON array of file ids.
pub const LIST_FILE_REFERENCE: &str = "list.file_reference";

/// Sheet alias for a scalar file reference.
pub const FILE_ALIAS: &str = "File";

/// Sheet alias for a list file reference.
pub const FILES_ALIAS: &str = "Files";

/// Resolve a sheet-declared metafield type to the platform type.
///
/// The mapping is total and case-sensitive: `"File"` and `"Files"` become
/// the platform reference types, any other value passes through unchanged.
#[must_use]
pub fn resolve_metafield_type(raw: &str) -> &str {
    match raw {
        FILE_ALIAS => FILE_REFERENCE,
        FILES_ALIAS => LIST_FILE_REFERENCE,
        other => other,
    }
}

/// Whether a sheet-declared type denotes the list file reference.
///
/// The attachment loop branches on this to decide between setting all
/// matching file ids versus only the first.
#[must_use]
pub fn is_list_alias(raw: &str) -> bool {
    raw == FILES_ALIAS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_map_to_reference_types() {
        assert_eq!(resolve_metafield_type("File"), "file_reference");
        assert_eq!(resolve_metafield_type("Files"), "list.file_reference");
    }

    #[test]
    fn other_types_pass_through_unchanged() {
        assert_eq!(resolve_metafield_type("single_line_text_field"), "single_line_text_field");
        assert_eq!(resolve_metafield_type("number_integer"), "number_integer");
        assert_eq!(resolve_metafield_type(""), "");
    }

    #[test]
    fn aliasing_is_case_sensitive() {
        // Lowercase variants are plain pass-through, not aliases.
        assert_eq!(resolve_metafield_type("file"), "file");
        assert_eq!(resolve_metafield_type("files"), "files");
        assert!(!is_list_alias("files"));
    }

    #[test]
    fn list_alias_detection() {
        assert!(is_list_alias("Files"));
        assert!(!is_list_alias("File"));
        assert!(!is_list_alias("list.file_reference"));
    }
}

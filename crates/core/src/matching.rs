//! File-to-product matching.
//!
//! A file belongs to a product when the file's alt text contains the
//! product's title as a case-insensitive substring. Multiple files can
//! match one product; callers decide whether to use the first match or all
//! of them based on the metafield type.

use crate::types::UploadedFile;

/// All uploaded files whose alt text contains `title`, preserving upload
/// order.
///
/// Files without alt text never match.
#[must_use]
pub fn matching_files<'a>(files: &'a [UploadedFile], title: &str) -> Vec<&'a UploadedFile> {
    let needle = title.to_lowercase();
    files
        .iter()
        .filter(|file| {
            file.alt
                .as_ref()
                .is_some_and(|alt| alt.to_lowercase().contains(&needle))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: &str, alt: Option<&str>) -> UploadedFile {
        UploadedFile {
            id: id.to_string(),
            file_status: None,
            alt: alt.map(str::to_string),
        }
    }

    #[test]
    fn matches_case_insensitive_substring() {
        let files = vec![file("f1", Some("Red Shoe Side View"))];

        assert_eq!(matching_files(&files, "red shoe").len(), 1);
        assert!(matching_files(&files, "blue shoe").is_empty());
    }

    #[test]
    fn preserves_upload_order() {
        let files = vec![
            file("f1", Some("Blue Mug front")),
            file("f2", Some("Red Mug")),
            file("f3", Some("blue mug back")),
        ];

        let matches = matching_files(&files, "Blue Mug");
        let ids: Vec<&str> = matches.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["f1", "f3"]);
    }

    #[test]
    fn files_without_alt_never_match() {
        let files = vec![file("f1", None), file("f2", Some(""))];

        assert!(matching_files(&files, "anything").is_empty());
        // An empty title is contained in any alt text that exists.
        assert_eq!(matching_files(&files, "").len(), 1);
    }
}

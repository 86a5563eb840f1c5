use crate::media::UploadFile;

/// A description paired with the files that belong to it, before upload.
#[derive(Debug)]
pub struct PendingRow {
    pub description: String,
    pub files: Vec<UploadFile>,
}

/// Parse a per-row file count. Missing, empty, negative or non-numeric counts mean zero.
pub fn parse_file_count(raw: Option<&str>) -> usize {
    raw.map(str::trim)
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(0)
}

/// Rebuild the row/file association from the three parallel form lists.
///
/// One cursor walks `files` across all rows. Row `i` takes up to `file_counts[i]`
/// files from the cursor; when the list runs out early the row keeps whatever was
/// left. One row is produced per description, in order.
pub fn correlate(
    descriptions: Vec<String>,
    file_counts: &[String],
    files: Vec<UploadFile>,
) -> Vec<PendingRow> {
    let mut cursor = files.into_iter();

    descriptions
        .into_iter()
        .enumerate()
        .map(|(i, description)| {
            let wanted = parse_file_count(file_counts.get(i).map(String::as_str));
            let files: Vec<UploadFile> = cursor.by_ref().take(wanted).collect();
            PendingRow { description, files }
        })
        .collect()
}

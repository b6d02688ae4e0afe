use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;

/// Opens `path` for appending, creating the file and any missing parent
/// directories.
pub fn open_file_for_append(path: impl AsRef<Path>) -> io::Result<File> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_open_file_for_append_creates_missing_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/dir/out.log");

        let mut file = open_file_for_append(&path).unwrap();
        writeln!(file, "first").unwrap();

        let mut file = open_file_for_append(&path).unwrap();
        writeln!(file, "second").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }
}

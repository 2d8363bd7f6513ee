//! Session numbering across capture runs

use crate::error::{CaptureError, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Next unused numeric index in `dir`.
///
/// Each entry's file stem is read up to the first `_`, so `7.png`, a bare `7`
/// and `7_1234.csv` all count as index 7. Entries that do not parse are ignored.
/// Returns one past the largest index found, or 0 when there is none. A missing
/// directory is created.
pub fn next_session_index<P: AsRef<Path>>(dir: P) -> Result<u64> {
    next_session_index_across([dir])
}

/// Next index unused in every one of `dirs`.
pub fn next_session_index_across<I, P>(dirs: I) -> Result<u64>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut max: Option<(u64, std::path::PathBuf)> = None;
    for dir in dirs {
        let dir = dir.as_ref();
        if let Some(index) = highest_index(dir)? {
            if max.as_ref().map_or(true, |(m, _)| index > *m) {
                max = Some((index, dir.to_path_buf()));
            }
        }
    }

    match max {
        None => Ok(0),
        Some((m, dir)) => m.checked_add(1).ok_or_else(|| {
            CaptureError::InvalidParameter(format!(
                "session index {} in {} leaves no room for another session",
                m,
                dir.display()
            ))
        }),
    }
}

fn highest_index(dir: &Path) -> Result<Option<u64>> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| CaptureError::io(dir, e))?;
        debug!("created {}", dir.display());
        return Ok(None);
    }

    let mut max: Option<u64> = None;
    for entry in fs::read_dir(dir).map_err(|e| CaptureError::io(dir, e))? {
        let entry = entry.map_err(|e| CaptureError::io(dir, e))?;
        let path = entry.path();
        let Some(index) = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.split('_').next())
            .and_then(|prefix| prefix.parse::<u64>().ok())
        else {
            continue;
        };
        max = Some(max.map_or(index, |m| m.max(index)));
    }
    Ok(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_empty_directory_starts_at_zero() {
        let dir = TempDir::new().unwrap();
        assert_eq!(next_session_index(dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_missing_directory_is_created() {
        let dir = TempDir::new().unwrap();
        let png = dir.path().join("pictures").join("png");
        assert_eq!(next_session_index(&png).unwrap(), 0);
        assert!(png.is_dir());
    }

    #[test]
    fn test_one_past_largest() {
        let dir = TempDir::new().unwrap();
        for name in ["3.png", "7.png", "2.png"] {
            File::create(dir.path().join(name)).unwrap();
        }
        assert_eq!(next_session_index(dir.path()).unwrap(), 8);
    }

    #[test]
    fn test_non_numeric_names_ignored() {
        let dir = TempDir::new().unwrap();
        for name in ["4", "notes.txt", "99abc.png", "-12.png", ".png"] {
            File::create(dir.path().join(name)).unwrap();
        }
        assert_eq!(next_session_index(dir.path()).unwrap(), 5);
    }

    #[test]
    fn test_only_non_numeric_names() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("readme.md")).unwrap();
        assert_eq!(next_session_index(dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_csv_prefix_counts_as_index() {
        let dir = TempDir::new().unwrap();
        for name in ["2_40.csv", "11_1375.csv", "x_3.csv"] {
            File::create(dir.path().join(name)).unwrap();
        }
        assert_eq!(next_session_index(dir.path()).unwrap(), 12);
    }

    #[test]
    fn test_largest_across_directories() {
        let dir = TempDir::new().unwrap();
        let (png, depth, color) = (dir.path().join("png"), dir.path().join("depth"), dir.path().join("color"));
        fs::create_dir_all(&png).unwrap();
        fs::create_dir_all(&depth).unwrap();
        File::create(png.join("1.png")).unwrap();
        File::create(depth.join("4_0.csv")).unwrap();
        assert_eq!(next_session_index_across([&png, &depth, &color]).unwrap(), 5);
        assert!(color.is_dir());
    }

    #[test]
    fn test_largest_u64_index_is_an_error() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join(format!("{}.png", u64::MAX))).unwrap();
        let err = next_session_index(dir.path()).unwrap_err();
        assert!(matches!(err, CaptureError::InvalidParameter(_)));
        assert!(err.to_string().contains(&dir.path().display().to_string()));
    }
}

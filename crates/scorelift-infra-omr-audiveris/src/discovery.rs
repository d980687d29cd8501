use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Compressed first: `.mxl` wins a tie against `.xml`.
pub const EXPORT_EXTENSIONS: [&str; 2] = ["mxl", "xml"];

const MAX_DEPTH: usize = 6;

struct Candidate {
    path: PathBuf,
    stem_match: bool,
    modified: SystemTime,
    ext_rank: usize,
}

impl Candidate {
    fn rank(&self, other: &Self) -> Ordering {
        other
            .stem_match
            .cmp(&self.stem_match)
            .then_with(|| other.modified.cmp(&self.modified))
            .then_with(|| self.ext_rank.cmp(&other.ext_rank))
            .then_with(|| self.path.cmp(&other.path))
    }
}

pub fn export_rank(path: &Path) -> Option<usize> {
    let ext = path.extension()?.to_str()?;
    EXPORT_EXTENSIONS
        .iter()
        .position(|known| ext.eq_ignore_ascii_case(known))
}

/// Picks the MusicXML export Audiveris left under `output_dir`.
///
/// Audiveris may write straight into the directory or into a per-book
/// subfolder, so the walk goes a few levels deep. When several exports
/// exist the winner is, in order: the one named after the input, the most
/// recently modified, the compressed one, the lexically smallest path.
pub fn find_export(output_dir: &Path, input_stem: Option<&str>) -> Option<PathBuf> {
    let mut candidates = Vec::new();
    collect(output_dir, input_stem, 0, &mut candidates);
    candidates
        .into_iter()
        .min_by(|a, b| a.rank(b))
        .map(|candidate| candidate.path)
}

fn collect(dir: &Path, input_stem: Option<&str>, depth: usize, out: &mut Vec<Candidate>) {
    if depth > MAX_DEPTH {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if meta.is_dir() {
            collect(&path, input_stem, depth + 1, out);
            continue;
        }
        let Some(ext_rank) = export_rank(&path) else {
            continue;
        };
        let stem_match = match (input_stem, path.file_stem().and_then(|s| s.to_str())) {
            (Some(wanted), Some(stem)) => wanted == stem,
            _ => false,
        };
        out.push(Candidate {
            stem_match,
            modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            ext_rank,
            path,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    fn touch(path: &Path, age_secs: u64) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let file = File::create(path).unwrap();
        let when = SystemTime::now() - Duration::from_secs(age_secs);
        file.set_modified(when).unwrap();
    }

    #[test]
    fn empty_dir_has_no_export() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("audiveris.log"), 0);
        assert_eq!(find_export(dir.path(), Some("score")), None);
    }

    #[test]
    fn missing_dir_has_no_export() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_export(&dir.path().join("nope"), None), None);
    }

    #[test]
    fn input_stem_beats_newer_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("score.xml"), 300);
        touch(&dir.path().join("other.mxl"), 0);
        assert_eq!(
            find_export(dir.path(), Some("score")),
            Some(dir.path().join("score.xml"))
        );
    }

    #[test]
    fn newest_wins_without_stem_match() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("old.mxl"), 600);
        touch(&dir.path().join("new.xml"), 10);
        assert_eq!(find_export(dir.path(), None), Some(dir.path().join("new.xml")));
    }

    #[test]
    fn compressed_wins_equal_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let when = SystemTime::now() - Duration::from_secs(60);
        for name in ["score.xml", "score.mxl"] {
            let file = File::create(dir.path().join(name)).unwrap();
            file.set_modified(when).unwrap();
        }
        assert_eq!(
            find_export(dir.path(), Some("score")),
            Some(dir.path().join("score.mxl"))
        );
    }

    #[test]
    fn finds_export_in_book_subfolder() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("score").join("score.MXL");
        touch(&nested, 0);
        assert_eq!(find_export(dir.path(), Some("score")), Some(nested));
    }

    #[test]
    fn rank_is_case_insensitive() {
        assert_eq!(export_rank(Path::new("a.MXL")), Some(0));
        assert_eq!(export_rank(Path::new("a.Xml")), Some(1));
        assert_eq!(export_rank(Path::new("a.pdf")), None);
        assert_eq!(export_rank(Path::new("noext")), None);
    }
}

// src/extract/store.rs
// =============================================================================
// Saves chapter text to disk.
//
// Layout:
//   <output_dir>/<novel title>/<chapter title>.txt
//
// Files are opened in append mode: a chapter spread over several pages ends
// up in one file, page after page, in the order its worker fetched them.
// Different chapters go to different files, so workers never write to the
// same file at the same time.
// =============================================================================

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

const UNTITLED: &str = "untitled";

#[derive(Debug, Clone)]
pub struct NovelStore {
    dir: PathBuf,
}

impl NovelStore {
    // Creates (if needed) the directory for one novel
    pub fn open(output_dir: &Path, novel_title: &str) -> Result<Self> {
        let dir = output_dir.join(sanitize_title(novel_title));
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn chapter_path(&self, chapter_title: &str) -> PathBuf {
        self.dir.join(format!("{}.txt", sanitize_title(chapter_title)))
    }

    pub fn append(&self, chapter_title: &str, text: &str) -> Result<PathBuf> {
        let path = self.chapter_path(chapter_title);
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            file.write_all(b"\n")?;
        }
        Ok(path)
    }
}

// Turns a page title into something safe to use as one path component
//
// Path separators and characters Windows refuses become '_'. Leading and
// trailing dots/spaces are dropped so "..", "." and " " can't escape or
// vanish.
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let cleaned = cleaned.trim_matches(|c: char| c == '.' || c.is_whitespace());

    if cleaned.is_empty() {
        UNTITLED.to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("第6章 归来"), "第6章 归来");
        assert_eq!(sanitize_title("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_title(".."), "untitled");
        assert_eq!(sanitize_title("   "), "untitled");
        assert_eq!(sanitize_title(" Chapter 1. "), "Chapter 1");
    }

    #[test]
    fn test_append_keeps_page_order() {
        let tmp = tempfile::tempdir().unwrap();
        let store = NovelStore::open(tmp.path(), "My Novel").unwrap();

        store.append("Chapter 6", "page one").unwrap();
        let path = store.append("Chapter 6", "page two\n").unwrap();

        assert_eq!(path, tmp.path().join("My Novel").join("Chapter 6.txt"));
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text, "page one\npage two\n");
    }

    #[test]
    fn test_open_sanitizes_novel_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let store = NovelStore::open(tmp.path(), "a/b").unwrap();
        assert_eq!(store.dir(), tmp.path().join("a_b"));
        assert!(store.dir().is_dir());
    }
}

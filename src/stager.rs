//! Staging area lifecycle
//!
//! The staging area is the data root holding every artifact of one run. Before
//! the catalog is fetched it is wiped (after operator confirmation) and
//! recreated empty.

use crate::error::{Error, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Name of the catalog listing file inside the data root
pub const PACKS_FILE: &str = "packs.json";

/// Name of the images directory inside the data root
pub const IMAGES_DIR: &str = "images";

/// Extension of image archives (without the dot)
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Paths of every artifact under one data root
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    /// A staging area rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The data root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Catalog listing file
    pub fn packs_file(&self) -> PathBuf {
        self.root.join(PACKS_FILE)
    }

    /// Record file for one pack
    pub fn record_file(&self, pack_id: &str) -> PathBuf {
        self.root.join(format!("cards_{pack_id}.json"))
    }

    /// Directory holding every pack's images or archive
    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    /// Expanded image directory for one pack
    pub fn image_dir(&self, pack_id: &str) -> PathBuf {
        self.images_dir().join(pack_id)
    }

    /// Image archive for one pack
    pub fn image_archive(&self, pack_id: &str) -> PathBuf {
        self.images_dir()
            .join(format!("{pack_id}.{ARCHIVE_EXTENSION}"))
    }
}

/// Source of the yes/no answer guarding destructive removal
pub trait Confirmation {
    /// Show `prompt` and return whether the operator agreed
    ///
    /// # Errors
    ///
    /// Returns [`Error::Input`] if no answer could be read.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Reads one line per question; any answer starting with `y`/`Y` is a yes
pub struct LineConfirmation<R> {
    reader: R,
}

impl<R: BufRead> LineConfirmation<R> {
    /// Read answers from `reader`
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl LineConfirmation<std::io::StdinLock<'static>> {
    /// Read answers from the process's standard input
    pub fn stdin() -> Self {
        Self::new(std::io::stdin().lock())
    }
}

impl<R: BufRead> Confirmation for LineConfirmation<R> {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let mut stderr = std::io::stderr();
        write!(stderr, "{prompt} (y/N) ").ok();
        stderr.flush().ok();

        let mut answer = String::new();
        let read = self
            .reader
            .read_line(&mut answer)
            .map_err(|e| Error::Input(e.to_string()))?;
        if read == 0 {
            return Err(Error::Input("unexpected end of input".to_string()));
        }
        Ok(is_affirmative(&answer))
    }
}

fn is_affirmative(answer: &str) -> bool {
    answer.trim().to_lowercase().starts_with('y')
}

/// Prepares the staging area for a fresh run
#[derive(Clone, Copy, Debug, Default)]
pub struct Stager;

impl Stager {
    /// Create a new stager
    pub fn new() -> Self {
        Self
    }

    /// Wipe `path` (after confirmation) if it exists, then create it fresh
    ///
    /// # Errors
    ///
    /// - [`Error::Input`] if the confirmation could not be read
    /// - [`Error::Aborted`] if the operator declined; nothing is removed
    /// - [`Error::FileSystem`] if removal or creation failed
    ///
    /// The confirmation is read synchronously on the calling task, so the
    /// prompt blocks its worker thread until the operator answers. Call this
    /// before any other work is spawned.
    pub async fn prepare(&self, path: &Path, confirmation: &mut dyn Confirmation) -> Result<()> {
        if let Ok(existing) = tokio::fs::symlink_metadata(path).await {
            let prompt = format!(
                "The {} is about to be wiped to hold new data, do you want to proceed?",
                path.display()
            );
            if !confirmation.confirm(&prompt)? {
                return Err(Error::Aborted);
            }

            if existing.is_dir() {
                tokio::fs::remove_dir_all(path)
                    .await
                    .map_err(|e| Error::fs("remove directory", path, e))?;
            } else {
                tokio::fs::remove_file(path)
                    .await
                    .map_err(|e| Error::fs("remove file", path, e))?;
            }
            info!(?path, "removed previous data root");
        }

        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| Error::fs("create directory", path, e))?;
        info!(?path, "created data directory");
        Ok(())
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Confirmation that must never be consulted
    struct Unreachable;

    impl Confirmation for Unreachable {
        fn confirm(&mut self, _prompt: &str) -> Result<bool> {
            panic!("confirmation should not be requested");
        }
    }

    fn answer(text: &str) -> LineConfirmation<Cursor<Vec<u8>>> {
        LineConfirmation::new(Cursor::new(text.as_bytes().to_vec()))
    }

    fn populated_root() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("english");
        std::fs::create_dir_all(root.join("images/sv1")).unwrap();
        std::fs::write(root.join("packs.json"), "[]").unwrap();
        std::fs::write(root.join("images/sv1/a.png"), b"png").unwrap();
        (dir, root)
    }

    #[test]
    fn staging_paths_follow_the_layout() {
        let area = StagingArea::new("/data/english");
        assert_eq!(area.packs_file(), PathBuf::from("/data/english/packs.json"));
        assert_eq!(
            area.record_file("sv1"),
            PathBuf::from("/data/english/cards_sv1.json")
        );
        assert_eq!(
            area.image_dir("sv1"),
            PathBuf::from("/data/english/images/sv1")
        );
        assert_eq!(
            area.image_archive("sv1"),
            PathBuf::from("/data/english/images/sv1.zip")
        );
    }

    #[test]
    fn affirmative_answers() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative("  YES please\n"));
        assert!(!is_affirmative("n\n"));
        assert!(!is_affirmative("\n"));
        assert!(!is_affirmative("sure\n"));
    }

    #[tokio::test]
    async fn creates_missing_directory_without_prompting() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("data").join("english");

        Stager::new().prepare(&root, &mut Unreachable).await.unwrap();

        assert!(root.is_dir());
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn yes_replaces_directory_with_empty_one() {
        let (_dir, root) = populated_root();

        Stager::new()
            .prepare(&root, &mut answer("y\n"))
            .await
            .unwrap();

        assert!(root.is_dir());
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn yes_replaces_plain_file_with_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("english");
        std::fs::write(&root, b"stale").unwrap();

        Stager::new()
            .prepare(&root, &mut answer("y\n"))
            .await
            .unwrap();

        assert!(root.is_dir());
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn yes_replaces_dangling_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("english");
        std::os::unix::fs::symlink(dir.path().join("gone"), &root).unwrap();

        Stager::new()
            .prepare(&root, &mut answer("y\n"))
            .await
            .unwrap();

        assert!(root.is_dir());
        assert!(!root.symlink_metadata().unwrap().file_type().is_symlink());
    }

    #[tokio::test]
    async fn decline_leaves_directory_untouched() {
        let (_dir, root) = populated_root();

        for input in ["n\n", "\n", "nope\n", "okay\n"] {
            let err = Stager::new()
                .prepare(&root, &mut answer(input))
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Aborted), "input {input:?}");
            assert!(root.join("packs.json").exists());
            assert!(root.join("images/sv1/a.png").exists());
        }
    }

    #[tokio::test]
    async fn closed_input_is_an_input_error() {
        let (_dir, root) = populated_root();

        let err = Stager::new()
            .prepare(&root, &mut answer(""))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Input(_)));
        assert!(root.join("packs.json").exists());
    }
}

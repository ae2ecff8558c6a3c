// Output layout of a sweep: one root with `stimuli`, `tmaps` and `dmaps` underneath.
// File names carry the grid side length and the 1-based repetition so that every
// (grid size, repetition) pair maps to its own three files.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct OutputFolders {
    pub root: PathBuf,
    pub stimuli: PathBuf,
    pub tmaps: PathBuf,
    pub dmaps: PathBuf,
}

impl OutputFolders {
    /// Creates the folder tree under `root` if it is missing. Existing folders are reused.
    pub fn prepare<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let folders = Self {
            stimuli: root.join("stimuli"),
            tmaps: root.join("tmaps"),
            dmaps: root.join("dmaps"),
            root,
        };

        for dir in [&folders.root, &folders.stimuli, &folders.tmaps, &folders.dmaps] {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating output folder {}", dir.display()))?;
        }

        Ok(folders)
    }

    pub fn stimulus_path(&self, array_size: u32, repetition: u32) -> PathBuf {
        self.stimuli
            .join(format!("stimulus_{array_size}dots_{repetition}.png"))
    }

    pub fn tmap_path(&self, array_size: u32, repetition: u32) -> PathBuf {
        self.tmaps.join(format!("tmap_{array_size}dots_{repetition}.png"))
    }

    pub fn dmap_path(&self, array_size: u32, repetition: u32) -> PathBuf {
        self.dmaps.join(format!("dmap_{array_size}dots_{repetition}.png"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_creates_all_three_folders_and_is_idempotent() {
        let dir = tempfile::tempdir().expect("Error creating temp dir.");
        let root = dir.path().join("dot_arrays");

        let folders = OutputFolders::prepare(&root).unwrap();
        assert!(folders.stimuli.is_dir());
        assert!(folders.tmaps.is_dir());
        assert!(folders.dmaps.is_dir());

        fs::write(folders.stimuli.join("keep.png"), b"x").unwrap();
        OutputFolders::prepare(&root).unwrap();
        assert!(folders.stimuli.join("keep.png").exists());
    }

    #[test]
    fn names_encode_grid_size_and_repetition() {
        let folders = OutputFolders {
            root: PathBuf::from("out"),
            stimuli: PathBuf::from("out/stimuli"),
            tmaps: PathBuf::from("out/tmaps"),
            dmaps: PathBuf::from("out/dmaps"),
        };

        assert_eq!(folders.stimulus_path(3, 7), PathBuf::from("out/stimuli/stimulus_3dots_7.png"));
        assert_eq!(folders.tmap_path(3, 7), PathBuf::from("out/tmaps/tmap_3dots_7.png"));
        assert_eq!(folders.dmap_path(4, 12), PathBuf::from("out/dmaps/dmap_4dots_12.png"));
        assert_ne!(folders.stimulus_path(2, 13), folders.stimulus_path(21, 3));
    }

    #[test]
    fn prepare_fails_when_root_is_a_file() {
        let dir = tempfile::tempdir().expect("Error creating temp dir.");
        let root = dir.path().join("occupied");
        fs::write(&root, b"not a folder").unwrap();
        assert!(OutputFolders::prepare(&root).is_err());
    }
}

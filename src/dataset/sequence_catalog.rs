use crate::dataset::common_structs::FrameFiles;
use crate::dataset::error::{DatasetError, DatasetResult};
use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const INDEX_FILE_NAME: &str = "files.txt";
pub const IMAGES_DIR: &str = "images";
pub const FLOWS_DIR: &str = "flows";
pub const ANNOTATIONS_DIR: &str = "annot";

/// The sequence directories under a dataset root, in iteration order
#[derive(Debug, Clone)]
pub struct SequenceCatalog {
    root: PathBuf,
    sequences: Vec<String>,
}

impl SequenceCatalog {
    pub fn scan<P: AsRef<Path>>(root: P) -> DatasetResult<SequenceCatalog> {
        let root = root.as_ref().to_owned();
        let sequences = SequenceCatalog::list_sequences(&root)?;
        info!("Found {} sequences in {:?}", sequences.len(), root);
        Ok(SequenceCatalog { root, sequences })
    }

    /// Names of the directories directly under `root`, sorted by name
    pub fn list_sequences(root: &Path) -> DatasetResult<Vec<String>> {
        let entries = fs::read_dir(root).map_err(|e| DatasetError::from_io(root, e))?;
        let mut sequences = vec![];
        for entry in entries {
            let entry = entry.map_err(|e| DatasetError::from_io(root, e))?;
            // follows symlinked sequence directories
            if !entry.path().is_dir() {
                continue;
            }
            sequences.push(entry.file_name().to_string_lossy().into_owned());
        }
        sequences.sort();
        Ok(sequences)
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.sequences.shuffle(rng);
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sequences(&self) -> &[String] {
        &self.sequences
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn sequence_dir(&self, sequence: &str) -> PathBuf {
        self.root.join(sequence)
    }

    /// Frame ids listed in the sequence's `files.txt`, in file order
    pub fn load_frame_ids(&self, sequence: &str) -> DatasetResult<Vec<String>> {
        let path = self.sequence_dir(sequence).join(INDEX_FILE_NAME);
        let contents = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DatasetError::MissingIndex { path: path.clone() },
            _ => DatasetError::Io {
                path: path.clone(),
                source: e,
            },
        })?;
        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect())
    }

    /// Where the image, flow steps and label of a frame live
    pub fn frame_files(
        &self,
        sequence: &str,
        frame_id: &str,
        frame_rate: usize,
        flow_extension: &str,
    ) -> DatasetResult<FrameFiles> {
        let invalid = || DatasetError::InvalidFrameId {
            sequence: sequence.to_owned(),
            frame_id: frame_id.to_owned(),
        };
        let frame_number: u64 = frame_id.parse().map_err(|_| invalid())?;
        let sequence_dir = self.sequence_dir(sequence);
        let flows_dir = sequence_dir.join(FLOWS_DIR);
        // the last step ends at frame_number + frame_rate, which must still be a u64
        let flows = (0..frame_rate as u64)
            .map(|step| {
                let start = frame_number.checked_add(step)?;
                let end = start.checked_add(1)?;
                Some(flows_dir.join(format!("{}_{}.{}", start, end, flow_extension)))
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(invalid)?;
        Ok(FrameFiles {
            image: sequence_dir.join(IMAGES_DIR).join(format!("{}.png", frame_id)),
            flows,
            label: sequence_dir
                .join(ANNOTATIONS_DIR)
                .join(format!("{}_{:06}_L.png", sequence, frame_number)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn make_sequences(root: &Path, names: &[&str]) {
        for name in names {
            fs::create_dir_all(root.join(name)).unwrap();
        }
    }

    #[test]
    fn lists_only_directories() {
        let dir = tempfile::tempdir().unwrap();
        make_sequences(dir.path(), &["seq_b", "seq_a"]);
        fs::write(dir.path().join("README"), "not a sequence").unwrap();
        let catalog = SequenceCatalog::scan(dir.path()).unwrap();
        assert_eq!(catalog.sequences(), &["seq_a".to_string(), "seq_b".to_string()]);
    }

    #[test]
    fn shuffle_keeps_all_sequences() {
        let dir = tempfile::tempdir().unwrap();
        let names = ["a", "b", "c", "d", "e", "f"];
        make_sequences(dir.path(), &names);
        let mut catalog = SequenceCatalog::scan(dir.path()).unwrap();
        catalog.shuffle(&mut StdRng::seed_from_u64(3));
        let mut shuffled = catalog.sequences().to_vec();
        shuffled.sort();
        assert_eq!(shuffled, names.iter().map(|n| n.to_string()).collect::<Vec<_>>());
    }

    #[test]
    fn reads_frame_ids_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        make_sequences(dir.path(), &["seq"]);
        fs::write(dir.path().join("seq").join(INDEX_FILE_NAME), "7\n3\n\n 5 \n").unwrap();
        let catalog = SequenceCatalog::scan(dir.path()).unwrap();
        assert_eq!(catalog.load_frame_ids("seq").unwrap(), vec!["7", "3", "5"]);
    }

    #[test]
    fn empty_index_has_no_frames() {
        let dir = tempfile::tempdir().unwrap();
        make_sequences(dir.path(), &["seq"]);
        fs::write(dir.path().join("seq").join(INDEX_FILE_NAME), "").unwrap();
        let catalog = SequenceCatalog::scan(dir.path()).unwrap();
        assert!(catalog.load_frame_ids("seq").unwrap().is_empty());
    }

    #[test]
    fn missing_index() {
        let dir = tempfile::tempdir().unwrap();
        make_sequences(dir.path(), &["seq"]);
        let catalog = SequenceCatalog::scan(dir.path()).unwrap();
        match catalog.load_frame_ids("seq") {
            Err(DatasetError::MissingIndex { path }) => {
                assert!(path.ends_with("seq/files.txt"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn frame_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = SequenceCatalog::scan(dir.path()).unwrap();
        let files = catalog.frame_files("seq_a", "12", 2, "flo").unwrap();
        assert_eq!(files.image, dir.path().join("seq_a/images/12.png"));
        assert_eq!(
            files.flows,
            vec![
                dir.path().join("seq_a/flows/12_13.flo"),
                dir.path().join("seq_a/flows/13_14.flo"),
            ]
        );
        assert_eq!(files.label, dir.path().join("seq_a/annot/seq_a_000012_L.png"));
    }

    #[test]
    fn non_numeric_frame_id() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = SequenceCatalog::scan(dir.path()).unwrap();
        assert!(matches!(
            catalog.frame_files("seq", "frame7", 1, "flo"),
            Err(DatasetError::InvalidFrameId { .. })
        ));
    }

    #[test]
    fn flow_steps_past_u64_max() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = SequenceCatalog::scan(dir.path()).unwrap();
        let last = u64::MAX.to_string();
        match catalog.frame_files("seq", &last, 1, "flo") {
            Err(DatasetError::InvalidFrameId { sequence, frame_id }) => {
                assert_eq!(sequence, "seq");
                assert_eq!(frame_id, last);
            }
            other => panic!("unexpected {:?}", other),
        }
        let before_last = (u64::MAX - 1).to_string();
        assert!(catalog.frame_files("seq", &before_last, 1, "flo").is_ok());
        assert!(matches!(
            catalog.frame_files("seq", &before_last, 2, "flo"),
            Err(DatasetError::InvalidFrameId { .. })
        ));
        // no flow steps, nothing to overflow
        assert!(catalog.frame_files("seq", &last, 0, "flo").is_ok());
    }
}

//! Checkpoints of fitted coefficients.
//!
//! Writes go through a [`CheckpointWriter`]: bytes land in a temporary file
//! next to the target and only replace it on [`CheckpointWriter::commit`].
//! A writer dropped before commit removes its temporary file, so an aborted
//! save never leaves a partial checkpoint behind.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::Coefficients;
use crate::serialization::SerializableParams;

/// Scoped handle on an in-progress checkpoint write.
#[derive(Debug)]
pub struct CheckpointWriter {
    target: PathBuf,
    tmp: PathBuf,
    file: Option<BufWriter<File>>,
}

impl CheckpointWriter {
    /// Creates `<target>.tmp` for writing.
    pub fn create(target: impl AsRef<Path>) -> Result<Self> {
        let target = target.as_ref().to_path_buf();
        let mut tmp = target.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let file = BufWriter::new(File::create(&tmp)?);
        Ok(Self {
            target,
            tmp,
            file: Some(file),
        })
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.write_all(bytes)?;
        }
        Ok(())
    }

    /// Flushes, syncs and atomically moves the temporary file into place.
    pub fn commit(mut self) -> Result<PathBuf> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
            file.get_ref().sync_all()?;
        }
        fs::rename(&self.tmp, &self.target)?;
        Ok(self.target.clone())
    }

    pub fn temp_path(&self) -> &Path {
        &self.tmp
    }
}

impl Drop for CheckpointWriter {
    fn drop(&mut self) {
        self.file.take();
        if self.tmp.exists() {
            let _ = fs::remove_file(&self.tmp);
        }
    }
}

/// Writes `coefficients` to `path`, replacing any previous checkpoint.
pub fn save(path: impl AsRef<Path>, coefficients: &Coefficients) -> Result<()> {
    let path = path.as_ref();
    let mut writer = CheckpointWriter::create(path)?;
    writer.write_all(&coefficients.to_bytes()?)?;
    writer.commit()?;
    log::info!(
        "saved checkpoint with {} weights to {}",
        coefficients.n_inputs(),
        path.display()
    );
    Ok(())
}

pub fn restore(path: impl AsRef<Path>) -> Result<Coefficients> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let coefficients = Coefficients::from_bytes(&bytes)?;
    log::info!("restored checkpoint from {}", path.display());
    Ok(coefficients)
}

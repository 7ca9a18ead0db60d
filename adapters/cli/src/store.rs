use std::{
    fs, io,
    path::{Path, PathBuf},
};

use lane_control_simulation::ports::{decode_world, encode_world, StateStore, StoreError};
use lane_control_world::World;

/// State store persisting the world as a JSON file.
#[derive(Debug)]
pub(crate) struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn load(&mut self) -> Result<Option<World>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(document) => decode_world(&document).map(Some),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn save(&mut self, world: &World) -> Result<(), StoreError> {
        let document = encode_world(world)?;
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, document)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

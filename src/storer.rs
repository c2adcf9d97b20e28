use std::fs::File;

use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use std::path::Path;

use crate::error::Error;
use crate::handlers::upload::FileStorer;

/// Content-addressed file storage on local disk; identical uploads collapse
/// into one file. The extension is kept so the static file service can derive
/// a content type.
pub struct LocalStorer {
    path: String,
}

impl LocalStorer {
    pub fn new(path: &str) -> Self {
        Self { path: path.to_owned() }
    }
}

impl FileStorer for LocalStorer {
    fn write(&self, bytes: Bytes, extension: &str) -> Result<String, Error> {
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hasher.finalize();
        let name = if extension.is_empty() {
            format!("{:x}", digest)
        } else {
            format!("{:x}.{}", digest, extension)
        };
        let mut file = File::create(Path::new(&self.path).join(&name))?;
        file.write_all(&bytes)?;
        Ok(name)
    }
    fn read(&self, name: &str) -> Result<Bytes, Error> {
        let mut file = File::open(Path::new(&self.path).join(name))?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        Ok(Bytes::from(content))
    }
}

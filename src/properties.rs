use std::{collections::HashMap, fs::File, io::BufReader, path::{Path, PathBuf}};

use crate::{bitstreams::{DEFAULT_BUFFER_SIZE, MIN_BUFFER_SIZE}, ArchiveError, Result};

/// Settings of an archiving run, read from a Java-style `.properties` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Properties {
    /// Capacity in bytes of every bit stream buffer
    pub buffer_size: usize,
    /// Where extracted files are created
    pub output_dir: PathBuf,
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            output_dir: PathBuf::from("./"),
        }
    }
}

impl Properties {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let properties_file = File::open(path.as_ref())?;
        let p = java_properties::read(BufReader::new(properties_file))
            .map_err(|e| ArchiveError::Config(format!("failed parsing {}: {}", path.as_ref().display(), e)))?;

        Self::try_from(p)
    }

    pub fn set_buffer_size(&mut self, buffer_size: usize) -> Result<()> {
        if buffer_size < MIN_BUFFER_SIZE {
            return Err(ArchiveError::Config(format!(
                "buffer size {} is below the minimum of {} bytes",
                buffer_size, MIN_BUFFER_SIZE
            )));
        }
        self.buffer_size = buffer_size;
        Ok(())
    }
}

impl TryFrom<HashMap<String, String>> for Properties {
    type Error = ArchiveError;

    fn try_from(value: HashMap<String, String>) -> Result<Self> {
        let mut props = Properties::default();

        if let Some(buffer_size) = value.get("buffersize") {
            let parsed = buffer_size
                .trim()
                .parse()
                .map_err(|_| ArchiveError::Config(format!("malformed buffersize {:?}", buffer_size)))?;
            props.set_buffer_size(parsed)?;
        }
        if let Some(output_dir) = value.get("outputdir") {
            if !output_dir.trim().is_empty() {
                props.output_dir = PathBuf::from(output_dir.trim());
            }
        }

        Ok(props)
    }
}

impl From<&Properties> for String {
    fn from(val: &Properties) -> Self {
        let mut s = String::new();

        s.push_str("#huffarc properties\n");
        s.push_str(&format!("buffersize={}\n", val.buffer_size));
        s.push_str(&format!("outputdir={}\n", val.output_dir.display()));

        s
    }
}

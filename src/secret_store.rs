use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Directory under the home directory holding the secrets file
const STORE_DIR: &str = ".llm-langfuse";
const STORE_FILE: &str = "secrets.json";

/// Persistent fallback for credentials that are neither in the node
/// configuration nor in the environment
///
/// Keys are the environment variable names the credentials would otherwise
/// be read from (`OPENAI_API_KEY`, `LANGFUSE_SECRET_KEY`, ...). Values are
/// stored as plain JSON; protect the file with filesystem permissions.
#[derive(Debug)]
pub struct SecretStore {
    /// Map of secret keys to their values
    secrets: BTreeMap<String, SecretString>,
    /// Path to the secrets file
    file_path: PathBuf,
}

impl SecretStore {
    /// Opens the store at the default path (~/.llm-langfuse/secrets.json)
    ///
    /// # Returns
    ///
    /// * `io::Result<Self>` - The loaded store or an IO error
    pub fn new() -> io::Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not find home directory")
        })?;
        Self::open(home_dir.join(STORE_DIR).join(STORE_FILE))
    }

    /// Opens the store backed by an explicit file, creating parent directories
    ///
    /// A missing file is treated as an empty store.
    pub fn open(file_path: impl Into<PathBuf>) -> io::Result<Self> {
        let file_path = file_path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut store = SecretStore {
            secrets: BTreeMap::new(),
            file_path,
        };

        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn load(&mut self) -> io::Result<()> {
        match File::open(&self.file_path) {
            Ok(mut file) => {
                let mut contents = String::new();
                file.read_to_string(&mut contents)?;
                if contents.trim().is_empty() {
                    return Ok(());
                }
                let secrets: BTreeMap<String, String> = serde_json::from_str(&contents)
                    .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;
                self.secrets = secrets
                    .into_iter()
                    .map(|(key, value)| (key, SecretString::new(value)))
                    .collect();
                Ok(())
            }
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn save(&self) -> io::Result<()> {
        let secrets: BTreeMap<&str, &str> = self
            .secrets
            .iter()
            .map(|(key, value)| (key.as_str(), value.expose_secret().as_str()))
            .collect();
        let contents = serde_json::to_string_pretty(&secrets)?;
        let mut file = File::create(&self.file_path)?;
        file.write_all(contents.as_bytes())?;
        Ok(())
    }

    /// Sets a secret value for the given key and persists the store
    ///
    /// # Arguments
    ///
    /// * `key` - The key to store the secret under
    /// * `value` - The secret value to store
    pub fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.secrets
            .insert(key.to_string(), SecretString::new(value.to_string()));
        self.save()
    }

    /// Retrieves a secret value for the given key
    pub fn get(&self, key: &str) -> Option<&String> {
        self.secrets.get(key).map(|secret| secret.expose_secret())
    }

    /// Retrieves a secret value without exposing it as a String
    pub fn get_secret(&self, key: &str) -> Option<&SecretString> {
        self.secrets.get(key)
    }

    /// Deletes a secret and persists the store
    ///
    /// # Returns
    ///
    /// * `io::Result<bool>` - Whether the key was present
    pub fn delete(&mut self, key: &str) -> io::Result<bool> {
        let removed = self.secrets.remove(key).is_some();
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Stored keys, without their values
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.secrets.keys().map(String::as_str)
    }
}

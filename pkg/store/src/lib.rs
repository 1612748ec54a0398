use std::{
    fs::{OpenOptions, create_dir_all, rename},
    io::{ErrorKind, Read, Write},
    path::{Path, PathBuf},
};

use schema::Todo;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value.to_string())
    }
}

/// Whole-collection access to persisted todos. Callers always load the full
/// collection and hand back the full collection; there are no partial writes.
pub trait TodoStore {
    fn load(&self) -> Result<Vec<Todo>, StoreError>;
    fn save(&mut self, todos: &[Todo]) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// JSON file backend
// ---------------------------------------------------------------------------

/// Collection stored as a single pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        PathBuf::from(tmp_path)
    }
}

impl TodoStore for JsonFileStore {
    /// A missing file is an empty collection. Anything unreadable or
    /// undecodable is an error; the caller never sees corrupt state as empty.
    fn load(&self) -> Result<Vec<Todo>, StoreError> {
        let mut file = match OpenOptions::new().read(true).open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut raw = String::new();
        file.read_to_string(&mut raw)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&mut self, todos: &[Todo]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent)?;
        }

        let payload = serde_json::to_string_pretty(todos)?;
        let tmp_path = self.tmp_path();
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;
        file.write_all(payload.as_bytes())?;
        file.sync_all()?;
        rename(tmp_path, &self.path)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    todos: Vec<Todo>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_todos(todos: Vec<Todo>) -> Self {
        Self { todos }
    }

    pub fn todos_len(&self) -> usize {
        self.todos.len()
    }
}

impl TodoStore for InMemoryStore {
    fn load(&self) -> Result<Vec<Todo>, StoreError> {
        Ok(self.todos.clone())
    }

    fn save(&mut self, todos: &[Todo]) -> Result<(), StoreError> {
        self.todos = todos.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::todo_builder;

    #[test]
    fn missing_file_loads_as_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("todos.json"));
        assert_eq!(store.load().unwrap(), Vec::new());
    }

    #[test]
    fn save_then_load_preserves_order_and_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path().join("todos.json"));
        let todos = vec![
            todo_builder(2, "second", true),
            todo_builder(1, "first", false),
        ];
        store.save(&todos).unwrap();

        let reopened = JsonFileStore::open(store.path());
        assert_eq!(reopened.load().unwrap(), todos);
    }

    #[test]
    fn save_writes_pretty_printed_array_and_replaces_prior_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");
        let mut store = JsonFileStore::open(&path);
        store
            .save(&[todo_builder(1, "a", false), todo_builder(2, "b", false)])
            .unwrap();
        store.save(&[todo_builder(1, "only", true)]).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            raw,
            "[\n  {\n    \"id\": 1,\n    \"title\": \"only\",\n    \"completed\": true\n  }\n]"
        );
        assert!(!dir.path().join("todos.json.tmp").exists());
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("todos.json");
        let mut store = JsonFileStore::open(&path);
        store.save(&[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn corrupt_file_is_reported_instead_of_emptied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::open(&path);
        assert!(matches!(store.load(), Err(StoreError::Parse(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    }

    #[test]
    fn save_into_unwritable_location_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let mut store = JsonFileStore::open(blocker.join("todos.json"));
        assert!(matches!(store.save(&[]), Err(StoreError::Io(_))));
    }

    #[test]
    fn in_memory_store_replaces_whole_collection() {
        let mut store = InMemoryStore::with_todos(vec![todo_builder(1, "a", false)]);
        store.save(&[todo_builder(5, "b", true)]).unwrap();
        assert_eq!(store.todos_len(), 1);
        assert_eq!(store.load().unwrap(), vec![todo_builder(5, "b", true)]);
    }
}

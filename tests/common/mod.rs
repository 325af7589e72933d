//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tweetdex::document::Document;
use tweetdex::error::Result;
use tweetdex::storage::{
    MemoryStorage, Storage, StorageError, StorageInput, StorageLock, StorageOutput,
};

/// A tweet document with the six schema fields.
pub fn tweet(polarity: &str, id: &str, user: &str, text: &str) -> Document {
    Document::builder()
        .add_field("polarity", polarity)
        .add_field("id", id)
        .add_field("date", "Mon Apr 06 22:19:45 PDT 2009")
        .add_field("query", "NO_QUERY")
        .add_field("user", user)
        .add_field("text", text)
        .build()
}

/// A CSV row for the same fields.
pub fn csv_row(polarity: &str, id: &str, user: &str, text: &str) -> String {
    format!(
        "\"{polarity}\",\"{id}\",\"Mon Apr 06 22:19:45 PDT 2009\",\"NO_QUERY\",\"{user}\",\"{}\"\n",
        text.replace('"', "\"\"")
    )
}

/// Memory storage that can be told to fail while publishing.
#[derive(Debug, Default)]
pub struct FailingStorage {
    pub inner: MemoryStorage,
    /// Fail the rename that publishes the manifest.
    pub fail_manifest: AtomicBool,
    /// Fail creating segment files.
    pub fail_segments: AtomicBool,
    /// Fail the directory sync that follows a publish.
    pub fail_sync: AtomicBool,
}

impl FailingStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_fail_manifest(&self, fail: bool) {
        self.fail_manifest.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_segments(&self, fail: bool) {
        self.fail_segments.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_sync(&self, fail: bool) {
        self.fail_sync.store(fail, Ordering::SeqCst);
    }
}

impl Storage for FailingStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        self.inner.open_input(name)
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        if self.fail_segments.load(Ordering::SeqCst) && name.ends_with(".seg.tmp") {
            return Err(StorageError::IoError(format!("injected failure creating {name}")).into());
        }
        self.inner.create_output(name)
    }

    fn file_exists(&self, name: &str) -> bool {
        self.inner.file_exists(name)
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        self.inner.delete_file(name)
    }

    fn list_files(&self) -> Result<Vec<String>> {
        self.inner.list_files()
    }

    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()> {
        if self.fail_manifest.load(Ordering::SeqCst) && new_name == "segments.json" {
            return Err(StorageError::IoError("injected failure publishing manifest".into()).into());
        }
        self.inner.rename_file(old_name, new_name)
    }

    fn acquire_lock(&self, name: &str) -> Result<Box<dyn StorageLock>> {
        self.inner.acquire_lock(name)
    }

    fn sync(&self) -> Result<()> {
        if self.fail_sync.load(Ordering::SeqCst) {
            return Err(StorageError::IoError("injected failure syncing".into()).into());
        }
        self.inner.sync()
    }
}

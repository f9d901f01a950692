use bytelayer::error::{Error, Result};
use bytelayer::storage::backend::OpenDalStore;
use bytelayer::storage::pipe::StreamWriter;
use bytelayer::storage::{ByteStream, DeclaredLength, IoPath, StorageClient, StorageIo};
use bytes::Bytes;
use libtest_mimic::{Failed, Trial};
use opendal::Operator;
use rand::Rng;
use rand::prelude::*;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock, Mutex};
use uuid::Uuid;

pub type TestClient = StorageClient<OpenDalStore>;

pub static TEST_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
});

/// Behavior tests run against the in-memory service; no external daemon.
pub fn init_test_service() -> Result<TestClient> {
    let operator = Operator::new(opendal::services::Memory::default())?.finish();
    Ok(StorageClient::new(OpenDalStore::new(operator)))
}

pub struct Fixture {
    pub paths: std::sync::Mutex<Vec<String>>,
}

impl Fixture {
    pub const fn new() -> Self {
        Self {
            paths: std::sync::Mutex::new(vec![]),
        }
    }

    pub fn new_file_path(&self) -> String {
        let path = format!("{}", Uuid::new_v4());
        self.paths.lock().unwrap().push(path.clone());
        path
    }

    pub fn new_file(&self) -> (String, Vec<u8>, usize) {
        self.new_file_with_range(Uuid::new_v4().to_string(), 1..128 * 1024)
    }

    pub fn new_file_with_range(
        &self,
        path: impl Into<String>,
        range: std::ops::Range<usize>,
    ) -> (String, Vec<u8>, usize) {
        let path = path.into();
        self.paths.lock().unwrap().push(path.clone());

        let mut rng = rand::rng();
        let size = rng.random_range(range);
        let mut content = vec![0; size];
        rng.fill_bytes(&mut content);

        (path, content, size)
    }

    pub async fn cleanup(&self, op: &Operator) {
        let paths: Vec<_> = std::mem::take(self.paths.lock().unwrap().as_mut());
        if !paths.is_empty() {
            let _ = op.delete_iter(paths).await;
        }
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

pub static TEST_FIXTURE: Fixture = Fixture::new();

/// Delegating store that injects read failures for marked paths and can
/// hide object sizes, to exercise the merge failure policies and the
/// unknown-length path.
#[derive(Clone)]
pub struct FlakyStore<S> {
    inner: S,
    unreadable: Arc<Mutex<HashSet<String>>>,
    hide_sizes: bool,
}

impl<S> FlakyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            unreadable: Arc::new(Mutex::new(HashSet::new())),
            hide_sizes: false,
        }
    }

    pub fn hide_sizes(mut self) -> Self {
        self.hide_sizes = true;
        self
    }

    pub fn mark_unreadable(&self, path: &IoPath) {
        self.unreadable.lock().unwrap().insert(path.to_string());
    }

    fn check_readable(&self, path: &IoPath) -> Result<()> {
        if self.unreadable.lock().unwrap().contains(path.as_str()) {
            return Err(Error::Io {
                source: std::io::Error::other("injected read failure"),
            });
        }
        Ok(())
    }
}

impl<S: StorageIo> StorageIo for FlakyStore<S> {
    async fn read(&self, path: &IoPath) -> Result<ByteStream> {
        self.check_readable(path)?;
        self.inner.read(path).await
    }

    async fn read_from(&self, path: &IoPath, offset: u64) -> Result<ByteStream> {
        self.check_readable(path)?;
        self.inner.read_from(path, offset).await
    }

    async fn write(&self, path: &IoPath, payload: Bytes) -> Result<()> {
        self.inner.write(path, payload).await
    }

    async fn write_stream(&self, path: &IoPath, declared: DeclaredLength) -> Result<StreamWriter> {
        self.inner.write_stream(path, declared).await
    }

    async fn size(&self, path: &IoPath) -> Result<DeclaredLength> {
        if self.hide_sizes {
            return Ok(DeclaredLength::Unknown);
        }
        self.inner.size(path).await
    }

    async fn copy(&self, from: &IoPath, to: &IoPath) -> Result<()> {
        self.inner.copy(from, to).await
    }

    async fn remove(&self, path: &IoPath) -> Result<()> {
        self.inner.remove(path).await
    }
}

/// A client over a `FlakyStore` sharing the given client's operator.
pub fn flaky_client(client: &TestClient) -> (StorageClient<FlakyStore<OpenDalStore>>, FlakyStore<OpenDalStore>) {
    let store = FlakyStore::new(client.store().clone());
    (StorageClient::new(store.clone()), store)
}

pub fn build_async_trial<F, Fut>(name: &str, client: &TestClient, f: F) -> Trial
where
    F: FnOnce(TestClient) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = Result<()>> + Send,
{
    let handle = TEST_RUNTIME.handle().clone();
    let client = client.clone();

    Trial::test(format!("behavior::{name}"), move || {
        handle
            .block_on(f(client))
            .map_err(|err| Failed::from(err.to_string()))
    })
}

#[macro_export]
macro_rules! async_trials {
    ($client:ident, $($test:ident),*) => {
        vec![$(build_async_trial(stringify!($test), $client, $test),)*]
    };
}

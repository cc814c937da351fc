//! End-to-end scenarios: a worker thread driven through commands against a
//! scripted server, observed only through `SyncStatus`.


pub(crate) mod harness {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::config::SyncConfig;
    use crate::platforms::DeviceProfile;
    use crate::status::{Signal, SyncStatus};
    use crate::test_utils::{self, FakeTransport};
    use crate::worker::{Command, WorkerHandle};

    const WAIT: Duration = Duration::from_secs(5);

    pub struct Harness {
        tmp: tempfile::TempDir,
        pub status: Arc<SyncStatus>,
        pub transport: Arc<FakeTransport>,
        worker: Option<WorkerHandle>,
    }

    impl Harness {
        pub fn start(profile: DeviceProfile, config: SyncConfig) -> Self {
            let tmp = tempfile::tempdir().unwrap();
            let ctx = Arc::new(test_utils::context(tmp.path(), profile, config));
            let status = Arc::new(SyncStatus::new());
            let transport = Arc::new(FakeTransport::new());
            let worker = WorkerHandle::spawn(ctx, Arc::clone(&status), transport.clone()).unwrap();
            Self {
                tmp,
                status,
                transport,
                worker: Some(worker),
            }
        }

        pub fn roms(&self) -> PathBuf {
            self.tmp.path().join("roms")
        }

        pub fn mkdirs(&self, folders: &[&str]) {
            for folder in folders {
                std::fs::create_dir_all(self.roms().join(folder)).unwrap();
            }
        }

        pub fn root(&self) -> &Path {
            self.tmp.path()
        }

        /// Send `command` and wait until `signal` has been raised once more.
        pub fn run(&self, command: Command, signal: impl Fn(&SyncStatus) -> &Signal) {
            let signal = signal(&self.status);
            let before = signal.raise_count();
            assert!(self.worker().send(command));
            let deadline = std::time::Instant::now() + WAIT;
            while signal.raise_count() == before {
                assert!(std::time::Instant::now() < deadline, "timed out on {:?}", command);
                signal.wait_timeout(Duration::from_millis(10));
            }
        }

        pub fn send(&self, command: Command) {
            assert!(self.worker().send(command));
        }

        pub fn shutdown(mut self) -> Result<(), crate::SyncError> {
            self.worker.take().unwrap().shutdown()
        }

        fn worker(&self) -> &WorkerHandle {
            self.worker.as_ref().unwrap()
        }
    }
}

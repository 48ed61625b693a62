use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{ArcPath, ArcStr, log::LogLevel};

use super::data::{Data, PathOpt, StrOpt, U64Opt};

/// Mock implementation of the configuration actor for testing purposes.
///
/// Stores the configuration data in memory; load and save are no-ops.
#[derive(Debug, Clone)]
pub struct Mock {
    data: Arc<Mutex<Data>>,
}

impl Mock {
    pub fn new(data: Data) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
        }
    }

    pub async fn path(&self, opt: PathOpt) -> ArcPath {
        self.data.lock().await.path(opt)
    }

    pub async fn str(&self, opt: StrOpt) -> ArcStr {
        self.data.lock().await.str(opt)
    }

    pub async fn u64(&self, opt: U64Opt) -> u64 {
        self.data.lock().await.u64(opt)
    }

    pub async fn log_level(&self) -> LogLevel {
        self.data.lock().await.log_level()
    }

    pub async fn set_str(&self, opt: StrOpt, value: ArcStr) {
        self.data.lock().await.set_str(opt, value);
    }

    pub async fn set_u64(&self, opt: U64Opt, value: u64) {
        self.data.lock().await.set_u64(opt, value);
    }
}

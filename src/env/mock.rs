use std::{collections::HashMap, env::VarError, ffi::OsString, sync::Arc};

use tokio::sync::Mutex;

use crate::{ArcOsStr, ArcStr};

/// Mock implementation of the environment actor for testing purposes.
///
/// Stores variables in memory so tests never touch the real process
/// environment.
#[derive(Debug, Clone)]
pub struct Mock {
    vars: Arc<Mutex<HashMap<ArcOsStr, OsString>>>,
}

impl Mock {
    pub fn empty() -> Self {
        Self {
            vars: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn var(&self, key: ArcOsStr) -> Result<ArcStr, VarError> {
        let vars = self.vars.lock().await;
        vars.get(&key)
            .map(|v| ArcStr::from(v.to_string_lossy().as_ref()))
            .ok_or(VarError::NotPresent)
    }

    pub async fn set_var(&self, key: ArcOsStr, value: OsString) {
        let mut vars = self.vars.lock().await;
        vars.insert(key, value);
    }

    pub async fn unset_var(&self, key: ArcOsStr) {
        let mut vars = self.vars.lock().await;
        vars.remove(&key);
    }
}

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::ArcStr;

/// In-memory session state for the mock variant.
#[derive(Debug, Clone, Default)]
pub struct MockData {
    pub token: Option<ArcStr>,
    pub user_id: Option<ArcStr>,
}

/// Mock implementation of the session actor for testing purposes.
#[derive(Debug, Clone)]
pub struct Mock {
    data: Arc<Mutex<MockData>>,
}

impl Mock {
    pub fn new(data: MockData) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
        }
    }

    pub async fn token(&self) -> Option<ArcStr> {
        self.data.lock().await.token.clone()
    }

    pub async fn user_id(&self) -> Option<ArcStr> {
        self.data.lock().await.user_id.clone()
    }

    pub async fn set_token(&self, token: Option<ArcStr>) {
        let mut data = self.data.lock().await;
        data.token = token;
        data.user_id = None;
    }

    pub async fn set_identity(&self, user_id: ArcStr) {
        self.data.lock().await.user_id = Some(user_id);
    }
}

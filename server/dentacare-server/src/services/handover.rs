//! Versioned branding/content handover blobs

use std::sync::Arc;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::models::HandoverTemp;
use crate::store::ClinicStore;

#[derive(Clone)]
pub struct HandoverService {
    store: Arc<dyn ClinicStore>,
}

impl HandoverService {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    /// Store `payload` as the next version; only JSON objects are accepted
    pub async fn publish(&self, payload: serde_json::Value) -> ApiResult<HandoverTemp> {
        if !payload.is_object() {
            return Err(ApiError::validation("Handover payload must be a JSON object"));
        }
        let entry = self.store.insert_handover(payload).await?;
        info!(version = entry.version, "Handover published");
        Ok(entry)
    }

    pub async fn latest(&self) -> ApiResult<HandoverTemp> {
        self.store
            .latest_handover()
            .await?
            .ok_or_else(|| ApiError::not_found("Handover"))
    }

    pub async fn get(&self, version: i64) -> ApiResult<HandoverTemp> {
        self.store
            .get_handover(version)
            .await?
            .ok_or_else(|| ApiError::not_found("Handover version"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_versions_increase() {
        let svc = HandoverService::new(Arc::new(InMemoryStore::new()));
        assert!(svc.latest().await.is_err());

        let v1 = svc.publish(json!({"heroTitle": "Smile"})).await.unwrap();
        let v2 = svc.publish(json!({"heroTitle": "Smile brighter"})).await.unwrap();
        assert_eq!(v2.version, v1.version + 1);
        assert_eq!(svc.latest().await.unwrap().version, v2.version);
        assert_eq!(svc.get(v1.version).await.unwrap().payload["heroTitle"], "Smile");
        assert!(matches!(svc.publish(json!([1, 2])).await, Err(ApiError::Validation { .. })));
    }
}

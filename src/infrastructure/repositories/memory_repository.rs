use super::content_repository::{ContentRepository, CreateOutcome};
use super::delivery_repository::DeliveryRepository;
use crate::domain::content::ContentRecord;
use crate::domain::delivery::{DeliveryRequest, ResolvedDelivery};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    contents: HashMap<Uuid, ContentRecord>,
    content_ids_by_url: HashMap<String, Uuid>,
    requests: Vec<DeliveryRequest>,
}

impl MemoryState {
    fn resolve(&self, request: &DeliveryRequest) -> AppResult<ResolvedDelivery> {
        let content = self.contents.get(&request.content_id).cloned().ok_or_else(|| {
            AppError::Internal(format!(
                "request {} references missing content {}",
                request.id, request.content_id
            ))
        })?;

        Ok(ResolvedDelivery {
            request: request.clone(),
            content,
        })
    }
}

/// Process-local content and request store, used when no database is
/// configured and as the store behind tests. Data is lost on restart.
#[derive(Default)]
pub struct InMemoryRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn content_count(&self) -> usize {
        self.state.read().await.contents.len()
    }

    pub async fn request_count(&self) -> usize {
        self.state.read().await.requests.len()
    }
}

#[async_trait]
impl ContentRepository for InMemoryRepository {
    async fn find_by_url(&self, canonical_url: &str) -> AppResult<Option<ContentRecord>> {
        let state = self.state.read().await;
        Ok(state
            .content_ids_by_url
            .get(canonical_url)
            .and_then(|id| state.contents.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ContentRecord>> {
        Ok(self.state.read().await.contents.get(&id).cloned())
    }

    async fn create_if_absent(&self, candidate: ContentRecord) -> AppResult<CreateOutcome> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        match state.content_ids_by_url.entry(candidate.canonical_url.clone()) {
            Entry::Occupied(existing) => {
                let record = state.contents.get(existing.get()).cloned().ok_or_else(|| {
                    AppError::Internal(format!("dangling URL index for {}", existing.key()))
                })?;
                Ok(CreateOutcome::Existing(record))
            }
            Entry::Vacant(slot) => {
                if state.contents.contains_key(&candidate.id) {
                    return Err(AppError::Internal(format!(
                        "content id {} already in use",
                        candidate.id
                    )));
                }
                slot.insert(candidate.id);
                state.contents.insert(candidate.id, candidate.clone());
                Ok(CreateOutcome::Created(candidate))
            }
        }
    }

    async fn check_health(&self) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl DeliveryRepository for InMemoryRepository {
    async fn create(&self, request: DeliveryRequest) -> AppResult<DeliveryRequest> {
        let mut state = self.state.write().await;

        if !state.contents.contains_key(&request.content_id) {
            return Err(AppError::NotFound(format!("Content {}", request.content_id)));
        }

        state.requests.push(request.clone());
        Ok(request)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ResolvedDelivery>> {
        let state = self.state.read().await;
        state
            .requests
            .iter()
            .find(|request| request.id == id)
            .map(|request| state.resolve(request))
            .transpose()
    }

    async fn find_by_phone(&self, phone: &str) -> AppResult<Vec<ResolvedDelivery>> {
        let state = self.state.read().await;
        let mut requests: Vec<&DeliveryRequest> =
            state.requests.iter().filter(|r| r.phone == phone).collect();
        // Stable sort keeps insertion order for equal timestamps
        requests.sort_by_key(|r| r.created_at);

        requests.into_iter().map(|r| state.resolve(r)).collect()
    }
}

//! Firestore-backed cache of trending region documents.

use async_trait::async_trait;
use tracing::{debug, info};
use trend_models::{CachedRegionDocument, ContentType, RegionCode};

use crate::client::FirestoreClient;
use crate::error::FirestoreResult;
use crate::store::TrendCacheStore;
use crate::types::{mark_timestamp, to_fields, Document, StructuredQuery, Value};

/// Default collection for cached region documents.
pub const DEFAULT_TREND_COLLECTION: &str = "trending_data_grouped";

/// Upper bound on documents per region (one unscoped plus one per content type).
const REGION_QUERY_LIMIT: i32 = 16;

/// Repository for `trending_data_grouped/{country}[_{type}]`.
#[derive(Clone)]
pub struct FirestoreTrendStore {
    client: FirestoreClient,
    collection: String,
}

impl FirestoreTrendStore {
    pub fn new(client: FirestoreClient, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
        }
    }

    /// Collection name from `TREND_COLLECTION`, falling back to the default.
    pub fn collection_from_env() -> String {
        std::env::var("TREND_COLLECTION")
            .ok()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TREND_COLLECTION.to_string())
    }

    fn decode_sorted(docs: Vec<Document>) -> FirestoreResult<Vec<CachedRegionDocument>> {
        let mut decoded = docs
            .iter()
            .map(|d| d.decode::<CachedRegionDocument>())
            .collect::<FirestoreResult<Vec<_>>>()?;
        decoded.sort_by_key(|d| d.id());
        Ok(decoded)
    }
}

#[async_trait]
impl TrendCacheStore for FirestoreTrendStore {
    async fn upsert(&self, doc: &CachedRegionDocument) -> FirestoreResult<()> {
        let doc_id = doc.id();
        let mut fields = to_fields(doc)?;
        mark_timestamp(&mut fields, "updated_at");

        self.client
            .set_document(&self.collection, &doc_id, fields)
            .await?;

        info!(
            collection = %self.collection,
            doc_id = %doc_id,
            videos = doc.data.len(),
            "Upserted cached region document"
        );
        Ok(())
    }

    async fn get(
        &self,
        country: &RegionCode,
        content_type: Option<ContentType>,
    ) -> FirestoreResult<Option<CachedRegionDocument>> {
        let doc_id = CachedRegionDocument::document_id(country, content_type);
        match self.client.get_document(&self.collection, &doc_id).await? {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    async fn load_region(
        &self,
        country: &RegionCode,
        content_type: Option<ContentType>,
    ) -> FirestoreResult<Vec<CachedRegionDocument>> {
        if content_type.is_some() {
            return Ok(self.get(country, content_type).await?.into_iter().collect());
        }

        let query = StructuredQuery::collection(&self.collection)
            .where_eq("country", Value::StringValue(country.to_string()))
            .limit(REGION_QUERY_LIMIT);
        let docs = self.client.run_query(query).await?;
        debug!(country = %country, found = docs.len(), "Loaded region documents");

        Self::decode_sorted(docs)
    }

    async fn ping(&self) -> FirestoreResult<()> {
        self.client
            .list_documents(&self.collection, Some(1), None)
            .await
            .map(|_| ())
    }
}

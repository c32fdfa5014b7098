use store_logging::store_debug;

use crate::rest::TableStore;
use crate::{NewViewRecord, StoreError, StoreErrorKind};

/// Display label used when a record is created before its page has a title.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Conflicting writers force a re-read; give up after this many rounds.
const MAX_ATTEMPTS: usize = 3;

/// Records exactly one view for `slug`, creating the record lazily with a
/// count of 1 if it does not exist yet. Returns the count after this view.
///
/// The naive read-then-write increment loses updates when two sessions read
/// the same value concurrently. Here the write is a compare-and-set on the
/// previously read count, retried a bounded number of times, so a successful
/// return always means the remote counter advanced by exactly one.
pub async fn record_view(
    store: &dyn TableStore,
    slug: &str,
    title: Option<&str>,
) -> Result<u64, StoreError> {
    for _ in 0..MAX_ATTEMPTS {
        match store.fetch_view_record(slug).await? {
            None => {
                let record = NewViewRecord {
                    slug: slug.to_string(),
                    title: title.unwrap_or(DEFAULT_TITLE).to_string(),
                    view_count: 1,
                };
                match store.insert_view_record(&record).await {
                    Ok(()) => return Ok(1),
                    // Another session created the record first; re-read and
                    // increment it instead.
                    Err(err) if err.kind == StoreErrorKind::Conflict => {
                        store_debug!("view record for {slug} appeared concurrently; retrying");
                        continue;
                    }
                    Err(err) => return Err(err),
                }
            }
            Some(existing) => {
                let next = existing.view_count + 1;
                if store
                    .compare_and_set_count(slug, existing.view_count, next)
                    .await?
                {
                    return Ok(next);
                }
                store_debug!("view count for {slug} moved underneath us; retrying");
            }
        }
    }
    Err(StoreError::new(
        StoreErrorKind::Conflict,
        format!("gave up recording view for {slug} after {MAX_ATTEMPTS} attempts"),
    ))
}

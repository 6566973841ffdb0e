use async_trait::async_trait;
use fl_types::{Address, PostId, PostRecord};

use crate::error::LedgerResult;
use crate::projection;

/// What a mutator decided to do with the record it was handed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordMutation {
    /// Replace the record with this value and commit a new snapshot.
    Replace(PostRecord),
    /// Leave the ledger as it is; nothing is written.
    Unchanged,
}

/// Result of [`LedgerWriter::mutate_record`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationOutcome {
    /// A new snapshot was committed.
    Committed {
        address: Address,
        before: PostRecord,
        after: PostRecord,
        /// Number of records in the committed snapshot.
        ledger_len: usize,
    },
    /// The mutator declined; the pointer did not move.
    Unchanged { record: PostRecord },
}

/// A record mutator.
///
/// May be invoked more than once per call when a concurrent writer forces a
/// retry, so it must depend only on the record it is given.
pub type Mutator<'a> = &'a (dyn Fn(&PostRecord) -> RecordMutation + Send + Sync);

/// Write boundary for ledger mutations.
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    /// Append `record` to the end of the ledger and return the new snapshot
    /// address.
    async fn append_record(&self, record: PostRecord) -> LedgerResult<Address>;

    /// Locate the record with `post_id`, run `mutator` on it, and commit the
    /// result in place.
    async fn mutate_record(
        &self,
        post_id: &PostId,
        mutator: Mutator<'_>,
    ) -> LedgerResult<MutationOutcome>;
}

/// Read boundary for ledger queries. Every query is a linear scan.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Address of the current snapshot.
    async fn current_address(&self) -> LedgerResult<Address>;

    /// All records in upload order. Empty before the first commit.
    async fn get_all(&self) -> LedgerResult<Vec<PostRecord>>;

    async fn get_by_author(&self, author: &str) -> LedgerResult<Vec<PostRecord>> {
        Ok(projection::by_author(self.get_all().await?, author))
    }

    async fn get_by_id_and_image(
        &self,
        author: &str,
        image_ref: &str,
    ) -> LedgerResult<Vec<PostRecord>> {
        Ok(projection::by_author_and_image(
            self.get_all().await?,
            author,
            image_ref,
        ))
    }

    async fn get_by_id(&self, post_id: &PostId) -> LedgerResult<Option<PostRecord>> {
        Ok(projection::by_id(self.get_all().await?, post_id))
    }
}

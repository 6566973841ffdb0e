use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use fl_pointer::{Pointer, PointerStore};
use fl_store::ContentStore;
use fl_types::{Address, PostId, PostRecord};
use tracing::{debug, info, warn};

use crate::config::{CommitPolicy, LedgerConfig};
use crate::error::{LedgerError, LedgerResult};
use crate::snapshot;
use crate::traits::{LedgerReader, LedgerWriter, MutationOutcome, Mutator, RecordMutation};

/// What one planning pass decided, given the snapshot it was handed.
enum Step<W, S> {
    /// Commit these records as the next snapshot.
    Write(Vec<PostRecord>, W),
    /// Nothing to write.
    Skip(S),
}

enum Commit<W, S> {
    Written {
        address: Address,
        ledger_len: usize,
        value: W,
    },
    Skipped(S),
}

/// Ledger over an immutable content store plus a single mutable pointer.
///
/// Every write loads the snapshot the pointer names, rebuilds the whole
/// record list, stores it as a new blob and then advances the pointer.
/// Under [`CommitPolicy::CompareAndSwap`] a pointer that moved in between is
/// detected and the write is replanned against the newer snapshot.
pub struct SnapshotLedger {
    store: Arc<dyn ContentStore>,
    pointer: Arc<dyn PointerStore>,
    config: LedgerConfig,
}

impl SnapshotLedger {
    pub fn new(
        store: Arc<dyn ContentStore>,
        pointer: Arc<dyn PointerStore>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            store,
            pointer,
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The content store snapshots are written to.
    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    async fn load(&self) -> LedgerResult<(Option<Address>, Vec<PostRecord>)> {
        let Some(pointer) = self.pointer.read()? else {
            return Ok((None, Vec::new()));
        };
        let data = self.store.get(pointer.address()).await?;
        let records = snapshot::decode(pointer.address(), &data)?;
        Ok((Some(pointer.address), records))
    }

    async fn commit<W, S, F>(&self, op: &'static str, plan: F) -> LedgerResult<Commit<W, S>>
    where
        F: Fn(Vec<PostRecord>) -> LedgerResult<Step<W, S>> + Send + Sync,
        W: Send,
        S: Send,
    {
        let attempts = match self.config.commit_policy {
            CommitPolicy::CompareAndSwap => self.config.max_commit_attempts.max(1),
            CommitPolicy::Unguarded => 1,
        };

        for attempt in 1..=attempts {
            let (base, records) = self.load().await?;
            let (records, value) = match plan(records)? {
                Step::Write(records, value) => (records, value),
                Step::Skip(skipped) => return Ok(Commit::Skipped(skipped)),
            };

            let ledger_len = records.len();
            let address = self.store.put(snapshot::encode(&records)?).await?;
            let next = Pointer::new(address.clone());

            let advanced = match self.config.commit_policy {
                CommitPolicy::Unguarded => {
                    self.pointer.write(&next)?;
                    true
                }
                CommitPolicy::CompareAndSwap => {
                    self.pointer.compare_and_swap(base.as_ref(), &next)?
                }
            };

            if advanced {
                debug!(op, attempt, address = %address, ledger_len, "snapshot committed");
                return Ok(Commit::Written {
                    address,
                    ledger_len,
                    value,
                });
            }
            warn!(op, attempt, "pointer moved during commit; replanning");
        }

        Err(LedgerError::CommitConflict { attempts })
    }
}

#[async_trait]
impl LedgerWriter for SnapshotLedger {
    async fn append_record(&self, record: PostRecord) -> LedgerResult<Address> {
        let plan = |mut records: Vec<PostRecord>| -> LedgerResult<Step<(), Infallible>> {
            if records.iter().any(|r| r.id == record.id) {
                return Err(LedgerError::DuplicateId(record.id.clone()));
            }
            records.push(record.clone());
            Ok(Step::Write(records, ()))
        };

        match self.commit("append", plan).await? {
            Commit::Written {
                address,
                ledger_len,
                ..
            } => {
                info!(post = %record.id, address = %address, ledger_len, "post appended");
                Ok(address)
            }
            Commit::Skipped(never) => match never {},
        }
    }

    async fn mutate_record(
        &self,
        post_id: &PostId,
        mutator: Mutator<'_>,
    ) -> LedgerResult<MutationOutcome> {
        let plan = |mut records: Vec<PostRecord>| -> LedgerResult<
            Step<(PostRecord, PostRecord), PostRecord>,
        > {
            let index = records
                .iter()
                .position(|r| &r.id == post_id)
                .ok_or_else(|| LedgerError::PostNotFound(post_id.clone()))?;
            let before = records[index].clone();
            match mutator(&before) {
                RecordMutation::Unchanged => Ok(Step::Skip(before)),
                RecordMutation::Replace(after) => {
                    if after.id != before.id {
                        return Err(LedgerError::IdChanged(post_id.clone()));
                    }
                    records[index] = after.clone();
                    Ok(Step::Write(records, (before, after)))
                }
            }
        };

        Ok(match self.commit("mutate", plan).await? {
            Commit::Written {
                address,
                ledger_len,
                value: (before, after),
            } => MutationOutcome::Committed {
                address,
                before,
                after,
                ledger_len,
            },
            Commit::Skipped(record) => MutationOutcome::Unchanged { record },
        })
    }
}

#[async_trait]
impl LedgerReader for SnapshotLedger {
    async fn current_address(&self) -> LedgerResult<Address> {
        self.pointer
            .read()?
            .map(|p| p.address)
            .ok_or(LedgerError::Empty)
    }

    async fn get_all(&self) -> LedgerResult<Vec<PostRecord>> {
        Ok(self.load().await?.1)
    }
}

impl fmt::Debug for SnapshotLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotLedger")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use bytes::Bytes;
    use fl_pointer::{FilePointerStore, InMemoryPointerStore, PointerError};
    use fl_store::{InMemoryContentStore, StoreResult};
    use fl_types::{MediaType, PublicKey};

    fn post(id: &str, author: &str) -> PostRecord {
        PostRecord::new(
            PostId::new(id).unwrap(),
            PublicKey::new(author).unwrap(),
            format!("post {id}"),
            MediaType::Text,
            None,
        )
    }

    fn ledger_with(
        config: LedgerConfig,
    ) -> (SnapshotLedger, Arc<InMemoryContentStore>, Arc<InMemoryPointerStore>) {
        let store = Arc::new(InMemoryContentStore::new());
        let pointer = Arc::new(InMemoryPointerStore::new());
        let ledger = SnapshotLedger::new(store.clone(), pointer.clone(), config);
        (ledger, store, pointer)
    }

    fn ids(records: &[PostRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    fn bump(record: &PostRecord) -> RecordMutation {
        let mut next = record.clone();
        next.like_count += 1;
        RecordMutation::Replace(next)
    }

    #[tokio::test]
    async fn empty_ledger_reads_as_empty() {
        let (ledger, _, _) = ledger_with(LedgerConfig::default());
        assert!(ledger.get_all().await.unwrap().is_empty());
        assert!(matches!(
            ledger.current_address().await,
            Err(LedgerError::Empty)
        ));
    }

    #[tokio::test]
    async fn appends_keep_upload_order_and_move_pointer() {
        let (ledger, _, pointer) = ledger_with(LedgerConfig::default());

        let a1 = ledger.append_record(post("p1", "A1")).await.unwrap();
        let a2 = ledger.append_record(post("p2", "A2")).await.unwrap();

        assert_ne!(a1, a2);
        assert_eq!(pointer.read().unwrap().unwrap().address, a2);
        assert_eq!(ledger.current_address().await.unwrap(), a2);
        assert_eq!(ids(&ledger.get_all().await.unwrap()), ["p1", "p2"]);
    }

    #[tokio::test]
    async fn old_snapshots_stay_readable() {
        let (ledger, store, _) = ledger_with(LedgerConfig::default());
        let first = ledger.append_record(post("p1", "A1")).await.unwrap();
        ledger.append_record(post("p2", "A1")).await.unwrap();

        let data = store.get(&first).await.unwrap();
        assert_eq!(ids(&snapshot::decode(&first, &data).unwrap()), ["p1"]);
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let (ledger, _, _) = ledger_with(LedgerConfig::default());
        let head = ledger.append_record(post("p1", "A1")).await.unwrap();

        let err = ledger.append_record(post("p1", "A2")).await.unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateId(_)));
        assert_eq!(ledger.current_address().await.unwrap(), head);
    }

    #[tokio::test]
    async fn corrupt_snapshot_leaves_pointer_alone() {
        let (ledger, store, pointer) = ledger_with(LedgerConfig::default());
        let garbage = store.put_blocking(Bytes::from_static(b"not json"));
        pointer.write(&Pointer::new(garbage.clone())).unwrap();

        let err = ledger.append_record(post("p1", "A1")).await.unwrap_err();
        assert!(matches!(err, LedgerError::CorruptSnapshot { .. }));
        assert!(matches!(
            ledger.get_all().await,
            Err(LedgerError::CorruptSnapshot { .. })
        ));
        assert_eq!(pointer.read().unwrap().unwrap().address, garbage);
    }

    #[tokio::test]
    async fn dangling_pointer_surfaces_store_error() {
        let (ledger, _, pointer) = ledger_with(LedgerConfig::default());
        pointer
            .write(&Pointer::new(Address::new("missing").unwrap()))
            .unwrap();
        assert!(matches!(
            ledger.get_all().await,
            Err(LedgerError::Store(fl_store::StoreError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn mutate_replaces_in_place() {
        let (ledger, _, _) = ledger_with(LedgerConfig::default());
        for id in ["p1", "p2", "p3"] {
            ledger.append_record(post(id, "A1")).await.unwrap();
        }

        let target = PostId::new("p2").unwrap();
        let outcome = ledger.mutate_record(&target, &bump).await.unwrap();
        let MutationOutcome::Committed {
            address,
            before,
            after,
            ledger_len,
        } = outcome
        else {
            panic!("expected a commit");
        };
        assert_eq!(before.like_count, 0);
        assert_eq!(after.like_count, 1);
        assert_eq!(ledger_len, 3);
        assert_eq!(ledger.current_address().await.unwrap(), address);

        let records = ledger.get_all().await.unwrap();
        assert_eq!(ids(&records), ["p1", "p2", "p3"]);
        assert_eq!(records[1].like_count, 1);
        assert_eq!(records[0].like_count, 0);
    }

    #[tokio::test]
    async fn mutate_unknown_post_writes_nothing() {
        let (ledger, store, _) = ledger_with(LedgerConfig::default());
        let head = ledger.append_record(post("p1", "A1")).await.unwrap();
        let blobs = store.len();

        let err = ledger
            .mutate_record(&PostId::new("nope").unwrap(), &bump)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::PostNotFound(_)));
        assert_eq!(ledger.current_address().await.unwrap(), head);
        assert_eq!(store.len(), blobs);
    }

    #[tokio::test]
    async fn declined_mutation_does_not_move_pointer() {
        let (ledger, _, _) = ledger_with(LedgerConfig::default());
        let head = ledger.append_record(post("p1", "A1")).await.unwrap();

        let outcome = ledger
            .mutate_record(&PostId::new("p1").unwrap(), &|_| RecordMutation::Unchanged)
            .await
            .unwrap();
        assert!(matches!(outcome, MutationOutcome::Unchanged { .. }));
        assert_eq!(ledger.current_address().await.unwrap(), head);
    }

    #[tokio::test]
    async fn mutation_may_not_change_id() {
        let (ledger, _, _) = ledger_with(LedgerConfig::default());
        ledger.append_record(post("p1", "A1")).await.unwrap();

        let rename = |r: &PostRecord| {
            let mut next = r.clone();
            next.id = PostId::new("other").unwrap();
            RecordMutation::Replace(next)
        };
        let err = ledger
            .mutate_record(&PostId::new("p1").unwrap(), &rename)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::IdChanged(_)));
    }

    #[tokio::test]
    async fn queries_filter_by_author_and_image() {
        let (ledger, _, _) = ledger_with(LedgerConfig::default());
        ledger.append_record(post("p1", "A1")).await.unwrap();
        ledger.append_record(post("p2", "A2")).await.unwrap();
        let mut with_image = post("p3", "A1");
        with_image.image_ref = Some("https://gw/ipfs/img".into());
        with_image.media_type = MediaType::Image;
        ledger.append_record(with_image).await.unwrap();

        assert_eq!(ids(&ledger.get_by_author("A1").await.unwrap()), ["p1", "p3"]);
        assert!(ledger.get_by_author("nobody").await.unwrap().is_empty());
        assert_eq!(
            ids(&ledger
                .get_by_id_and_image("A1", "https://gw/ipfs/img")
                .await
                .unwrap()),
            ["p3"]
        );
        assert!(ledger
            .get_by_id(&PostId::new("p2").unwrap())
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_all_survive() {
        let (ledger, _, _) = ledger_with(LedgerConfig::default());
        let ledger = Arc::new(ledger);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let ledger = ledger.clone();
                tokio::spawn(async move { ledger.append_record(post(&format!("c{i}"), "A1")).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(ledger.get_all().await.unwrap().len(), 16);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_likes_all_count() {
        let (ledger, _, _) = ledger_with(LedgerConfig::default());
        ledger.append_record(post("p1", "A1")).await.unwrap();
        let ledger = Arc::new(ledger);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    ledger
                        .mutate_record(&PostId::new("p1").unwrap(), &bump)
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let record = ledger
            .get_by_id(&PostId::new("p1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.like_count, 16);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_commits_over_pointer_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mainCID.json");
        let store = Arc::new(InMemoryContentStore::new());
        let ledger = Arc::new(SnapshotLedger::new(
            store.clone(),
            Arc::new(FilePointerStore::new(&path)),
            LedgerConfig::default(),
        ));
        ledger.append_record(post("p1", "A1")).await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    if i % 2 == 0 {
                        ledger
                            .append_record(post(&format!("f{i}"), "A2"))
                            .await
                            .map(|_| ())
                    } else {
                        ledger
                            .mutate_record(&PostId::new("p1").unwrap(), &bump)
                            .await
                            .map(|_| ())
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let reopened = SnapshotLedger::new(
            store,
            Arc::new(FilePointerStore::new(&path)),
            LedgerConfig::default(),
        );
        let records = reopened.get_all().await.unwrap();
        assert_eq!(records.len(), 9);
        assert_eq!(records[0].like_count, 8);
    }

    /// Content store that lets a second writer slip in a commit right after
    /// the first snapshot read, once armed.
    struct InterleavingStore {
        inner: InMemoryContentStore,
        pointer: Arc<InMemoryPointerStore>,
        armed: AtomicBool,
    }

    #[async_trait]
    impl ContentStore for InterleavingStore {
        async fn put(&self, data: Bytes) -> StoreResult<Address> {
            self.inner.put(data).await
        }

        async fn get(&self, address: &Address) -> StoreResult<Bytes> {
            let data = self.inner.get(address).await?;
            if self.armed.swap(false, Ordering::SeqCst) {
                let mut records = snapshot::decode(address, &data).unwrap();
                records.push(post("rogue", "R1"));
                let rogue = self.inner.put_blocking(snapshot::encode(&records).unwrap());
                self.pointer.write(&Pointer::new(rogue)).unwrap();
            }
            Ok(data)
        }
    }

    async fn race_one_append(config: LedgerConfig) -> Vec<PostRecord> {
        let pointer = Arc::new(InMemoryPointerStore::new());
        let store = Arc::new(InterleavingStore {
            inner: InMemoryContentStore::new(),
            pointer: pointer.clone(),
            armed: AtomicBool::new(false),
        });
        let ledger = SnapshotLedger::new(store.clone(), pointer, config);

        ledger.append_record(post("seed", "A1")).await.unwrap();
        store.armed.store(true, Ordering::SeqCst);
        ledger.append_record(post("mine", "A1")).await.unwrap();
        ledger.get_all().await.unwrap()
    }

    #[tokio::test]
    async fn compare_and_swap_keeps_interleaved_write() {
        let records = race_one_append(LedgerConfig::default()).await;
        assert_eq!(ids(&records), ["seed", "rogue", "mine"]);
    }

    #[tokio::test]
    async fn unguarded_commit_loses_interleaved_write() {
        let records = race_one_append(LedgerConfig::unguarded()).await;
        assert_eq!(ids(&records), ["seed", "mine"]);
    }

    /// Pointer store whose value never matches what the caller saw.
    struct AlwaysMoved;

    impl PointerStore for AlwaysMoved {
        fn read(&self) -> fl_pointer::Result<Option<Pointer>> {
            Ok(None)
        }

        fn write(&self, _pointer: &Pointer) -> fl_pointer::Result<()> {
            Err(PointerError::LockPoisoned)
        }

        fn compare_and_swap(
            &self,
            _expected: Option<&Address>,
            _new: &Pointer,
        ) -> fl_pointer::Result<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn gives_up_after_bounded_attempts() {
        let ledger = SnapshotLedger::new(
            Arc::new(InMemoryContentStore::new()),
            Arc::new(AlwaysMoved),
            LedgerConfig {
                max_commit_attempts: 3,
                ..Default::default()
            },
        );
        let err = ledger.append_record(post("p1", "A1")).await.unwrap_err();
        assert!(matches!(err, LedgerError::CommitConflict { attempts: 3 }));
    }
}

/// Deleting the selected table rows.
use thiserror::Error;

use super::table::TableViewState;
use crate::types::{TrackItemBatch, TrackItemId};

/// Storage that can remove track items. A batch is removed entirely or not at all.
pub trait DeletionStore {
    fn delete_by_ids(&self, ids: &[TrackItemId]) -> anyhow::Result<()>;
}

#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("No track items selected, nothing deleted")]
    EmptySelection,
    #[error("Failed to delete {count} track items: {source}")]
    Store {
        count: usize,
        #[source]
        source: anyhow::Error,
    },
}

/// State after a completed deletion.
#[derive(Debug)]
pub struct Deleted {
    pub ids: Vec<TrackItemId>,
    pub state: TableViewState,
    pub batch: TrackItemBatch,
}

/// Deletes the selected ids through `store`.
///
/// On success the selection is cleared and the ids are dropped from `batch`.
/// On failure nothing is returned, so the caller keeps its state and selection.
pub fn delete_selected<S>(
    store: &S,
    state: &TableViewState,
    batch: &TrackItemBatch,
) -> Result<Deleted, DeleteError>
where
    S: DeletionStore + ?Sized,
{
    let ids = state.selected_ids.clone();
    log::debug!("Delete track items {ids:?}");
    if ids.is_empty() {
        log::error!("No ids, not deleting from DB");
        return Err(DeleteError::EmptySelection);
    }

    if let Err(source) = store.delete_by_ids(&ids) {
        log::error!("Deleting track items {ids:?} failed: {source:#}");
        return Err(DeleteError::Store {
            count: ids.len(),
            source,
        });
    }
    log::debug!("Deleted track items {ids:?}");

    let mut batch = batch.clone();
    batch.remove_ids(&ids);
    let state = state.clone().with_selection(Vec::new());
    Ok(Deleted { ids, state, batch })
}

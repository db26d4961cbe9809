use uuid::Uuid;

use super::Filter;
use crate::db::Store;
use crate::error::AppResult;
use crate::models::efir::{EfirReport, EfirStatus};

/// E-FIR reports, optionally limited to one tourist's alerts.
pub async fn list_reports(
    store: &dyn Store,
    user_id: Option<Uuid>,
    status: Filter<EfirStatus>,
) -> AppResult<Vec<EfirReport>> {
    let reports = store.list_efir(user_id).await?;
    Ok(reports.into_iter().filter(|r| status.matches(&r.status)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SosSettings;
    use crate::db::memory::MemoryStore;
    use crate::sos::dispatch::{dispatch, SosRequest};
    use crate::sos::location::ReportedPosition;
    use chrono::Utc;

    #[tokio::test]
    async fn reports_filter_by_owner_and_status() {
        let store = MemoryStore::new();
        let sarah = Uuid::new_v4();
        let mike = Uuid::new_v4();
        for user in [sarah, sarah, mike] {
            dispatch(
                &store,
                &SosSettings::default(),
                SosRequest::manual(user),
                &ReportedPosition::new(None, false),
                Utc::now(),
            )
            .await
            .unwrap();
        }

        let all = list_reports(&store, None, Filter::All).await.unwrap();
        assert_eq!(all.len(), 3);

        let mine = list_reports(&store, Some(sarah), Filter::Only(EfirStatus::Filed))
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);

        let closed = list_reports(&store, None, Filter::Only(EfirStatus::Closed))
            .await
            .unwrap();
        assert!(closed.is_empty());
    }
}

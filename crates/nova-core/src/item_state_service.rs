//! Item resolution with overlay and messaging
//!
//! Wraps [`ItemInfoService`](crate::services::ItemInfoService) for the router:
//! rejects malformed ids before any request, keeps the loading overlay up for
//! exactly the duration of the lookup, and tells the user when an item does
//! not exist.

use crate::error::NovaError;
use crate::loading::LoadingScope;
use crate::messages::MessageKey;
use crate::services::Services;
use nova_artifact::ItemInfoResult;

/// Parse a route id
///
/// # Errors
/// Returns `NovaError::InvalidId` unless `raw` is an integer
pub fn parse_item_id(raw: &str) -> Result<i32, NovaError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| NovaError::InvalidId(raw.to_string()))
}

#[derive(Debug, Clone)]
pub struct ItemStateService {
    services: Services,
}

impl ItemStateService {
    #[inline]
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    /// Resolve the route id to an item descriptor
    ///
    /// # Errors
    /// - `NovaError::InvalidId` without any request when `raw_id` is malformed
    /// - the lookup error otherwise; a Not-Found is also posted to the
    ///   message service first
    pub async fn get_item_info_result(&self, raw_id: &str) -> Result<ItemInfoResult, NovaError> {
        let id = parse_item_id(raw_id)?;

        let _overlay = LoadingScope::begin(self.services.loading.clone());
        tracing::debug!(id, "resolving item info");

        match self.services.item_info.get(id).await {
            Ok(info) => {
                tracing::debug!(id, kind = ?info.kind(), "item resolved");
                Ok(info)
            }
            Err(err) => {
                if err.is_not_found() {
                    self.services.add_error(MessageKey::HttpErrorNotFound);
                }
                tracing::warn!(id, error = %err, "item lookup failed");
                Err(err)
            }
        }
    }
}

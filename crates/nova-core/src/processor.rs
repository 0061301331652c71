//! Live process state to wire payload

use nova_artifact::ProcessModel;
use std::collections::HashSet;

/// Normalizes a process graph before it is sent to the server.
///
/// Shapes keep their order. Links and decision-branch links that reference
/// a shape no longer in the graph are dropped, and links are sorted by
/// source then order index so saves are stable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessModelProcessor;

impl ProcessModelProcessor {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn process(&self, mut model: ProcessModel) -> ProcessModel {
        let ids: HashSet<i32> = model.shapes.iter().map(|s| s.id).collect();

        let before = model.links.len();
        model
            .links
            .retain(|l| ids.contains(&l.source_id) && ids.contains(&l.destination_id));
        if model.links.len() != before {
            tracing::warn!(
                id = model.id,
                dropped = before - model.links.len(),
                "dropping links to missing shapes"
            );
        }
        model.links.sort_by(|a, b| {
            a.source_id
                .cmp(&b.source_id)
                .then(a.orderindex.total_cmp(&b.orderindex))
        });

        model.decision_branch_destination_links.retain_mut(|d| {
            d.source_ids.retain(|s| ids.contains(s));
            ids.contains(&d.destination_id) && !d.source_ids.is_empty()
        });

        model
    }
}

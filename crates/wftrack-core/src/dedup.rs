use std::collections::HashMap;

use crate::workflows::RawWorkflowData;

/// Collapse items that share a source URL, keeping the variant with the
/// highest headline metric (views, or search volume for trend rows).
///
/// Ties keep the earliest item. Items without a URL are passed through.
/// Output order follows the first appearance of each URL.
#[must_use]
pub fn dedup_by_source_url(items: Vec<RawWorkflowData>) -> Vec<RawWorkflowData> {
    let mut out: Vec<RawWorkflowData> = Vec::with_capacity(items.len());
    let mut index_by_url: HashMap<String, usize> = HashMap::new();

    for item in items {
        let Some(url) = item
            .source_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(ToOwned::to_owned)
        else {
            out.push(item);
            continue;
        };

        match index_by_url.get(&url) {
            Some(&idx) => {
                if headline_metric(&item) > headline_metric(&out[idx]) {
                    out[idx] = item;
                }
            }
            None => {
                index_by_url.insert(url, out.len());
                out.push(item);
            }
        }
    }

    out
}

fn headline_metric(item: &RawWorkflowData) -> i64 {
    item.views.or(item.search_volume).unwrap_or(0)
}

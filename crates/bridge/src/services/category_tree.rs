//! Category tree assembly and flat-list pagination.

use std::collections::{HashMap, HashSet};

use commerce_bridge_core::{CategoryId, CategoryNode, CategoryRecord, CategorySummary, PageResult};

/// Drop repeated ids, keeping the first occurrence.
pub fn dedup_by_id(records: impl IntoIterator<Item = CategoryRecord>) -> Vec<CategoryRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.id))
        .collect()
}

/// Build the nested tree below `parent_id`.
///
/// Siblings are ordered by ascending `sort_order`; ties keep upstream order.
/// Records whose parent is not reachable from `parent_id` are not included.
#[must_use]
pub fn build_tree(records: &[CategoryRecord], parent_id: CategoryId) -> Vec<CategoryNode> {
    let mut by_parent: HashMap<CategoryId, Vec<&CategoryRecord>> = HashMap::new();
    for record in records {
        by_parent.entry(record.parent_id).or_default().push(record);
    }
    for siblings in by_parent.values_mut() {
        siblings.sort_by_key(|record| record.sort_order);
    }

    let mut placed = HashSet::new();
    assemble(&by_parent, parent_id, &mut placed)
}

fn assemble(
    by_parent: &HashMap<CategoryId, Vec<&CategoryRecord>>,
    parent_id: CategoryId,
    placed: &mut HashSet<CategoryId>,
) -> Vec<CategoryNode> {
    let Some(siblings) = by_parent.get(&parent_id) else {
        return Vec::new();
    };

    let mut nodes = Vec::with_capacity(siblings.len());
    for record in siblings {
        // Each category is placed at most once
        if !placed.insert(record.id) {
            continue;
        }
        nodes.push(CategoryNode {
            id: record.id,
            label: record.label.clone(),
            children: assemble(by_parent, record.id, placed),
        });
    }
    nodes
}

/// Flatten a tree in pre-order (parent, then its subtree, then the next sibling).
#[must_use]
pub fn flatten(tree: &[CategoryNode]) -> Vec<CategorySummary> {
    fn walk(nodes: &[CategoryNode], out: &mut Vec<CategorySummary>) {
        for node in nodes {
            out.push(CategorySummary::from(node));
            walk(&node.children, out);
        }
    }

    let mut out = Vec::new();
    walk(tree, &mut out);
    out
}

/// Keep entries whose label contains `keyword`, ignoring case.
#[must_use]
pub fn filter_by_keyword(list: Vec<CategorySummary>, keyword: &str) -> Vec<CategorySummary> {
    let needle = keyword.to_lowercase();
    list.into_iter()
        .filter(|entry| entry.label.to_lowercase().contains(&needle))
        .collect()
}

/// Slice page `page` (1-based) of `limit` entries out of `list`.
///
/// `total` is the size of the whole list. Page `0` yields no items and never
/// reports a next page.
#[must_use]
pub fn paginate<T>(list: Vec<T>, page: u32, limit: usize) -> PageResult<T> {
    let total = list.len();
    if page == 0 {
        return PageResult {
            items: Vec::new(),
            total,
            has_next: false,
        };
    }

    let page = usize::try_from(page).unwrap_or(usize::MAX);
    let start = (page - 1).saturating_mul(limit);
    let items = list.into_iter().skip(start).take(limit).collect();

    PageResult {
        items,
        total,
        has_next: total > page.saturating_mul(limit),
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub has_more: bool,
}

/// Slices out the 1-based `page` of `items`. Pages past the end (and page 0)
/// come back empty with `has_more` unset; `total` always counts every item.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Paginated<T> {
    let total = items.len();

    let bounds = page
        .checked_sub(1)
        .and_then(|p| p.checked_mul(page_size))
        .zip(page.checked_mul(page_size))
        .filter(|(start, _)| page_size > 0 && *start < total);

    let (items, has_more) = match bounds {
        Some((start, end)) => {
            let end = end.min(total);
            let items = items.into_iter().skip(start).take(end - start).collect();
            (items, end < total)
        }
        None => (Vec::new(), false),
    };

    Paginated {
        items,
        total,
        page,
        page_size,
        has_more,
    }
}

use serde::{Deserialize, Serialize};

/// Hard cap on page size so a single request cannot drag the whole table.
pub const MAX_PAGE_SIZE: i64 = 100;
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Client-supplied paging parameters. Both fields are optional on the wire.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    pub page: Option<i64>,
    #[serde(alias = "pageSize", alias = "page_size")]
    pub page_size: Option<i64>,
}

impl PageRequest {
    /// Normalized (page, page_size), 1-based page, clamped size.
    pub fn normalize(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let size = self
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        (page, size)
    }

    /// SQL LIMIT/OFFSET for the normalized request.
    pub fn limit_offset(&self) -> (i64, i64) {
        let (page, size) = self.normalize();
        (size, (page - 1) * size)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: i64,
    pub page_size: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

impl PageInfo {
    pub fn new(request: &PageRequest, total_count: i64) -> Self {
        let (page, page_size) = request.normalize();
        Self {
            page,
            page_size,
            total_count,
            total_pages: (total_count + page_size - 1) / page_size,
        }
    }
}

/// Paged projection: `{data, pagination:{page, pageSize, totalCount, totalPages}}`.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, request: &PageRequest, total_count: i64) -> Self {
        Self {
            data,
            pagination: PageInfo::new(request, total_count),
        }
    }
}

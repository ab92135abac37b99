//! Pagination parameters for list endpoints

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::error::{api_success_with_meta, ApiResponse, PaginationInfo, ResponseMetadata};

#[derive(Debug, Deserialize, IntoParams, ToSchema, Clone, Default)]
pub struct PaginationParams {
    #[param(example = 1, minimum = 1)]
    pub page: Option<u32>,

    #[param(example = 20, minimum = 1, maximum = 100)]
    pub page_size: Option<u32>,
}

impl PaginationParams {
    /// Page number (defaults to 1, minimum 1)
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size (defaults to 20, clamped between 1 and 100)
    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(20).clamp(1, 100)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.page_size())
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size())
    }

    pub fn total_pages(&self, total_count: u64) -> u32 {
        if total_count == 0 {
            return 1;
        }
        let pages = total_count.div_ceil(u64::from(self.page_size()));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn to_metadata(&self, total_count: u64) -> ResponseMetadata {
        let total_pages = self.total_pages(total_count);

        ResponseMetadata {
            pagination: Some(PaginationInfo {
                page: i32::try_from(self.page()).unwrap_or(i32::MAX),
                page_size: i32::try_from(self.page_size()).unwrap_or(i32::MAX),
                total_pages: i32::try_from(total_pages).unwrap_or(i32::MAX),
                has_next: self.page() < total_pages,
                has_previous: self.page() > 1,
            }),
            total_count: Some(i64::try_from(total_count).unwrap_or(i64::MAX)),
        }
    }

    /// Wrap data with pagination metadata
    pub fn wrap_response<T>(&self, data: T, total_count: u64) -> ApiResponse<T> {
        api_success_with_meta(data, self.to_metadata(total_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: u32, page_size: u32) -> PaginationParams {
        PaginationParams {
            page: Some(page),
            page_size: Some(page_size),
        }
    }

    #[test]
    fn test_pagination_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 20);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_pagination_offset() {
        assert_eq!(params(3, 10).offset(), 20);
    }

    #[test]
    fn test_total_pages() {
        let p = params(1, 20);
        assert_eq!(p.total_pages(100), 5);
        assert_eq!(p.total_pages(101), 6);
        assert_eq!(p.total_pages(0), 1);
    }

    #[test]
    fn test_to_metadata() {
        let metadata = params(2, 20).to_metadata(100);
        let pagination = metadata.pagination.unwrap();
        assert_eq!(pagination.total_pages, 5);
        assert!(pagination.has_next);
        assert!(pagination.has_previous);
        assert_eq!(metadata.total_count, Some(100));
    }

    #[test]
    fn test_clamping() {
        assert_eq!(params(0, 20).page(), 1);
        assert_eq!(params(1, 200).page_size(), 100);
        assert_eq!(params(1, 0).page_size(), 1);
    }
}

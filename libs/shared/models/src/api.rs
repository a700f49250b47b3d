use serde::{Deserialize, Serialize};

/// Envelope returned by the scheduling service for mutating operations.
/// The message is the service's human-readable outcome, independent of the
/// HTTP transport status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn into_data(self) -> Option<T> {
        if self.success {
            self.data
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: i32,
    pub limit: i32,
    pub total: i64,
    pub has_next: bool,
    pub has_prev: bool,
    pub total_pages: i32,
}

impl PageMeta {
    /// Meta for a result set that fits on one page.
    pub fn single_page(total: i64, limit: i32) -> Self {
        Self {
            page: 1,
            limit,
            total,
            has_next: false,
            has_prev: false,
            total_pages: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_page_meta_has_no_neighbours() {
        let meta = PageMeta::single_page(3, 50);
        assert_eq!(meta.page, 1);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
        assert_eq!(meta.total_pages, 1);
    }

    #[test]
    fn failed_envelope_yields_no_data() {
        let resp = ApiResponse::<i32> {
            success: false,
            message: "slot already taken".to_string(),
            data: Some(7),
        };
        assert_eq!(resp.into_data(), None);
    }
}

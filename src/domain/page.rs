use crate::config::PaginationConfig;

/// A 1-indexed, offset-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: u32,
    size: u32,
}

impl Page {
    /// Builds a page, forcing `number` and `size` to be at least 1.
    #[must_use]
    pub fn new(number: u32, size: u32) -> Self {
        Self { number: number.max(1), size: size.max(1) }
    }

    /// Builds a page from raw request values.
    ///
    /// A page number below 1 becomes 1. A page size below 1 falls back to the
    /// configured default, and anything above the configured maximum is clamped.
    #[must_use]
    pub fn from_request(number: i32, size: i32, config: &PaginationConfig) -> Self {
        let number = u32::try_from(number).unwrap_or(1);
        let size = match u32::try_from(size) {
            Ok(0) | Err(_) => config.default_page_size,
            Ok(size) => size.min(config.max_page_size),
        };
        Self::new(number, size)
    }

    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Records to skip: `(number - 1) * size`.
    #[must_use]
    pub fn skip(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.size)
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PaginationConfig {
        PaginationConfig { default_page_size: 20, max_page_size: 100 }
    }

    #[test]
    fn test_skip_and_limit() {
        let first = Page::new(1, 2);
        assert_eq!(first.skip(), 0);
        assert_eq!(first.limit(), 2);

        let second = Page::new(2, 2);
        assert_eq!(second.skip(), 2);
        assert_eq!(second.limit(), 2);

        let far = Page::new(u32::MAX, u32::MAX);
        assert_eq!(far.skip(), u64::from(u32::MAX - 1) * u64::from(u32::MAX));
    }

    #[test]
    fn test_new_forces_minimums() {
        let page = Page::new(0, 0);
        assert_eq!(page.number(), 1);
        assert_eq!(page.size(), 1);
    }

    #[test]
    fn test_from_request_defaults() {
        let page = Page::from_request(0, 0, &config());
        assert_eq!(page.number(), 1);
        assert_eq!(page.size(), 20);

        let page = Page::from_request(-3, -1, &config());
        assert_eq!(page.number(), 1);
        assert_eq!(page.size(), 20);
    }

    #[test]
    fn test_from_request_clamps_size() {
        let page = Page::from_request(3, 500, &config());
        assert_eq!(page.number(), 3);
        assert_eq!(page.size(), 100);
        assert_eq!(page.skip(), 200);
    }
}

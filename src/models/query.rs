//! Topic queries and page windows.

/// Topics harvested on every run, in order.
pub const DEFAULT_QUERIES: [&str; 20] = [
    "machine learning",
    "artificial intelligence",
    "data science",
    "history",
    "science fiction",
    "fantasy",
    "romance",
    "mystery",
    "philosophy",
    "psychology",
    "self-help",
    "biography",
    "business",
    "technology",
    "education",
    "health",
    "travel",
    "art",
    "music",
    "literature",
];

/// One paginated request: `start_index` offset and `max_results` page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start_index: u32,
    pub max_results: u32,
}

impl PageWindow {
    /// 1-based inclusive range of result positions this window asks for.
    pub fn span(&self) -> (u32, u32) {
        (self.start_index + 1, self.start_index + self.max_results)
    }
}

/// Windows `0, size, 2*size, ...` strictly below `ceiling`.
///
/// The span is fixed: it does not shrink when a query has fewer results.
/// A zero `size` yields no windows.
pub fn page_windows(ceiling: u32, size: u32) -> impl Iterator<Item = PageWindow> {
    let step = size.max(1) as usize;
    let end = if size == 0 { 0 } else { ceiling };
    (0..end).step_by(step).map(move |start_index| PageWindow {
        start_index,
        max_results: size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_queries() {
        assert_eq!(DEFAULT_QUERIES.len(), 20);
        assert_eq!(DEFAULT_QUERIES[0], "machine learning");
        assert_eq!(DEFAULT_QUERIES[19], "literature");
    }

    #[test]
    fn test_page_windows_default_span() {
        let windows: Vec<_> = page_windows(500, 40).collect();
        assert_eq!(windows.len(), 13);
        assert_eq!(windows[0].start_index, 0);
        assert_eq!(windows[1].start_index, 40);
        assert_eq!(windows[12].start_index, 480);
        assert!(windows.iter().all(|w| w.max_results == 40));
    }

    #[test]
    fn test_page_windows_exact_multiple() {
        let starts: Vec<_> = page_windows(80, 40).map(|w| w.start_index).collect();
        assert_eq!(starts, vec![0, 40]);
    }

    #[test]
    fn test_page_windows_zero_size() {
        assert_eq!(page_windows(500, 0).count(), 0);
    }

    #[test]
    fn test_span() {
        let window = PageWindow {
            start_index: 40,
            max_results: 40,
        };
        assert_eq!(window.span(), (41, 80));
    }
}

use crate::film::FilmSummary;

/// Films shown per page of results.
pub const PAGE_SIZE: usize = 3;

/// Fixed-width window over a deduplicated result list.
///
/// Result endpoints can return the same film more than once; the pager
/// keeps the first occurrence of each id and drops the rest. Navigation
/// wraps: `next()` past the last page lands on page 0 and `previous()`
/// from page 0 lands on the last page.
#[derive(Debug, Clone)]
pub struct ResultPager {
    films: Vec<FilmSummary>,
    current_page: usize,
}

impl ResultPager {
    pub fn new(films: Vec<FilmSummary>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let films = films
            .into_iter()
            .filter(|f| seen.insert(f.id.clone()))
            .collect();
        Self {
            films,
            current_page: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.films.len()
    }

    pub fn is_empty(&self) -> bool {
        self.films.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.films.len().div_ceil(PAGE_SIZE)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Whether prev/next controls should be shown at all.
    pub fn has_navigation(&self) -> bool {
        self.films.len() > PAGE_SIZE
    }

    pub fn next(&mut self) {
        let pages = self.page_count();
        if pages > 0 {
            self.current_page = (self.current_page + 1) % pages;
        }
    }

    pub fn previous(&mut self) {
        let pages = self.page_count();
        if pages > 0 {
            self.current_page = if self.current_page == 0 {
                pages - 1
            } else {
                self.current_page - 1
            };
        }
    }

    pub fn visible(&self) -> &[FilmSummary] {
        let start = self.current_page * PAGE_SIZE;
        let end = (start + PAGE_SIZE).min(self.films.len());
        if start >= self.films.len() {
            &[]
        } else {
            &self.films[start..end]
        }
    }

    pub fn all(&self) -> &[FilmSummary] {
        &self.films
    }

    /// Look up a film in the working set by id.
    pub fn get(&self, id: &str) -> Option<&FilmSummary> {
        self.films.iter().find(|f| f.id == id)
    }
}

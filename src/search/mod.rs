mod debounce;

pub use debounce::{DebouncedSearch, SearchBackend, SearchError, MIN_QUERY_LEN, QUIET_PERIOD};

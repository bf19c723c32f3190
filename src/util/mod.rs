mod query;

pub use query::QueryString;

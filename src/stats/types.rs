use serde::Deserialize;

/// Query string for endpoints scoped to one year
#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: i32,
}

/// Query string for endpoints that default to all years
#[derive(Debug, Deserialize)]
pub struct OptionalYearQuery {
    pub year: Option<i32>,
}

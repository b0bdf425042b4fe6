//! Sort specification for list endpoints.

/// Sort direction. Only the literal `desc` (any case) means descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Parsed `field:direction` pair from the `sorting` query parameter.
///
/// Whether `field` names a sortable column is decided by the per-entity
/// allowlist at query time; an unknown field leaves the listing unsorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: Direction,
}

impl SortSpec {
    /// Parse `"email:desc"` / `"id"` style input. Direction defaults to
    /// ascending when omitted or unrecognized.
    pub fn parse(raw: &str) -> Self {
        let (field, direction) = match raw.split_once(':') {
            Some((field, direction)) => (field, direction),
            None => (raw, ""),
        };
        let direction = if direction.eq_ignore_ascii_case("desc") {
            Direction::Desc
        } else {
            Direction::Asc
        };
        Self {
            field: field.to_owned(),
            direction,
        }
    }
}

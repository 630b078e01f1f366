use std::fmt;

use serde::Serialize;

use super::Column;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sort<C: Column> {
    pub column: C,
    pub direction: Direction,
}

impl<C: Column> Sort<C> {
    pub fn asc(column: C) -> Self {
        Sort { column, direction: Direction::Asc }
    }

    pub fn desc(column: C) -> Self {
        Sort { column, direction: Direction::Desc }
    }
}

/// Appends an ascending id sort unless the id is already sorted on, so that
/// rows with equal sort keys keep a stable order across pages.
pub fn with_id_tiebreak<C: Column>(sort: &[Sort<C>]) -> Vec<Sort<C>> {
    let mut order = sort.to_vec();
    if !order.iter().any(|s| s.column == C::ID) {
        order.push(Sort::asc(C::ID));
    }
    order
}

#[derive(Debug)]
pub enum PageableError {
    InvalidNumber { param: &'static str, value: String },
    UnknownSortField(String),
    InvalidSort(String),
}

impl fmt::Display for PageableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageableError::InvalidNumber { param, value } => write!(f, "Invalid {} parameter: {:?}", param, value),
            PageableError::UnknownSortField(field) => write!(f, "Cannot sort by unknown field: {}", field),
            PageableError::InvalidSort(value) => write!(f, "Invalid sort parameter: {:?}", value),
        }
    }
}

/// Zero-based page request with optional ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Pageable<C: Column> {
    pub page: i64,
    pub size: i64,
    pub sort: Vec<Sort<C>>,
}

impl<C: Column> Default for Pageable<C> {
    fn default() -> Self {
        Pageable {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: Vec::new(),
        }
    }
}

impl<C: Column> Pageable<C> {
    pub fn of(page: i64, size: i64) -> Self {
        Pageable { page, size, sort: Vec::new() }
    }

    pub fn sorted(mut self, sort: Sort<C>) -> Self {
        self.sort.push(sort);
        self
    }

    /// Saturates, so a page far past the end just selects nothing.
    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }

    /// Reads `page`, `size` and any number of `sort` parameters. A negative
    /// page falls back to the first page and the size is clamped to
    /// `1..=MAX_PAGE_SIZE`.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, PageableError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut pageable = Pageable::default();
        for (key, value) in pairs {
            match key {
                "page" => pageable.page = parse_number("page", value)?.max(0),
                "size" => pageable.size = parse_number("size", value)?.clamp(1, MAX_PAGE_SIZE),
                "sort" => pageable.sort.extend(parse_sort::<C>(value)?),
                _ => {}
            }
        }
        Ok(pageable)
    }
}

fn parse_number(param: &'static str, value: &str) -> Result<i64, PageableError> {
    value.trim().parse::<i64>().map_err(|_| PageableError::InvalidNumber {
        param,
        value: value.to_string(),
    })
}

/// `name`, `name,desc` or `name,age,asc`: a trailing direction applies to
/// every listed field.
fn parse_sort<C: Column>(value: &str) -> Result<Vec<Sort<C>>, PageableError> {
    let mut parts: Vec<&str> = value.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
    let direction = match parts.last().map(|p| p.to_ascii_lowercase()) {
        Some(last) if last == "asc" => {
            parts.pop();
            Direction::Asc
        }
        Some(last) if last == "desc" => {
            parts.pop();
            Direction::Desc
        }
        _ => Direction::Asc,
    };
    if parts.is_empty() {
        return Err(PageableError::InvalidSort(value.to_string()));
    }
    parts
        .into_iter()
        .map(|field| {
            C::from_field(field)
                .map(|column| Sort { column, direction })
                .ok_or_else(|| PageableError::UnknownSortField(field.to_string()))
        })
        .collect()
}

/// One window of a query result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
    pub number: i64,
    pub size: i64,
}

impl<T> Page<T> {
    pub fn new<C: Column>(content: Vec<T>, total_elements: i64, pageable: &Pageable<C>) -> Self {
        Page {
            content,
            total_elements,
            number: pageable.page,
            size: pageable.size,
        }
    }

    pub fn total_pages(&self) -> i64 {
        if self.size <= 0 {
            return 0;
        }
        (self.total_elements + self.size - 1) / self.size
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages() - 1
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::tests::TestColumn;

    fn parse(pairs: &[(&str, &str)]) -> Result<Pageable<TestColumn>, PageableError> {
        Pageable::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn defaults_to_first_page_of_twenty() {
        let pageable = parse(&[]).unwrap();
        assert_eq!(pageable, Pageable::of(0, 20));
        assert_eq!(pageable.offset(), 0);
    }

    #[test]
    fn reads_page_size_and_sort() {
        let pageable = parse(&[("page", "2"), ("size", "5"), ("sort", "id,desc"), ("sort", "name")]).unwrap();
        assert_eq!(pageable.offset(), 10);
        assert_eq!(pageable.sort, vec![Sort::desc(TestColumn::Id), Sort::asc(TestColumn::Name)]);
    }

    #[test]
    fn trailing_direction_applies_to_all_fields() {
        let pageable = parse(&[("sort", "name,score,DESC")]).unwrap();
        assert_eq!(pageable.sort, vec![Sort::desc(TestColumn::Name), Sort::desc(TestColumn::Score)]);
    }

    #[test]
    fn clamps_out_of_range_values() {
        let pageable = parse(&[("page", "-3"), ("size", "100000")]).unwrap();
        assert_eq!(pageable.page, 0);
        assert_eq!(pageable.size, MAX_PAGE_SIZE);
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(matches!(parse(&[("page", "first")]), Err(PageableError::InvalidNumber { param: "page", .. })));
        assert!(matches!(parse(&[("sort", "salary,desc")]), Err(PageableError::UnknownSortField(f)) if f == "salary"));
        assert!(matches!(parse(&[("sort", "desc")]), Err(PageableError::InvalidSort(_))));
    }

    #[test]
    fn huge_page_does_not_overflow() {
        let max = i64::MAX.to_string();
        let pageable = parse(&[("page", max.as_str()), ("size", "20")]).unwrap();
        assert_eq!(pageable.offset(), i64::MAX);
        let page: Page<i32> = Page::new(vec![], 3, &pageable);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn id_tiebreak_added_once() {
        let order = with_id_tiebreak(&[Sort::desc(TestColumn::Name)]);
        assert_eq!(order, vec![Sort::desc(TestColumn::Name), Sort::asc(TestColumn::Id)]);
        let order = with_id_tiebreak(&[Sort::desc(TestColumn::Id)]);
        assert_eq!(order, vec![Sort::desc(TestColumn::Id)]);
    }

    #[test]
    fn page_arithmetic() {
        let page: Page<i32> = Page::new(vec![1, 2], 45, &Pageable::<TestColumn>::of(1, 20));
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert!(page.has_previous());
        let empty: Page<i32> = Page::new(vec![], 0, &Pageable::<TestColumn>::of(0, 20));
        assert_eq!(empty.total_pages(), 0);
        assert!(!empty.has_next());
    }
}

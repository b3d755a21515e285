use crate::validation::{validate_sort, SortDirection, SortField};
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

pub const DEFAULT_PAGE_SIZE: i64 = 10;

const STUDENT_COLUMNS: &str = "id, first_name, last_name, email, phone, date_of_birth, course, year, address, notes, created_at, updated_at";

/// Listing parameters exactly as they arrived on the query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

/// A checked listing request. `page` and `page_size` keep their raw values so
/// responses can echo them back; the SQL side clamps via [`Self::limit`] and
/// [`Self::offset`].
#[derive(Debug, Clone, PartialEq)]
pub struct ListPlan {
    pub search: Option<String>,
    pub page: i64,
    pub page_size: i64,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
}

impl ListPlan {
    pub fn from_params(params: ListParams) -> Self {
        let (sort_field, sort_direction) =
            validate_sort(params.sort_by.as_deref(), params.sort_dir.as_deref());

        Self {
            search: params.search.filter(|search| !search.is_empty()),
            page: params.page.unwrap_or(1),
            page_size: params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            sort_field,
            sort_direction,
        }
    }

    pub const fn limit(&self) -> i64 {
        if self.page_size < 1 { 1 } else { self.page_size }
    }

    pub const fn offset(&self) -> i64 {
        let page = if self.page < 1 { 1 } else { self.page };
        (page - 1) * self.limit()
    }

    pub const fn total_pages(&self, total: i64) -> i64 {
        // i64::div_ceil is unstable (`int_roundings`); this is its exact arithmetic
        let limit = self.limit();
        let quotient = total / limit;
        let remainder = total % limit;
        if (remainder > 0 && limit > 0) || (remainder < 0 && limit < 0) {
            quotient + 1
        } else {
            quotient
        }
    }

    pub fn page_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder =
            QueryBuilder::new(format!("SELECT {STUDENT_COLUMNS} FROM students"));
        self.push_search_filter(&mut builder);
        builder
            .push(" ORDER BY ")
            .push(self.sort_field.as_sql())
            .push(" ")
            .push(self.sort_direction.as_sql())
            .push(" LIMIT ")
            .push_bind(self.limit())
            .push(" OFFSET ")
            .push_bind(self.offset());

        builder
    }

    pub fn count_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM students");
        self.push_search_filter(&mut builder);

        builder
    }

    fn push_search_filter(&self, builder: &mut QueryBuilder<'static, Postgres>) {
        if let Some(search) = &self.search {
            let like = format!("%{search}%");
            builder
                .push(" WHERE (first_name ILIKE ")
                .push_bind(like.clone())
                .push(" OR last_name ILIKE ")
                .push_bind(like.clone())
                .push(" OR email ILIKE ")
                .push_bind(like.clone())
                .push(" OR phone ILIKE ")
                .push_bind(like.clone())
                .push(" OR course ILIKE ")
                .push_bind(like)
                .push(")");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(params: ListParams) -> ListPlan {
        ListPlan::from_params(params)
    }

    #[test]
    fn defaults_when_nothing_is_given() {
        let plan = plan(ListParams::default());

        assert_eq!(plan.search, None);
        assert_eq!(plan.page, 1);
        assert_eq!(plan.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(plan.sort_field, SortField::CreatedAt);
        assert_eq!(plan.sort_direction, SortDirection::Descending);
    }

    #[test]
    fn empty_search_means_no_filter() {
        let plan = plan(ListParams {
            search: Some(String::new()),
            ..ListParams::default()
        });

        assert_eq!(plan.search, None);
        assert!(!plan.page_query().into_sql().contains("WHERE"));
    }

    #[test]
    fn raw_page_values_are_kept_but_sql_is_clamped() {
        let plan = plan(ListParams {
            page: Some(0),
            page_size: Some(-5),
            ..ListParams::default()
        });

        assert_eq!(plan.page, 0);
        assert_eq!(plan.page_size, -5);
        assert_eq!(plan.limit(), 1);
        assert_eq!(plan.offset(), 0);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let plan = plan(ListParams {
            page: Some(3),
            ..ListParams::default()
        });

        assert_eq!(plan.offset(), 20);
    }

    #[test]
    fn total_pages_rounds_up() {
        let plan = plan(ListParams::default());

        assert_eq!(plan.total_pages(0), 0);
        assert_eq!(plan.total_pages(10), 1);
        assert_eq!(plan.total_pages(11), 2);
    }

    #[test]
    fn page_query_binds_search_and_pagination() {
        let plan = plan(ListParams {
            search: Some("ali'; DROP TABLE students; --".to_string()),
            sort_by: Some("last_name".to_string()),
            sort_dir: Some("asc".to_string()),
            ..ListParams::default()
        });
        let sql = plan.page_query().into_sql();

        assert!(sql.contains("first_name ILIKE $1"));
        assert!(sql.contains("last_name ILIKE $2"));
        assert!(sql.contains("email ILIKE $3"));
        assert!(sql.contains("phone ILIKE $4"));
        assert!(sql.contains("course ILIKE $5"));
        assert!(sql.contains("ORDER BY last_name ASC"));
        assert!(sql.contains("LIMIT $6 OFFSET $7"));
        assert!(!sql.contains("DROP TABLE"), "search text must only appear as a bind");
    }

    #[test]
    fn count_query_shares_the_filter_but_not_the_ordering() {
        let plan = plan(ListParams {
            search: Some("chen".to_string()),
            ..ListParams::default()
        });
        let sql = plan.count_query().into_sql();

        assert!(sql.starts_with("SELECT COUNT(*) FROM students"));
        assert!(sql.contains("course ILIKE $5"));
        assert!(!sql.contains("ORDER BY"));
        assert!(!sql.contains("LIMIT"));
    }

    #[test]
    fn hostile_sort_params_fall_back_to_defaults() {
        let plan = plan(ListParams {
            sort_by: Some("id; DROP TABLE students".to_string()),
            sort_dir: Some("sideways".to_string()),
            ..ListParams::default()
        });
        let sql = plan.page_query().into_sql();

        assert!(sql.contains("ORDER BY created_at DESC"));
    }
}

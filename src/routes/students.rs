use crate::{
    data::student::Student,
    error::RegistrarResult,
    maud_conveniences::render_table,
    query::{ListParams, ListPlan},
    state::RegistrarState,
    validation::{SortDirection, SortField},
};
use axum::extract::{Query, State};
use maud::{Markup, html};
use serde::Deserialize;

pub async fn internal_get_students(
    State(state): State<RegistrarState>,
    Query(params): Query<ListParams>,
) -> RegistrarResult<Markup> {
    let plan = ListPlan::from_params(params);
    let (students, total) = Student::fetch_page(&plan, &state).await?;

    Ok(students_fragment(&plan, &students, total))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteStudentParams {
    pub id: i32,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

#[axum::debug_handler]
pub async fn internal_delete_student(
    State(state): State<RegistrarState>,
    Query(DeleteStudentParams {
        id,
        search,
        page,
        page_size,
        sort_by,
        sort_dir,
    }): Query<DeleteStudentParams>,
) -> RegistrarResult<Markup> {
    Student::remove_from_database(id, &mut *state.get_connection().await?).await?;

    let plan = ListPlan::from_params(ListParams {
        search,
        page,
        page_size,
        sort_by,
        sort_dir,
    });
    let (students, total) = Student::fetch_page(&plan, &state).await?;

    Ok(students_fragment(&plan, &students, total))
}

fn students_fragment(plan: &ListPlan, students: &[Student], total: i64) -> Markup {
    let total_pages = plan.total_pages(total);

    let headers = [
        sortable_header("Name", SortField::LastName, plan),
        sortable_header("Email", SortField::Email, plan),
        sortable_header("Course", SortField::Course, plan),
        sortable_header("Year", SortField::Year, plan),
        html! { "Actions" },
    ];
    let rows = students
        .iter()
        .map(|student| {
            [
                html! { (student.last_name) ", " (student.first_name) },
                html! { (student.email) },
                html! { (student.course.as_deref().unwrap_or("-")) },
                html! {
                    @if let Some(year) = student.year {
                        (year)
                    } @else {
                        "-"
                    }
                },
                html! {
                    div class="flex flex-row space-x-2" {
                        a href={"/student/" (student.id)} class="text-blue-400 hover:underline" {"View"}
                        a href={"/student/" (student.id) "/edit"} class="text-blue-400 hover:underline" {"Edit"}
                        button
                            class="text-red-400 hover:underline"
                            hx-delete={"/internal/students?id=" (student.id) "&page=" (plan.page) "&sortBy=" (plan.sort_field.as_sql()) "&sortDir=" (plan.sort_direction.as_query())}
                            hx-confirm="Delete this student?"
                            hx-include="#students_search, #students_page_size"
                            hx-target="#students"
                            hx-swap="outerHTML" {
                            "Delete"
                        }
                    }
                },
            ]
        })
        .collect();

    html! {
        div id="students" class="container mx-auto flex flex-col space-y-4" {
            form hx-get="/internal/students" hx-target="#students" hx-swap="outerHTML" class="flex flex-row space-x-2" {
                input type="hidden" name="sortBy" value=(plan.sort_field.as_sql()) {}
                input type="hidden" name="sortDir" value=(plan.sort_direction.as_query()) {}
                input type="hidden" name="pageSize" id="students_page_size" value=(plan.page_size) {}
                input
                    type="search"
                    name="search"
                    id="students_search"
                    value=[plan.search.as_deref()]
                    placeholder="Search name, email, phone, course"
                    class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline text-gray-200 bg-gray-700 border-gray-600" {}
                button type="submit" class="bg-blue-500 hover:bg-blue-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline" {
                    "Search"
                }
                button
                    type="button"
                    class="bg-gray-600 hover:bg-gray-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline"
                    hx-get="/internal/students"
                    hx-include="#students_page_size"
                    hx-target="#students"
                    hx-swap="outerHTML" {
                    "Clear"
                }
            }

            (render_table(headers, rows))
            @if students.is_empty() {
                p class="text-gray-400 text-center py-4" {"No students found"}
            }

            div class="flex flex-row justify-between items-center" {
                span class="text-gray-400" {"Total: " (total)}
                div class="flex flex-row items-center space-x-2" {
                    button
                        class="bg-gray-700 hover:bg-gray-600 py-1 px-3 rounded disabled:opacity-50"
                        disabled[plan.page <= 1]
                        hx-get={"/internal/students?page=" (plan.page - 1) "&sortBy=" (plan.sort_field.as_sql()) "&sortDir=" (plan.sort_direction.as_query())}
                        hx-include="#students_search, #students_page_size"
                        hx-target="#students"
                        hx-swap="outerHTML" {
                        "Prev"
                    }
                    span class="text-gray-400" {"Page " (plan.page) " of " (total_pages)}
                    button
                        class="bg-gray-700 hover:bg-gray-600 py-1 px-3 rounded disabled:opacity-50"
                        disabled[plan.page >= total_pages]
                        hx-get={"/internal/students?page=" (plan.page + 1) "&sortBy=" (plan.sort_field.as_sql()) "&sortDir=" (plan.sort_direction.as_query())}
                        hx-include="#students_search, #students_page_size"
                        hx-target="#students"
                        hx-swap="outerHTML" {
                        "Next"
                    }
                }
            }
        }
    }
}

fn sortable_header(label: &'static str, field: SortField, plan: &ListPlan) -> Markup {
    let active = plan.sort_field == field;
    let next_direction = if active {
        plan.sort_direction.toggled()
    } else {
        SortDirection::Ascending
    };
    let marker = match plan.sort_direction {
        SortDirection::Ascending => "▲",
        SortDirection::Descending => "▼",
    };

    html! {
        button
            class="flex flex-row items-center space-x-1 font-semibold text-gray-300 hover:text-white"
            hx-get={"/internal/students?sortBy=" (field.as_sql()) "&sortDir=" (next_direction.as_query())}
            hx-include="#students_search, #students_page_size"
            hx-target="#students"
            hx-swap="outerHTML" {
            span {(label)}
            @if active {
                span {(marker)}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn sample_student(id: i32, first: &str, last: &str) -> Student {
        Student {
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: format!("{first}.{last}@example.com").to_lowercase(),
            phone: None,
            date_of_birth: None,
            course: None,
            year: None,
            address: None,
            notes: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn default_plan() -> ListPlan {
        ListPlan::from_params(ListParams::default())
    }

    #[test]
    fn rows_show_surname_first_and_dashes_for_gaps() {
        let students = vec![sample_student(1, "Jake", "Chen")];
        let html = students_fragment(&default_plan(), &students, 1).into_string();

        assert!(html.contains("Chen, Jake"));
        assert!(html.contains("jake.chen@example.com"));
        assert!(html.contains("<td class=\"py-2 px-4 border-b border-gray-600 text-gray-200\">-</td>"));
    }

    #[test]
    fn empty_page_reports_no_students() {
        let html = students_fragment(&default_plan(), &[], 0).into_string();

        assert!(html.contains("No students found"));
        assert!(html.contains("Page 1 of 0"));
        assert!(html.contains("Total: 0"));
    }

    #[test]
    fn active_header_link_toggles_the_direction() {
        let plan = ListPlan::from_params(ListParams {
            sort_by: Some("last_name".to_string()),
            sort_dir: Some("asc".to_string()),
            ..ListParams::default()
        });
        let html = students_fragment(&plan, &[], 0).into_string();

        assert!(html.contains("sortBy=last_name&amp;sortDir=desc"));
        assert!(html.contains("sortBy=email&amp;sortDir=asc"));
        assert!(html.contains("▲"));
    }

    #[test]
    fn middle_pages_enable_both_pagination_buttons() {
        let plan = ListPlan::from_params(ListParams {
            page: Some(2),
            ..ListParams::default()
        });
        let students: Vec<_> = (1..=10)
            .map(|id| sample_student(id, "Test", "Student"))
            .collect();
        let html = students_fragment(&plan, &students, 30).into_string();

        assert!(html.contains("Page 2 of 3"));
        assert!(!html.contains("disabled "));
        assert!(html.contains("page=1"));
        assert!(html.contains("page=3"));
    }

    #[test]
    fn deleting_asks_for_confirmation() {
        let students = vec![sample_student(7, "Grace", "Kim")];
        let html = students_fragment(&default_plan(), &students, 1).into_string();

        assert!(html.contains("hx-confirm=\"Delete this student?\""));
        assert!(html.contains("hx-delete=\"/internal/students?id=7"));
    }
}

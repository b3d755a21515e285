use crate::{
    data::student::{Student, parse_student_id},
    error::{MissingStudentSnafu, RegistrarResult},
    maud_conveniences::title,
    state::RegistrarState,
};
use axum::extract::{Path, State};
use maud::{Markup, html};
use snafu::OptionExt;

pub async fn get_student(
    State(state): State<RegistrarState>,
    Path(id): Path<String>,
) -> RegistrarResult<Markup> {
    let id = parse_student_id(&id)?;
    let student = Student::get_from_db_by_id(id, &mut *state.get_connection().await?)
        .await?
        .context(MissingStudentSnafu { id })?;

    let notes = student.notes.map(|notes| {
        html! {
            div {
                @for line in notes.lines() {
                    (line)
                    br;
                }
            }
        }
    });

    Ok(state.render(html! {
        div class="container mx-auto px-4 py-8" {
            div class="bg-gray-800 p-6 md:p-8 rounded-lg shadow-xl max-w-3xl mx-auto" {
                (title(format!("{}, {}", student.last_name, student.first_name)))

                div class="grid grid-cols-1 md:grid-cols-2 gap-6 mb-8" {
                    (detail_field("Email", Some(student.email)))
                    (detail_field("Phone", student.phone))
                    (detail_field("Date of Birth", student.date_of_birth.map(|d| d.to_string())))
                    (detail_field("Course", student.course))
                    (detail_field("Year", student.year.map(|y| y.to_string())))
                    (detail_field("Address", student.address))
                }

                div class="mb-8" {
                    p class="text-gray-300 text-sm mb-2" {"Notes:"}
                    @if let Some(notes) = notes {
                        p class="text-gray-100 leading-relaxed" {(notes)}
                    } @else {
                        p class="text-gray-500 italic" {"No notes."}
                    }
                }

                p class="text-gray-500 text-sm" {"Created " (student.created_at)}
                p class="text-gray-500 text-sm mb-6" {"Updated " (student.updated_at)}

                div class="flex flex-row space-x-4" {
                    a href={"/student/" (student.id) "/edit"} class="bg-blue-500 hover:bg-blue-700 text-white font-bold py-2 px-4 rounded" {
                        "Edit"
                    }
                    a href="/" class="text-gray-300 hover:text-white py-2" {
                        "Back to list"
                    }
                }
            }
        }
    }))
}

fn detail_field(label: &'static str, value: Option<String>) -> Markup {
    html! {
        div {
            p class="text-gray-300 text-sm" {(label) ":"}
            @if let Some(value) = value {
                p class="text-gray-100 text-lg" {(value)}
            } @else {
                p class="text-gray-500 text-lg" {"-"}
            }
        }
    }
}

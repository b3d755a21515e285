use crate::{
    data::student::{Student, parse_student_id},
    error::{MissingStudentSnafu, RegistrarError, RegistrarResult},
    maud_conveniences::{
        form_element, form_submit_button, simple_form_element, textarea_form_element, title,
    },
    state::RegistrarState,
    validation::{ValidationFailure, validate_new_student, validate_student_patch},
};
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use serde_json::{Value, json};
use snafu::OptionExt;

/// Raw form submission. Browsers send every input, so empty optionals arrive
/// as empty strings and get turned into JSON nulls before validation.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StudentFormBody {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    date_of_birth: String,
    #[serde(default)]
    course: String,
    #[serde(default)]
    year: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    notes: String,
}

impl StudentFormBody {
    fn from_student(student: &Student) -> Self {
        Self {
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            email: student.email.clone(),
            phone: student.phone.clone().unwrap_or_default(),
            date_of_birth: student
                .date_of_birth
                .map(|d| d.to_string())
                .unwrap_or_default(),
            course: student.course.clone().unwrap_or_default(),
            year: student.year.map(|y| y.to_string()).unwrap_or_default(),
            address: student.address.clone().unwrap_or_default(),
            notes: student.notes.clone().unwrap_or_default(),
        }
    }

    fn into_payload(self) -> Value {
        let optional = |value: String| {
            if value.is_empty() {
                Value::Null
            } else {
                Value::String(value)
            }
        };

        json!({
            "first_name": self.first_name,
            "last_name": self.last_name,
            "email": self.email,
            "phone": optional(self.phone),
            "date_of_birth": optional(self.date_of_birth),
            "course": optional(self.course),
            "year": optional(self.year),
            "address": optional(self.address),
            "notes": optional(self.notes),
        })
    }
}

struct FormContext<'a> {
    action: String,
    heading: &'static str,
    submit_label: &'static str,
    values: &'a StudentFormBody,
    failure: Option<&'a ValidationFailure>,
    banner: Option<&'a str>,
}

fn render_form(state: &RegistrarState, ctx: &FormContext) -> Markup {
    let err = |field: &str| ctx.failure.and_then(|failure| failure.first_message(field));
    let values = ctx.values;

    state.render(html! {
        div class="bg-gray-800 shadow-md rounded px-8 pt-6 pb-8 mb-4 w-full max-w-lg" {
            (title(ctx.heading))

            @if let Some(banner) = ctx.banner {
                div role="alert" class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" {
                    span class="block sm:inline" {(banner)}
                }
            }

            form method="post" action=(ctx.action) {
                (simple_form_element("first_name", "First Name", true, None, Some(values.first_name.as_str()), err("first_name")))
                (simple_form_element("last_name", "Last Name", true, None, Some(values.last_name.as_str()), err("last_name")))
                (simple_form_element("email", "Email", true, Some("email"), Some(values.email.as_str()), err("email")))
                (simple_form_element("phone", "Phone", false, None, Some(values.phone.as_str()), err("phone")))
                (simple_form_element("date_of_birth", "Date of Birth", false, Some("date"), Some(values.date_of_birth.as_str()), err("date_of_birth")))
                (simple_form_element("course", "Course", false, None, Some(values.course.as_str()), err("course")))
                (form_element("year", "Year", err("year"), html! {
                    input
                        type="number"
                        name="year"
                        id="year"
                        min="1"
                        max="8"
                        value=(values.year)
                        class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline text-gray-200 bg-gray-700 border-gray-600" {}
                }))
                (simple_form_element("address", "Address", false, None, Some(values.address.as_str()), err("address")))
                (textarea_form_element("notes", "Notes", Some(values.notes.as_str()), err("notes")))

                div class="flex items-center justify-between" {
                    (form_submit_button(Some(ctx.submit_label)))
                    a href="/" class="text-gray-300 hover:text-white" {"Cancel"}
                }
            }
        }
    })
}

pub async fn get_new_student_form(State(state): State<RegistrarState>) -> Markup {
    render_form(
        &state,
        &FormContext {
            action: "/new".to_string(),
            heading: "Create Student",
            submit_label: "Create",
            values: &StudentFormBody::default(),
            failure: None,
            banner: None,
        },
    )
}

pub async fn post_new_student(
    State(state): State<RegistrarState>,
    Form(body): Form<StudentFormBody>,
) -> RegistrarResult<Response> {
    let payload = body.clone().into_payload();
    let context = |failure: Option<&ValidationFailure>, banner: Option<&str>| {
        render_form(
            &state,
            &FormContext {
                action: "/new".to_string(),
                heading: "Create Student",
                submit_label: "Create",
                values: &body,
                failure,
                banner,
            },
        )
        .into_response()
    };

    match validate_new_student(&payload) {
        Ok(draft) => {
            match Student::insert_into_database(draft, &mut *state.get_connection().await?).await {
                Ok(_) => Ok(Redirect::to("/").into_response()),
                Err(RegistrarError::DuplicateEmail { .. }) => {
                    Ok(context(None, Some("Email already exists")))
                }
                Err(other) => Err(other),
            }
        }
        Err(failure) => Ok(context(Some(&failure), None)),
    }
}

pub async fn get_edit_student_form(
    State(state): State<RegistrarState>,
    Path(id): Path<String>,
) -> RegistrarResult<Markup> {
    let id = parse_student_id(&id)?;
    let student = Student::get_from_db_by_id(id, &mut *state.get_connection().await?)
        .await?
        .context(MissingStudentSnafu { id })?;

    Ok(render_form(
        &state,
        &FormContext {
            action: format!("/student/{id}/edit"),
            heading: "Edit Student",
            submit_label: "Update",
            values: &StudentFormBody::from_student(&student),
            failure: None,
            banner: None,
        },
    ))
}

pub async fn post_edit_student_form(
    State(state): State<RegistrarState>,
    Path(id): Path<String>,
    Form(body): Form<StudentFormBody>,
) -> RegistrarResult<Response> {
    let id = parse_student_id(&id)?;
    let payload = body.clone().into_payload();
    let context = |failure: Option<&ValidationFailure>, banner: Option<&str>| {
        render_form(
            &state,
            &FormContext {
                action: format!("/student/{id}/edit"),
                heading: "Edit Student",
                submit_label: "Update",
                values: &body,
                failure,
                banner,
            },
        )
        .into_response()
    };

    match validate_student_patch(&payload) {
        Ok(patch) => {
            match Student::update(id, patch, &mut *state.get_connection().await?).await {
                Ok(_) => Ok(Redirect::to("/").into_response()),
                Err(RegistrarError::DuplicateEmail { .. }) => {
                    Ok(context(None, Some("Email already exists")))
                }
                Err(other) => Err(other),
            }
        }
        Err(failure) => Ok(context(Some(&failure), None)),
    }
}

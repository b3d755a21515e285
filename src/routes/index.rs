use crate::{error::RegistrarResult, maud_conveniences::title, state::RegistrarState};
use axum::{extract::State, response::IntoResponse};
use maud::html;

pub async fn get_index_route(
    State(state): State<RegistrarState>,
) -> RegistrarResult<impl IntoResponse> {
    Ok(state.render(html! {
        div class="container mx-auto px-4" {
            div class="flex flex-row justify-between items-center" {
                (title("Students"))
                a href="/new" class="bg-blue-500 hover:bg-blue-700 text-white font-bold py-2 px-4 rounded" {
                    "Create Student"
                }
            }
            div hx-get="/internal/students" hx-trigger="load" hx-swap="outerHTML" {
                p class="text-gray-400" {"Loading students..."}
            }
        }
    }))
}

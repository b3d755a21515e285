use maud::{Markup, Render, html};

pub fn render_table<const N: usize>(headers: [Markup; N], rows: Vec<[Markup; N]>) -> Markup {
    html! {
        div class="overflow-x-auto" {
            table class="min-w-full bg-gray-800 rounded shadow-md" {
                thead class="bg-gray-700" {
                    tr {
                        @for header in headers {
                            th class="py-2 px-4 text-left font-semibold text-gray-300" {(header)}
                        }
                    }
                }
                tbody {
                    @for row in rows {
                        tr {
                            @for col in row {
                                td class="py-2 px-4 border-b border-gray-600 text-gray-200" {(col)}
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

pub fn render_nav() -> Markup {
    html! {
        nav class="bg-gray-800 w-full shadow-md mb-6" {
            div class="container mx-auto px-4 py-3 flex items-center justify-between" {
                a href="/" class="text-xl font-bold text-white" {"Registrar"}
                div class="space-x-4" {
                    a href="/" class="text-gray-300 hover:text-white" {"Students"}
                    a href="/new" class="text-gray-300 hover:text-white" {"Add Student"}
                }
            }
        }
    }
}

pub fn form_element(
    name: &'static str,
    label: &str,
    error: Option<&str>,
    inner: Markup,
) -> Markup {
    html! {
        div class="mb-4" {
            label for=(name) class="block text-gray-300 text-sm font-bold mb-2" {(label)}
            (inner)
            @if let Some(error) = error {
                span class="text-red-400 text-sm" {(error)}
            }
        }
    }
}

pub fn simple_form_element(
    name: &'static str,
    label: &str,
    required: bool,
    kind: Option<&str>,
    value: Option<&str>,
    error: Option<&str>,
) -> Markup {
    let label = if required {
        format!("{label} *")
    } else {
        label.to_string()
    };
    form_element(
        name,
        &label,
        error,
        html! {
            input
                type=(kind.unwrap_or("text"))
                name=(name)
                id=(name)
                value=[value]
                class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline text-gray-200 bg-gray-700 border-gray-600" {}
        },
    )
}

pub fn textarea_form_element(
    name: &'static str,
    label: &str,
    value: Option<&str>,
    error: Option<&str>,
) -> Markup {
    form_element(
        name,
        label,
        error,
        html! {
            textarea
                name=(name)
                id=(name)
                rows="4"
                class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline text-gray-200 bg-gray-700 border-gray-600" {
                (value.unwrap_or(""))
            }
        },
    )
}

pub fn form_submit_button(text: Option<&str>) -> Markup {
    html! {
        button
            type="submit"
            class="bg-blue-500 hover:bg-blue-700 text-white font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline" {
            (text.unwrap_or("Submit"))
        }
    }
}

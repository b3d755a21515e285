pub mod api;
pub mod index;
pub mod student_form;
pub mod student_in_detail;
pub mod students;

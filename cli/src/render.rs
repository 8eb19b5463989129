//! Plain-text rendering of the student page.

use student_core::{Draft, DraftField, Student, ViewState};

pub const EMPTY_LIST: &str = "No students found. Add your first student above!";
pub const LOADING: &str = "Loading students...";

const ID_W: usize = 5;
const STUDENT_W: usize = 24;
const CONTACT_W: usize = 28;
const ACADEMIC_W: usize = 22;
const STATUS_W: usize = 10;
const GPA_W: usize = 5;

/// Cut `text` to at most `width` characters, marking the cut with `~`.
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('~');
    cut
}

fn or_na(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "N/A",
    }
}

fn gpa(student: &Student) -> String {
    student
        .gpa
        .map(|gpa| format!("{gpa:.2}"))
        .unwrap_or_else(|| "N/A".to_string())
}

fn year(student: &Student) -> String {
    match student.year {
        Some(year) => format!("Year {year}"),
        None => "Year N/A".to_string(),
    }
}

fn row(out: &mut String, cells: [&str; 7]) {
    let [id, student, contact, academic, status, gpa, action] = cells;
    out.push_str(&format!(
        "{:>ID_W$}  {:<STUDENT_W$}  {:<CONTACT_W$}  {:<ACADEMIC_W$}  {:<STATUS_W$}  {:>GPA_W$}  {}\n",
        id,
        fit(student, STUDENT_W),
        fit(contact, CONTACT_W),
        fit(academic, ACADEMIC_W),
        status,
        gpa,
        action,
    ));
}

/// The student table. Each record takes two lines. `busy` marks the one row
/// whose delete is in flight.
pub fn render_students(students: &[Student], busy: Option<u64>) -> String {
    if students.is_empty() {
        return format!("{EMPTY_LIST}\n");
    }
    let mut out = String::new();
    row(
        &mut out,
        ["ID", "STUDENT", "CONTACT", "ACADEMIC INFO", "STATUS", "GPA", "ACTION"],
    );
    for student in students {
        let id = student.id.to_string();
        let action = if busy == Some(student.id) {
            "Deleting..."
        } else {
            "Delete"
        };
        row(
            &mut out,
            [
                &id,
                &student.full_name(),
                &student.email,
                or_na(student.major.as_deref()),
                student.status.as_str(),
                &gpa(student),
                action,
            ],
        );
        row(
            &mut out,
            [
                "",
                &format!("Code: {}", student.student_code),
                or_na(student.phone.as_deref()),
                &year(student),
                "",
                "",
                "",
            ],
        );
    }
    out
}

/// Full record, one field per line.
pub fn render_student(student: &Student) -> String {
    let mut out = String::new();
    let fields = [
        ("ID", student.id.to_string()),
        ("Code", student.student_code.clone()),
        ("Name", student.full_name()),
        ("Email", student.email.clone()),
        ("Phone", or_na(student.phone.as_deref()).to_string()),
        (
            "Date of birth",
            student
                .date_of_birth
                .map(|dob| dob.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        ),
        ("Address", or_na(student.address.as_deref()).to_string()),
        ("Major", or_na(student.major.as_deref()).to_string()),
        ("Year", year(student)),
        ("GPA", gpa(student)),
        ("Status", student.status.to_string()),
        ("Created", student.created_at.to_rfc3339()),
        ("Updated", student.updated_at.to_rfc3339()),
    ];
    for (label, value) in fields {
        out.push_str(&format!("{label:>14}: {value}\n"));
    }
    out
}

pub fn render_draft(draft: &Draft) -> String {
    let mut out = String::from("Add New Student  (set <field> <value>, then `add`)\n");
    for field in DraftField::ALL {
        let marker = if field.is_required() { " *" } else { "" };
        let label = format!("{field}{marker}");
        out.push_str(&format!("  {label:<15} {}\n", draft.value(field)));
    }
    out
}

/// The whole page: draft form, then the list area.
pub fn render_page(state: &ViewState) -> String {
    let mut out = String::from("Student Management System\n\n");
    out.push_str(&render_draft(state.draft()));
    out.push_str(&format!("\nStudents ({})\n", state.students().len()));

    if state.is_loading() {
        out.push_str(LOADING);
        out.push('\n');
    }
    if let Some(error) = state.error() {
        out.push_str(&format!("! {error}\n  Type `refresh` to try again.\n"));
    }
    if !state.is_loading() && state.error().is_none() {
        out.push_str(&render_students(state.students(), state.deleting_id()));
    }
    out
}

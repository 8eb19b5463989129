//! View state and the action handlers that keep it in sync with the API.
//!
//! # Design
//! `Controller` owns one `ViewState` and is the only thing that mutates it.
//! It never performs I/O: every action that needs the network returns a
//! `Dispatch` (the request plus a `Pending` tag), and the host feeds the
//! outcome back through `Controller::complete`. Completions may arrive in
//! any order. List loads carry a sequence number and only the most recently
//! issued load is allowed to commit, so a slow stale response can never
//! overwrite a newer list.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::client::StudentClient;
use crate::error::{ApiError, DraftError};
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{NewStudent, Student, StudentStatus};

pub const FETCH_FAILED: &str = "Failed to fetch students. Make sure the backend is running.";
pub const CREATE_FAILED: &str = "Failed to create student";

/// Interactive confirmation and notices, supplied by whatever renders the page.
pub trait Prompt {
    /// Blocking yes/no question. Returning `false` aborts the action.
    fn confirm(&mut self, message: &str) -> bool;

    /// Blocking notice the user has to acknowledge.
    fn alert(&mut self, message: &str);
}

/// The editable fields of the create form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    StudentCode,
    FirstName,
    LastName,
    Email,
    Major,
    Year,
}

impl DraftField {
    pub const ALL: [DraftField; 6] = [
        DraftField::StudentCode,
        DraftField::FirstName,
        DraftField::LastName,
        DraftField::Email,
        DraftField::Major,
        DraftField::Year,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DraftField::StudentCode => "student_code",
            DraftField::FirstName => "first_name",
            DraftField::LastName => "last_name",
            DraftField::Email => "email",
            DraftField::Major => "major",
            DraftField::Year => "year",
        }
    }

    pub fn is_required(self) -> bool {
        !matches!(self, DraftField::Major | DraftField::Year)
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DraftField {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "student_code" | "code" => DraftField::StudentCode,
            "first_name" | "first" => DraftField::FirstName,
            "last_name" | "last" => DraftField::LastName,
            "email" => DraftField::Email,
            "major" => DraftField::Major,
            "year" => DraftField::Year,
            _ => {
                return Err(DraftError::UnknownField {
                    name: s.to_string(),
                })
            }
        };
        Ok(field)
    }
}

/// Parse the year field. Only whole numbers in `1..=6` are accepted.
pub fn parse_year(input: &str) -> Result<u8, DraftError> {
    let year: i64 = input.trim().parse().map_err(|_| DraftError::InvalidYear {
        input: input.to_string(),
    })?;
    match u8::try_from(year) {
        Ok(year @ 1..=6) => Ok(year),
        _ => Err(DraftError::YearOutOfRange { year }),
    }
}

/// The not-yet-submitted create form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub student_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub major: String,
    pub year: u8,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            student_code: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            major: String::new(),
            year: 1,
        }
    }
}

impl Draft {
    /// Update one field from raw text. A rejected year leaves the draft as it was.
    pub fn set(&mut self, field: DraftField, input: &str) -> Result<(), DraftError> {
        let text = input.trim().to_string();
        match field {
            DraftField::StudentCode => self.student_code = text,
            DraftField::FirstName => self.first_name = text,
            DraftField::LastName => self.last_name = text,
            DraftField::Email => self.email = text,
            DraftField::Major => self.major = text,
            DraftField::Year => self.year = parse_year(input)?,
        }
        Ok(())
    }

    pub fn value(&self, field: DraftField) -> String {
        match field {
            DraftField::StudentCode => self.student_code.clone(),
            DraftField::FirstName => self.first_name.clone(),
            DraftField::LastName => self.last_name.clone(),
            DraftField::Email => self.email.clone(),
            DraftField::Major => self.major.clone(),
            DraftField::Year => self.year.to_string(),
        }
    }

    /// True when all four required fields hold something other than whitespace.
    pub fn is_complete(&self) -> bool {
        [
            &self.student_code,
            &self.first_name,
            &self.last_name,
            &self.email,
        ]
        .iter()
        .all(|value| !value.trim().is_empty())
    }

    pub fn to_new_student(&self) -> NewStudent {
        let major = self.major.trim();
        NewStudent {
            student_code: self.student_code.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            major: (!major.is_empty()).then(|| major.to_string()),
            year: Some(self.year),
            status: StudentStatus::Active,
            ..NewStudent::default()
        }
    }
}

/// Everything the page renders from.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    students: Vec<Student>,
    loading: bool,
    error: Option<String>,
    draft: Draft,
    deleting_id: Option<u64>,
}

impl ViewState {
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn deleting_id(&self) -> Option<u64> {
        self.deleting_id
    }

    /// Whether the delete control of `id` should render as busy.
    pub fn is_deleting(&self, id: u64) -> bool {
        self.deleting_id == Some(id)
    }
}

/// What a dispatched request was for, handed back on completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    Load { seq: u64 },
    Create,
    Delete { id: u64, name: String },
}

/// A request the host must execute, tagged with its purpose.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub pending: Pending,
    pub request: HttpRequest,
}

#[derive(Debug)]
pub struct Controller {
    client: StudentClient,
    state: ViewState,
    mounted: bool,
    last_load: u64,
}

impl Controller {
    pub fn new(client: StudentClient) -> Self {
        Self {
            client,
            state: ViewState::default(),
            mounted: false,
            last_load: 0,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn client(&self) -> &StudentClient {
        &self.client
    }

    pub fn set_draft_field(&mut self, field: DraftField, input: &str) -> Result<(), DraftError> {
        self.state.draft.set(field, input)
    }

    /// First render. Issues the initial load exactly once.
    pub fn mount(&mut self) -> Option<Dispatch> {
        if self.mounted {
            return None;
        }
        self.mounted = true;
        Some(self.refresh())
    }

    /// Start a full list reload. Any load still in flight becomes stale.
    pub fn refresh(&mut self) -> Dispatch {
        self.last_load += 1;
        self.state.loading = true;
        self.state.error = None;
        debug!(seq = self.last_load, "fetching students");
        Dispatch {
            pending: Pending::Load {
                seq: self.last_load,
            },
            request: self.client.build_list_students(),
        }
    }

    /// Submit the draft. An incomplete draft is ignored without any notice.
    pub fn submit_draft(&mut self) -> Option<Dispatch> {
        if !self.state.draft.is_complete() {
            debug!("draft is missing required fields, not submitting");
            return None;
        }
        match self
            .client
            .build_create_student(&self.state.draft.to_new_student())
        {
            Ok(request) => Some(Dispatch {
                pending: Pending::Create,
                request,
            }),
            Err(err) => {
                warn!(error = %err, "could not build create request");
                self.state.error = Some(CREATE_FAILED.to_string());
                None
            }
        }
    }

    /// Ask for confirmation, then mark the row busy and issue the delete.
    ///
    /// Returns `None` if the user declines or `id` is not in the loaded list.
    pub fn request_delete(&mut self, id: u64, prompt: &mut impl Prompt) -> Option<Dispatch> {
        let name = match self.state.students.iter().find(|s| s.id == id) {
            Some(student) => student.full_name(),
            None => {
                debug!(id, "delete requested for a student that is not listed");
                return None;
            }
        };
        if !prompt.confirm(&format!("Are you sure you want to delete {name}?")) {
            return None;
        }
        self.state.deleting_id = Some(id);
        debug!(id, "deleting student");
        Some(Dispatch {
            pending: Pending::Delete { id, name },
            request: self.client.build_delete_student(id),
        })
    }

    /// Feed back the outcome of a dispatched request. May return a follow-up
    /// dispatch (the reload after a create or delete).
    pub fn complete(
        &mut self,
        pending: Pending,
        outcome: Result<HttpResponse, ApiError>,
        prompt: &mut impl Prompt,
    ) -> Option<Dispatch> {
        match pending {
            Pending::Load { seq } => {
                self.finish_load(seq, outcome);
                None
            }
            Pending::Create => self.finish_create(outcome),
            Pending::Delete { id, name } => self.finish_delete(id, &name, outcome, prompt),
        }
    }

    fn finish_load(&mut self, seq: u64, outcome: Result<HttpResponse, ApiError>) {
        if seq != self.last_load {
            debug!(seq, latest = self.last_load, "dropping stale list response");
            return;
        }
        match outcome.and_then(|response| self.client.parse_list_students(response)) {
            Ok(envelope) => {
                debug!(count = envelope.data.len(), "students fetched");
                self.state.students = envelope.data;
            }
            Err(err) => {
                warn!(error = %err, "error fetching students");
                self.state.error = Some(FETCH_FAILED.to_string());
            }
        }
        self.state.loading = false;
    }

    fn finish_create(&mut self, outcome: Result<HttpResponse, ApiError>) -> Option<Dispatch> {
        match outcome.and_then(|response| self.client.parse_create_student(response)) {
            Ok(student) => {
                info!(id = student.id, code = %student.student_code, "student created");
                self.state.draft = Draft::default();
                Some(self.refresh())
            }
            Err(err) => {
                warn!(error = %err, "error creating student");
                self.state.error = Some(CREATE_FAILED.to_string());
                None
            }
        }
    }

    fn finish_delete(
        &mut self,
        id: u64,
        name: &str,
        outcome: Result<HttpResponse, ApiError>,
        prompt: &mut impl Prompt,
    ) -> Option<Dispatch> {
        if self.state.deleting_id == Some(id) {
            self.state.deleting_id = None;
        }
        match outcome.and_then(|response| self.client.parse_delete_student(response)) {
            Ok(receipt) => {
                info!(id, reply = %receipt.message, "student deleted");
                prompt.alert(&format!("{name} has been deleted successfully!"));
                Some(self.refresh())
            }
            Err(err) => {
                warn!(id, error = %err, "error deleting student");
                self.state.error = Some(format!("Failed to delete student: {err}"));
                prompt.alert(&format!("Failed to delete {name}. Please try again."));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    #[derive(Default)]
    struct Scripted {
        answer: bool,
        confirms: Vec<String>,
        alerts: Vec<String>,
    }

    impl Scripted {
        fn agreeing() -> Self {
            Self {
                answer: true,
                ..Self::default()
            }
        }
    }

    impl Prompt for Scripted {
        fn confirm(&mut self, message: &str) -> bool {
            self.confirms.push(message.to_string());
            self.answer
        }

        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_string());
        }
    }

    fn student_json(id: u64, first: &str, last: &str) -> String {
        format!(
            r#"{{"id":{id},"student_code":"SV{id:03}","first_name":"{first}","last_name":"{last}","email":"s{id}@example.com","status":"active","created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z"}}"#
        )
    }

    fn list_response(students: &[(u64, &str, &str)]) -> Result<HttpResponse, ApiError> {
        let items: Vec<String> = students
            .iter()
            .map(|(id, first, last)| student_json(*id, first, last))
            .collect();
        Ok(HttpResponse::new(
            200,
            format!(r#"{{"data":[{}],"count":{}}}"#, items.join(","), items.len()),
        ))
    }

    /// A controller that already shows students 1 (An Nguyen) and 2 (Binh Le).
    fn loaded() -> Controller {
        let mut controller = Controller::new(StudentClient::default());
        let dispatch = controller.mount().unwrap();
        let follow_up = controller.complete(
            dispatch.pending,
            list_response(&[(1, "An", "Nguyen"), (2, "Binh", "Le")]),
            &mut Scripted::default(),
        );
        assert!(follow_up.is_none());
        controller
    }

    fn fill_draft(controller: &mut Controller) {
        controller.set_draft_field(DraftField::StudentCode, "SV100").unwrap();
        controller.set_draft_field(DraftField::FirstName, "Chi").unwrap();
        controller.set_draft_field(DraftField::LastName, "Pham").unwrap();
        controller.set_draft_field(DraftField::Email, "chi@example.com").unwrap();
        controller.set_draft_field(DraftField::Major, "Biology").unwrap();
        controller.set_draft_field(DraftField::Year, "3").unwrap();
    }

    #[test]
    fn mount_loads_only_once() {
        let mut controller = Controller::new(StudentClient::default());
        let dispatch = controller.mount().expect("first mount loads");
        assert_eq!(dispatch.request.method, HttpMethod::Get);
        assert!(dispatch.request.path.ends_with("/students"));
        assert!(controller.state().is_loading());
        assert!(controller.mount().is_none());
    }

    #[test]
    fn load_replaces_list_and_clears_loading() {
        let controller = loaded();
        let state = controller.state();
        assert!(!state.is_loading());
        assert!(state.error().is_none());
        assert_eq!(state.students().len(), 2);

        let mut controller = controller;
        let dispatch = controller.refresh();
        controller.complete(
            dispatch.pending,
            list_response(&[(2, "Binh", "Le")]),
            &mut Scripted::default(),
        );
        let ids: Vec<u64> = controller.state().students().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn failed_load_sets_error_and_clears_loading() {
        let mut controller = loaded();
        let dispatch = controller.refresh();
        controller.complete(
            dispatch.pending,
            Err(ApiError::transport("connection refused")),
            &mut Scripted::default(),
        );
        assert_eq!(controller.state().error(), Some(FETCH_FAILED));
        assert!(!controller.state().is_loading());

        // the next successful load clears it
        let dispatch = controller.refresh();
        assert!(controller.state().error().is_none());
        controller.complete(dispatch.pending, list_response(&[]), &mut Scripted::default());
        assert!(controller.state().error().is_none());
        assert!(controller.state().students().is_empty());
    }

    #[test]
    fn stale_load_cannot_overwrite_newer_one() {
        let mut controller = loaded();
        let first = controller.refresh();
        let second = controller.refresh();

        controller.complete(
            second.pending,
            list_response(&[(3, "Dung", "Vo")]),
            &mut Scripted::default(),
        );
        controller.complete(
            first.pending,
            list_response(&[(1, "An", "Nguyen")]),
            &mut Scripted::default(),
        );

        let ids: Vec<u64> = controller.state().students().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3]);
        assert!(!controller.state().is_loading());
    }

    #[test]
    fn stale_load_leaves_loading_set_until_latest_returns() {
        let mut controller = loaded();
        let first = controller.refresh();
        let second = controller.refresh();
        controller.complete(first.pending, list_response(&[]), &mut Scripted::default());
        assert!(controller.state().is_loading());
        controller.complete(second.pending, list_response(&[]), &mut Scripted::default());
        assert!(!controller.state().is_loading());
    }

    #[test]
    fn incomplete_draft_issues_no_request() {
        let mut controller = loaded();
        for skipped in [
            DraftField::StudentCode,
            DraftField::FirstName,
            DraftField::LastName,
            DraftField::Email,
        ] {
            fill_draft(&mut controller);
            controller.set_draft_field(skipped, "   ").unwrap();
            assert!(controller.submit_draft().is_none(), "{skipped} left empty");
            assert!(controller.state().error().is_none());
        }
    }

    #[test]
    fn successful_create_resets_draft_and_reloads_once() {
        let mut controller = loaded();
        fill_draft(&mut controller);

        let dispatch = controller.submit_draft().expect("complete draft submits");
        assert_eq!(dispatch.pending, Pending::Create);
        assert_eq!(dispatch.request.method, HttpMethod::Post);
        let body: serde_json::Value =
            serde_json::from_str(dispatch.request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["status"], "active");
        assert_eq!(body["year"], 3);
        assert_eq!(body["major"], "Biology");

        let created = format!(r#"{{"data":{}}}"#, student_json(3, "Chi", "Pham"));
        let follow_up = controller.complete(
            dispatch.pending,
            Ok(HttpResponse::new(201, created)),
            &mut Scripted::default(),
        );

        let reload = follow_up.expect("create triggers a reload");
        assert!(matches!(reload.pending, Pending::Load { .. }));
        assert_eq!(controller.state().draft(), &Draft::default());
        assert_eq!(controller.state().draft().year, 1);

        // the reload itself triggers nothing further
        let next = controller.complete(
            reload.pending,
            list_response(&[(1, "An", "Nguyen"), (2, "Binh", "Le"), (3, "Chi", "Pham")]),
            &mut Scripted::default(),
        );
        assert!(next.is_none());
        assert_eq!(controller.state().students().len(), 3);
    }

    #[test]
    fn failed_create_keeps_draft() {
        let mut controller = loaded();
        fill_draft(&mut controller);
        let before = controller.state().draft().clone();

        let dispatch = controller.submit_draft().unwrap();
        let follow_up = controller.complete(
            dispatch.pending,
            Ok(HttpResponse::new(409, r#"{"error":"duplicate"}"#)),
            &mut Scripted::default(),
        );
        assert!(follow_up.is_none());
        assert_eq!(controller.state().error(), Some(CREATE_FAILED));
        assert_eq!(controller.state().draft(), &before);
    }

    #[test]
    fn declined_delete_does_nothing() {
        let mut controller = loaded();
        let mut prompt = Scripted::default();
        assert!(controller.request_delete(1, &mut prompt).is_none());
        assert_eq!(prompt.confirms, vec!["Are you sure you want to delete An Nguyen?"]);
        assert_eq!(controller.state().deleting_id(), None);
    }

    #[test]
    fn delete_of_unlisted_id_is_ignored() {
        let mut controller = loaded();
        let mut prompt = Scripted::agreeing();
        assert!(controller.request_delete(99, &mut prompt).is_none());
        assert!(prompt.confirms.is_empty());
    }

    #[test]
    fn successful_delete_reloads_once_and_notifies() {
        let mut controller = loaded();
        let mut prompt = Scripted::agreeing();

        let dispatch = controller.request_delete(1, &mut prompt).unwrap();
        assert_eq!(dispatch.request.method, HttpMethod::Delete);
        assert!(controller.state().is_deleting(1));

        let follow_up = controller.complete(
            dispatch.pending,
            Ok(HttpResponse::new(200, r#"{"message":"Student deleted successfully"}"#)),
            &mut prompt,
        );
        assert_eq!(prompt.alerts, vec!["An Nguyen has been deleted successfully!"]);
        assert_eq!(controller.state().deleting_id(), None);

        let reload = follow_up.expect("delete triggers a reload");
        let next = controller.complete(
            reload.pending,
            list_response(&[(2, "Binh", "Le")]),
            &mut prompt,
        );
        assert!(next.is_none());
        assert_eq!(controller.state().students().len(), 1);
    }

    #[test]
    fn failed_delete_leaves_list_untouched() {
        let mut controller = loaded();
        let before = controller.state().students().to_vec();
        let mut prompt = Scripted::agreeing();

        let dispatch = controller.request_delete(2, &mut prompt).unwrap();
        let follow_up = controller.complete(
            dispatch.pending,
            Ok(HttpResponse::new(500, "boom")),
            &mut prompt,
        );

        assert!(follow_up.is_none());
        assert_eq!(controller.state().students(), before.as_slice());
        assert_eq!(controller.state().deleting_id(), None);
        let error = controller.state().error().unwrap();
        assert!(error.starts_with("Failed to delete student:"));
        assert!(error.contains("500") && error.contains("boom"));
        assert_eq!(prompt.alerts, vec!["Failed to delete Binh Le. Please try again."]);
    }

    #[test]
    fn busy_marker_is_per_row() {
        let mut controller = loaded();
        let mut prompt = Scripted::agreeing();

        let first = controller.request_delete(1, &mut prompt).unwrap();
        assert!(controller.state().is_deleting(1));
        assert!(!controller.state().is_deleting(2));

        // a second delete moves the marker; finishing the first must not clear it
        let second = controller.request_delete(2, &mut prompt).unwrap();
        assert!(controller.state().is_deleting(2));
        controller.complete(first.pending, Ok(HttpResponse::new(500, "boom")), &mut prompt);
        assert!(controller.state().is_deleting(2));
        assert!(!controller.state().is_deleting(1));

        controller.complete(second.pending, Ok(HttpResponse::new(500, "boom")), &mut prompt);
        assert_eq!(controller.state().deleting_id(), None);
    }

    #[test]
    fn year_is_validated_at_the_boundary() {
        let mut draft = Draft::default();
        assert_eq!(
            draft.set(DraftField::Year, "abc"),
            Err(DraftError::InvalidYear {
                input: "abc".to_string()
            })
        );
        assert_eq!(
            draft.set(DraftField::Year, "7"),
            Err(DraftError::YearOutOfRange { year: 7 })
        );
        assert_eq!(
            draft.set(DraftField::Year, "0"),
            Err(DraftError::YearOutOfRange { year: 0 })
        );
        assert_eq!(draft.year, 1);
        draft.set(DraftField::Year, " 6 ").unwrap();
        assert_eq!(draft.year, 6);
    }

    #[test]
    fn empty_major_is_sent_as_absent() {
        let draft = Draft {
            student_code: "SV1".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            email: "a@b.c".to_string(),
            ..Draft::default()
        };
        let input = draft.to_new_student();
        assert_eq!(input.major, None);
        assert_eq!(input.year, Some(1));
    }

    #[test]
    fn field_names_parse_with_aliases() {
        assert_eq!("first-name".parse::<DraftField>(), Ok(DraftField::FirstName));
        assert_eq!("code".parse::<DraftField>(), Ok(DraftField::StudentCode));
        assert!("gpa".parse::<DraftField>().is_err());
    }
}

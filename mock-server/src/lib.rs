use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

pub const STATUSES: [&str; 4] = ["active", "inactive", "graduated", "suspended"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Student {
    pub id: u64,
    pub student_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub address: Option<String>,
    pub major: Option<String>,
    pub year: Option<i64>,
    pub gpa: Option<f64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateStudent {
    #[serde(default)]
    pub student_code: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub address: Option<String>,
    pub major: Option<String>,
    pub year: Option<i64>,
    pub gpa: Option<f64>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStudent {
    pub student_code: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub address: Option<String>,
    pub major: Option<String>,
    pub year: Option<i64>,
    pub gpa: Option<f64>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MajorQuery {
    pub major: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    students: BTreeMap<u64, Student>,
}

impl Store {
    fn conflicts(&self, student: &Student) -> Option<&'static str> {
        self.students
            .values()
            .filter(|other| other.id != student.id)
            .find_map(|other| {
                if other.student_code == student.student_code {
                    Some("student_code already exists")
                } else if other.email == student.email {
                    Some("email already exists")
                } else {
                    None
                }
            })
    }
}

pub type Db = Arc<RwLock<Store>>;

type ApiResult = Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)>;

fn fail(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message })))
}

fn not_found() -> (StatusCode, Json<Value>) {
    fail(StatusCode::NOT_FOUND, "Student not found")
}

fn validate(student: &Student) -> Result<(), (StatusCode, Json<Value>)> {
    let required = [
        ("student_code", &student.student_code),
        ("first_name", &student.first_name),
        ("last_name", &student.last_name),
        ("email", &student.email),
    ];
    if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(fail(StatusCode::BAD_REQUEST, &format!("{name} is required")));
    }
    if matches!(student.year, Some(year) if !(1..=6).contains(&year)) {
        return Err(fail(StatusCode::BAD_REQUEST, "year must be between 1 and 6"));
    }
    if matches!(student.gpa, Some(gpa) if !(0.0..=4.0).contains(&gpa)) {
        return Err(fail(StatusCode::BAD_REQUEST, "gpa must be between 0 and 4"));
    }
    if !STATUSES.contains(&student.status.as_str()) {
        return Err(fail(StatusCode::BAD_REQUEST, "unknown status"));
    }
    Ok(())
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let api = Router::new()
        .route("/students", get(list_students).post(create_student))
        .route("/students/major", get(students_by_major))
        .route("/students/status", get(students_by_status))
        .route(
            "/students/{id}",
            get(get_student).put(update_student).delete(delete_student),
        );
    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(health))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock student service listening");
    }
    axum::serve(listener, app()).await
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_students(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let students: Vec<&Student> = store.students.values().collect();
    Json(json!({ "data": students, "count": students.len() }))
}

async fn create_student(State(db): State<Db>, Json(input): Json<CreateStudent>) -> ApiResult {
    let mut store = db.write().await;
    let now = Utc::now();
    let mut student = Student {
        id: 0,
        student_code: input.student_code,
        first_name: input.first_name,
        last_name: input.last_name,
        email: input.email,
        phone: input.phone,
        date_of_birth: input.date_of_birth,
        address: input.address,
        major: input.major,
        year: input.year,
        gpa: input.gpa,
        status: input.status.unwrap_or_else(|| "active".to_string()),
        created_at: now,
        updated_at: now,
    };
    validate(&student)?;
    if let Some(message) = store.conflicts(&student) {
        return Err(fail(StatusCode::CONFLICT, message));
    }
    store.next_id += 1;
    student.id = store.next_id;
    debug!(id = student.id, code = %student.student_code, "student created");
    store.students.insert(student.id, student.clone());
    Ok((StatusCode::CREATED, Json(json!({ "data": student }))))
}

async fn get_student(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult {
    let store = db.read().await;
    let student = store.students.get(&id).ok_or_else(not_found)?;
    Ok((StatusCode::OK, Json(json!({ "data": student }))))
}

async fn update_student(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateStudent>,
) -> ApiResult {
    let mut store = db.write().await;
    let mut student = store.students.get(&id).cloned().ok_or_else(not_found)?;
    if let Some(code) = input.student_code {
        student.student_code = code;
    }
    if let Some(first_name) = input.first_name {
        student.first_name = first_name;
    }
    if let Some(last_name) = input.last_name {
        student.last_name = last_name;
    }
    if let Some(email) = input.email {
        student.email = email;
    }
    if input.phone.is_some() {
        student.phone = input.phone;
    }
    if input.date_of_birth.is_some() {
        student.date_of_birth = input.date_of_birth;
    }
    if input.address.is_some() {
        student.address = input.address;
    }
    if input.major.is_some() {
        student.major = input.major;
    }
    if input.year.is_some() {
        student.year = input.year;
    }
    if input.gpa.is_some() {
        student.gpa = input.gpa;
    }
    if let Some(status) = input.status {
        student.status = status;
    }
    validate(&student)?;
    if let Some(message) = store.conflicts(&student) {
        return Err(fail(StatusCode::CONFLICT, message));
    }
    student.updated_at = Utc::now();
    store.students.insert(id, student.clone());
    Ok((StatusCode::OK, Json(json!({ "data": student }))))
}

async fn delete_student(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult {
    let mut store = db.write().await;
    store.students.remove(&id).ok_or_else(not_found)?;
    debug!(id, "student deleted");
    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Student deleted successfully" })),
    ))
}

async fn students_by_major(State(db): State<Db>, Query(query): Query<MajorQuery>) -> ApiResult {
    let major = query
        .major
        .filter(|major| !major.is_empty())
        .ok_or_else(|| fail(StatusCode::BAD_REQUEST, "Major parameter is required"))?;
    let store = db.read().await;
    let students: Vec<&Student> = store
        .students
        .values()
        .filter(|student| student.major.as_deref() == Some(major.as_str()))
        .collect();
    Ok((
        StatusCode::OK,
        Json(json!({ "data": students, "count": students.len(), "major": major })),
    ))
}

async fn students_by_status(State(db): State<Db>, Query(query): Query<StatusQuery>) -> Json<Value> {
    let status = query
        .status
        .filter(|status| !status.is_empty())
        .unwrap_or_else(|| "active".to_string());
    let store = db.read().await;
    let students: Vec<&Student> = store
        .students
        .values()
        .filter(|student| student.status == status)
        .collect();
    Json(json!({ "data": students, "count": students.len(), "status": status }))
}

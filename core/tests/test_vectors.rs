//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results or errors. Comparing parsed JSON (not raw
//! strings) avoids false negatives from field-ordering differences.

use serde_json::Value;
use student_core::{
    ApiError, DeleteReceipt, Envelope, HealthStatus, HttpMethod, HttpRequest, HttpResponse,
    NewStudent, Student, StudentClient, StudentStatus, StudentUpdate,
};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn client() -> StudentClient {
    StudentClient::new(BASE_URL)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn cases(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

/// Check method, target and (when the vector has one) the JSON body. The
/// target is either a `path` under the base URL or an absolute `url`.
fn check_request(name: &str, req: &HttpRequest, case: &Value) {
    let expected = &case["expected_request"];
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    let target = match expected.get("url") {
        Some(url) => url.as_str().unwrap().to_string(),
        None => format!("{BASE_URL}{}", expected["path"].as_str().unwrap()),
    };
    assert_eq!(req.path, target, "{name}: path");

    if let Some(headers) = expected.get("headers") {
        let expected_headers: Vec<(String, String)> = headers
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");
    }

    match expected.get("body") {
        Some(body) => {
            let req_body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&req_body, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

/// Compare a parse result against `expected_result` or `expected_error`.
fn check_outcome<T>(name: &str, result: Result<T, ApiError>, case: &Value)
where
    T: serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
{
    if let Some(expected_error) = case.get("expected_error") {
        let err = result.unwrap_err();
        let status = expected_error["status"].as_u64().unwrap() as u16;
        assert_eq!(err.status(), Some(status), "{name}: status");
        let needle = expected_error["contains"].as_str().unwrap();
        assert!(err.to_string().contains(needle), "{name}: message {err}");
    } else {
        let expected: T = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(result.unwrap(), expected, "{name}: parsed result");
    }
}

#[test]
fn list_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/list.json")) {
        let name = case["name"].as_str().unwrap();
        check_request(name, &c.build_list_students(), &case);
        check_outcome::<Envelope<Vec<Student>>>(name, c.parse_list_students(simulated(&case)), &case);
    }
}

#[test]
fn get_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/get.json")) {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_u64().unwrap();
        check_request(name, &c.build_get_student(id), &case);
        check_outcome::<Student>(name, c.parse_get_student(simulated(&case)), &case);
    }
}

#[test]
fn create_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/create.json")) {
        let name = case["name"].as_str().unwrap();
        let input: NewStudent = serde_json::from_value(case["input"].clone()).unwrap();
        check_request(name, &c.build_create_student(&input).unwrap(), &case);
        check_outcome::<Student>(name, c.parse_create_student(simulated(&case)), &case);
    }
}

#[test]
fn update_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/update.json")) {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_u64().unwrap();
        let input: StudentUpdate = serde_json::from_value(case["input"].clone()).unwrap();
        check_request(name, &c.build_update_student(id, &input).unwrap(), &case);
        check_outcome::<Student>(name, c.parse_update_student(simulated(&case)), &case);
    }
}

#[test]
fn delete_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/delete.json")) {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_u64().unwrap();
        check_request(name, &c.build_delete_student(id), &case);
        check_outcome::<DeleteReceipt>(name, c.parse_delete_student(simulated(&case)), &case);
    }
}

#[test]
fn by_major_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/by_major.json")) {
        let name = case["name"].as_str().unwrap();
        let major = case["input_major"].as_str().unwrap();
        check_request(name, &c.build_list_students_by_major(major), &case);
        check_outcome::<Envelope<Vec<Student>>>(
            name,
            c.parse_list_students_by_major(simulated(&case)),
            &case,
        );
    }
}

#[test]
fn by_status_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/by_status.json")) {
        let name = case["name"].as_str().unwrap();
        let status: Option<StudentStatus> =
            serde_json::from_value(case["input_status"].clone()).unwrap();
        check_request(
            name,
            &c.build_list_students_by_status(status.unwrap_or_default()),
            &case,
        );
        check_outcome::<Envelope<Vec<Student>>>(
            name,
            c.parse_list_students_by_status(simulated(&case)),
            &case,
        );
    }
}

#[test]
fn health_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/health.json")) {
        let name = case["name"].as_str().unwrap();
        check_request(name, &c.build_health_check(), &case);
        check_outcome::<HealthStatus>(name, c.parse_health_check(simulated(&case)), &case);
    }
}

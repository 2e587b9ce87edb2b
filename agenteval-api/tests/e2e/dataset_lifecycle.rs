use super::common::spawn_server;
use agenteval::model::{Dataset, TestCase};
use serde_json::json;

#[tokio::test]
async fn create_list_get_and_delete_a_dataset() {
    let server = spawn_server().await;

    let created: Dataset = server
        .client
        .post(format!("{}/api/datasets", server.base_url))
        .json(&json!({"name": "Email triage", "goal": "Evaluate email-handling accuracy"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created.name, "Email triage");

    let list: Vec<Dataset> = server.client.get(format!("{}/api/datasets", server.base_url)).send().await.unwrap().json().await.unwrap();
    assert!(list.iter().any(|d| d.dataset_id == created.dataset_id));

    let fetched: Dataset = server
        .client
        .get(format!("{}/api/datasets/{}", server.base_url, created.dataset_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched.dataset_id, created.dataset_id);

    let status = server
        .client
        .delete(format!("{}/api/datasets/{}", server.base_url, created.dataset_id))
        .send()
        .await
        .unwrap()
        .status();
    assert!(status.is_success());

    let not_found = server
        .client
        .get(format!("{}/api/datasets/{}", server.base_url, created.dataset_id))
        .send()
        .await
        .unwrap();
    assert_eq!(not_found.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn creating_a_testcase_under_an_unknown_dataset_is_not_found() {
    let server = spawn_server().await;

    let resp = server
        .client
        .post(format!("{}/api/datasets/ds_does_not_exist/testcases", server.base_url))
        .json(&json!({"input": "hi", "expected_response": "hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn testcase_created_under_a_dataset_is_listed_under_it() {
    let server = spawn_server().await;

    let dataset: Dataset = server
        .client
        .post(format!("{}/api/datasets", server.base_url))
        .json(&json!({"name": "Arithmetic", "goal": "basic math"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let testcase: TestCase = server
        .client
        .post(format!("{}/api/datasets/{}/testcases", server.base_url, dataset.dataset_id))
        .json(&json!({"input": "2+2?", "expected_response": "4"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(testcase.dataset_id, dataset.dataset_id);
    assert_eq!(testcase.assertion_mode, agenteval::model::AssertionMode::ResponseOnly);

    let listed: Vec<TestCase> = server
        .client
        .get(format!("{}/api/datasets/{}/testcases", server.base_url, dataset.dataset_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].tc_id, testcase.tc_id);
}

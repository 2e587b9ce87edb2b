use super::common::spawn_server;
use agenteval::model::{Agent, Dataset};

#[tokio::test]
async fn startup_reconciliation_seeds_a_default_agent() {
    let server = spawn_server().await;

    let agents: Vec<Agent> = server.client.get(format!("{}/api/agents", server.base_url)).send().await.unwrap().json().await.unwrap();
    assert!(agents.iter().any(|a| a.name == "Computer Use Agent"));
}

#[tokio::test]
async fn seed_demo_adds_a_runnable_dataset_and_agent() {
    let server = spawn_server().await;

    let status = server.client.post(format!("{}/api/admin/seed-demo", server.base_url)).send().await.unwrap().status();
    assert!(status.is_success());

    let datasets: Vec<Dataset> = server.client.get(format!("{}/api/datasets", server.base_url)).send().await.unwrap().json().await.unwrap();
    assert!(datasets.iter().any(|d| d.name == "Demo Dataset"));

    let agents: Vec<Agent> = server.client.get(format!("{}/api/agents", server.base_url)).send().await.unwrap().json().await.unwrap();
    assert!(agents.iter().any(|a| a.name == "Demo Echo Agent"));
}

#[tokio::test]
async fn reset_wipes_every_resettable_table() {
    let server = spawn_server().await;
    server.client.post(format!("{}/api/admin/seed-demo", server.base_url)).send().await.unwrap();

    let status = server.client.post(format!("{}/api/admin/reset", server.base_url)).send().await.unwrap().status();
    assert!(status.is_success());

    let agents: Vec<Agent> = server.client.get(format!("{}/api/agents", server.base_url)).send().await.unwrap().json().await.unwrap();
    assert!(agents.is_empty());
    let datasets: Vec<Dataset> = server.client.get(format!("{}/api/datasets", server.base_url)).send().await.unwrap().json().await.unwrap();
    assert!(datasets.is_empty());
}

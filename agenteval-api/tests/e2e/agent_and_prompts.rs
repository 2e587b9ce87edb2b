use super::common::spawn_server;
use agenteval::model::{Agent, PromptVersion};
use serde_json::json;

#[tokio::test]
async fn create_agent_add_prompt_version_and_activate_it() {
    let server = spawn_server().await;

    let agent: Agent = server
        .client
        .post(format!("{}/api/agents", server.base_url))
        .json(&json!({"name": "Support Bot", "endpoint_url": "http://localhost:8001/invoke", "model_label": "gpt-4o-mini"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(agent.name, "Support Bot");

    let prompt: PromptVersion = server
        .client
        .post(format!("{}/api/agents/{}/prompts", server.base_url, agent.agent_id))
        .json(&json!({"system_prompt": "You are a support agent."}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(prompt.version, 1);
    assert!(!prompt.is_active);

    let activate_status = server
        .client
        .post(format!("{}/api/agents/{}/prompts/{}/activate", server.base_url, agent.agent_id, prompt.version))
        .send()
        .await
        .unwrap()
        .status();
    assert!(activate_status.is_success());

    let versions: Vec<PromptVersion> = server
        .client
        .get(format!("{}/api/agents/{}/prompts", server.base_url, agent.agent_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(versions.iter().find(|p| p.version == 1).unwrap().is_active);
}

#[tokio::test]
async fn patch_updates_only_the_supplied_fields() {
    let server = spawn_server().await;

    let agent: Agent = server
        .client
        .post(format!("{}/api/agents", server.base_url))
        .json(&json!({"name": "Original Name", "endpoint_url": "http://localhost:8001/invoke", "model_label": "gpt-4o-mini"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let updated: Agent = server
        .client
        .patch(format!("{}/api/agents/{}", server.base_url, agent.agent_id))
        .json(&json!({"description": "A newly-documented agent."}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(updated.name, "Original Name");
    assert_eq!(updated.description, "A newly-documented agent.");
    assert_eq!(updated.endpoint_url, agent.endpoint_url);
}

#[tokio::test]
async fn deleting_an_agent_then_fetching_it_is_not_found() {
    let server = spawn_server().await;

    let agent: Agent = server
        .client
        .post(format!("{}/api/agents", server.base_url))
        .json(&json!({"name": "Throwaway", "endpoint_url": "http://localhost:8001/invoke", "model_label": "gpt-4o-mini"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    server.client.delete(format!("{}/api/agents/{}", server.base_url, agent.agent_id)).send().await.unwrap();

    let resp = server.client.get(format!("{}/api/agents/{}", server.base_url, agent.agent_id)).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
}

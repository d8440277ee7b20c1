mod common;

use anyhow::Result;
use chess_tournament_api::api::Event;
use chess_tournament_api::handlers::Function;
use chess_tournament_api::testing::MemoryStore;
use chess_tournament_api::types::TournamentStatus;
use serde_json::json;

use common::{call, date};

fn seeded() -> MemoryStore {
    let store = MemoryStore::new();
    let late = store.seed_tournament("Autumn Cup", TournamentStatus::Registration, date("2025-10-01"), None);
    store.seed_tournament("Winter Open", TournamentStatus::Planned, date("2025-12-01"), None);
    let early = store.seed_tournament("Spring Open", TournamentStatus::Registration, date("2025-03-01"), None);
    store.seed_tournament("Old Blitz", TournamentStatus::Completed, date("2024-06-01"), None);

    store.seed_registration(early.id, "registered");
    store.seed_registration(early.id, "registered");
    store.seed_registration(early.id, "cancelled");
    store.seed_registration(late.id, "registered");
    store
}

#[tokio::test]
async fn lists_soonest_first_with_real_participant_counts() -> Result<()> {
    let store = seeded();

    let (status, body) = call(Function::GetTournaments, &store, Event::new("GET", "/")).await?;
    assert_eq!(status, 200);
    assert_eq!(body["count"], json!(4));

    let names: Vec<&str> = body["tournaments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Old Blitz", "Spring Open", "Autumn Cup", "Winter Open"]);

    let spring = &body["tournaments"][1];
    assert_eq!(spring["current_participants"], json!(2));
    assert_eq!(spring["entry_fee"], json!(0.0));
    assert!(spring.get("created_by").is_none());
    Ok(())
}

#[tokio::test]
async fn filters_by_status() -> Result<()> {
    let store = seeded();

    let event = Event::new("GET", "/").with_query("status", "registration");
    let (status, body) = call(Function::GetTournaments, &store, event).await?;
    assert_eq!(status, 200);
    assert_eq!(body["count"], json!(2));
    for t in body["tournaments"].as_array().unwrap() {
        assert_eq!(t["status"], json!("registration"));
    }

    let event = Event::new("GET", "/").with_query("status", "'; DROP TABLE tournaments; --");
    let (status, body) = call(Function::GetTournaments, &store, event).await?;
    assert_eq!(status, 400);
    assert!(body["field_errors"]["status"].is_string());
    Ok(())
}

#[tokio::test]
async fn limit_defaults_and_clamps() -> Result<()> {
    let store = MemoryStore::new();
    for day in 1..=12 {
        store.seed_tournament(&format!("Day {day}"), TournamentStatus::Planned, date(&format!("2025-01-{day:02}")), None);
    }

    let (_, body) = call(Function::GetTournaments, &store, Event::new("GET", "/")).await?;
    assert_eq!(body["count"], json!(10));

    let event = Event::new("GET", "/").with_query("limit", "3");
    let (_, body) = call(Function::GetTournaments, &store, event).await?;
    assert_eq!(body["count"], json!(3));
    assert_eq!(body["tournaments"][0]["name"], json!("Day 1"));

    let event = Event::new("GET", "/").with_query("limit", "-5");
    let (_, body) = call(Function::GetTournaments, &store, event).await?;
    assert_eq!(body["count"], json!(1));

    let event = Event::new("GET", "/").with_query("limit", "500");
    let (_, body) = call(Function::GetTournaments, &store, event).await?;
    assert_eq!(body["count"], json!(12));
    Ok(())
}

#[tokio::test]
async fn only_get_is_allowed() -> Result<()> {
    let store = MemoryStore::new();
    let (status, _) = call(Function::GetTournaments, &store, Event::new("POST", "/")).await?;
    assert_eq!(status, 405);
    Ok(())
}

#[tokio::test]
async fn database_errors_are_generic() -> Result<()> {
    let store = MemoryStore::new();
    store.set_unavailable(true);

    let (status, body) = call(Function::GetTournaments, &store, Event::new("GET", "/")).await?;
    assert_eq!(status, 500);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Internal server error"));
    Ok(())
}

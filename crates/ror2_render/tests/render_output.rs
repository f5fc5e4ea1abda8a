use std::path::PathBuf;

use ror2_core::catalog::Catalog;
use ror2_core::config::Config;
use ror2_core::core_api::{Engine, Outcome, ProfileListing, ProfileSummary, RejectReason};
use ror2_core::store::Profile;
use ror2_render::{
    render_json_coins, render_json_listing, render_json_outcome, render_json_summary,
    render_text_listing, render_text_outcome, render_text_summary,
};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn summary_from_fixture(name: &str) -> ProfileSummary {
    let path = workspace_root().join("tests/profiles").join(name);
    let mut profile = Profile::open("76561198000000000", &path).expect("fixture should parse");
    Engine::new(&Config::default(), Catalog::empty())
        .summary(&mut profile)
        .expect("summary should build")
}

#[test]
fn summary_json_uses_canonical_key_order() {
    let value = render_json_summary(&summary_from_fixture("veteran_profile.xml"));
    let keys: Vec<&str> = value
        .as_object()
        .expect("json should be an object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(
        keys,
        vec![
            "name",
            "coins",
            "characters",
            "skills_skins",
            "items",
            "achievements",
            "logbook",
            "logbook_total",
        ]
    );

    let logbook_keys: Vec<&str> = value["logbook"]
        .as_object()
        .expect("logbook should be an object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(logbook_keys, vec!["items", "equipment", "artifacts", "drones"]);
}

#[test]
fn summary_json_values_match_profile() {
    let value = render_json_summary(&summary_from_fixture("veteran_profile.xml"));
    assert_eq!(value["name"], "Veteran");
    assert_eq!(value["coins"], 120);
    assert_eq!(
        value["characters"],
        serde_json::json!(["Characters.Commando", "Characters.Huntress"])
    );
    assert_eq!(value["logbook"]["equipment"], serde_json::json!(["EquipmentIndex.Blackhole"]));
    assert_eq!(value["logbook_total"], 3);
}

#[test]
fn listing_json_reports_steam_id() {
    let listing = vec![ProfileListing {
        id: "42_p.xml".to_string(),
        account_id: "42".to_string(),
        name: "Survivor".to_string(),
        file: "p.xml".to_string(),
    }];
    let value = render_json_listing(&listing);
    assert_eq!(
        value,
        serde_json::json!([{"id": "42_p.xml", "steam_id": "42", "name": "Survivor", "file": "p.xml"}])
    );

    let text = render_text_listing(&listing);
    assert_eq!(text, "42_p.xml  Survivor\n");
    assert_eq!(render_text_listing(&[]), "No profiles found.\n");
}

#[test]
fn outcome_json_flags_success() {
    assert_eq!(
        render_json_outcome(&Outcome::applied(4)),
        serde_json::json!({"success": true, "count": 4})
    );
    assert_eq!(
        render_json_outcome(&Outcome::rejected(RejectReason::Conflict, "already unlocked")),
        serde_json::json!({"success": false, "reason": "conflict", "message": "already unlocked"})
    );
    assert_eq!(
        render_json_coins(7),
        serde_json::json!({"success": true, "coins": 7})
    );
}

#[test]
fn text_renderers_are_readable() {
    let text = render_text_summary(&summary_from_fixture("sample_profile.xml"));
    assert!(text.contains("Profile: Survivor"));
    assert!(text.contains("Lunar Coins: 0"));
    assert!(text.contains("Characters.Commando"));
    assert!(text.contains("Logbook: 0 discovered"));

    assert_eq!(render_text_outcome(&Outcome::applied(2)), "ok (2 changed)");
    assert_eq!(
        render_text_outcome(&Outcome::rejected(RejectReason::NotFound, "no stats")),
        "failed [not_found]: no stats"
    );
}

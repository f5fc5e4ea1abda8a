use std::fmt::Write as _;

use ror2_core::core_api::{Outcome, ProfileListing, ProfileSummary, RejectReason};
use serde_json::{Map as JsonMap, Value as JsonValue};

const LABEL_WIDTH: usize = 14;

pub fn render_json_listing(profiles: &[ProfileListing]) -> JsonValue {
    JsonValue::Array(
        profiles
            .iter()
            .map(|profile| {
                let mut m = JsonMap::new();
                m.insert("id".to_string(), JsonValue::String(profile.id.clone()));
                m.insert(
                    "steam_id".to_string(),
                    JsonValue::String(profile.account_id.clone()),
                );
                m.insert("name".to_string(), JsonValue::String(profile.name.clone()));
                m.insert("file".to_string(), JsonValue::String(profile.file.clone()));
                JsonValue::Object(m)
            })
            .collect(),
    )
}

pub fn render_json_summary(summary: &ProfileSummary) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("name".to_string(), JsonValue::String(summary.name.clone()));
    out.insert("coins".to_string(), JsonValue::from(summary.coins));
    out.insert("characters".to_string(), strings_to_json(&summary.characters));
    out.insert(
        "skills_skins".to_string(),
        strings_to_json(&summary.skills_skins),
    );
    out.insert("items".to_string(), strings_to_json(&summary.items));
    out.insert(
        "achievements".to_string(),
        strings_to_json(&summary.achievements),
    );

    let mut logbook = JsonMap::new();
    logbook.insert("items".to_string(), strings_to_json(&summary.logbook.items));
    logbook.insert(
        "equipment".to_string(),
        strings_to_json(&summary.logbook.equipment),
    );
    logbook.insert(
        "artifacts".to_string(),
        strings_to_json(&summary.logbook.artifacts),
    );
    logbook.insert(
        "drones".to_string(),
        strings_to_json(&summary.logbook.drones),
    );
    out.insert("logbook".to_string(), JsonValue::Object(logbook));
    out.insert(
        "logbook_total".to_string(),
        JsonValue::from(summary.logbook_total),
    );

    JsonValue::Object(out)
}

pub fn render_json_outcome(outcome: &Outcome) -> JsonValue {
    let mut out = JsonMap::new();
    match outcome {
        Outcome::Applied { count } => {
            out.insert("success".to_string(), JsonValue::Bool(true));
            out.insert("count".to_string(), JsonValue::from(*count));
        }
        Outcome::Rejected { reason, message } => {
            out.insert("success".to_string(), JsonValue::Bool(false));
            out.insert(
                "reason".to_string(),
                JsonValue::String(reason_name(*reason).to_string()),
            );
            out.insert("message".to_string(), JsonValue::String(message.clone()));
        }
    }
    JsonValue::Object(out)
}

pub fn render_json_coins(coins: i64) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("success".to_string(), JsonValue::Bool(true));
    out.insert("coins".to_string(), JsonValue::from(coins));
    JsonValue::Object(out)
}

pub fn render_text_listing(profiles: &[ProfileListing]) -> String {
    if profiles.is_empty() {
        return "No profiles found.\n".to_string();
    }

    let id_width = profiles
        .iter()
        .map(|profile| profile.id.len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for profile in profiles {
        let _ = writeln!(out, "{:<id_width$}  {}", profile.id, profile.name);
    }
    out
}

pub fn render_text_summary(summary: &ProfileSummary) -> String {
    let mut out = String::new();
    let width = LABEL_WIDTH;
    let _ = writeln!(out, "{:>width$}: {}", "Profile", summary.name);
    let _ = writeln!(out, "{:>width$}: {}", "Lunar Coins", summary.coins);
    push_section(&mut out, "Characters", &summary.characters);
    push_section(&mut out, "Skills/Skins", &summary.skills_skins);
    push_section(&mut out, "Items", &summary.items);
    push_section(&mut out, "Achievements", &summary.achievements);

    let _ = writeln!(
        out,
        "{:>width$}: {} discovered",
        "Logbook", summary.logbook_total
    );
    push_section(&mut out, "Item Log", &summary.logbook.items);
    push_section(&mut out, "Equipment Log", &summary.logbook.equipment);
    push_section(&mut out, "Artifact Log", &summary.logbook.artifacts);
    push_section(&mut out, "Drone Log", &summary.logbook.drones);
    out
}

pub fn render_text_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Applied { count } => format!("ok ({count} changed)"),
        Outcome::Rejected { reason, message } => {
            format!("failed [{}]: {message}", reason_name(*reason))
        }
    }
}

fn push_section(out: &mut String, label: &str, values: &[String]) {
    let width = LABEL_WIDTH;
    let _ = writeln!(out, "{:>width$}: {}", label, values.len());
    for value in values {
        let _ = writeln!(out, "{:>width$}  {}", "", value);
    }
}

fn reason_name(reason: RejectReason) -> &'static str {
    match reason {
        RejectReason::NotFound => "not_found",
        RejectReason::InvalidArgument => "invalid_argument",
        RejectReason::Conflict => "conflict",
    }
}

fn strings_to_json(values: &[String]) -> JsonValue {
    JsonValue::Array(values.iter().cloned().map(JsonValue::String).collect())
}

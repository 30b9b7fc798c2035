//! JSON decoders for raw oracle responses.
//!
//! Action selection answers with
//! `{"selected_hero_id", "selected_skill", "target_type", "teammate_target_id"}`,
//! targeting with `{"target_position", "guessed_identity"}` or `{"action": "SURRENDER"}`,
//! skill parsing with `{"damage_amount", "is_aoe", "targets_lowest"}`.
//! Anything missing or ill-typed is `OracleError::Malformed`; range checks that
//! depend on live state are left to the orchestrator.

use serde_json::{Map, Value};

use super::{ActionDecision, OracleError, TargetReply};
use crate::combat::ParsedSkill;
use crate::content::classify_active;
use crate::types::TargetType;

fn malformed(message: impl Into<String>) -> OracleError {
    OracleError::Malformed(message.into())
}

fn object(raw: &str) -> Result<Map<String, Value>, OracleError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(malformed(format!("expected a JSON object, got {other}"))),
        Err(err) => Err(malformed(format!("invalid JSON: {err}"))),
    }
}

fn position(map: &Map<String, Value>, key: &str) -> Result<u8, OracleError> {
    let value = map.get(key).ok_or_else(|| malformed(format!("missing `{key}`")))?;
    value
        .as_u64()
        .and_then(|raw| u8::try_from(raw).ok())
        .ok_or_else(|| malformed(format!("`{key}` must be a small non-negative integer, got {value}")))
}

fn string<'a>(map: &'a Map<String, Value>, key: &str) -> Result<&'a str, OracleError> {
    map.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(format!("missing or non-string `{key}`")))
}

fn flag(map: &Map<String, Value>, key: &str) -> Result<bool, OracleError> {
    map.get(key)
        .and_then(Value::as_bool)
        .ok_or_else(|| malformed(format!("missing or non-boolean `{key}`")))
}

pub fn decode_action(raw: &str) -> Result<ActionDecision, OracleError> {
    let map = object(raw)?;
    let hero = position(&map, "selected_hero_id")?;
    let skill_text = string(&map, "selected_skill")?;
    let skill = classify_active(skill_text)
        .ok_or_else(|| malformed(format!("unrecognised skill `{skill_text}`")))?;
    let target_type = match string(&map, "target_type")?.trim().to_ascii_lowercase().as_str() {
        "enemy" => TargetType::Enemy,
        "teammate" => TargetType::Teammate,
        other => return Err(malformed(format!("unknown target_type `{other}`"))),
    };
    let teammate_target = match map.get("teammate_target_id") {
        None | Some(Value::Null) => None,
        Some(_) => Some(position(&map, "teammate_target_id")?),
    };
    Ok(ActionDecision { hero, skill, target_type, teammate_target })
}

pub fn decode_target(raw: &str) -> Result<TargetReply, OracleError> {
    let map = object(raw)?;
    if let Some(action) = map.get("action") {
        return match action.as_str() {
            Some(action) if action.eq_ignore_ascii_case("surrender") => Ok(TargetReply::Surrender),
            _ => Err(malformed(format!("unknown action {action}"))),
        };
    }
    let position = position(&map, "target_position")?;
    let guessed_identity = string(&map, "guessed_identity")?.to_string();
    Ok(TargetReply::Attack { position, guessed_identity })
}

pub fn decode_skill(raw: &str) -> Result<ParsedSkill, OracleError> {
    let map = object(raw)?;
    let damage_amount = map
        .get("damage_amount")
        .and_then(Value::as_f64)
        .ok_or_else(|| malformed("missing or non-numeric `damage_amount`"))?;
    if damage_amount < 0.0 {
        return Err(malformed(format!("negative damage_amount {damage_amount}")));
    }
    Ok(ParsedSkill {
        damage_amount,
        is_aoe: flag(&map, "is_aoe")?,
        targets_lowest: flag(&map, "targets_lowest")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SkillKind;

    #[test]
    fn action_with_named_skill_and_null_teammate() {
        let decision = decode_action(
            r#"{"selected_hero_id": 2, "selected_skill": "Crit", "target_type": "enemy", "teammate_target_id": null}"#,
        )
        .unwrap();
        assert_eq!(
            decision,
            ActionDecision {
                hero: 2,
                skill: SkillKind::Crit,
                target_type: TargetType::Enemy,
                teammate_target: None
            }
        );
    }

    #[test]
    fn action_accepts_full_skill_descriptions() {
        let decision = decode_action(
            r#"{"selected_hero_id": 0, "selected_skill": "Subtle: Choose a teammate or yourself", "target_type": "Teammate", "teammate_target_id": 0}"#,
        )
        .unwrap();
        assert_eq!(decision.skill, SkillKind::Subtle);
        assert_eq!(decision.target_type, TargetType::Teammate);
        assert_eq!(decision.teammate_target, Some(0));

        let basic = decode_action(
            r#"{"selected_hero_id": 1, "selected_skill": "Basic Attack", "target_type": "enemy"}"#,
        )
        .unwrap();
        assert_eq!(basic.skill, SkillKind::BasicAttack);
    }

    #[test]
    fn action_rejects_missing_or_mistyped_fields() {
        for raw in [
            r#"{"selected_skill": "Crit", "target_type": "enemy"}"#,
            r#"{"selected_hero_id": -1, "selected_skill": "Crit", "target_type": "enemy"}"#,
            r#"{"selected_hero_id": "two", "selected_skill": "Crit", "target_type": "enemy"}"#,
            r#"{"selected_hero_id": 1, "selected_skill": "Dance", "target_type": "enemy"}"#,
            r#"{"selected_hero_id": 1, "selected_skill": "Crit", "target_type": "ally"}"#,
            r#"{"selected_hero_id": 1, "selected_skill": "Infight", "target_type": "teammate", "teammate_target_id": "x"}"#,
            r#"[1, 2, 3]"#,
            "not json",
        ] {
            assert!(matches!(decode_action(raw), Err(OracleError::Malformed(_))), "{raw}");
        }
    }

    #[test]
    fn target_reply_or_surrender() {
        assert_eq!(
            decode_target(r#"{"target_position": 3, "guessed_identity": "Nord"}"#).unwrap(),
            TargetReply::Attack { position: 3, guessed_identity: "Nord".to_string() }
        );
        assert_eq!(decode_target(r#"{"action": "SURRENDER"}"#).unwrap(), TargetReply::Surrender);
        assert!(decode_target(r#"{"action": "RETREAT"}"#).is_err());
        assert!(decode_target(r#"{"target_position": 3}"#).is_err());
    }

    #[test]
    fn skill_parse_requires_every_field() {
        let parsed =
            decode_skill(r#"{"damage_amount": 70.0, "is_aoe": true, "targets_lowest": false}"#)
                .unwrap();
        assert_eq!(parsed, ParsedSkill { damage_amount: 70.0, is_aoe: true, targets_lowest: false });
        assert!(decode_skill(r#"{"damage_amount": 70, "is_aoe": true}"#).is_err());
        assert!(decode_skill(r#"{"damage_amount": -1, "is_aoe": false, "targets_lowest": false}"#).is_err());
        assert!(decode_skill(r#"{"damage_amount": "lots", "is_aoe": false, "targets_lowest": false}"#).is_err());
    }
}

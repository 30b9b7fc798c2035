//! Deterministic skill parser for catalog-style ability text.

use regex::Regex;
use tracing::debug;

use super::{OracleError, SkillParser, SkillQuery};
use crate::combat::ParsedSkill;
use crate::content::BASIC_ATTACK_TEXT;

const CONDITIONAL_PATTERN: &str = r"(?i)below\s+(\d+)[^%]*?(\d+(?:\.\d+)?)\s*%";
const SHARE_OF_ATTACK_PATTERN: &str = r"(?i)(\d+(?:\.\d+)?)\s*%[^.]*?attack (?:point|power)";
const CRITICAL_OF_ATTACK_PATTERN: &str =
    r"(?i)(\d+(?:\.\d+)?)\s+critical damage of (?:your|its) attack (?:point|power)";
const FLAT_PATTERN: &str = r"(?i)deal\s+(\d+(?:\.\d+)?)";
const AOE_PATTERN: &str = r"(?i)all enemies";
const LOWEST_PATTERN: &str = r"(?i)lowest health";

/// Reads damage figures straight out of the ability text.
///
/// Rules, first match wins for the base amount:
/// "Basic Attack" deals the attacker's full attack power; "N% ... attack point"
/// deals that share of it; "N CRITICAL damage of your attack power" deals N%;
/// "Deal N" is flat. A "below T ... P%" clause switches to P% of attack power
/// when the target's health is under T.
#[derive(Clone, Debug)]
pub struct RuleSkillParser {
    conditional: Regex,
    share_of_attack: Regex,
    critical_of_attack: Regex,
    flat: Regex,
    aoe: Regex,
    lowest: Regex,
}

impl RuleSkillParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            conditional: Regex::new(CONDITIONAL_PATTERN)?,
            share_of_attack: Regex::new(SHARE_OF_ATTACK_PATTERN)?,
            critical_of_attack: Regex::new(CRITICAL_OF_ATTACK_PATTERN)?,
            flat: Regex::new(FLAT_PATTERN)?,
            aoe: Regex::new(AOE_PATTERN)?,
            lowest: Regex::new(LOWEST_PATTERN)?,
        })
    }

    fn number(re: &Regex, text: &str, group: usize) -> Option<f64> {
        re.captures(text)?.get(group)?.as_str().parse().ok()
    }

    fn base_amount(&self, text: &str, attack_power: f64) -> Option<f64> {
        if text.trim().eq_ignore_ascii_case(BASIC_ATTACK_TEXT) {
            return Some(attack_power);
        }
        if let Some(percent) = Self::number(&self.share_of_attack, text, 1) {
            return Some(share(attack_power, percent));
        }
        if let Some(percent) = Self::number(&self.critical_of_attack, text, 1) {
            return Some(share(attack_power, percent));
        }
        Self::number(&self.flat, text, 1)
    }

    fn conditional_amount(&self, query: &SkillQuery, attack_power: f64) -> Option<f64> {
        let captures = self.conditional.captures(&query.text)?;
        let threshold: f64 = captures.get(1)?.as_str().parse().ok()?;
        let percent: f64 = captures.get(2)?.as_str().parse().ok()?;
        (f64::from(query.target_health) < threshold).then(|| share(attack_power, percent))
    }
}

fn share(attack_power: f64, percent: f64) -> f64 {
    (attack_power * percent / 100.0).floor()
}

impl SkillParser for RuleSkillParser {
    fn parse(&mut self, query: &SkillQuery) -> Result<ParsedSkill, OracleError> {
        let attack_power = f64::from(query.attacker_attack_power);
        let damage_amount = self
            .conditional_amount(query, attack_power)
            .or_else(|| self.base_amount(&query.text, attack_power))
            .ok_or_else(|| {
                OracleError::Malformed(format!("no damage figure in skill text `{}`", query.text))
            })?;
        let parsed = ParsedSkill {
            damage_amount,
            is_aoe: self.aoe.is_match(&query.text),
            targets_lowest: self.lowest.is_match(&query.text),
        };
        debug!(target: "battle.combat", text = %query.text, ?parsed, "skill text parsed");
        Ok(parsed)
    }
}

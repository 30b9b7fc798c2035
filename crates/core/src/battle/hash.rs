//! Stable snapshot hashing for replay verification.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use super::*;
use crate::intel::KnownStatus;

fn archetype_tag(archetype: Archetype) -> u8 {
    Archetype::ALL.iter().position(|candidate| *candidate == archetype).map_or(u8::MAX, |idx| idx as u8)
}

impl Battle {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u32(self.round);
        hasher.write_u8(self.to_act.index() as u8);
        for state in &self.sides {
            hasher.write_i64(state.starting_health);
            for hero in state.roster.heroes() {
                hasher.write_u8(hero.position);
                hasher.write_u8(archetype_tag(hero.archetype));
                hasher.write_i32(hero.health);
                hasher.write_i32(hero.attack_power);
                hasher.write_u8(u8::from(hero.is_alive()));
                hasher.write_u8(u8::from(hero.revealed));
                hasher.write_u8(u8::from(hero.shield_active));
                hasher.write_i32(hero.accumulated_damage);
                hasher.write_i32(hero.buff_threshold);
            }
            for entry in state.intel.snapshot() {
                hasher.write_u8(entry.position);
                hasher.write_u8(entry.identity.map_or(u8::MAX, archetype_tag));
                hasher.write_i32(entry.health.unwrap_or(-1));
                hasher.write_u8(match entry.status {
                    KnownStatus::Unknown => 0,
                    KnownStatus::Alive => 1,
                    KnownStatus::Dead => 2,
                });
            }
        }
        hasher.finish()
    }
}

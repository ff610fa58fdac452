//! Synthetic participant roster.
//!
//! The roster is manufactured once at engine start and never changes for the
//! process lifetime: a fixed number of synthetic identities plus exactly one
//! admin-bot identity under the well-known [`ADMIN_ID`]. Structure is
//! deterministic, content is random: two engines with different seeds get
//! different names, the same seed reproduces the roster exactly.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Well-known id of the single admin-bot identity.
pub const ADMIN_ID: &str = "admin-support";

const ADMIN_DISPLAY_NAME: &str = "Support";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
        }
    }
}

/// One synthetic participant record. Immutable after roster construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Identity {
    pub id: String,
    pub display_name: String,
    pub avatar_ref: String,
    pub country: String,
    pub gender: Gender,
    pub is_admin_bot: bool,
}

/// Per-country name table. An empty table falls back to the generic pool.
struct NameTable {
    country: &'static str,
    female_first: &'static [&'static str],
    male_first: &'static [&'static str],
    last: &'static [&'static str],
}

const NAME_TABLES: &[NameTable] = &[
    NameTable {
        country: "DE",
        female_first: &["Anna", "Lena", "Katrin", "Sofie", "Mia"],
        male_first: &["Lukas", "Finn", "Jonas", "Max", "Felix"],
        last: &["Muller", "Schmidt", "Fischer", "Weber", "Wagner"],
    },
    NameTable {
        country: "FR",
        female_first: &["Camille", "Chloe", "Manon", "Lea", "Emma"],
        male_first: &["Hugo", "Louis", "Lucas", "Nathan", "Theo"],
        last: &["Martin", "Bernard", "Dubois", "Robert", "Moreau"],
    },
    NameTable {
        country: "ES",
        female_first: &["Lucia", "Maria", "Paula", "Sofia", "Carla"],
        male_first: &["Hugo", "Daniel", "Pablo", "Alvaro", "Diego"],
        last: &["Garcia", "Lopez", "Martinez", "Sanchez", "Romero"],
    },
    NameTable {
        country: "BR",
        female_first: &["Ana", "Beatriz", "Julia", "Larissa", "Camila"],
        male_first: &["Gabriel", "Lucas", "Matheus", "Rafael", "Thiago"],
        last: &["Silva", "Santos", "Oliveira", "Souza", "Costa"],
    },
    NameTable {
        country: "JP",
        female_first: &["Yui", "Hana", "Sakura", "Aoi", "Rin"],
        male_first: &["Haruto", "Ren", "Sota", "Yuto", "Kaito"],
        last: &["Sato", "Suzuki", "Takahashi", "Tanaka", "Watanabe"],
    },
    // Countries without a dedicated table draw from the generic pool.
    NameTable {
        country: "US",
        female_first: &[],
        male_first: &[],
        last: &[],
    },
    NameTable {
        country: "GB",
        female_first: &[],
        male_first: &[],
        last: &[],
    },
    NameTable {
        country: "NG",
        female_first: &[],
        male_first: &[],
        last: &[],
    },
];

const GENERIC_FEMALE_FIRST: &[&str] = &[
    "Maya", "Nina", "Sara", "Elena", "Amara", "Leila", "Ines", "Dana", "Noor", "Ava",
];

const GENERIC_MALE_FIRST: &[&str] = &[
    "Adam", "Omar", "Leo", "Ivan", "Marco", "Samir", "Jon", "Ali", "Dev", "Noah",
];

const GENERIC_LAST: &[&str] = &[
    "Okafor", "Novak", "Rossi", "Khan", "Petrov", "Ahmed", "Larsen", "Mori", "Silva", "Brown",
];

fn pick<'a>(rng: &mut impl Rng, pool: &[&'a str], fallback: &[&'a str]) -> &'a str {
    // Degenerate pools never error; the generic pool backs every table.
    pool.choose(rng)
        .or_else(|| fallback.choose(rng))
        .copied()
        .unwrap_or("Alex")
}

fn synthesize_identity(rng: &mut impl Rng, index: usize) -> Identity {
    let gender = if rng.gen_bool(0.5) {
        Gender::Female
    } else {
        Gender::Male
    };
    let table = &NAME_TABLES[rng.gen_range(0..NAME_TABLES.len())];
    let first = match gender {
        Gender::Female => pick(rng, table.female_first, GENERIC_FEMALE_FIRST),
        Gender::Male => pick(rng, table.male_first, GENERIC_MALE_FIRST),
    };
    let last = pick(rng, table.last, GENERIC_LAST);
    Identity {
        id: format!("guest-{index:04}"),
        display_name: format!("{first} {last}"),
        avatar_ref: format!("avatars/{}/{:03}.png", gender.as_str(), index % 64),
        country: table.country.to_string(),
        gender,
        is_admin_bot: false,
    }
}

fn admin_identity() -> Identity {
    Identity {
        id: ADMIN_ID.to_string(),
        display_name: ADMIN_DISPLAY_NAME.to_string(),
        avatar_ref: "avatars/admin.png".to_string(),
        country: "US".to_string(),
        gender: Gender::Female,
        is_admin_bot: true,
    }
}

/// The full participant roster: `size` synthetic identities plus the admin.
#[derive(Debug)]
pub struct Roster {
    identities: Vec<Identity>,
    by_id: HashMap<String, usize>,
}

impl Roster {
    /// Manufacture a roster of `size` synthetic identities and one admin.
    pub fn generate(rng: &mut impl Rng, size: usize) -> Self {
        let mut identities = Vec::with_capacity(size + 1);
        for index in 0..size {
            identities.push(synthesize_identity(rng, index));
        }
        identities.push(admin_identity());

        let by_id = identities
            .iter()
            .enumerate()
            .map(|(position, identity)| (identity.id.clone(), position))
            .collect();
        Roster { identities, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&Identity> {
        self.by_id.get(id).map(|position| &self.identities[*position])
    }

    pub fn admin(&self) -> &Identity {
        self.get(ADMIN_ID).expect("roster always contains the admin")
    }

    /// Ids of every non-admin identity, in roster order.
    pub fn synthetic_ids(&self) -> Vec<String> {
        self.identities
            .iter()
            .filter(|identity| !identity.is_admin_bot)
            .map(|identity| identity.id.clone())
            .collect()
    }

    /// Total roster size including the admin.
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

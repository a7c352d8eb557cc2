use crate::rules::calendar::MILITARY_INTERVAL;
use crate::simulation::economy::Security;
use crate::simulation::random::RandomSource;

/// Military challenges only threaten villages larger than this.
pub const MILITARY_MIN_POPULATION: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Threat {
    BanditRaid,
    Brigands,
    Warband,
    Invasion,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MilitaryDeltas {
    pub food: f64,
    pub wood: f64,
    pub gold: f64,
    pub pop: i32,
}

impl Threat {
    pub const ALL: [Threat; 4] = [Threat::BanditRaid, Threat::Brigands, Threat::Warband, Threat::Invasion];

    /// Villagers one defender is expected to protect against this threat.
    pub fn divisor(self) -> f64 {
        match self {
            Threat::BanditRaid => 15.0,
            Threat::Brigands => 12.0,
            Threat::Warband => 10.0,
            Threat::Invasion => 8.0,
        }
    }

    pub fn required_defenders(self, population: usize) -> u32 {
        ((population as f64 / self.divisor()).ceil() as u32).max(1)
    }

    pub fn success_bonus(self) -> MilitaryDeltas {
        let (food, wood, gold) = match self {
            Threat::BanditRaid => (0.0, 0.0, 20.0),
            Threat::Brigands => (30.0, 0.0, 40.0),
            Threat::Warband => (50.0, 30.0, 80.0),
            Threat::Invasion => (100.0, 50.0, 150.0),
        };
        MilitaryDeltas { food, wood, gold, pop: 0 }
    }

    pub fn failure_loss(self) -> MilitaryDeltas {
        let (food, wood, gold, pop) = match self {
            Threat::BanditRaid => (-50.0, -20.0, -30.0, -1),
            Threat::Brigands => (-80.0, -40.0, -50.0, -2),
            Threat::Warband => (-150.0, -80.0, -100.0, -4),
            Threat::Invasion => (-250.0, -150.0, -200.0, -8),
        };
        MilitaryDeltas { food, wood, gold, pop }
    }

    pub fn message(self) -> &'static str {
        match self {
            Threat::BanditRaid => "A band of raiders creeps toward the village.",
            Threat::Brigands => "Brigands gather on the road and demand tribute.",
            Threat::Warband => "A warband marches on the village.",
            Threat::Invasion => "An army crosses the border in full force.",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            Threat::BanditRaid => "The guards drive them off and recover stolen coin.",
            Threat::Brigands => "The guards scatter the brigands and seize their supplies.",
            Threat::Warband => "The defenders break the warband and claim its baggage.",
            Threat::Invasion => "The invasion is repelled and the spoils are rich.",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            Threat::BanditRaid => "The raiders slip past the guards.",
            Threat::Brigands => "The brigands plunder the storehouses.",
            Threat::Warband => "The warband burns the outskirts.",
            Threat::Invasion => "The invaders sack the village.",
        }
    }
}

/// Tier picked for a village of `population`. Larger villages face bigger threats.
pub fn pick_threat(population: usize, rng: &mut impl RandomSource) -> Threat {
    let bracket = if population < 15 {
        1
    } else if population < 30 {
        2
    } else if population < 50 {
        3
    } else {
        Threat::ALL.len()
    };
    Threat::ALL[rng.index(bracket).min(bracket - 1)]
}

pub fn is_military_week(tick: u32, population: usize) -> bool {
    population > MILITARY_MIN_POPULATION && tick % MILITARY_INTERVAL == 0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Engagement {
    Repelled { threat: Threat, bonus: MilitaryDeltas },
    Survived { threat: Threat, loss: MilitaryDeltas },
    /// Defenders overwhelmed; the village is lost.
    Overrun { threat: Threat },
}

impl Engagement {
    pub fn threat(&self) -> Threat {
        match *self {
            Engagement::Repelled { threat, .. }
            | Engagement::Survived { threat, .. }
            | Engagement::Overrun { threat } => threat,
        }
    }

    /// Resource changes applied at settlement.
    pub fn deltas(&self) -> MilitaryDeltas {
        match *self {
            Engagement::Repelled { bonus, .. } => bonus,
            Engagement::Survived { loss, .. } => loss,
            Engagement::Overrun { .. } => MilitaryDeltas::default(),
        }
    }

    pub fn casualties(&self) -> usize {
        match *self {
            Engagement::Survived { loss, .. } => loss.pop.unsigned_abs() as usize,
            _ => 0,
        }
    }
}

/// Compare defence strength with what the threat demands.
///
/// Each guard counts for the full coverage including defensive buildings, while
/// the requirement is measured against base coverage alone.
pub fn resolve(
    threat: Threat,
    population: usize,
    security: &Security,
) -> Engagement {
    let required = threat.required_defenders(population) as f64;
    let strength = security.guards as f64 * security.coverage;
    if strength >= required * security.base_coverage {
        return Engagement::Repelled {
            threat,
            bonus: threat.success_bonus(),
        };
    }
    let loss = threat.failure_loss();
    if population as i64 + loss.pop as i64 <= 0 || security.guards == 0 {
        Engagement::Overrun { threat }
    } else {
        Engagement::Survived { threat, loss }
    }
}

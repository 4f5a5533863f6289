//! Ranking strategies and mixed-mode rotation.

use log::warn;

use crate::domain::error::EngineError;
use crate::ports::store_port::RotationStatePort;

/// Closed set of ranking strategies. `Mixed` is a placeholder that resolves
/// to one of the concrete strategies via the rotation cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    TopGainers,
    TopLosers,
    TopVolume,
    LessVolume,
    TopMarketCap,
    Mixed,
}

/// Rotation order under mixed mode.
pub const CONCRETE_STRATEGIES: [Strategy; 5] = [
    Strategy::TopGainers,
    Strategy::TopLosers,
    Strategy::TopVolume,
    Strategy::LessVolume,
    Strategy::TopMarketCap,
];

impl Strategy {
    pub fn is_concrete(self) -> bool {
        self != Strategy::Mixed
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::TopGainers => "gainer",
            Strategy::TopLosers => "loser",
            Strategy::TopVolume => "volume",
            Strategy::LessVolume => "less-volume",
            Strategy::TopMarketCap => "marketcap",
            Strategy::Mixed => "mixed",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Strategy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gainer" => Ok(Strategy::TopGainers),
            "loser" => Ok(Strategy::TopLosers),
            "volume" => Ok(Strategy::TopVolume),
            "less-volume" => Ok(Strategy::LessVolume),
            "marketcap" => Ok(Strategy::TopMarketCap),
            "mixed" => Ok(Strategy::Mixed),
            other => Err(EngineError::ConfigInvalid {
                name: "strategy".into(),
                reason: format!("unknown strategy {other}"),
            }),
        }
    }
}

/// Resolve the configured strategy for this invocation. Anything concrete
/// passes through; `Mixed` advances the persisted rotation cursor to the
/// next concrete strategy and returns it.
pub fn resolve(
    configured: Strategy,
    state: &dyn RotationStatePort,
) -> Result<Strategy, EngineError> {
    if configured.is_concrete() {
        return Ok(configured);
    }

    let next = match state.load() {
        Some(last) if last < CONCRETE_STRATEGIES.len() => (last + 1) % CONCRETE_STRATEGIES.len(),
        Some(last) => {
            warn!("rotation cursor {last} out of range, restarting rotation");
            0
        }
        None => 0,
    };
    state.store(next)?;
    Ok(CONCRETE_STRATEGIES[next])
}

use thiserror::Error;

/// Evidence that the engine's model of the authority is wrong.
///
/// Always recoverable: by the time one of these is returned the engine has
/// already dropped back to an uncracked state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Contradiction {
    #[error(
        "no enchantment seed matches the table; the server may run unknown mods, \
         the client may be desynced, or the table was read wrong"
    )]
    CandidatesExhausted,

    #[error(
        "seeds {first:#010x} and {second:#010x} are not consecutive player RNG outputs; \
         the server may run unknown mods, the client may be desynced, or something \
         else used the player RNG (e.g. an operator /give)"
    )]
    InconsistentSeeds { first: u32, second: u32 },
}

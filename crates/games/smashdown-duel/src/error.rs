/// Fatal configuration problems detected while setting up a match.
#[derive(Debug, Clone, PartialEq)]
pub enum SetupError {
    UnknownVariant(String),
    UnknownDifficulty(String),
    ArenaTooNarrow { width: f32, required: f32 },
    InvalidFighterSize { width: f32, height: f32 },
    TimerOutOfRange { field: &'static str, ms: u64, max: u64 },
}

impl std::fmt::Display for SetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownVariant(name) => write!(f, "unknown fighter variant: {name:?}"),
            Self::UnknownDifficulty(name) => write!(f, "unknown difficulty: {name:?}"),
            Self::ArenaTooNarrow { width, required } => {
                write!(f, "arena width {width} is too narrow (need at least {required})")
            },
            Self::InvalidFighterSize { width, height } => {
                write!(f, "invalid fighter size {width}x{height}")
            },
            Self::TimerOutOfRange { field, ms, max } => {
                write!(f, "{field} = {ms}ms exceeds the {max}ms limit")
            },
        }
    }
}

impl std::error::Error for SetupError {}

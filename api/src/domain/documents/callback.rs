/// Save status reported by the document server in its callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackStatus {
    NoDocument,
    Editing,
    ReadyForSave,
    SaveError,
    ClosedUnchanged,
    ForceSave,
    ForceSaveError,
    Unknown(i64),
}

impl CallbackStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::NoDocument,
            1 => Self::Editing,
            2 => Self::ReadyForSave,
            3 => Self::SaveError,
            4 => Self::ClosedUnchanged,
            6 => Self::ForceSave,
            7 => Self::ForceSaveError,
            other => Self::Unknown(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::NoDocument => 0,
            Self::Editing => 1,
            Self::ReadyForSave => 2,
            Self::SaveError => 3,
            Self::ClosedUnchanged => 4,
            Self::ForceSave => 6,
            Self::ForceSaveError => 7,
            Self::Unknown(code) => *code,
        }
    }

    /// 2 and 6 carry a URL with the new document state.
    pub fn requires_save(&self) -> bool {
        matches!(self, Self::ReadyForSave | Self::ForceSave)
    }
}

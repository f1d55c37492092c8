//! Statut hors-ligne d'une playlist

/// Statut hors-ligne rapporté par l'autorité
///
/// Chaque code connu correspond à exactement un statut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum OfflineStatus {
    /// Code 0 : état de base du mode hors-ligne, aucune copie locale en cours
    OfflineMode = 0,
    /// Code 1 : disponible hors-ligne
    AvailableOffline = 1,
    /// Code 2 : synchronisation en cours
    Syncing = 2,
    /// Code 3 : en attente de synchronisation
    Waiting = 3,
}

impl OfflineStatus {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(OfflineStatus::OfflineMode),
            1 => Some(OfflineStatus::AvailableOffline),
            2 => Some(OfflineStatus::Syncing),
            3 => Some(OfflineStatus::Waiting),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

//! Validation des noms de playlist saisis par l'utilisateur

/// Taille maximale d'un nom, en octets UTF-8
pub const MAX_NAME_BYTES: usize = 255;

/// Raison du rejet d'un nom
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("name must not be blank")]
    Blank,

    #[error("name is too long ({len} bytes, max {max} bytes)")]
    TooManyBytes { len: usize, max: usize },
}

/// Vérifie qu'un nom est utilisable
///
/// La limite porte sur les octets et non sur les caractères : 200 « ä »
/// occupent 400 octets et sont refusés.
pub fn check_name(name: &str) -> Result<(), NameError> {
    if name.trim().is_empty() {
        return Err(NameError::Blank);
    }

    if name.len() > MAX_NAME_BYTES {
        return Err(NameError::TooManyBytes {
            len: name.len(),
            max: MAX_NAME_BYTES,
        });
    }

    Ok(())
}

/// Retourne le message d'erreur si le nom est invalide, `None` sinon
pub fn invalid_name(name: &str) -> Option<String> {
    check_name(name).err().map(|e| e.to_string())
}

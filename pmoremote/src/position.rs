//! Résolution des positions signées en offsets absolus

/// Position hors des bornes de la collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("position {requested} out of range for length {len}")]
pub struct OutOfRange {
    pub requested: i64,
    pub len: usize,
}

/// Convertit une position signée en offset absolu
///
/// Les valeurs négatives comptent depuis la fin. Avec `allow_append`, la fin
/// de la collection est elle-même une position valide (`len`), et `-1`
/// désigne donc cette position d'ajout.
///
/// ```
/// use pmoremote::position::resolve;
///
/// assert_eq!(resolve(-1, 4, false), Ok(3));
/// assert_eq!(resolve(-1, 4, true), Ok(4));
/// assert!(resolve(4, 4, false).is_err());
/// ```
pub fn resolve(requested: i64, len: usize, allow_append: bool) -> Result<usize, OutOfRange> {
    let err = OutOfRange { requested, len };
    let slots = if allow_append { len + 1 } else { len };
    let slots = i64::try_from(slots).map_err(|_| err)?;

    let absolute = if requested < 0 {
        slots + requested
    } else {
        requested
    };

    if absolute < 0 || absolute >= slots {
        return Err(err);
    }

    usize::try_from(absolute).map_err(|_| err)
}

/// Résout un lot de positions (tout ou rien)
///
/// Retourne les offsets triés et dédoublonnés.
pub fn resolve_all(
    requested: &[i64],
    len: usize,
    allow_append: bool,
) -> Result<Vec<usize>, OutOfRange> {
    let mut offsets = requested
        .iter()
        .map(|&position| resolve(position, len, allow_append))
        .collect::<Result<Vec<_>, _>>()?;
    offsets.sort_unstable();
    offsets.dedup();
    Ok(offsets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_positions() {
        assert_eq!(resolve(0, 3, false), Ok(0));
        assert_eq!(resolve(2, 3, false), Ok(2));
        assert_eq!(resolve(3, 3, false), Err(OutOfRange { requested: 3, len: 3 }));
    }

    #[test]
    fn test_minus_one_is_last_slot() {
        for len in 1..20 {
            assert_eq!(resolve(-1, len, false), Ok(len - 1));
        }
    }

    #[test]
    fn test_append_slot() {
        for len in 0..20 {
            assert_eq!(resolve(len as i64, len, true), Ok(len));
            assert!(resolve(len as i64, len, false).is_err());
            assert!(resolve(len as i64 + 1, len, true).is_err());
        }
    }

    #[test]
    fn test_negative_out_of_range() {
        assert!(resolve(-5, 4, false).is_err());
        assert_eq!(resolve(-4, 4, false), Ok(0));
        assert_eq!(resolve(-5, 4, true), Ok(0));
        assert!(resolve(-6, 4, true).is_err());
    }

    #[test]
    fn test_empty_collection() {
        assert!(resolve(0, 0, false).is_err());
        assert!(resolve(-1, 0, false).is_err());
        assert_eq!(resolve(0, 0, true), Ok(0));
        assert_eq!(resolve(-1, 0, true), Ok(0));
    }

    #[test]
    fn test_resolve_all_is_all_or_nothing() {
        assert_eq!(resolve_all(&[3, 1, -1], 4, false), Ok(vec![1, 3]));
        assert_eq!(
            resolve_all(&[0, 4], 4, false),
            Err(OutOfRange { requested: 4, len: 4 })
        );
    }
}

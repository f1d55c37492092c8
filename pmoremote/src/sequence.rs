//! Opérations de référence sur une séquence ordonnée
//!
//! Ces fonctions fixent la sémantique attendue d'une autorité pour les trois
//! mutations de playlist. Les offsets reçus sont déjà résolus et valides
//! (voir [`crate::position`]).

use std::collections::BTreeSet;

/// Insère `batch` à `offset`, en conservant l'ordre du lot
pub fn insert_at<T>(items: &mut Vec<T>, offset: usize, batch: impl IntoIterator<Item = T>) {
    let offset = offset.min(items.len());
    let tail = items.split_off(offset);
    items.extend(batch);
    items.extend(tail);
}

/// Retire simultanément les éléments aux offsets donnés
///
/// Les offsets désignent tous l'indexation d'origine : retirer `{1, 3}` de
/// `[X, Y, Z, W]` donne `[X, Z]`.
pub fn remove_at<T>(items: &mut Vec<T>, offsets: &[usize]) {
    let doomed: BTreeSet<usize> = offsets.iter().copied().collect();
    let mut index = 0;
    items.retain(|_| {
        let keep = !doomed.contains(&index);
        index += 1;
        keep
    });
}

/// Déplace en bloc les éléments aux offsets donnés vers `destination`
///
/// Les éléments déplacés sont extraits dans leur ordre d'origine, puis
/// réinsérés à partir de `destination` dans le reste de la séquence (borné à
/// sa longueur). L'ordre relatif des deux groupes est conservé.
pub fn move_to<T>(items: &mut Vec<T>, offsets: &[usize], destination: usize) {
    let selected: BTreeSet<usize> = offsets.iter().copied().collect();
    let mut moved = Vec::with_capacity(selected.len());
    let mut remainder = Vec::with_capacity(items.len());

    for (index, item) in items.drain(..).enumerate() {
        if selected.contains(&index) {
            moved.push(item);
        } else {
            remainder.push(item);
        }
    }

    insert_at(&mut remainder, destination, moved);
    *items = remainder;
}

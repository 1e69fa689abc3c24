// Small helpers shared by the engine and the views

use crate::constants::{IMAGE_DIR, IMAGE_EXT, SLOT_COUNT};

/// `djinn` -> `images/djinn.png`
pub fn texture_path(id: &str) -> String {
    format!("{}/{}.{}", IMAGE_DIR, id, IMAGE_EXT)
}

/// Catalog identifier of a texture path: the file name without directory or extension.
pub fn texture_id(path: &str) -> &str {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.split_once('.') {
        Some((stem, _)) => stem,
        None => file,
    }
}

/// Slot number typed by the player; anything outside `0..SLOT_COUNT` is rejected.
pub fn parse_slot(input: &str) -> Option<usize> {
    input.trim().parse::<usize>().ok().filter(|i| *i < SLOT_COUNT)
}

/// Toggle `slot` in a selection holding at most two slots (oldest dropped first).
pub fn toggle_selection(current: &[usize], slot: usize) -> Vec<usize> {
    let mut next: Vec<usize> = current.iter().copied().filter(|s| *s != slot).collect();
    if next.len() == current.len() {
        next.push(slot);
        if next.len() > 2 {
            next.remove(0);
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_id_strips_dir_and_extension() {
        assert_eq!(texture_id("images/djinn.png"), "djinn");
        assert_eq!(texture_id("uma.png"), "uma");
        assert_eq!(texture_id("taaka"), "taaka");
        assert_eq!(texture_id(&texture_path("phoenix")), "phoenix");
    }

    #[test]
    fn test_parse_slot_bounds() {
        assert_eq!(parse_slot(" 0 "), Some(0));
        assert_eq!(parse_slot("11"), Some(11));
        assert_eq!(parse_slot("12"), None);
        assert_eq!(parse_slot("-1"), None);
        assert_eq!(parse_slot("two"), None);
    }

    #[test]
    fn test_selection_keeps_last_two() {
        let sel = toggle_selection(&[], 3);
        let sel = toggle_selection(&sel, 5);
        assert_eq!(sel, vec![3, 5]);
        assert_eq!(toggle_selection(&sel, 7), vec![5, 7]);
        assert_eq!(toggle_selection(&sel, 3), vec![5]);
    }
}
